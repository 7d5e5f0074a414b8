//! Soul Player CLI - headless playback driver
//!
//! Wires a JSON catalog and a headless media engine into a
//! [`soul_playback::PlaybackController`] and runs scripted transport
//! commands against it.

pub mod backend;
pub mod config;
pub mod error;
pub mod script;

pub use backend::HeadlessBackend;
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use script::{execute, parse_script, ScriptCommand};
