/// CLI error types
use soul_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] soul_core::SoulError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
