//! Soul Player - Playback Controller
//!
//! Owns the playback queue, position, and transport state, and serializes
//! every change against an external, stateful media engine.
//!
//! This crate provides:
//! - Queue model (tracks, albums, playlists with sub-item navigation)
//! - Playback state machine (`Unavailable -> Loading -> Available`)
//! - Repeat modes (Off, Track, List)
//! - Media backend adapter (blocking engine calls, bounded duration probing)
//! - Observable state snapshots and playback events
//! - Elapsed-time clock
//!
//! # Architecture
//!
//! `soul-playback` is platform-agnostic:
//! - Library lookups come from any [`soul_core::TrackResolver`]
//! - The media engine is any [`MediaBackend`] implementation
//! - Commands run one at a time on a single worker task
//!
//! # Example: Basic Playback
//!
//! ```rust,no_run
//! use soul_core::{Catalog, CatalogAlbum, QueueSource, TrackRef};
//! use soul_playback::{BackendResult, MediaBackend, PlaybackConfig, PlaybackController};
//! use std::sync::Arc;
//!
//! struct Silent;
//!
//! impl MediaBackend for Silent {
//!     fn load(&self, _uri: &str) -> BackendResult<()> { Ok(()) }
//!     fn play(&self) -> BackendResult<()> { Ok(()) }
//!     fn pause(&self) -> BackendResult<()> { Ok(()) }
//!     fn stop(&self) -> BackendResult<()> { Ok(()) }
//!     fn seek(&self, _position_ms: u64) -> BackendResult<()> { Ok(()) }
//!     fn probe_duration(&self, _uri: &str) -> BackendResult<u64> { Ok(180_000) }
//!     fn is_playing(&self) -> bool { false }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> soul_playback::Result<()> {
//! let catalog = Catalog::new()
//!     .with_track(TrackRef::new("t1", "Opening").with_audio_uri("/music/01.flac"))
//!     .with_track(TrackRef::new("t2", "Closing").with_audio_uri("/music/02.flac"))
//!     .with_album(CatalogAlbum::new("a1", "Debut").with_tracks(["t1", "t2"]));
//!
//! let controller = PlaybackController::spawn(PlaybackConfig::default(), Arc::new(catalog), Silent);
//!
//! controller.play(vec![QueueSource::album("a1")]).await?;
//! controller.next().await?;
//! controller.pause().await?;
//!
//! let snapshot = controller.snapshot();
//! assert!(snapshot.enabled);
//! assert!(!snapshot.state.is_playing());
//!
//! controller.release().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Observing State
//!
//! ```rust,no_run
//! use soul_playback::{PlaybackController, PlaybackEvent};
//!
//! async fn watch(controller: PlaybackController) {
//!     let mut observer = controller.subscribe();
//!     let mut events = controller.subscribe_events();
//!
//!     while let Ok(snapshot) = observer.changed().await {
//!         if !snapshot.enabled {
//!             continue; // command in flight
//!         }
//!         println!("{:?}", snapshot.state);
//!     }
//!
//!     while let Ok(event) = events.recv().await {
//!         if let PlaybackEvent::TrackChanged { track_id, .. } = event {
//!             println!("now playing {track_id}");
//!         }
//!     }
//! }
//! ```

mod backend;
mod clock;
mod controller;
mod error;
mod events;
mod machine;
mod publisher;
pub mod queue;
pub mod types;

// Public exports
pub use backend::{BackendAdapter, BackendError, BackendResult, MediaBackend};
pub use clock::ElapsedClock;
pub use controller::{PlaybackCommand, PlaybackController, WeakPlaybackController};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use publisher::{StateObserver, StatePublisher};
pub use queue::{AlbumEntry, PlaylistEntry, Queue, QueueEntry};
pub use types::{
    Condition, PlaybackConfig, PlaybackSnapshot, PlaybackState, Position, RepeatMode, Session,
    TrackStatus,
};
