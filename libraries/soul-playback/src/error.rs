//! Error types for playback management

use crate::backend::BackendError;
use soul_core::{QueueSource, SoulError};
use thiserror::Error;

/// Playback errors
///
/// Queue-shape errors (`NoQueueToPlay`, `EmptyQueueSource`, `IndexOutOfRange`,
/// `NotAvailable`, `InvalidSeekPosition`) are raised before any state is
/// touched. `BackendUnavailable` and `Released` are terminal for the
/// controller instance.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// `play()` with no replacement queue while nothing is queued
    #[error("No queue to play")]
    NoQueueToPlay,

    /// An album or playlist resolved to zero tracks
    #[error("Queue source {reference} has no tracks")]
    EmptyQueueSource { reference: QueueSource },

    /// Jump target outside the current queue
    #[error("Index out of range: entry {entry}, sub-item {sub} (queue length {len})")]
    IndexOutOfRange { entry: usize, sub: usize, len: usize },

    /// Command requires an established queue
    #[error("{command} requires an established queue")]
    NotAvailable { command: &'static str },

    /// Seek target past the end of the current track
    #[error("Invalid seek position: {target_ms}ms (duration {duration_ms}ms)")]
    InvalidSeekPosition { target_ms: u64, duration_ms: u64 },

    /// Duration probing failed or timed out
    ///
    /// Transport commands never return this: the controller reports probe
    /// failures as `PlaybackEvent::ProbeFailed` and keeps the track
    /// selected. It exists for callers converting a raw `BackendError`.
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    /// The media engine could not be initialized
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The controller has been released
    #[error("Playback controller released")]
    Released,

    /// Resolver lookup failed
    #[error("Resolve error: {0}")]
    Resolve(#[from] SoulError),

    /// Media backend call failed
    #[error("Backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for PlaybackError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(reason) => Self::BackendUnavailable(reason),
            err @ (BackendError::ProbeTimeout { .. } | BackendError::ProbeUnparseable { .. }) => {
                Self::ProbeFailed(err.to_string())
            }
            other => Self::Backend(other),
        }
    }
}

impl PlaybackError {
    /// Whether the controller can accept further commands after this error
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_) | Self::Released)
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_map_by_kind() {
        let err: PlaybackError = BackendError::Unavailable("no audio device".into()).into();
        assert!(matches!(err, PlaybackError::BackendUnavailable(ref reason) if reason == "no audio device"));
        assert!(err.is_terminal());

        let err: PlaybackError = BackendError::ProbeTimeout {
            uri: "/music/slow.flac".into(),
            timeout_ms: 200,
        }
        .into();
        assert!(matches!(err, PlaybackError::ProbeFailed(ref reason) if reason.contains("200ms")));
        assert!(!err.is_terminal());

        let err: PlaybackError = BackendError::ProbeUnparseable {
            uri: "/music/odd.flac".into(),
            reason: "bad header".into(),
        }
        .into();
        assert!(matches!(err, PlaybackError::ProbeFailed(_)));

        let err: PlaybackError = BackendError::Engine("device lost".into()).into();
        assert!(matches!(err, PlaybackError::Backend(BackendError::Engine(_))));
    }
}
