//! Playback Events
//!
//! Fine-grained notifications broadcast alongside the state snapshot.
//! Events are emitted at key points:
//! - Transport changes (play/pause)
//! - Track changes (every position change that selects a new track)
//! - Queue and repeat-mode changes
//! - Degraded media (probe failures, silent or unloadable tracks)
//! - Terminal conditions (backend unavailable, release)
//!
//! Snapshots coalesce; events do not. Subscribers that fall behind the
//! broadcast buffer see `RecvError::Lagged` and should resynchronize from the
//! latest snapshot.

use crate::types::{Position, RepeatMode};
use serde::{Deserialize, Serialize};
use soul_core::TrackId;

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Transport started or stopped producing output
    StateChanged {
        /// Whether playback is now running
        is_playing: bool,
    },

    /// A different track became current
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
        /// Queue position of the new track
        position: Position,
    },

    /// Queue replaced or extended
    QueueChanged {
        /// New number of top-level entries
        length: usize,
    },

    /// Repeat mode changed
    RepeatModeChanged { mode: RepeatMode },

    /// Explicit seek applied
    Seeked { position_ms: u64 },

    /// Duration probing failed; the track stays playable
    ProbeFailed { track_id: TrackId, reason: String },

    /// Current track has no audio URI
    SilentTrack { track_id: TrackId },

    /// Backend refused to load the current track
    TrackLoadFailed { track_id: TrackId, reason: String },

    /// Last track finished with repeat off
    QueueFinished,

    /// Media engine could not be initialized
    BackendUnavailable { reason: String },

    /// Controller torn down
    Released,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlaybackEvent::TrackChanged {
            track_id: TrackId::new("t2"),
            previous_track_id: Some(TrackId::new("t1")),
            position: Position::new(0, 1),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "track_changed");
        assert_eq!(json["track_id"], "t2");
        assert_eq!(json["position"]["sub"], 1);
    }
}
