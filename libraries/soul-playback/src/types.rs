//! Core types for playback management

use crate::queue::Queue;
use serde::{Deserialize, Serialize};
use soul_core::TrackRef;
use std::time::Duration;

/// Repeat mode
///
/// Consulted when a track finishes on its own. Explicit `next()` and
/// `previous()` always wrap around the queue regardless of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Advance through the queue and stop after the last track
    #[default]
    Off,

    /// Replay the current track
    Track,

    /// Loop the entire queue
    List,
}

impl RepeatMode {
    /// Next mode in the `Off -> Track -> List -> Off` cycle
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::Track,
            RepeatMode::Track => RepeatMode::List,
            RepeatMode::List => RepeatMode::Off,
        }
    }
}

/// Pointer into the queue: top-level entry plus sub-item within that entry
///
/// `sub` is always 0 for single-track entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub entry: usize,
    pub sub: usize,
}

impl Position {
    pub const START: Position = Position { entry: 0, sub: 0 };

    pub fn new(entry: usize, sub: usize) -> Self {
        Self { entry, sub }
    }
}

/// Media status of the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    /// Loaded into the backend with a known duration
    Playable,

    /// Loaded, but neither the probe nor the library knows the duration
    DurationUnknown,

    /// Track has no audio URI; selected but never handed to the backend
    Silent,

    /// Backend rejected the audio URI
    LoadFailed,
}

impl TrackStatus {
    /// Whether transport controls (play/pause/seek) act on real media
    pub fn is_audible(self) -> bool {
        matches!(self, TrackStatus::Playable | TrackStatus::DurationUnknown)
    }
}

/// Steady-state playback session
///
/// Only the state machine constructs or mutates sessions; the invariants
/// (non-empty queue, in-range position) hold for every published value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub(crate) queue: Queue,
    pub(crate) position: Position,
    pub(crate) is_playing: bool,
    pub(crate) repeat_mode: RepeatMode,
    pub(crate) duration_ms: Option<u64>,
    pub(crate) elapsed_ms: u64,
    pub(crate) track_status: TrackStatus,
}

impl Session {
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Duration of the current track in milliseconds, if known
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn track_status(&self) -> TrackStatus {
        self.track_status
    }

    /// The track the position resolves to
    pub fn current_track(&self) -> &TrackRef {
        self.queue.current_track(self.position)
    }
}

/// Playback state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlaybackState {
    /// No queue established yet
    #[default]
    Unavailable,

    /// Assembling a freshly supplied queue
    Loading,

    /// Queue established; transport commands apply
    Available(Session),
}

impl PlaybackState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            PlaybackState::Available(session) => Some(session),
            PlaybackState::Unavailable | PlaybackState::Loading => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PlaybackState::Available(_))
    }

    pub fn is_playing(&self) -> bool {
        self.session().is_some_and(Session::is_playing)
    }
}

/// Lifecycle condition of the controller itself
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    /// Accepting commands
    #[default]
    Active,

    /// The media engine could not be initialized; terminal
    BackendUnavailable { reason: String },

    /// Torn down; terminal
    Released,
}

impl Condition {
    pub fn is_active(&self) -> bool {
        matches!(self, Condition::Active)
    }
}

/// Value published to observers
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlaybackSnapshot {
    /// Current playback state
    pub state: PlaybackState,

    /// `false` while a command is in flight
    pub enabled: bool,

    /// Controller lifecycle condition
    pub condition: Condition,
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Upper bound for duration probing in milliseconds (default: 5000)
    pub probe_timeout_ms: u64,

    /// Pending commands buffered before submitters wait (default: 32)
    pub command_capacity: usize,

    /// Event broadcast buffer size (default: 64)
    pub event_capacity: usize,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,
}

impl PlaybackConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 5_000,
            command_capacity: 32,
            event_capacity: 64,
            repeat: RepeatMode::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.command_capacity, 32);
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.repeat, RepeatMode::Off);
    }

    #[test]
    fn repeat_cycle_visits_track_then_list() {
        let mut mode = RepeatMode::Off;
        let mut visited = Vec::new();
        for _ in 0..3 {
            mode = mode.cycle();
            visited.push(mode);
        }
        assert_eq!(
            visited,
            vec![RepeatMode::Track, RepeatMode::List, RepeatMode::Off]
        );
    }

    #[test]
    fn audible_statuses() {
        assert!(TrackStatus::Playable.is_audible());
        assert!(TrackStatus::DurationUnknown.is_audible());
        assert!(!TrackStatus::Silent.is_audible());
        assert!(!TrackStatus::LoadFailed.is_audible());
    }

    #[test]
    fn unavailable_state_has_no_session() {
        let state = PlaybackState::default();
        assert!(state.session().is_none());
        assert!(!state.is_playing());
    }

    #[test]
    fn config_fills_missing_fields_from_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{"probe_timeout_ms": 250, "repeat": "list"}"#).unwrap();
        assert_eq!(config.probe_timeout_ms, 250);
        assert_eq!(config.repeat, RepeatMode::List);
        assert_eq!(config.command_capacity, 32);
    }
}
