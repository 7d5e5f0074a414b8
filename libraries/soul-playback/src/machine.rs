//! Playback state machine
//!
//! Owns the playback state, the backend adapter, and the resolver. Every
//! transport command is implemented here as a method that either fails
//! before writing any state or commits a complete new state. Adapter calls
//! always happen before state writes, so an adapter failure leaves the
//! previous state in place.
//!
//! ```text
//! Unavailable ──play(sources)/enqueue(source)──> Loading ──> Available
//!      │                                            │
//!      │<──────── resolution failed ────────────────┘
//!      │
//! Available ──play/pause/seek/next/previous/jump/enqueue/tick──> Available
//! ```
//!
//! The machine is driven by the controller's command worker and is never
//! shared between tasks.

use crate::backend::{BackendAdapter, BackendError};
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::publisher::StatePublisher;
use crate::queue::{Queue, QueueEntry};
use crate::types::{Condition, PlaybackState, Position, RepeatMode, Session, TrackStatus};
use soul_core::{QueueSource, TrackId, TrackRef, TrackResolver};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Broadcast side of the event channel
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: broadcast::Sender<PlaybackEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: broadcast::Sender<PlaybackEvent>) -> Self {
        Self { tx }
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

/// Outcome of selecting a track in the backend
struct Loaded {
    status: TrackStatus,
    duration_ms: Option<u64>,
    is_playing: bool,
}

pub(crate) struct PlaybackMachine {
    state: PlaybackState,
    repeat_mode: RepeatMode,
    condition: Condition,
    backend_ready: bool,
    adapter: BackendAdapter,
    resolver: Arc<dyn TrackResolver>,
    publisher: StatePublisher,
    events: EventSink,
}

impl PlaybackMachine {
    pub(crate) fn new(
        adapter: BackendAdapter,
        resolver: Arc<dyn TrackResolver>,
        repeat_mode: RepeatMode,
        publisher: StatePublisher,
        events: EventSink,
    ) -> Self {
        Self {
            state: PlaybackState::Unavailable,
            repeat_mode,
            condition: Condition::Active,
            backend_ready: false,
            adapter,
            resolver,
            publisher,
            events,
        }
    }

    pub(crate) fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub(crate) fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub(crate) fn publisher(&self) -> &StatePublisher {
        &self.publisher
    }

    /// Mark a command as in flight
    pub(crate) fn begin(&self) {
        self.publisher.disable();
    }

    /// Publish the committed state and re-enable commands
    pub(crate) fn commit(&self) {
        self.publisher
            .publish(self.state.clone(), self.condition.clone());
    }

    /// Publish the committed state without toggling `enabled`
    pub(crate) fn commit_quiet(&self) {
        self.publisher.publish_quiet(self.state.clone());
    }

    /// Fail fast once the controller reached a terminal condition
    pub(crate) fn ensure_active(&self) -> Result<()> {
        match &self.condition {
            Condition::Active => Ok(()),
            Condition::BackendUnavailable { reason } => {
                Err(PlaybackError::BackendUnavailable(reason.clone()))
            }
            Condition::Released => Err(PlaybackError::Released),
        }
    }

    /// Start playback
    ///
    /// With sources, replaces the queue and starts its first track. Without,
    /// resumes the current track.
    pub(crate) async fn play(&mut self, sources: Vec<QueueSource>) -> Result<()> {
        if sources.is_empty() {
            return self.resume().await;
        }

        if !self.state.is_available() {
            self.publisher.publish_in_flight(PlaybackState::Loading);
        }

        let mut entries = Vec::with_capacity(sources.len());
        for source in &sources {
            entries.push(self.resolve_entry(source).await?);
        }

        self.establish(Queue::from_entries(entries), true).await
    }

    async fn resume(&mut self) -> Result<()> {
        let PlaybackState::Available(session) = &mut self.state else {
            return Err(PlaybackError::NoQueueToPlay);
        };

        if !session.track_status.is_audible() {
            debug!(
                track_id = %session.current_track().id,
                status = ?session.track_status,
                "Resume ignored for track without playable media"
            );
            return Ok(());
        }

        if !self.adapter.is_playing() {
            self.adapter.play().await?;
        }

        if !session.is_playing {
            session.is_playing = true;
            self.events
                .emit(PlaybackEvent::StateChanged { is_playing: true });
        }
        Ok(())
    }

    pub(crate) async fn pause(&mut self) -> Result<()> {
        let PlaybackState::Available(session) = &mut self.state else {
            return Err(PlaybackError::NotAvailable { command: "pause" });
        };

        if self.adapter.is_playing() {
            self.adapter.pause().await?;
        }

        if session.is_playing {
            session.is_playing = false;
            self.events
                .emit(PlaybackEvent::StateChanged { is_playing: false });
        }
        Ok(())
    }

    pub(crate) async fn seek(&mut self, target_ms: u64) -> Result<()> {
        let PlaybackState::Available(session) = &mut self.state else {
            return Err(PlaybackError::NotAvailable { command: "seek" });
        };

        if let Some(duration_ms) = session.duration_ms {
            if target_ms > duration_ms {
                return Err(PlaybackError::InvalidSeekPosition {
                    target_ms,
                    duration_ms,
                });
            }
        }

        if session.track_status.is_audible() {
            self.adapter.seek(target_ms).await?;
        }

        session.elapsed_ms = target_ms;
        self.events.emit(PlaybackEvent::Seeked {
            position_ms: target_ms,
        });
        Ok(())
    }

    pub(crate) async fn next(&mut self) -> Result<()> {
        let session = self.session("next")?;
        let target = session.queue.next_position(session.position);
        self.change_track(target).await
    }

    pub(crate) async fn previous(&mut self) -> Result<()> {
        let session = self.session("previous")?;
        let target = session.queue.previous_position(session.position);
        self.change_track(target).await
    }

    pub(crate) async fn jump_to_entry(&mut self, entry: usize) -> Result<()> {
        let target = self.session("jump_to_entry")?.queue.checked_position(entry, 0)?;
        self.change_track(target).await
    }

    pub(crate) async fn jump_to_sub_item(&mut self, entry: usize, sub: usize) -> Result<()> {
        let target = self
            .session("jump_to_sub_item")?
            .queue
            .checked_position(entry, sub)?;
        self.change_track(target).await
    }

    pub(crate) fn set_repeat_mode(&mut self, mode: RepeatMode) {
        if let PlaybackState::Available(session) = &mut self.state {
            session.repeat_mode = mode;
        }

        if self.repeat_mode != mode {
            self.repeat_mode = mode;
            info!(?mode, "Repeat mode changed");
            self.events.emit(PlaybackEvent::RepeatModeChanged { mode });
        }
    }

    pub(crate) fn cycle_repeat_mode(&mut self) -> RepeatMode {
        let mode = self.repeat_mode.cycle();
        self.set_repeat_mode(mode);
        mode
    }

    /// Append one source to the queue
    ///
    /// Establishes a paused queue when nothing is queued yet.
    pub(crate) async fn enqueue(&mut self, source: QueueSource) -> Result<()> {
        if !self.state.is_available() {
            self.publisher.publish_in_flight(PlaybackState::Loading);
            let entry = self.resolve_entry(&source).await?;
            return self.establish(Queue::from_entries(vec![entry]), false).await;
        }

        let entry = self.resolve_entry(&source).await?;
        if let PlaybackState::Available(session) = &mut self.state {
            session.queue.push(entry);
            debug!(%source, length = session.queue.len(), "Enqueued");
            self.events.emit(PlaybackEvent::QueueChanged {
                length: session.queue.len(),
            });
        }
        Ok(())
    }

    /// Whether a tick of `delta_ms` would reach the end of the current track
    pub(crate) fn tick_reaches_end(&self, delta_ms: u64) -> bool {
        self.state.session().is_some_and(|session| {
            session.is_playing
                && session
                    .duration_ms
                    .is_some_and(|duration| session.elapsed_ms.saturating_add(delta_ms) >= duration)
        })
    }

    /// Advance the elapsed time of a playing track
    ///
    /// Ignored while nothing plays. Reaching the known duration completes
    /// the track.
    pub(crate) async fn advance_elapsed(&mut self, delta_ms: u64) -> Result<()> {
        let PlaybackState::Available(session) = &mut self.state else {
            return Ok(());
        };
        if !session.is_playing {
            return Ok(());
        }

        let elapsed = session.elapsed_ms.saturating_add(delta_ms);
        match session.duration_ms {
            Some(duration) if elapsed >= duration => {
                session.elapsed_ms = duration;
                self.complete_track().await
            }
            _ => {
                session.elapsed_ms = elapsed;
                Ok(())
            }
        }
    }

    /// The current track ended on its own
    pub(crate) async fn track_finished(&mut self) -> Result<()> {
        self.session("track_finished")?;
        self.complete_track().await
    }

    /// Stop and release the backend
    ///
    /// Later calls do nothing.
    pub(crate) async fn release(&mut self) {
        if self.condition == Condition::Released {
            return;
        }

        if self.adapter.is_playing() {
            if let Err(err) = self.adapter.stop().await {
                warn!(error = %err, "Failed to stop backend during release");
            }
        }

        if self.adapter.release() {
            info!("Media backend released");
        }

        if let PlaybackState::Available(session) = &mut self.state {
            session.is_playing = false;
        }
        self.condition = Condition::Released;
        self.events.emit(PlaybackEvent::Released);
    }

    fn session(&self, command: &'static str) -> Result<&Session> {
        self.state
            .session()
            .ok_or(PlaybackError::NotAvailable { command })
    }

    async fn resolve_entry(&self, source: &QueueSource) -> Result<QueueEntry> {
        match source {
            QueueSource::Track(id) => Ok(QueueEntry::Track(self.resolver.resolve_track(id).await?)),
            QueueSource::Album(id) => QueueEntry::album(self.resolver.resolve_album(id).await?),
            QueueSource::Playlist(id) => {
                QueueEntry::playlist(self.resolver.resolve_playlist(id).await?)
            }
        }
    }

    /// Initialize the backend on first use
    async fn ensure_backend(&mut self) -> Result<()> {
        if self.backend_ready {
            return Ok(());
        }

        if let Err(err) = self.adapter.initialize().await {
            let reason = err.to_string();
            warn!(error = %err, "Media backend unavailable");
            self.condition = Condition::BackendUnavailable {
                reason: reason.clone(),
            };
            self.events
                .emit(PlaybackEvent::BackendUnavailable { reason: reason.clone() });
            return Err(PlaybackError::BackendUnavailable(reason));
        }

        self.backend_ready = true;
        Ok(())
    }

    /// Replace the whole queue and select its first track
    async fn establish(&mut self, queue: Queue, autoplay: bool) -> Result<()> {
        self.ensure_backend().await?;

        let previous_track_id = self.current_track_id();
        let was_playing = self.state.is_playing();
        if self.adapter.is_playing() {
            self.adapter.stop().await?;
        }

        let track = queue.current_track(Position::START).clone();
        let loaded = self.load_track(&track, autoplay).await;
        let length = queue.len();

        self.state = PlaybackState::Available(Session {
            queue,
            position: Position::START,
            is_playing: loaded.is_playing,
            repeat_mode: self.repeat_mode,
            duration_ms: loaded.duration_ms,
            elapsed_ms: 0,
            track_status: loaded.status,
        });

        info!(track_id = %track.id, entries = length, autoplay, "Queue established");
        self.events.emit(PlaybackEvent::QueueChanged { length });
        self.events.emit(PlaybackEvent::TrackChanged {
            track_id: track.id,
            previous_track_id,
            position: Position::START,
        });
        if was_playing != loaded.is_playing {
            self.events.emit(PlaybackEvent::StateChanged {
                is_playing: loaded.is_playing,
            });
        }
        Ok(())
    }

    /// Move to `target` within the current queue and start it
    async fn change_track(&mut self, target: Position) -> Result<()> {
        let session = self.session("change_track")?;
        let track = session.queue.current_track(target).clone();
        let previous_track_id = session.current_track().id.clone();
        let was_playing = session.is_playing;

        if self.adapter.is_playing() {
            self.adapter.stop().await?;
        }
        let loaded = self.load_track(&track, true).await;

        let PlaybackState::Available(session) = &mut self.state else {
            return Err(PlaybackError::NotAvailable {
                command: "change_track",
            });
        };
        session.position = target;
        session.is_playing = loaded.is_playing;
        session.duration_ms = loaded.duration_ms;
        session.elapsed_ms = 0;
        session.track_status = loaded.status;

        info!(
            track_id = %track.id,
            entry = target.entry,
            sub = target.sub,
            "Track changed"
        );
        self.events.emit(PlaybackEvent::TrackChanged {
            track_id: track.id,
            previous_track_id: Some(previous_track_id),
            position: target,
        });
        if was_playing != loaded.is_playing {
            self.events.emit(PlaybackEvent::StateChanged {
                is_playing: loaded.is_playing,
            });
        }
        Ok(())
    }

    /// Apply the repeat policy to a finished track
    async fn complete_track(&mut self) -> Result<()> {
        let session = self.session("track_finished")?;
        let position = session.position;

        match self.repeat_mode {
            RepeatMode::Track => self.replay_current().await,
            RepeatMode::List => {
                let target = session.queue.next_position(position);
                self.change_track(target).await
            }
            RepeatMode::Off if session.queue.is_last(position) => self.finish_queue().await,
            RepeatMode::Off => {
                let target = session.queue.next_position(position);
                self.change_track(target).await
            }
        }
    }

    async fn replay_current(&mut self) -> Result<()> {
        let PlaybackState::Available(session) = &mut self.state else {
            return Err(PlaybackError::NotAvailable {
                command: "track_finished",
            });
        };

        if session.track_status.is_audible() {
            self.adapter.seek(0).await?;
            if !self.adapter.is_playing() {
                self.adapter.play().await?;
            }
            if !session.is_playing {
                session.is_playing = true;
                self.events
                    .emit(PlaybackEvent::StateChanged { is_playing: true });
            }
        }

        session.elapsed_ms = 0;
        debug!(track_id = %session.current_track().id, "Replaying track");
        Ok(())
    }

    async fn finish_queue(&mut self) -> Result<()> {
        let PlaybackState::Available(session) = &mut self.state else {
            return Err(PlaybackError::NotAvailable {
                command: "track_finished",
            });
        };

        if self.adapter.is_playing() {
            self.adapter.stop().await?;
        }

        session.elapsed_ms = 0;
        if session.is_playing {
            session.is_playing = false;
            self.events
                .emit(PlaybackEvent::StateChanged { is_playing: false });
        }
        info!("Reached end of queue");
        self.events.emit(PlaybackEvent::QueueFinished);
        Ok(())
    }

    /// Hand a track to the backend
    ///
    /// Never fails: tracks that cannot be loaded stay selected with a
    /// degraded status.
    async fn load_track(&mut self, track: &TrackRef, autoplay: bool) -> Loaded {
        let Some(uri) = track.audio_uri.as_deref() else {
            warn!(track_id = %track.id, "Track has no audio URI, selecting without playback");
            self.events.emit(PlaybackEvent::SilentTrack {
                track_id: track.id.clone(),
            });
            return Loaded {
                status: TrackStatus::Silent,
                duration_ms: track.duration_ms,
                is_playing: false,
            };
        };

        let started = match self.adapter.load(uri).await {
            Ok(()) if autoplay => self.adapter.play().await,
            Ok(()) => self.adapter.pause().await,
            Err(err) => Err(err),
        };
        if let Err(err) = started {
            warn!(track_id = %track.id, %uri, error = %err, "Backend failed to load track");
            self.events.emit(PlaybackEvent::TrackLoadFailed {
                track_id: track.id.clone(),
                reason: err.to_string(),
            });
            return Loaded {
                status: TrackStatus::LoadFailed,
                duration_ms: track.duration_ms,
                is_playing: false,
            };
        }

        let probed = match self.adapter.probe_duration(uri).await {
            // Engines report zero when the container carries no length
            Ok(0) => Err(BackendError::ProbeUnparseable {
                uri: uri.to_string(),
                reason: "engine reported a zero duration".to_string(),
            }),
            other => other,
        };

        let (status, duration_ms) = match probed {
            Ok(duration_ms) => (TrackStatus::Playable, Some(duration_ms)),
            Err(err) => {
                warn!(track_id = %track.id, %uri, error = %err, "Duration probe failed");
                self.events.emit(PlaybackEvent::ProbeFailed {
                    track_id: track.id.clone(),
                    reason: err.to_string(),
                });
                match track.duration_ms {
                    Some(known) => (TrackStatus::Playable, Some(known)),
                    None => (TrackStatus::DurationUnknown, None),
                }
            }
        };

        Loaded {
            status,
            duration_ms,
            is_playing: autoplay,
        }
    }

    fn current_track_id(&self) -> Option<TrackId> {
        self.state
            .session()
            .map(|session| session.current_track().id.clone())
    }
}

impl std::fmt::Debug for PlaybackMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackMachine")
            .field("state", &self.state)
            .field("repeat_mode", &self.repeat_mode)
            .field("condition", &self.condition)
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}
