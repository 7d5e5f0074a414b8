//! Playback controller handle and command worker
//!
//! [`PlaybackController`] is a cheap, cloneable handle. Every method sends a
//! [`PlaybackCommand`] to a single worker task that owns the state machine,
//! so commands run one at a time in the order they were submitted. Each
//! command carries a reply channel; awaiting the method waits for the
//! command to finish.
//!
//! A command that has been submitted always runs to completion, even if the
//! caller stops awaiting it.

use crate::backend::{BackendAdapter, MediaBackend};
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::machine::{EventSink, PlaybackMachine};
use crate::publisher::{StateObserver, StatePublisher};
use crate::types::{PlaybackConfig, PlaybackSnapshot, RepeatMode};
use soul_core::{QueueSource, TrackResolver};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

/// Commands executed by the playback worker
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    /// Replace the queue and start it, or resume when empty
    Play(Vec<QueueSource>),

    /// Pause playback
    Pause,

    /// Seek within the current track (milliseconds)
    Seek(u64),

    /// Skip to next track
    Next,

    /// Go to previous track
    Previous,

    /// Set repeat mode
    SetRepeat(RepeatMode),

    /// Advance repeat mode `Off -> Track -> List -> Off`
    CycleRepeat,

    /// Append a source to the queue
    Enqueue(QueueSource),

    /// Start the first track of an entry
    JumpToEntry(usize),

    /// Start a specific track of an entry
    JumpToSubItem { entry: usize, sub: usize },

    /// Elapsed-time tick (milliseconds)
    AdvanceElapsed(u64),

    /// The backend reported the current track ended
    TrackFinished,

    /// Stop and release the backend
    Release,
}

impl PlaybackCommand {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackCommand::Play(_) => "play",
            PlaybackCommand::Pause => "pause",
            PlaybackCommand::Seek(_) => "seek",
            PlaybackCommand::Next => "next",
            PlaybackCommand::Previous => "previous",
            PlaybackCommand::SetRepeat(_) => "set_repeat",
            PlaybackCommand::CycleRepeat => "cycle_repeat",
            PlaybackCommand::Enqueue(_) => "enqueue",
            PlaybackCommand::JumpToEntry(_) => "jump_to_entry",
            PlaybackCommand::JumpToSubItem { .. } => "jump_to_sub_item",
            PlaybackCommand::AdvanceElapsed(_) => "advance_elapsed",
            PlaybackCommand::TrackFinished => "track_finished",
            PlaybackCommand::Release => "release",
        }
    }
}

/// What the worker reports back once a command finished
struct Completion {
    snapshot: PlaybackSnapshot,
    repeat_mode: RepeatMode,
}

pub(crate) struct Envelope {
    command: PlaybackCommand,
    reply: oneshot::Sender<Result<Completion>>,
}

/// Handle to a running playback controller
///
/// Cloning is cheap. When the last handle is dropped the worker releases
/// the backend and exits.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    commands: mpsc::Sender<Envelope>,
    events: broadcast::Sender<PlaybackEvent>,
    observer: StateObserver,
}

impl PlaybackController {
    /// Start a controller with its worker task
    ///
    /// The backend is initialized lazily by the first command that
    /// establishes a queue.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        config: PlaybackConfig,
        resolver: Arc<dyn TrackResolver>,
        backend: impl MediaBackend,
    ) -> Self {
        let (commands, rx) = mpsc::channel(config.command_capacity.max(1));
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let publisher = StatePublisher::new();
        let observer = publisher.subscribe();
        let adapter = BackendAdapter::new(backend, config.probe_timeout());
        let machine = PlaybackMachine::new(
            adapter,
            resolver,
            config.repeat,
            publisher,
            EventSink::new(events.clone()),
        );

        tokio::spawn(run_worker(machine, rx));
        info!(
            probe_timeout_ms = config.probe_timeout_ms,
            command_capacity = config.command_capacity,
            "Playback controller started"
        );

        Self {
            commands,
            events,
            observer,
        }
    }

    async fn submit(&self, command: PlaybackCommand) -> Result<Completion> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Envelope { command, reply })
            .await
            .map_err(|_| PlaybackError::Released)?;
        response.await.map_err(|_| PlaybackError::Released)?
    }

    async fn execute(&self, command: PlaybackCommand) -> Result<PlaybackSnapshot> {
        self.submit(command).await.map(|done| done.snapshot)
    }

    /// Replace the queue with `sources` and start its first track
    ///
    /// With no sources, resumes the current track.
    ///
    /// # Errors
    /// `NoQueueToPlay` when resuming with nothing queued, `EmptyQueueSource`
    /// when an album or playlist has no tracks, `Resolve` for unknown ids
    pub async fn play(&self, sources: Vec<QueueSource>) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::Play(sources)).await
    }

    /// Resume the current track
    pub async fn resume(&self) -> Result<PlaybackSnapshot> {
        self.play(Vec::new()).await
    }

    pub async fn pause(&self) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::Pause).await
    }

    /// Seek within the current track
    ///
    /// # Errors
    /// `InvalidSeekPosition` past the known duration
    pub async fn seek(&self, position_ms: u64) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::Seek(position_ms)).await
    }

    pub async fn next(&self) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::Next).await
    }

    pub async fn previous(&self) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::Previous).await
    }

    pub async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::SetRepeat(mode)).await
    }

    /// Advance the repeat mode and return the new one
    pub async fn cycle_repeat_mode(&self) -> Result<RepeatMode> {
        self.submit(PlaybackCommand::CycleRepeat)
            .await
            .map(|done| done.repeat_mode)
    }

    /// Append `source` to the queue
    ///
    /// With nothing queued, establishes a paused queue.
    pub async fn enqueue(&self, source: QueueSource) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::Enqueue(source)).await
    }

    /// # Errors
    /// `IndexOutOfRange` if `entry` is outside the queue
    pub async fn jump_to_entry(&self, entry: usize) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::JumpToEntry(entry)).await
    }

    /// # Errors
    /// `IndexOutOfRange` if either index is outside the queue
    pub async fn jump_to_sub_item(&self, entry: usize, sub: usize) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::JumpToSubItem { entry, sub })
            .await
    }

    /// Report elapsed playback time
    pub async fn advance_elapsed(&self, delta_ms: u64) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::AdvanceElapsed(delta_ms))
            .await
    }

    /// Report that the current track ended
    pub async fn track_finished(&self) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::TrackFinished).await
    }

    /// Stop playback and release the backend
    ///
    /// Runs after every command submitted before it. Commands submitted
    /// afterwards fail with `Released`.
    pub async fn release(&self) -> Result<PlaybackSnapshot> {
        self.execute(PlaybackCommand::Release).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.observer.snapshot()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> StateObserver {
        self.observer.clone()
    }

    /// Receive fine-grained events
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Handle that does not keep the worker alive
    pub fn downgrade(&self) -> WeakPlaybackController {
        WeakPlaybackController {
            commands: self.commands.downgrade(),
            events: self.events.clone(),
            observer: self.observer.clone(),
        }
    }
}

/// Non-owning controller handle
#[derive(Debug, Clone)]
pub struct WeakPlaybackController {
    commands: mpsc::WeakSender<Envelope>,
    events: broadcast::Sender<PlaybackEvent>,
    observer: StateObserver,
}

impl WeakPlaybackController {
    /// `None` once every strong handle is gone
    pub fn upgrade(&self) -> Option<PlaybackController> {
        self.commands.upgrade().map(|commands| PlaybackController {
            commands,
            events: self.events.clone(),
            observer: self.observer.clone(),
        })
    }
}

async fn run_worker(mut machine: PlaybackMachine, mut commands: mpsc::Receiver<Envelope>) {
    while let Some(Envelope { command, reply }) = commands.recv().await {
        let name = command.name();
        debug!(command = name, "Playback command received");

        let result = process_command(&mut machine, command).await;
        match &result {
            Ok(()) => debug!(command = name, "Playback command completed"),
            Err(err) => warn!(command = name, error = %err, "Playback command rejected"),
        }

        let completion = result.map(|()| Completion {
            snapshot: machine.publisher().current(),
            repeat_mode: machine.repeat_mode(),
        });
        // The caller may have stopped waiting; the command already ran
        let _ = reply.send(completion);
    }

    machine.release().await;
    machine.commit();
    debug!("Playback worker stopped");
}

async fn process_command(machine: &mut PlaybackMachine, command: PlaybackCommand) -> Result<()> {
    if let PlaybackCommand::Release = command {
        if matches!(machine.ensure_active(), Err(PlaybackError::Released)) {
            return Ok(());
        }
        machine.begin();
        machine.release().await;
        machine.commit();
        return Ok(());
    }

    machine.ensure_active()?;

    if let PlaybackCommand::AdvanceElapsed(delta_ms) = command {
        if !machine.tick_reaches_end(delta_ms) {
            let result = machine.advance_elapsed(delta_ms).await;
            machine.commit_quiet();
            return result;
        }
    }

    machine.begin();
    let result = match command {
        PlaybackCommand::Play(sources) => machine.play(sources).await,
        PlaybackCommand::Pause => machine.pause().await,
        PlaybackCommand::Seek(position_ms) => machine.seek(position_ms).await,
        PlaybackCommand::Next => machine.next().await,
        PlaybackCommand::Previous => machine.previous().await,
        PlaybackCommand::SetRepeat(mode) => {
            machine.set_repeat_mode(mode);
            Ok(())
        }
        PlaybackCommand::CycleRepeat => {
            machine.cycle_repeat_mode();
            Ok(())
        }
        PlaybackCommand::Enqueue(source) => machine.enqueue(source).await,
        PlaybackCommand::JumpToEntry(entry) => machine.jump_to_entry(entry).await,
        PlaybackCommand::JumpToSubItem { entry, sub } => {
            machine.jump_to_sub_item(entry, sub).await
        }
        PlaybackCommand::AdvanceElapsed(delta_ms) => machine.advance_elapsed(delta_ms).await,
        PlaybackCommand::TrackFinished => machine.track_finished().await,
        PlaybackCommand::Release => {
            machine.release().await;
            Ok(())
        }
    };
    machine.commit();
    result
}
