//! Media backend abstraction
//!
//! The media engine is an external, stateful collaborator that handles one
//! resource at a time. [`MediaBackend`] is the vocabulary the controller
//! speaks; [`BackendAdapter`] runs those calls off the async executor and
//! bounds duration probing so a malformed file cannot stall the command
//! queue.
//!
//! ```text
//! Command worker                 Blocking pool
//!      │  adapter.load(uri)            │
//!      │──────────────────────────────>│ backend.load(uri)
//!      │<──────────────────────────────│
//!      │  adapter.probe_duration(uri)  │
//!      │──────────────────────────────>│ backend.probe_duration(uri)
//!      │    (timeout elapses)          │   ... still parsing ...
//!      │<── ProbeTimeout               │
//! ```

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Media backend failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Engine missing or failed to initialize
    #[error("media engine unavailable: {0}")]
    Unavailable(String),

    /// URI could not be opened
    #[error("cannot open {uri}: {reason}")]
    UnreachableUri { uri: String, reason: String },

    /// Probe did not answer within the configured bound
    #[error("probing {uri} timed out after {timeout_ms}ms")]
    ProbeTimeout { uri: String, timeout_ms: u64 },

    /// Container metadata could not be parsed
    #[error("cannot read duration of {uri}: {reason}")]
    ProbeUnparseable { uri: String, reason: String },

    /// Adapter was already released
    #[error("media backend already released")]
    Released,

    /// Any other engine failure
    #[error("media engine error: {0}")]
    Engine(String),
}

/// Result type for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Platform media engine
///
/// Implementors wrap a concrete engine (GStreamer pipeline, platform media
/// player, a headless stand-in). Every call may block; the adapter never
/// invokes them on the async executor.
///
/// Methods take `&self` so the adapter can hand the engine to the blocking
/// pool; engines keep their own interior state.
pub trait MediaBackend: Send + Sync + 'static {
    /// Bring up the engine before first use
    ///
    /// # Errors
    /// `BackendError::Unavailable` if the engine is missing or broken
    fn initialize(&self) -> BackendResult<()> {
        Ok(())
    }

    /// Open a media resource, replacing whatever was loaded
    fn load(&self, uri: &str) -> BackendResult<()>;

    /// Start or resume the loaded resource
    fn play(&self) -> BackendResult<()>;

    /// Pause the loaded resource
    fn pause(&self) -> BackendResult<()>;

    /// Stop and rewind the loaded resource
    fn stop(&self) -> BackendResult<()>;

    /// Seek within the loaded resource
    fn seek(&self, position_ms: u64) -> BackendResult<()>;

    /// Read the duration of a resource without playing it
    ///
    /// Return `ProbeUnparseable` rather than `Ok(0)` when the length is not
    /// known; a zero duration is treated as a failed probe.
    ///
    /// A probe that outlives the adapter's timeout is abandoned, not
    /// cancelled. It keeps running on the blocking pool while later
    /// `load`/`play`/`seek` calls arrive, so implementations must let
    /// `probe_duration` overlap every other method without corrupting the
    /// loaded resource.
    fn probe_duration(&self, uri: &str) -> BackendResult<u64>;

    /// Whether the engine is currently producing output
    fn is_playing(&self) -> bool;

    /// Free engine resources; called exactly once by the adapter
    fn release(&self) {}
}

/// Owner of the media backend handle
///
/// Only the playback state machine holds one of these.
pub struct BackendAdapter {
    backend: Arc<dyn MediaBackend>,
    probe_timeout: Duration,
    released: bool,
}

impl std::fmt::Debug for BackendAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendAdapter")
            .field("probe_timeout", &self.probe_timeout)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl BackendAdapter {
    pub fn new(backend: impl MediaBackend, probe_timeout: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            probe_timeout,
            released: false,
        }
    }

    /// Run one blocking engine call on the blocking pool
    async fn call<T, F>(&self, op: &'static str, f: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MediaBackend) -> BackendResult<T> + Send + 'static,
    {
        if self.released {
            return Err(BackendError::Released);
        }

        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || f(backend.as_ref()))
            .await
            .map_err(|e| BackendError::Engine(format!("{op} task failed: {e}")))?
    }

    pub async fn initialize(&self) -> BackendResult<()> {
        self.call("initialize", |backend| backend.initialize()).await
    }

    pub async fn load(&self, uri: &str) -> BackendResult<()> {
        let uri = uri.to_owned();
        self.call("load", move |backend| backend.load(&uri)).await
    }

    pub async fn play(&self) -> BackendResult<()> {
        self.call("play", |backend| backend.play()).await
    }

    pub async fn pause(&self) -> BackendResult<()> {
        self.call("pause", |backend| backend.pause()).await
    }

    pub async fn stop(&self) -> BackendResult<()> {
        self.call("stop", |backend| backend.stop()).await
    }

    pub async fn seek(&self, position_ms: u64) -> BackendResult<()> {
        self.call("seek", move |backend| backend.seek(position_ms))
            .await
    }

    /// Probe a resource's duration, giving up after the configured timeout
    ///
    /// A timed-out probe keeps running on the blocking pool until the engine
    /// returns, but its result is discarded.
    pub async fn probe_duration(&self, uri: &str) -> BackendResult<u64> {
        let owned = uri.to_owned();
        let probe = self.call("probe", move |backend| backend.probe_duration(&owned));

        match tokio::time::timeout(self.probe_timeout, probe).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::ProbeTimeout {
                uri: uri.to_owned(),
                timeout_ms: self.probe_timeout.as_millis() as u64,
            }),
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.released && self.backend.is_playing()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release the engine
    ///
    /// Returns `true` the first time; later calls do nothing.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.backend.release();
        true
    }
}

impl Drop for BackendAdapter {
    fn drop(&mut self) {
        self.release();
    }
}
