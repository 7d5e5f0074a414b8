//! Shared fixtures for controller tests

#![allow(dead_code)]

use soul_core::{Catalog, CatalogAlbum, CatalogPlaylist, TrackRef};
use soul_playback::{
    BackendError, BackendResult, MediaBackend, PlaybackConfig, PlaybackController, PlaybackEvent,
    PlaybackSnapshot, Session,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

// ===== Recording Backend =====

/// Engine call as seen by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initialize,
    Load(String),
    Play,
    Pause,
    Stop,
    Seek(u64),
    Probe(String),
}

#[derive(Default)]
struct Inner {
    calls: Mutex<Vec<Call>>,
    playing: AtomicBool,
    releases: AtomicUsize,
    load_delay: Mutex<Duration>,
    probe_delay: Mutex<Duration>,
    failing_loads: Mutex<HashSet<String>>,
    failing_probes: Mutex<HashSet<String>>,
    durations: Mutex<HashMap<String, u64>>,
    init_failure: Mutex<Option<String>>,
}

/// Fake engine that records every call
///
/// Clones share state, so a test keeps one clone and hands the other to
/// the controller.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<Inner>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load_delay(self, delay: Duration) -> Self {
        *self.inner.load_delay.lock().unwrap() = delay;
        self
    }

    pub fn with_probe_delay(self, delay: Duration) -> Self {
        *self.inner.probe_delay.lock().unwrap() = delay;
        self
    }

    pub fn failing_load(self, uri: &str) -> Self {
        self.inner.failing_loads.lock().unwrap().insert(uri.to_string());
        self
    }

    pub fn failing_probe(self, uri: &str) -> Self {
        self.inner.failing_probes.lock().unwrap().insert(uri.to_string());
        self
    }

    pub fn with_duration(self, uri: &str, duration_ms: u64) -> Self {
        self.inner
            .durations
            .lock()
            .unwrap()
            .insert(uri.to_string(), duration_ms);
        self
    }

    pub fn unavailable(self, reason: &str) -> Self {
        *self.inner.init_failure.lock().unwrap() = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn loads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Load(_)))
            .count()
    }

    pub fn release_count(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    pub fn engine_playing(&self) -> bool {
        self.inner.playing.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.inner.calls.lock().unwrap().push(call);
    }
}

impl MediaBackend for RecordingBackend {
    fn initialize(&self) -> BackendResult<()> {
        self.record(Call::Initialize);
        match self.inner.init_failure.lock().unwrap().clone() {
            Some(reason) => Err(BackendError::Unavailable(reason)),
            None => Ok(()),
        }
    }

    fn load(&self, uri: &str) -> BackendResult<()> {
        self.record(Call::Load(uri.to_string()));
        std::thread::sleep(*self.inner.load_delay.lock().unwrap());

        if self.inner.failing_loads.lock().unwrap().contains(uri) {
            return Err(BackendError::UnreachableUri {
                uri: uri.to_string(),
                reason: "file not found".to_string(),
            });
        }
        self.inner.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self) -> BackendResult<()> {
        self.record(Call::Play);
        self.inner.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) -> BackendResult<()> {
        self.record(Call::Pause);
        self.inner.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> BackendResult<()> {
        self.record(Call::Stop);
        self.inner.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn seek(&self, position_ms: u64) -> BackendResult<()> {
        self.record(Call::Seek(position_ms));
        Ok(())
    }

    fn probe_duration(&self, uri: &str) -> BackendResult<u64> {
        self.record(Call::Probe(uri.to_string()));
        std::thread::sleep(*self.inner.probe_delay.lock().unwrap());

        if self.inner.failing_probes.lock().unwrap().contains(uri) {
            return Err(BackendError::ProbeUnparseable {
                uri: uri.to_string(),
                reason: "not an audio container".to_string(),
            });
        }
        Ok(self
            .inner
            .durations
            .lock()
            .unwrap()
            .get(uri)
            .copied()
            .unwrap_or(180_000))
    }

    fn is_playing(&self) -> bool {
        self.engine_playing()
    }

    fn release(&self) {
        self.inner.releases.fetch_add(1, Ordering::SeqCst);
    }
}

// ===== Library =====

pub fn track(id: &str) -> TrackRef {
    TrackRef::new(id, format!("Track {}", id))
        .with_artist("Test Artist")
        .with_audio_uri(uri(id))
}

pub fn uri(id: &str) -> String {
    format!("/music/{}.flac", id)
}

/// Library used by every controller test
///
/// - tracks `t1`..`t3`, `encore`, `broken`
/// - `t2` carries a catalog duration of 200s
/// - `silent` has no audio URI
/// - album `debut` = `a1`, `a2`, `a3`
/// - playlist `mix` = `t1`, `t2`; playlist `empty` has no tracks
pub fn library() -> Catalog {
    let mut catalog = Catalog::new()
        .with_track(track("t1"))
        .with_track(track("t2").with_duration_ms(200_000))
        .with_track(track("t3"))
        .with_track(track("encore"))
        .with_track(track("broken"))
        .with_track(TrackRef::new("silent", "Liner Notes").with_duration_ms(30_000));

    for id in ["a1", "a2", "a3"] {
        catalog.insert_track(track(id));
    }

    catalog
        .with_album(CatalogAlbum::new("debut", "Debut").with_tracks(["a1", "a2", "a3"]))
        .with_playlist(CatalogPlaylist::new("mix", "Mix").with_tracks(["t1", "t2"]))
        .with_playlist(CatalogPlaylist::new("empty", "Nothing Yet"))
}

pub fn test_config() -> PlaybackConfig {
    PlaybackConfig {
        probe_timeout_ms: 200,
        ..PlaybackConfig::default()
    }
}

pub fn spawn_controller(backend: &RecordingBackend) -> PlaybackController {
    PlaybackController::spawn(test_config(), Arc::new(library()), backend.clone())
}

// ===== Assertions =====

pub fn session(snapshot: &PlaybackSnapshot) -> &Session {
    snapshot
        .state
        .session()
        .expect("playback should be available")
}

/// Collect every event already broadcast
pub fn drain(events: &mut broadcast::Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}
