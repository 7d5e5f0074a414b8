//! Headless media engine
//!
//! Stands in for a real audio engine: it opens local files, tracks the
//! transport flag, and reads container durations with lofty, but never
//! produces sound.

use lofty::AudioFile;
use soul_playback::{BackendError, BackendResult, MediaBackend};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

pub struct HeadlessBackend {
    load_latency: Duration,
    loaded: Mutex<Option<PathBuf>>,
    playing: AtomicBool,
}

impl HeadlessBackend {
    pub fn new(load_latency: Duration) -> Self {
        Self {
            load_latency,
            loaded: Mutex::new(None),
            playing: AtomicBool::new(false),
        }
    }

    fn loaded(&self) -> BackendResult<Option<PathBuf>> {
        self.loaded
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| BackendError::Engine("engine state poisoned".to_string()))
    }

    fn require_loaded(&self, op: &str) -> BackendResult<PathBuf> {
        self.loaded()?
            .ok_or_else(|| BackendError::Engine(format!("{op} with nothing loaded")))
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

/// Accept plain paths and `file://` URIs
fn uri_to_path(uri: &str) -> &Path {
    Path::new(uri.strip_prefix("file://").unwrap_or(uri))
}

impl MediaBackend for HeadlessBackend {
    fn load(&self, uri: &str) -> BackendResult<()> {
        let path = uri_to_path(uri);
        if !path.is_file() {
            return Err(BackendError::UnreachableUri {
                uri: uri.to_string(),
                reason: "file not found".to_string(),
            });
        }

        if !self.load_latency.is_zero() {
            std::thread::sleep(self.load_latency);
        }

        let mut loaded = self
            .loaded
            .lock()
            .map_err(|_| BackendError::Engine("engine state poisoned".to_string()))?;
        *loaded = Some(path.to_path_buf());
        self.playing.store(false, Ordering::SeqCst);
        debug!(path = %path.display(), "Loaded");
        Ok(())
    }

    fn play(&self) -> BackendResult<()> {
        self.require_loaded("play")?;
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) -> BackendResult<()> {
        self.require_loaded("pause")?;
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> BackendResult<()> {
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn seek(&self, position_ms: u64) -> BackendResult<()> {
        let path = self.require_loaded("seek")?;
        debug!(path = %path.display(), position_ms, "Seek");
        Ok(())
    }

    fn probe_duration(&self, uri: &str) -> BackendResult<u64> {
        let tagged_file =
            lofty::read_from_path(uri_to_path(uri)).map_err(|e| BackendError::ProbeUnparseable {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        match tagged_file.properties().duration().as_millis() as u64 {
            0 => Err(BackendError::ProbeUnparseable {
                uri: uri.to_string(),
                reason: "container reports no duration".to_string(),
            }),
            duration_ms => Ok(duration_ms),
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.playing.store(false, Ordering::SeqCst);
        if let Ok(mut loaded) = self.loaded.lock() {
            loaded.take();
        }
        info!("Headless engine released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_rejects_missing_file() {
        let backend = HeadlessBackend::default();
        let err = backend.load("/nonexistent/track.flac").unwrap_err();
        assert!(matches!(err, BackendError::UnreachableUri { .. }));
        assert!(!backend.is_playing());
    }

    #[test]
    fn transport_requires_loaded_file() {
        let backend = HeadlessBackend::default();
        assert!(matches!(backend.play(), Err(BackendError::Engine(_))));

        let file = tempfile::NamedTempFile::new().unwrap();
        let uri = format!("file://{}", file.path().display());
        backend.load(&uri).unwrap();
        backend.play().unwrap();
        assert!(backend.is_playing());

        backend.pause().unwrap();
        assert!(!backend.is_playing());
    }

    #[test]
    fn probe_rejects_non_audio_file() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"definitely not audio").unwrap();

        let backend = HeadlessBackend::default();
        let err = backend
            .probe_duration(&file.path().display().to_string())
            .unwrap_err();
        assert!(matches!(err, BackendError::ProbeUnparseable { .. }));
    }

    #[test]
    fn release_clears_loaded_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let backend = HeadlessBackend::default();
        backend.load(&file.path().display().to_string()).unwrap();
        backend.play().unwrap();

        backend.release();
        assert!(!backend.is_playing());
        assert!(backend.play().is_err());
    }
}
