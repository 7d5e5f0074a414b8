/// Track reference as consumed by the playback queue
use super::{AlbumId, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Album summary attached to a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumInfo {
    /// Album identifier
    pub id: AlbumId,

    /// Album name
    pub name: String,

    /// Artwork URI (optional)
    #[serde(default)]
    pub artwork: Option<String>,
}

/// Resolved track metadata
///
/// Built once by a resolver and never mutated afterwards. The playback
/// controller keeps probed durations alongside the queue rather than
/// rewriting the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Unique track identifier
    pub id: TrackId,

    /// Track name
    pub name: String,

    /// Performing artists, in display order
    #[serde(default)]
    pub artists: Vec<String>,

    /// Album the track belongs to (optional)
    #[serde(default)]
    pub album: Option<AlbumInfo>,

    /// URI handed to the media backend for audio playback
    #[serde(default)]
    pub audio_uri: Option<String>,

    /// URI of an accompanying video (optional)
    #[serde(default)]
    pub video_uri: Option<String>,

    /// Duration in milliseconds, when the library already knows it
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl TrackRef {
    /// Create a track reference with only identity and name
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: Vec::new(),
            album: None,
            audio_uri: None,
            video_uri: None,
            duration_ms: None,
        }
    }

    /// Add a performing artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artists.push(artist.into());
        self
    }

    /// Attach album information
    #[must_use]
    pub fn with_album(mut self, album: AlbumInfo) -> Self {
        self.album = Some(album);
        self
    }

    /// Set the audio URI
    #[must_use]
    pub fn with_audio_uri(mut self, uri: impl Into<String>) -> Self {
        self.audio_uri = Some(uri.into());
        self
    }

    /// Set the video URI
    #[must_use]
    pub fn with_video_uri(mut self, uri: impl Into<String>) -> Self {
        self.video_uri = Some(uri.into());
        self
    }

    /// Set the known duration in milliseconds
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Known duration as a `Duration`
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    /// Whether the backend can be asked to play this track
    pub fn has_audio(&self) -> bool {
        self.audio_uri.is_some()
    }

    /// Artists joined for display ("A, B")
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}
