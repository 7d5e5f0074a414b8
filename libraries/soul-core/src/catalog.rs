//! In-memory library catalog
//!
//! A small, serde-loadable library used by the headless player and by tests.
//! Albums and playlists reference tracks by id; resolution expands them into
//! ordered [`TrackRef`]s.

use crate::error::{Result, SoulError};
use crate::traits::TrackResolver;
use crate::types::{
    AlbumId, AlbumInfo, AlbumListing, PlaylistId, PlaylistListing, TrackId, TrackRef,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Album as stored in a catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAlbum {
    pub id: AlbumId,
    pub name: String,
    #[serde(default)]
    pub artwork: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub track_ids: Vec<TrackId>,
}

impl CatalogAlbum {
    pub fn new(id: impl Into<AlbumId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artwork: None,
            release_date: None,
            track_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tracks<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackId>,
    {
        self.track_ids.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// Playlist as stored in a catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlaylist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default)]
    pub artwork: Option<String>,
    #[serde(default)]
    pub track_ids: Vec<TrackId>,
}

impl CatalogPlaylist {
    pub fn new(id: impl Into<PlaylistId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artwork: None,
            track_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tracks<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackId>,
    {
        self.track_ids.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// On-disk shape of a catalog
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tracks: Vec<TrackRef>,
    #[serde(default)]
    albums: Vec<CatalogAlbum>,
    #[serde(default)]
    playlists: Vec<CatalogPlaylist>,
}

/// In-memory library implementing [`TrackResolver`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "CatalogFile")]
pub struct Catalog {
    tracks: HashMap<TrackId, TrackRef>,
    albums: HashMap<AlbumId, CatalogAlbum>,
    playlists: HashMap<PlaylistId, CatalogPlaylist>,
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        let mut catalog = Catalog::new();
        for track in file.tracks {
            catalog.insert_track(track);
        }
        for album in file.albums {
            catalog.insert_album(album);
        }
        for playlist in file.playlists {
            catalog.insert_playlist(playlist);
        }
        catalog
    }
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn insert_track(&mut self, track: TrackRef) {
        self.tracks.insert(track.id.clone(), track);
    }

    pub fn insert_album(&mut self, album: CatalogAlbum) {
        self.albums.insert(album.id.clone(), album);
    }

    pub fn insert_playlist(&mut self, playlist: CatalogPlaylist) {
        self.playlists.insert(playlist.id.clone(), playlist);
    }

    #[must_use]
    pub fn with_track(mut self, track: TrackRef) -> Self {
        self.insert_track(track);
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: CatalogAlbum) -> Self {
        self.insert_album(album);
        self
    }

    #[must_use]
    pub fn with_playlist(mut self, playlist: CatalogPlaylist) -> Self {
        self.insert_playlist(playlist);
        self
    }

    /// Number of tracks known to the catalog
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn lookup(&self, id: &TrackId) -> Result<TrackRef> {
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| SoulError::TrackNotFound(id.clone()))
    }

    fn lookup_all(&self, ids: &[TrackId]) -> Result<Vec<TrackRef>> {
        ids.iter().map(|id| self.lookup(id)).collect()
    }
}

#[async_trait]
impl TrackResolver for Catalog {
    async fn resolve_track(&self, id: &TrackId) -> Result<TrackRef> {
        self.lookup(id)
    }

    async fn resolve_album(&self, id: &AlbumId) -> Result<AlbumListing> {
        let album = self
            .albums
            .get(id)
            .ok_or_else(|| SoulError::AlbumNotFound(id.clone()))?;

        let info = AlbumInfo {
            id: album.id.clone(),
            name: album.name.clone(),
            artwork: album.artwork.clone(),
        };

        // Tracks stored without album details inherit them from the listing
        let tracks = self
            .lookup_all(&album.track_ids)?
            .into_iter()
            .map(|track| {
                if track.album.is_some() {
                    track
                } else {
                    track.with_album(info.clone())
                }
            })
            .collect();

        Ok(AlbumListing {
            id: album.id.clone(),
            name: album.name.clone(),
            artwork: album.artwork.clone(),
            release_date: album.release_date,
            tracks,
        })
    }

    async fn resolve_playlist(&self, id: &PlaylistId) -> Result<PlaylistListing> {
        let playlist = self
            .playlists
            .get(id)
            .ok_or_else(|| SoulError::PlaylistNotFound(id.clone()))?;

        Ok(PlaylistListing {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            artwork: playlist.artwork.clone(),
            tracks: self.lookup_all(&playlist.track_ids)?,
        })
    }
}
