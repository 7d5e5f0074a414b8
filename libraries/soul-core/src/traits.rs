/// Collaborator traits consumed by the playback controller
use crate::error::Result;
use crate::types::{AlbumId, AlbumListing, PlaylistId, PlaylistListing, TrackId, TrackRef};
use async_trait::async_trait;

/// Read-only lookup from library references to playable metadata
///
/// Implementations sit in front of whatever stores the library (a database,
/// a remote server, an in-memory [`Catalog`](crate::Catalog)). The playback
/// controller only ever reads through this trait.
///
/// Listings must preserve play order. An album or playlist with no tracks is
/// returned as an empty listing, not as an error; the controller decides how
/// to treat it.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Resolve a single track
    ///
    /// # Errors
    /// Returns `SoulError::TrackNotFound` if the id is unknown
    async fn resolve_track(&self, id: &TrackId) -> Result<TrackRef>;

    /// Resolve an album and its ordered tracks
    async fn resolve_album(&self, id: &AlbumId) -> Result<AlbumListing>;

    /// Resolve a playlist and its ordered tracks
    async fn resolve_playlist(&self, id: &PlaylistId) -> Result<PlaylistListing>;
}
