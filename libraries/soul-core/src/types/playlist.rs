/// Playlist listing types
use super::{PlaylistId, TrackRef};
use serde::{Deserialize, Serialize};

/// A playlist together with its ordered tracks, as returned by a resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistListing {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Artwork URI (optional)
    pub artwork: Option<String>,

    /// Tracks in playlist order
    pub tracks: Vec<TrackRef>,
}
