/// Core error types for Soul Player
use crate::types::{AlbumId, PlaylistId, TrackId};
use thiserror::Error;

/// Result type alias using `SoulError`
pub type Result<T> = std::result::Result<T, SoulError>;

/// Core error type for Soul Player
#[derive(Error, Debug)]
pub enum SoulError {
    /// Track not found
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Album not found
    #[error("Album not found: {0}")]
    AlbumNotFound(AlbumId),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl SoulError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error means the referenced entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TrackNotFound(_) | Self::AlbumNotFound(_) | Self::PlaylistNotFound(_)
        )
    }
}
