//! Soul Player Core
//!
//! Domain types and collaborator contracts shared by the playback controller
//! and the applications that host it.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackRef`, album/playlist listings, `QueueSource`
//! - **Core Traits**: `TrackResolver`, the read-only library lookup
//! - **Error Handling**: Unified `SoulError` and `Result` types
//! - **Catalog**: an in-memory `TrackResolver` loadable from JSON
//!
//! # Example
//!
//! ```rust
//! use soul_core::{Catalog, CatalogAlbum, QueueSource, TrackRef};
//!
//! let catalog = Catalog::new()
//!     .with_track(TrackRef::new("t1", "Opening").with_audio_uri("/music/01.flac"))
//!     .with_album(CatalogAlbum::new("a1", "Debut").with_tracks(["t1"]));
//!
//! let source: QueueSource = "album:a1".parse().unwrap();
//! assert_eq!(source, QueueSource::album("a1"));
//! assert_eq!(catalog.track_count(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogAlbum, CatalogPlaylist};
pub use error::{Result, SoulError};
pub use traits::TrackResolver;

pub use types::{
    AlbumId, AlbumInfo, AlbumListing, PlaylistId, PlaylistListing, QueueSource, SourceKind,
    TrackId, TrackRef,
};
