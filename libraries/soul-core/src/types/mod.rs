mod album;
mod ids;
mod playlist;
mod source;
mod track;

pub use album::AlbumListing;
pub use ids::{AlbumId, PlaylistId, TrackId};
pub use playlist::PlaylistListing;
pub use source::{QueueSource, SourceKind};
pub use track::{AlbumInfo, TrackRef};
