//! Queue source references
//!
//! A queue source names something the player can enqueue: a single track,
//! a whole album, or a playlist. The textual form is `kind:id`
//! (`track:42`, `album:7`, `playlist:mix`).

use super::{AlbumId, PlaylistId, TrackId};
use crate::error::SoulError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of queue source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Track,
    Album,
    Playlist,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Track => "track",
            SourceKind::Album => "album",
            SourceKind::Playlist => "playlist",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to something that can be placed in the playback queue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum QueueSource {
    Track(TrackId),
    Album(AlbumId),
    Playlist(PlaylistId),
}

impl QueueSource {
    pub fn track(id: impl Into<TrackId>) -> Self {
        Self::Track(id.into())
    }

    pub fn album(id: impl Into<AlbumId>) -> Self {
        Self::Album(id.into())
    }

    pub fn playlist(id: impl Into<PlaylistId>) -> Self {
        Self::Playlist(id.into())
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            QueueSource::Track(_) => SourceKind::Track,
            QueueSource::Album(_) => SourceKind::Album,
            QueueSource::Playlist(_) => SourceKind::Playlist,
        }
    }

    pub fn id_str(&self) -> &str {
        match self {
            QueueSource::Track(id) => id.as_str(),
            QueueSource::Album(id) => id.as_str(),
            QueueSource::Playlist(id) => id.as_str(),
        }
    }
}

impl fmt::Display for QueueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_str())
    }
}

impl FromStr for QueueSource {
    type Err = SoulError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| SoulError::invalid_input(format!("expected kind:id, got '{s}'")))?;

        if id.is_empty() {
            return Err(SoulError::invalid_input(format!("missing id in '{s}'")));
        }

        match kind {
            "track" => Ok(Self::track(id)),
            "album" => Ok(Self::album(id)),
            "playlist" => Ok(Self::playlist(id)),
            other => Err(SoulError::invalid_input(format!(
                "unknown source kind '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_kind() {
        assert_eq!(
            "track:42".parse::<QueueSource>().unwrap(),
            QueueSource::track("42")
        );
        assert_eq!(
            "album:a-1".parse::<QueueSource>().unwrap(),
            QueueSource::album("a-1")
        );
        assert_eq!(
            "playlist:mix".parse::<QueueSource>().unwrap(),
            QueueSource::playlist("mix")
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let source = QueueSource::album("7");
        assert_eq!(source.to_string(), "album:7");
        assert_eq!(source.to_string().parse::<QueueSource>().unwrap(), source);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("album".parse::<QueueSource>().is_err());
        assert!("album:".parse::<QueueSource>().is_err());
        assert!("folder:3".parse::<QueueSource>().is_err());
    }

    #[test]
    fn serializes_as_tagged_object() {
        let json = serde_json::to_string(&QueueSource::playlist("p1")).unwrap();
        assert_eq!(json, r#"{"kind":"playlist","id":"p1"}"#);
    }
}
