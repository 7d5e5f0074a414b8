//! Playback queue model
//!
//! A queue is an ordered list of entries. Each entry is either a single track
//! or an expanded album/playlist holding its tracks in play order:
//!
//! ```text
//! entry 0: Album "Debut"      sub 0: Intro
//!                             sub 1: Single
//!                             sub 2: Outro
//! entry 1: Track "Encore"     sub 0: Encore
//! entry 2: Playlist "Mix"     sub 0: ...
//! ```
//!
//! Navigation is pure arithmetic over `(entry, sub)` positions: no I/O, no
//! backend access, and no failure cases once the queue is non-empty.

use crate::error::{PlaybackError, Result};
use crate::types::Position;
use chrono::NaiveDate;
use serde::Serialize;
use soul_core::{
    AlbumId, AlbumListing, PlaylistId, PlaylistListing, QueueSource, TrackRef,
};

/// Album expanded into its tracks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumEntry {
    id: AlbumId,
    name: String,
    artwork: Option<String>,
    release_date: Option<NaiveDate>,
    items: Vec<TrackRef>,
}

impl AlbumEntry {
    pub fn id(&self) -> &AlbumId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artwork(&self) -> Option<&str> {
        self.artwork.as_deref()
    }

    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }
}

/// Playlist expanded into its tracks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistEntry {
    id: PlaylistId,
    name: String,
    artwork: Option<String>,
    items: Vec<TrackRef>,
}

impl PlaylistEntry {
    pub fn id(&self) -> &PlaylistId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artwork(&self) -> Option<&str> {
        self.artwork.as_deref()
    }
}

/// One slot in the playback queue
///
/// Album and playlist entries can only be built from non-empty listings, so
/// every entry has at least one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueueEntry {
    Track(TrackRef),
    Playlist(PlaylistEntry),
    Album(AlbumEntry),
}

impl QueueEntry {
    /// Build an album entry
    ///
    /// # Errors
    /// `EmptyQueueSource` if the album has no tracks
    pub fn album(listing: AlbumListing) -> Result<Self> {
        if listing.tracks.is_empty() {
            return Err(PlaybackError::EmptyQueueSource {
                reference: QueueSource::Album(listing.id),
            });
        }

        Ok(QueueEntry::Album(AlbumEntry {
            id: listing.id,
            name: listing.name,
            artwork: listing.artwork,
            release_date: listing.release_date,
            items: listing.tracks,
        }))
    }

    /// Build a playlist entry
    ///
    /// # Errors
    /// `EmptyQueueSource` if the playlist has no tracks
    pub fn playlist(listing: PlaylistListing) -> Result<Self> {
        if listing.tracks.is_empty() {
            return Err(PlaybackError::EmptyQueueSource {
                reference: QueueSource::Playlist(listing.id),
            });
        }

        Ok(QueueEntry::Playlist(PlaylistEntry {
            id: listing.id,
            name: listing.name,
            artwork: listing.artwork,
            items: listing.tracks,
        }))
    }

    /// Tracks in play order (a single track is a one-element slice)
    pub fn items(&self) -> &[TrackRef] {
        match self {
            QueueEntry::Track(track) => std::slice::from_ref(track),
            QueueEntry::Playlist(playlist) => &playlist.items,
            QueueEntry::Album(album) => &album.items,
        }
    }

    /// Number of tracks in this entry (always >= 1)
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Always `false`; entries are never empty
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Index of the last sub-item
    pub fn last_sub(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Display name of the entry
    pub fn name(&self) -> &str {
        match self {
            QueueEntry::Track(track) => &track.name,
            QueueEntry::Playlist(playlist) => &playlist.name,
            QueueEntry::Album(album) => &album.name,
        }
    }
}

/// Ordered sequence of queue entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Queue {
    entries: Vec<QueueEntry>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue from resolved entries
    pub fn from_entries(entries: Vec<QueueEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry to the end of the queue
    pub fn push(&mut self, entry: QueueEntry) {
        self.entries.push(entry);
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of tracks across all entries
    pub fn track_count(&self) -> usize {
        self.entries.iter().map(QueueEntry::len).sum()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn get(&self, entry: usize) -> Option<&QueueEntry> {
        self.entries.get(entry)
    }

    /// Whether `position` points at an existing track
    pub fn contains(&self, position: Position) -> bool {
        self.entries
            .get(position.entry)
            .is_some_and(|entry| position.sub < entry.len())
    }

    /// Validate a jump target
    ///
    /// # Errors
    /// `IndexOutOfRange` if either index is outside the queue
    pub fn checked_position(&self, entry: usize, sub: usize) -> Result<Position> {
        let position = Position::new(entry, sub);
        if self.contains(position) {
            Ok(position)
        } else {
            Err(PlaybackError::IndexOutOfRange {
                entry,
                sub,
                len: self.len(),
            })
        }
    }

    /// Track the position resolves to
    ///
    /// # Panics
    /// If `position` is not valid for this queue. Positions held by a
    /// playback session are always valid.
    pub fn current_track(&self, position: Position) -> &TrackRef {
        &self.entries[position.entry].items()[position.sub]
    }

    /// Position after `position`
    ///
    /// Steps through the current entry's sub-items first, then moves to the
    /// next entry, wrapping to the first entry after the last one.
    pub fn next_position(&self, position: Position) -> Position {
        let Some(entry) = self.entries.get(position.entry) else {
            return Position::START;
        };

        if position.sub + 1 < entry.len() {
            return Position::new(position.entry, position.sub + 1);
        }

        let next_entry = (position.entry + 1) % self.entries.len();
        Position::new(next_entry, 0)
    }

    /// Position before `position`
    ///
    /// Steps back through sub-items, then lands on the previous entry's last
    /// sub-item, wrapping to the last entry before the first one.
    pub fn previous_position(&self, position: Position) -> Position {
        if self.entries.is_empty() {
            return Position::START;
        }

        if position.sub > 0 && self.contains(position) {
            return Position::new(position.entry, position.sub - 1);
        }

        let previous_entry = if position.entry == 0 || position.entry > self.entries.len() {
            self.entries.len() - 1
        } else {
            position.entry - 1
        };

        Position::new(previous_entry, self.entries[previous_entry].last_sub())
    }

    /// Whether `position` is the final track of the final entry
    pub fn is_last(&self, position: Position) -> bool {
        self.entries.len() == position.entry + 1
            && self
                .entries
                .last()
                .is_some_and(|entry| entry.last_sub() == position.sub)
    }
}
