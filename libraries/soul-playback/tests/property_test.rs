//! Property-based tests for queue navigation
//!
//! Uses proptest to verify navigation invariants across arbitrary queue
//! shapes.

use proptest::prelude::*;
use soul_core::{AlbumId, AlbumListing, PlaylistId, PlaylistListing, TrackRef};
use soul_playback::{Position, Queue, QueueEntry, RepeatMode};

// ===== Helpers =====

fn track(entry: usize, sub: usize) -> TrackRef {
    TrackRef::new(format!("{entry}-{sub}"), format!("Track {sub}"))
        .with_audio_uri(format!("/music/{entry}/{sub}.flac"))
}

/// An entry is described by its kind (0 track, 1 album, 2 playlist) and size
fn build_queue(shape: &[(u8, usize)]) -> Queue {
    let entries = shape
        .iter()
        .enumerate()
        .map(|(entry, &(kind, size))| {
            let tracks: Vec<TrackRef> = (0..size).map(|sub| track(entry, sub)).collect();
            match kind {
                0 => QueueEntry::Track(track(entry, 0)),
                1 => QueueEntry::album(AlbumListing {
                    id: AlbumId::new(format!("album-{entry}")),
                    name: format!("Album {entry}"),
                    artwork: None,
                    release_date: None,
                    tracks,
                })
                .unwrap(),
                _ => QueueEntry::playlist(PlaylistListing {
                    id: PlaylistId::new(format!("playlist-{entry}")),
                    name: format!("Playlist {entry}"),
                    artwork: None,
                    tracks,
                })
                .unwrap(),
            }
        })
        .collect();
    Queue::from_entries(entries)
}

fn arbitrary_shape() -> impl Strategy<Value = Vec<(u8, usize)>> {
    prop::collection::vec((0u8..3, 1usize..6), 1..12)
}

/// Queue shape plus a valid position within it
fn queue_and_position() -> impl Strategy<Value = (Vec<(u8, usize)>, Position)> {
    arbitrary_shape().prop_flat_map(|shape| {
        let entries = shape.len();
        let shape_for_sub = shape.clone();
        (Just(shape), 0..entries).prop_flat_map(move |(shape, entry)| {
            let (kind, size) = shape_for_sub[entry];
            let subs = if kind == 0 { 1 } else { size };
            (Just(shape), (0..subs).prop_map(move |sub| Position::new(entry, sub)))
        })
    })
}

// ===== Property Tests =====

proptest! {
    /// Property: next and previous always return a valid position
    #[test]
    fn navigation_is_total((shape, position) in queue_and_position()) {
        let queue = build_queue(&shape);
        prop_assert!(queue.contains(position));

        let next = queue.next_position(position);
        let previous = queue.previous_position(position);
        prop_assert!(queue.contains(next), "next {:?} out of range", next);
        prop_assert!(queue.contains(previous), "previous {:?} out of range", previous);

        // The resolved track is always defined
        let _ = queue.current_track(next);
        let _ = queue.current_track(previous);
    }

    /// Property: previous undoes next unless next wrapped around
    #[test]
    fn previous_undoes_next((shape, position) in queue_and_position()) {
        let queue = build_queue(&shape);
        let next = queue.next_position(position);

        if !queue.is_last(position) {
            prop_assert_eq!(queue.previous_position(next), position);
        } else {
            prop_assert_eq!(next, Position::START);
        }
    }

    /// Property: stepping forward once per track visits every track exactly once
    #[test]
    fn full_cycle_visits_every_track(shape in arbitrary_shape()) {
        let queue = build_queue(&shape);
        let total = queue.track_count();

        let mut position = Position::START;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..total {
            prop_assert!(seen.insert(position));
            position = queue.next_position(position);
        }

        prop_assert_eq!(position, Position::START);
        prop_assert_eq!(seen.len(), total);
    }

    /// Property: out-of-range jump targets are always rejected
    #[test]
    fn checked_position_matches_contains(
        shape in arbitrary_shape(),
        entry in 0usize..16,
        sub in 0usize..8,
    ) {
        let queue = build_queue(&shape);
        let checked = queue.checked_position(entry, sub);
        prop_assert_eq!(checked.is_ok(), queue.contains(Position::new(entry, sub)));
    }

    /// Property: three cycles return any repeat mode to itself
    #[test]
    fn repeat_cycle_has_period_three(start in prop_oneof![
        Just(RepeatMode::Off),
        Just(RepeatMode::Track),
        Just(RepeatMode::List),
    ]) {
        prop_assert_ne!(start.cycle(), start);
        prop_assert_eq!(start.cycle().cycle().cycle(), start);
    }
}
