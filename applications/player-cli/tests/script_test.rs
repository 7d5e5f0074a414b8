//! End-to-end tests: catalog file + headless engine + scripted commands

use soul_core::Catalog;
use soul_player_cli::{execute, parse_script, CliError, HeadlessBackend};
use soul_playback::{PlaybackConfig, PlaybackController, PlaybackError, Position, TrackStatus};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ===== Test Helpers =====

/// Library on disk: two "audio" files that are not real containers, plus
/// one track pointing at a missing file
fn write_library(dir: &Path) -> Catalog {
    for name in ["one.flac", "two.flac"] {
        std::fs::write(dir.join(name), b"not really audio").unwrap();
    }

    let json = format!(
        r#"{{
            "tracks": [
                {{"id": "1", "name": "One", "audio_uri": "{dir}/one.flac", "duration_ms": 5000}},
                {{"id": "2", "name": "Two", "audio_uri": "{dir}/two.flac"}},
                {{"id": "3", "name": "Gone", "audio_uri": "{dir}/gone.flac"}}
            ],
            "albums": [{{"id": "lp", "name": "Long Player", "track_ids": ["1", "2"]}}],
            "playlists": [{{"id": "nothing", "name": "Nothing"}}]
        }}"#,
        dir = dir.display()
    );
    let path = dir.join("catalog.json");
    std::fs::write(&path, json).unwrap();
    Catalog::load(&path).unwrap()
}

fn spawn(dir: &TempDir) -> PlaybackController {
    PlaybackController::spawn(
        PlaybackConfig::default(),
        Arc::new(write_library(dir.path())),
        HeadlessBackend::new(Duration::ZERO),
    )
}

fn words(script: &str) -> Vec<String> {
    script.split_whitespace().map(String::from).collect()
}

// ===== Tests =====

#[tokio::test]
async fn script_drives_playback_through_album() {
    let dir = TempDir::new().unwrap();
    let controller = spawn(&dir);

    let mut snapshots = Vec::new();
    for command in parse_script(&words("play album:lp seek 2500 next pause")).unwrap() {
        snapshots.push(execute(&controller, &command).await.unwrap());
    }

    let played = snapshots[0].state.session().unwrap();
    assert!(played.is_playing());
    // Probe fails on fake audio; the catalog duration is used instead
    assert_eq!(played.duration_ms(), Some(5000));
    assert_eq!(played.track_status(), TrackStatus::Playable);

    assert_eq!(snapshots[1].state.session().unwrap().elapsed_ms(), 2500);

    let advanced = snapshots[2].state.session().unwrap();
    assert_eq!(advanced.position(), Position::new(0, 1));
    assert_eq!(advanced.track_status(), TrackStatus::DurationUnknown);

    assert!(!snapshots[3].state.is_playing());
}

#[tokio::test]
async fn missing_file_degrades_to_load_failed() {
    let dir = TempDir::new().unwrap();
    let controller = spawn(&dir);

    let command = &parse_script(&words("play track:3")).unwrap()[0];
    let snapshot = execute(&controller, command).await.unwrap();

    let session = snapshot.state.session().unwrap();
    assert_eq!(session.track_status(), TrackStatus::LoadFailed);
    assert!(!session.is_playing());
}

#[tokio::test]
async fn rejected_commands_surface_playback_errors() {
    let dir = TempDir::new().unwrap();
    let controller = spawn(&dir);

    let commands = parse_script(&words("enqueue playlist:nothing jump 4")).unwrap();

    let err = execute(&controller, &commands[0]).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Playback(PlaybackError::EmptyQueueSource { .. })
    ));

    let err = execute(&controller, &commands[1]).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Playback(PlaybackError::NotAvailable { .. })
    ));
}

#[tokio::test]
async fn snapshots_serialize_for_output() {
    let dir = TempDir::new().unwrap();
    let controller = spawn(&dir);

    let command = &parse_script(&words("enqueue album:lp")).unwrap()[0];
    let snapshot = execute(&controller, command).await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["enabled"], true);
    assert_eq!(json["state"]["status"], "available");
    assert_eq!(json["state"]["is_playing"], false);
    assert_eq!(json["state"]["queue"][0]["kind"], "album");
    assert_eq!(json["condition"]["condition"], "active");
}

#[tokio::test]
async fn release_ends_the_script() {
    let dir = TempDir::new().unwrap();
    let controller = spawn(&dir);

    let commands = parse_script(&words("play track:1 release next")).unwrap();
    execute(&controller, &commands[0]).await.unwrap();
    execute(&controller, &commands[1]).await.unwrap();

    let err = execute(&controller, &commands[2]).await.unwrap_err();
    assert!(matches!(err, CliError::Playback(PlaybackError::Released)));
}
