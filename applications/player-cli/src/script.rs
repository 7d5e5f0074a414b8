//! Scripted transport commands
//!
//! A script is a flat list of words, e.g.
//! `play album:1 next pause seek 3000 jump 0 2 repeat list tick 1000`.
//! Each keyword consumes the arguments that follow it.

use crate::error::{CliError, Result};
use soul_core::QueueSource;
use soul_playback::{PlaybackController, PlaybackSnapshot, RepeatMode};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// `play <source>...`; resume when no sources follow
    Play(Vec<QueueSource>),
    Pause,
    Seek(u64),
    Next,
    Previous,
    /// `jump <entry> [sub]`
    Jump { entry: usize, sub: Option<usize> },
    Enqueue(QueueSource),
    /// `repeat [off|track|list]`; cycles when no mode follows
    Repeat(Option<RepeatMode>),
    Tick(u64),
    Finish,
    /// Sleep, letting the elapsed clock run
    Wait(u64),
    Release,
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCommand::Play(sources) if sources.is_empty() => write!(f, "play"),
            ScriptCommand::Play(sources) => {
                write!(f, "play")?;
                for source in sources {
                    write!(f, " {}", source)?;
                }
                Ok(())
            }
            ScriptCommand::Pause => write!(f, "pause"),
            ScriptCommand::Seek(ms) => write!(f, "seek {}", ms),
            ScriptCommand::Next => write!(f, "next"),
            ScriptCommand::Previous => write!(f, "previous"),
            ScriptCommand::Jump { entry, sub: None } => write!(f, "jump {}", entry),
            ScriptCommand::Jump {
                entry,
                sub: Some(sub),
            } => write!(f, "jump {} {}", entry, sub),
            ScriptCommand::Enqueue(source) => write!(f, "enqueue {}", source),
            ScriptCommand::Repeat(None) => write!(f, "repeat"),
            ScriptCommand::Repeat(Some(mode)) => write!(f, "repeat {}", repeat_name(*mode)),
            ScriptCommand::Tick(ms) => write!(f, "tick {}", ms),
            ScriptCommand::Finish => write!(f, "finish"),
            ScriptCommand::Wait(ms) => write!(f, "wait {}", ms),
            ScriptCommand::Release => write!(f, "release"),
        }
    }
}

fn repeat_name(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "off",
        RepeatMode::Track => "track",
        RepeatMode::List => "list",
    }
}

fn parse_repeat(word: &str) -> Option<RepeatMode> {
    match word {
        "off" => Some(RepeatMode::Off),
        "track" => Some(RepeatMode::Track),
        "list" => Some(RepeatMode::List),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(keyword: &str, word: Option<&String>) -> Result<T> {
    let word = word.ok_or_else(|| CliError::Script(format!("'{keyword}' needs a number")))?;
    word.parse()
        .map_err(|_| CliError::Script(format!("'{keyword}': '{word}' is not a number")))
}

/// Parse a script into commands
pub fn parse_script(words: &[String]) -> Result<Vec<ScriptCommand>> {
    let mut commands = Vec::new();
    let mut words = words.iter().peekable();

    while let Some(keyword) = words.next() {
        let command = match keyword.as_str() {
            "play" => {
                let mut sources = Vec::new();
                while let Some(word) = words.next_if(|word| word.contains(':')) {
                    sources.push(word.parse::<QueueSource>()?);
                }
                ScriptCommand::Play(sources)
            }
            "pause" => ScriptCommand::Pause,
            "seek" => ScriptCommand::Seek(parse_number("seek", words.next())?),
            "next" => ScriptCommand::Next,
            "previous" | "prev" => ScriptCommand::Previous,
            "jump" => {
                let entry = parse_number("jump", words.next())?;
                let sub = match words.next_if(|word| word.parse::<usize>().is_ok()) {
                    Some(word) => Some(parse_number("jump", Some(word))?),
                    None => None,
                };
                ScriptCommand::Jump { entry, sub }
            }
            "enqueue" => {
                let word = words
                    .next()
                    .ok_or_else(|| CliError::Script("'enqueue' needs a source".to_string()))?;
                ScriptCommand::Enqueue(word.parse()?)
            }
            "repeat" => {
                let mode = words.next_if(|word| parse_repeat(word).is_some());
                ScriptCommand::Repeat(mode.and_then(|word| parse_repeat(word)))
            }
            "tick" => ScriptCommand::Tick(parse_number("tick", words.next())?),
            "finish" => ScriptCommand::Finish,
            "wait" => ScriptCommand::Wait(parse_number("wait", words.next())?),
            "release" => ScriptCommand::Release,
            other => return Err(CliError::Script(format!("unknown command '{other}'"))),
        };
        commands.push(command);
    }

    Ok(commands)
}

/// Run one command against the controller
pub async fn execute(
    controller: &PlaybackController,
    command: &ScriptCommand,
) -> Result<PlaybackSnapshot> {
    let snapshot = match command {
        ScriptCommand::Play(sources) => controller.play(sources.clone()).await?,
        ScriptCommand::Pause => controller.pause().await?,
        ScriptCommand::Seek(ms) => controller.seek(*ms).await?,
        ScriptCommand::Next => controller.next().await?,
        ScriptCommand::Previous => controller.previous().await?,
        ScriptCommand::Jump { entry, sub: None } => controller.jump_to_entry(*entry).await?,
        ScriptCommand::Jump {
            entry,
            sub: Some(sub),
        } => controller.jump_to_sub_item(*entry, *sub).await?,
        ScriptCommand::Enqueue(source) => controller.enqueue(source.clone()).await?,
        ScriptCommand::Repeat(Some(mode)) => controller.set_repeat_mode(*mode).await?,
        ScriptCommand::Repeat(None) => {
            let mode = controller.cycle_repeat_mode().await?;
            tracing::info!(mode = repeat_name(mode), "Repeat mode cycled");
            controller.snapshot()
        }
        ScriptCommand::Tick(ms) => controller.advance_elapsed(*ms).await?,
        ScriptCommand::Finish => controller.track_finished().await?,
        ScriptCommand::Wait(ms) => {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
            controller.snapshot()
        }
        ScriptCommand::Release => controller.release().await?,
    };

    Ok(snapshot)
}
