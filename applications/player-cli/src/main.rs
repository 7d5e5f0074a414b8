/// Soul Player - headless playback driver
use clap::{Parser, Subcommand};
use serde::Serialize;
use soul_core::{Catalog, QueueSource, TrackResolver};
use soul_player_cli::{config::CliConfig, execute, parse_script, HeadlessBackend};
use soul_playback::{ElapsedClock, PlaybackController, PlaybackSnapshot};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "soul-player")]
#[command(about = "Drive the Soul Player playback controller from the command line", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SOUL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run transport commands and print the state after each one
    Run {
        /// Continue after a rejected command
        #[arg(long)]
        keep_going: bool,

        /// Commands, e.g. `play album:1 next pause seek 3000`
        #[arg(required = true, trailing_var_arg = true)]
        script: Vec<String>,
    },
    /// Print the tracks a queue source resolves to
    Resolve {
        /// Source reference (`track:<id>`, `album:<id>`, `playlist:<id>`)
        source: String,
    },
}

/// One line of `run` output
#[derive(Serialize)]
struct Step<'a> {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a PlaybackSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soul_playback=info,soul_player_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Run { keep_going, script } => {
            run(config, &script, keep_going).await?;
        }
        Commands::Resolve { source } => {
            resolve(&config, &source).await?;
        }
    }

    Ok(())
}

async fn run(config: CliConfig, script: &[String], keep_going: bool) -> anyhow::Result<()> {
    let commands = parse_script(script)?;

    let catalog = Catalog::load(&config.catalog.path)?;
    tracing::info!(
        "Loaded catalog {:?} ({} tracks)",
        config.catalog.path,
        catalog.track_count()
    );

    let backend = HeadlessBackend::new(Duration::from_millis(config.backend.load_latency_ms));
    let controller = PlaybackController::spawn(config.playback.clone(), Arc::new(catalog), backend);

    let _clock = (config.backend.clock_ms > 0).then(|| {
        tracing::info!("Elapsed clock every {}ms", config.backend.clock_ms);
        ElapsedClock::start(&controller, Duration::from_millis(config.backend.clock_ms))
    });

    for command in &commands {
        match execute(&controller, command).await {
            Ok(snapshot) => {
                let step = Step {
                    command: command.to_string(),
                    snapshot: Some(&snapshot),
                    error: None,
                };
                println!("{}", serde_json::to_string(&step)?);
            }
            Err(e) if keep_going => {
                tracing::warn!("{} failed: {}", command, e);
                let step = Step {
                    command: command.to_string(),
                    snapshot: None,
                    error: Some(e.to_string()),
                };
                println!("{}", serde_json::to_string(&step)?);
            }
            Err(e) => {
                controller.release().await.ok();
                return Err(anyhow::anyhow!("{} failed: {}", command, e));
            }
        }
    }

    controller.release().await.ok();
    Ok(())
}

async fn resolve(config: &CliConfig, source: &str) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.catalog.path)?;
    let source: QueueSource = source.parse()?;

    let output = match &source {
        QueueSource::Track(id) => serde_json::to_value(catalog.resolve_track(id).await?)?,
        QueueSource::Album(id) => serde_json::to_value(catalog.resolve_album(id).await?)?,
        QueueSource::Playlist(id) => serde_json::to_value(catalog.resolve_playlist(id).await?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
