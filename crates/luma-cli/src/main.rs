mod playlist;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use luma_core::systems::stylesheet;
use luma_core::systems::transitions::available_styles;
use luma_core::{MemorySurface, SceneTransitionEngine, PRESETS};
use playlist::{Board, Playlist};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a playlist through the transition engine
    Run {
        /// Path to the playlist JSON
        #[arg(value_name = "PLAYLIST")]
        playlist: PathBuf,
    },
    /// List the built-in transition styles
    Styles,
    /// Print the built-in presets as JSON
    Presets,
    /// Print the transition stylesheet
    Css,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.to_string().parse()?)
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level, cli.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Run { playlist } => run(playlist).await,
        Command::Styles => {
            for style in available_styles() {
                println!("{}", style);
            }
            Ok(())
        }
        Command::Presets => serde_json::to_string_pretty(&PRESETS)
            .map(|json| println!("{}", json))
            .map_err(Into::into),
        Command::Css => {
            print!("{}", stylesheet::stylesheet());
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(path: PathBuf) -> Result<()> {
    info!("Playlist: {:?}", path);
    let playlist = Playlist::load(&path)?;

    let surface = MemorySurface::new();
    let board = Board::build(&playlist, &surface)?;
    let engine = SceneTransitionEngine::new(Arc::new(surface.clone()), board.live)?;

    if let Some(preset) = &playlist.preset {
        engine.apply_preset(preset)?;
    }
    if let Some(config) = &playlist.config {
        engine.configure(config)?;
    }
    info!(
        scenes = playlist.scenes.len(),
        steps = playlist.steps.len(),
        start = playlist.start_scene(),
        "Board ready"
    );

    // Submit everything up front; the engine serializes the rotation.
    let mut current = board.scene(playlist.start_scene())?;
    let mut pending = Vec::with_capacity(playlist.steps.len());
    for (index, step) in playlist.steps.iter().enumerate() {
        if step.disable {
            engine.disable();
        }
        if step.enable {
            engine.enable()?;
        }
        if let Some(update) = &step.configure {
            engine.configure(update)?;
        }

        let destination = board.scene(&step.to)?;
        let handle = engine.request_transition(Some(current), destination, step.style.as_deref());
        pending.push((index, step.to.as_str(), handle));
        current = destination;
    }

    let mut failures = 0;
    for (index, scene, handle) in pending {
        match handle.await {
            Ok(outcome) => info!(step = index, scene, ?outcome, "Step complete"),
            Err(e) => {
                failures += 1;
                warn!(step = index, scene, error = %e, "Step did not run");
            }
        }
    }

    println!("{}", surface.markup(board.live));
    println!("{}", serde_json::to_string_pretty(&engine.status())?);
    engine.teardown();

    if failures > 0 {
        warn!(failures, "Some steps did not run");
    }
    Ok(())
}
