use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repcount_lib::core::config::Config;
use repcount_lib::core::rep_tracker::{RepEvent, RepTracker};
use repcount_lib::logging::{self, LoggingConfig};
use repcount_lib::models::exercise::{BodySide, ExerciseMode};
use repcount_lib::platform::pose::ReplaySource;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repcount", version, about = "Count exercise reps from body landmarks")]
struct Cli {
    /// Config file (defaults to ~/.repcount/config/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded landmark frames (JSON Lines) and count reps
    Replay {
        file: PathBuf,

        /// pushups or squats
        #[arg(long, value_parser = ExerciseMode::from_string)]
        mode: Option<ExerciseMode>,

        /// left, right or most-visible
        #[arg(long, value_parser = BodySide::from_string)]
        side: Option<BodySide>,

        /// Minimum milliseconds between counted reps (0 disables)
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    logging::init(&LoggingConfig::from_env().with_level(level));

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    match cli.command {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Replay {
            file,
            mode,
            side,
            debounce_ms,
            json,
        } => {
            if let Some(side) = side {
                config.body_side = side;
            }
            if let Some(debounce_ms) = debounce_ms {
                config.debounce_ms = debounce_ms;
            }
            config.validate().context("Invalid configuration")?;

            let mode = mode.unwrap_or(config.default_mode);
            let tracker = RepTracker::new(config.processor_config(), config.event_buffer);
            let mut source = ReplaySource::open(&file)?;

            let report = repcount_lib::replay(&mut source, &tracker, mode)
                .await
                .with_context(|| format!("Replay of {} failed", file.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.summary)?);
            } else {
                for event in &report.events {
                    if let RepEvent::RepCounted {
                        timestamp_ms, reps, ..
                    } = event
                    {
                        println!("rep {:>3} at {:>8} ms", reps, timestamp_ms);
                    }
                }
                let summary = &report.summary;
                println!(
                    "{} {}: {} frames ({} without landmarks), {} suppressed",
                    summary.reps,
                    summary.mode.to_string(),
                    summary.frames_seen,
                    summary.frames_skipped,
                    summary.reps_suppressed
                );
            }
        }
    }

    Ok(())
}
