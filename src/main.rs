//! Bleep - Subtitle word detection and audio clip extraction
//!
//! Entry point for the `bleep` command line tool: finds words in subtitle
//! files, cuts the matching audio out of the movie with ffmpeg, and records
//! speech confirmation results.

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bleep::cli::{Args, Commands};
use bleep::config::{Config, DurationMode};
use bleep::error::BleepError;
use bleep::matcher::scan_file;
use bleep::store::{JsonSpeechStore, SpeechStore};
use bleep::transcribe::{SpeechService, TranscriberFactory};
use bleep::workflow::{MovieJob, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Bleep - subtitle word detection");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Scan { subtitles, words } => {
            let words = words.resolve()?;
            let matches = scan_file(&subtitles, &words)?;
            info!("Found {} matches in {}", matches.len(), subtitles.display());
            print_json(&matches)?;
        }
        Commands::Detect { video, subtitles, movie_name, output_dir, duration_mode, words } => {
            if let Some(dir) = output_dir {
                config.extraction.output_dir = dir;
            }
            if let Some(mode) = duration_mode {
                config.extraction.duration_mode = parse_duration_mode(&mode)?;
            }

            let movie_name = match movie_name {
                Some(name) => name,
                None => video
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
                    .ok_or_else(|| BleepError::Config("Cannot derive movie name from video path".to_string()))?,
            };

            let job = MovieJob {
                movie_name,
                video_path: video,
                subtitle_path: subtitles,
                words: words.resolve()?,
            };

            let workflow = Workflow::new(config.clone(), open_store(&config))?;
            info!("Using {}", workflow.media_version().await?);
            let report = workflow.process_movie(&job).await?;
            print_json(&report)?;
        }
        Commands::Batch { input_dir, output_dir, words } => {
            if let Some(dir) = output_dir {
                config.extraction.output_dir = dir;
            }
            let words = words.resolve()?;

            let workflow = Workflow::new(config.clone(), open_store(&config))?;
            let reports = workflow.process_directory(&input_dir, &words).await?;
            info!("Processed {} movies", reports.len());
            print_json(&reports)?;
        }
        Commands::Simulate { movie_name, words } => {
            let words = words.resolve()?;

            let service = SpeechService::new(TranscriberFactory::create_default(), open_store(&config));
            let report = service.process_audio(&movie_name, None, &words).await?;
            let records = service.get_speech_results(&movie_name).await?;

            print_json(&serde_json::json!({
                "records": records,
                "report": report,
            }))?;
        }
        Commands::Results { movie_name } => {
            let service = SpeechService::new(TranscriberFactory::create_default(), open_store(&config));
            let results = service.get_speech_results(&movie_name).await?;
            print_json(&results)?;
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            info!("Configuration written to {}", output.display());
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Arc<dyn SpeechStore> {
    Arc::new(JsonSpeechStore::new(&config.storage.speech_results_path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let bleep_dir = std::env::current_dir()?.join(".bleep");
    let log_dir = bleep_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "bleep.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so stdout stays valid JSON
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("bleep.log").display());

    Ok(())
}

/// Parse duration mode from string
fn parse_duration_mode(mode: &str) -> Result<DurationMode> {
    match mode.to_lowercase().as_str() {
        "stop-time" | "stoptime" => Ok(DurationMode::StopTime),
        "span" => Ok(DurationMode::Span),
        _ => Err(BleepError::Config(format!(
            "Invalid duration mode '{}'. Valid modes: stop-time, span",
            mode
        )).into()),
    }
}
