//! TrafficLens - per-tab web traffic observation with AI summaries.
//!
//! Main entry point for the TrafficLens CLI and command server.

mod cli;
mod commands;
mod register;

use std::path::Path;

use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use trafficlens_config::{Config, ConfigLoader, ConfigValidator, Finding};

use crate::cli::{Cli, Commands};

/// Initialize tracing with console and daily rolling file output.
fn init_tracing(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("trafficlens")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the writer flushing until exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Load and validate the configuration file; a missing file means defaults.
fn load_config(path: &Path) -> Result<(Config, Vec<Finding>), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    let warnings = ConfigValidator::validate(&config).into_result()?;
    Ok((config, warnings))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, warnings) = load_config(&cli.config)?;
    init_tracing(&config.storage.data_dir)?;
    for warning in warnings {
        warn!("Config {warning}");
    }

    match cli.command {
        None => commands::run_server(config, None, None).await,
        Some(Commands::Serve { host, port }) => commands::run_server(config, host, port).await,
        Some(Commands::Classify { url }) => commands::classify_url(&url),
        Some(Commands::Summarize { session }) => commands::summarize_file(&config, &session).await,
        Some(Commands::Tracking { origin, format }) => {
            commands::show_tracking(&config, &origin, &format).await
        }
        Some(Commands::Key { action }) => commands::handle_key_command(&config, action).await,
    }
}
