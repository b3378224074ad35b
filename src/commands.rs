//! Subcommand handlers for TrafficLens.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use trafficlens_api::{ApiServer, AppState};
use trafficlens_config::Config;
use trafficlens_core::credentials::mask_key;
use trafficlens_core::{
    CredentialStore, FileTrackingStore, Report, Summarizer, TrackingLog, classify, render_report,
};
use trafficlens_protocols::TabSession;

use crate::cli::KeyAction;
use crate::register::provider_factory;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Run the command server until interrupted.
pub(crate) async fn run_server(mut config: Config, host: Option<String>, port: Option<u16>) -> CmdResult {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!("Starting TrafficLens v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", config.storage.data_dir.display());

    let factory = provider_factory(&config.analysis);
    let server_config = config.server.clone();
    let state = Arc::new(AppState::open(config, factory).await?);
    let server = ApiServer::new(server_config, state);

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}

/// Print the classification of one URL.
pub(crate) fn classify_url(url: &str) -> CmdResult {
    match classify(url) {
        Some(info) => {
            println!("{}", serde_json::to_string_pretty(&info)?);
            if !info.has_tracking() {
                println!("No tracking parameters found.");
            }
        }
        None => println!("Not a classifiable URL: {}", url),
    }
    Ok(())
}

/// Render the report for a saved session snapshot.
pub(crate) async fn summarize_file(config: &Config, path: &Path) -> CmdResult {
    let content = tokio::fs::read_to_string(path).await?;
    let session: TabSession = serde_json::from_str(&content)?;

    let summarizer = Summarizer::new(config.summary.clone());
    let summary = summarizer.summarize(&session, Utc::now());
    match render_report(&summary, config.summary.domains_in_report) {
        Report::Text(text) => println!("{}", text),
        Report::NoData => println!("No traffic data collected yet."),
    }
    Ok(())
}

/// Print the tracking log for an origin.
pub(crate) async fn show_tracking(config: &Config, origin: &str, format: &str) -> CmdResult {
    let store = Arc::new(FileTrackingStore::new(&config.storage.data_dir).await?);
    let log = TrackingLog::open(store, &config.tracking).await?;
    let entries = log.query_recent_first(origin).await;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No tracking parameters recorded for {}.", origin);
        return Ok(());
    }

    println!("{:<20} {:<40} CLEAN URL", "TIME", "PARAMETERS");
    println!("{}", "-".repeat(100));
    for entry in &entries {
        let params: Vec<String> = entry
            .tracking_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!(
            "{:<20} {:<40} {}",
            entry.time.format("%Y-%m-%d %H:%M:%S"),
            params.join("&"),
            entry.clean_url
        );
    }
    println!();
    println!("Total: {} entries", entries.len());
    Ok(())
}

/// Handle key subcommands.
pub(crate) async fn handle_key_command(config: &Config, action: KeyAction) -> CmdResult {
    let credentials = CredentialStore::open(&config.storage.data_dir).await?;
    match action {
        KeyAction::Set { api_key } => {
            if api_key.trim().is_empty() {
                return Err("API key must not be empty".into());
            }
            credentials.set(&api_key).await?;
            println!("API key saved.");
        }
        KeyAction::Clear => {
            credentials.clear().await?;
            println!("Stored API key removed.");
        }
        KeyAction::Status => {
            match credentials
                .resolve(config.analysis.api_key.as_deref())
                .await
            {
                Some((key, source)) => {
                    println!("API key: {} ({:?})", mask_key(&key), source);
                }
                None => println!("API key: not configured"),
            }
            println!("Provider: {:?}", config.analysis.provider);
            println!("Model: {}", config.analysis.model_name());
        }
    }
    Ok(())
}
