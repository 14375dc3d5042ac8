//! ScamGuard - Main Entry Point
//!
//! Runs one analysis session: generates a batch, trains the risk model,
//! scores every transaction and reports laundering loops.
//!
//! Usage: `scamguard [CONFIG_PATH] [VOLUME]`

use anyhow::{Context, Result};
use scamguard::{config::LoggingConfig, AnalysisSession, AppConfig, RiskEngine};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(|s| s.as_str()).unwrap_or(DEFAULT_CONFIG_PATH);

    // Fall back to built-in settings only when the default file is absent
    let config_found = Path::new(config_path).exists();
    let config = if config_found || config_path != DEFAULT_CONFIG_PATH {
        AppConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path))?
    } else {
        AppConfig::default()
    };

    init_logging(&config.logging)?;

    info!("Starting ScamGuard analysis");
    if config_found {
        info!(path = %config_path, "Configuration loaded");
    } else {
        warn!(path = %config_path, "Configuration file not found, using defaults");
    }

    let volume = match args.get(2) {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("Invalid volume {:?}, expected a non-negative integer", raw))?,
        None => config.session.volume,
    };

    let start_time = Instant::now();
    let session = AnalysisSession::start(config, volume)?;
    let threshold = session.threshold();

    let preview = session.preview_graph()?;
    info!(
        accounts = preview.node_count(),
        edges = preview.edge_count(),
        high_risk_edges = preview.high_risk_edges(threshold).len(),
        "Preview network built"
    );

    let cycles = session.laundering_cycles()?;
    if cycles.is_empty() {
        info!("No circular patterns detected in this dataset");
    } else {
        for cycle in &cycles {
            warn!(length = cycle.len(), "LAUNDERING LOOP DETECTED: {}", cycle);
        }
    }

    let flagged = session
        .transactions()
        .iter()
        .filter_map(|tx| tx.risk_score.map(|score| (tx, score)))
        .filter(|(_, score)| *score > threshold);
    for (tx, score) in flagged {
        info!(
            tx_id = tx.tx_id,
            sender = tx.sender,
            receiver = tx.receiver,
            risk_score = format!("{:.2}", score),
            level = %RiskEngine::classify_alert(score),
            "Suspicious activity"
        );
    }

    let metrics = session.metrics()?;
    metrics.print_summary();

    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Analysis complete"
    );

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("scamguard={}", logging.level).parse()?);

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}
