//! Election Node Binary
//!
//! Opens the RocksDB-backed ledger and serves signed invocations, one JSON
//! envelope per line on stdin, one JSON response per line on stdout.

use anyhow::Context;
use election_engine::{
    Config, ElectionApp, ElectionEngine, IdentityRegistry, SignedInvocation, SystemClock,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vote_ledger::RocksLedger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries responses
    let json_logs = std::env::var("ELECTION_LOG_FORMAT").is_ok_and(|format| format == "json");
    tracing_subscriber::registry()
        .with((!json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with(EnvFilter::from_default_env())
        .init();

    info!("Starting election node");

    let config = if let Ok(config_path) = std::env::var("ELECTION_CONFIG") {
        info!(path = %config_path, "Loading config from file");
        Config::from_file(&config_path)?
    } else {
        info!("Loading config from environment variables");
        Config::from_env()?
    };

    info!(node_id = %config.node_id, data_dir = ?config.ledger.data_dir, "Opening ledger");
    let ledger = RocksLedger::open(&config.ledger).context("failed to open ledger")?;

    let registry = IdentityRegistry::from_config(&config.identity)?;
    let engine = ElectionEngine::new(ledger, SystemClock).with_settings(config.engine.clone());
    let app = ElectionApp::new(engine, registry)?;

    info!(node_id = %config.node_id, "Election node running");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let reply = handle_line(&app, &line);
                stdout.write_all(reply.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            signal = signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("Received shutdown signal"),
                    Err(err) => error!(error = %err, "Unable to listen for shutdown signal"),
                }
                break;
            }
        }
    }

    info!("Shutting down election node...");
    match app.metrics().gather_text() {
        Ok(text) => debug!(metrics = %text, "Final metrics"),
        Err(e) => warn!(error = %e, "Failed to render metrics"),
    }
    match app.engine().ledger().stats() {
        Ok(stats) => info!(approximate_keys = stats.approximate_keys, "Ledger size"),
        Err(e) => warn!(error = %e, "Failed to read ledger stats"),
    }
    app.engine().ledger().flush()?;

    info!("Election node stopped");
    Ok(())
}

fn handle_line(app: &ElectionApp<RocksLedger>, line: &str) -> String {
    let reply = match SignedInvocation::from_json(line) {
        Ok(tx) => {
            let response = app.deliver(&tx);
            serde_json::json!({
                "tx_id": tx.tx_id,
                "code": response.code,
                "payload": response.payload_str(),
                "log": response.log,
            })
        }
        Err(e) => {
            warn!(error = %e, "Rejected input line");
            serde_json::json!({
                "tx_id": null,
                "code": e.code(),
                "payload": "",
                "log": e.to_string(),
            })
        }
    };

    reply.to_string()
}
