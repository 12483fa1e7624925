//! SAEA Agent Binary
//!
//! Runs the evolutionary loop against the arena ledger and writes the run
//! report as JSON.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saea_common::{Identity, VERSION};
use saea_darwinian::{EvolutionMetrics, RunController, RunReport};
use saea_ledger::InMemoryLedger;

use crate::config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting SAEA agent v{}", VERSION);

    let config = AgentConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let authority = Identity::from_seed(config.authority_seed.as_bytes());
    let ledger = Arc::new(InMemoryLedger::new(authority));
    info!(authority = %authority, "Ledger ready");

    let rng = match config.rng_seed {
        Some(seed) => {
            info!(seed, "Using seeded random source");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let registry = Registry::new();
    let metrics = Arc::new(EvolutionMetrics::new()?);
    metrics.register(&registry)?;

    let mut controller = RunController::new(Arc::clone(&ledger), config.evolution.clone(), rng)?
        .with_metrics(Arc::clone(&metrics));

    let report = tokio::select! {
        result = controller.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal, abandoning run");
            return Ok(());
        }
    };

    write_report(&config, &report)?;
    dump_metrics(&registry);

    info!(
        events = ledger.events().len(),
        balance = ledger.balance(&authority),
        "Shutting down SAEA agent"
    );
    Ok(())
}

fn write_report(config: &AgentConfig, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&config.report_path, json)
        .with_context(|| format!("Failed to write report to {}", config.report_path.display()))?;
    info!(
        path = %config.report_path.display(),
        generations = report.generations.len(),
        "Run report written"
    );
    Ok(())
}

fn dump_metrics(registry: &Registry) {
    let mut buffer = Vec::new();
    match TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        Ok(()) => debug!("Metrics:\n{}", String::from_utf8_lossy(&buffer)),
        Err(err) => warn!(error = %err, "Metrics encoding failed"),
    }
}
