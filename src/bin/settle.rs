//! Settlement CLI
//!
//! Computes payouts for one or more resolved-contract snapshots and writes
//! the reports as JSON. Snapshots are independent, so they settle in
//! parallel; reports come out in input order.
//!
//! Usage:
//!   settle snapshot.json [more.json ...] [--config payout_config.toml] [--by-user] [--output out.json]
//!
//! Environment Variables:
//!   PAYOUT_CONFIG_PATH - Path to TOML config file when --config is absent
//!                        (default: payout_config.toml, else built-in defaults)
//!   RUST_LOG           - Log filter (overrides --log-level)
//!
//! Exit code is 1 if any snapshot fails to settle. A failed snapshot never
//! produces a report.

use anyhow::{Context, Result};
use clap::Parser;
use payout_engine::settlement::{
    PayoutEngine, SettlementConfig, SettlementReport, SettlementSnapshot,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "settle")]
#[command(about = "Compute prediction-market settlement payouts from contract snapshots")]
struct Args {
    /// Snapshot JSON files to settle
    #[arg(required = true)]
    snapshots: Vec<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write reports here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include a per-user breakdown (loan clawbacks included)
    #[arg(long)]
    by_user: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Outcome of one snapshot, as written to the output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotResult {
    snapshot: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<SettlementReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            SettlementConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => SettlementConfig::from_env(),
    };
    let engine = PayoutEngine::new(config);

    info!("Settling {} snapshot(s)", args.snapshots.len());

    let results: Vec<SnapshotResult> = args
        .snapshots
        .par_iter()
        .map(|path| settle_file(&engine, path, args.by_user))
        .collect();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let json = serde_json::to_string_pretty(&results)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {} report(s) to {}", results.len() - failed, path.display());
        }
        None => println!("{}", json),
    }

    if failed > 0 {
        error!("{} snapshot(s) failed to settle", failed);
        std::process::exit(1);
    }
    Ok(())
}

fn settle_file(engine: &PayoutEngine, path: &Path, by_user: bool) -> SnapshotResult {
    let name = path.display().to_string();
    match load_snapshot(path).and_then(|snapshot| {
        snapshot
            .report(engine, by_user)
            .map_err(|e| anyhow::anyhow!(e))
    }) {
        Ok(report) => {
            info!(
                snapshot = %name,
                contract_id = %report.contract_id,
                payouts = report.payout_info.payouts.len(),
                "settled"
            );
            SnapshotResult {
                snapshot: name,
                report: Some(report),
                error: None,
            }
        }
        Err(e) => {
            error!(snapshot = %name, "settlement failed: {:#}", e);
            SnapshotResult {
                snapshot: name,
                report: None,
                error: Some(format!("{:#}", e)),
            }
        }
    }
}

fn load_snapshot(path: &Path) -> Result<SettlementSnapshot> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid snapshot {}", path.display()))
}
