//! BizCheck CLI - batch business-registration status lookups.
//!
//! Thin rendering collaborator around the batch runner: feeds it raw
//! identifier text, logs progress as snapshots arrive, cancels on
//! Ctrl-C, and prints the reconciled result table at the end.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bizcheck_client::{LookupClient, MAX_BATCH_SIZE};
use bizcheck_core::RunState;
use bizcheck_runner::{BatchRunner, RunSnapshot, RunnerConfig};

/// BizCheck - look up NTS business-registration status in batches
#[derive(Parser)]
#[command(name = "bizcheck")]
#[command(about = "Batch business-registration status lookup", long_about = None)]
struct Cli {
    /// odcloud service key; either representation the portal issues.
    /// Falls back to the BIZCHECK_SERVICE_KEY environment variable.
    #[arg(short, long)]
    key: Option<String>,

    /// File with one registration number per line; reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Identifiers per upstream request (at most 100)
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    chunk_size: usize,

    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = 50)]
    chunk_delay_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let key = cli
        .key
        .or_else(|| std::env::var("BIZCHECK_SERVICE_KEY").ok())
        .ok_or("no service key: pass --key or set BIZCHECK_SERVICE_KEY")?;

    if cli.chunk_size == 0 || cli.chunk_size > MAX_BATCH_SIZE {
        return Err(format!("chunk size must be between 1 and {MAX_BATCH_SIZE}").into());
    }

    let raw_input = match &cli.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let client = LookupClient::new(&key)?;
    let runner = BatchRunner::with_config(
        client,
        RunnerConfig {
            chunk_size: cli.chunk_size,
            chunk_delay: Duration::from_millis(cli.chunk_delay_ms),
        },
    );

    let mut snapshots = runner.subscribe();
    let handle = runner.start(&raw_input);

    let final_snapshot = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("cancellation requested");
                handle.cancel();
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break snapshots.borrow().clone();
                }
                let snapshot = snapshots.borrow_and_update().clone();
                info!(
                    percent = snapshot.progress,
                    rows = snapshot.entries.len(),
                    "progress"
                );
                // A published Idle snapshot means the input held no
                // usable identifiers.
                if snapshot.state.is_terminal() || snapshot.state == RunState::Idle {
                    break snapshot;
                }
            }
        }
    };

    print_results(&final_snapshot);
    Ok(())
}

fn print_results(snapshot: &RunSnapshot) {
    if snapshot.entries.is_empty() {
        println!("No results.");
        return;
    }

    println!("Results ({}):", snapshot.entries.len());
    println!(
        "{:<16}  {:<4}  {:<14}  {:<28}  {}",
        "B_NO", "OK", "STATUS", "TAX TYPE", "DETAIL"
    );
    println!("{}", "-".repeat(90));

    for entry in &snapshot.entries {
        let ok = if entry.success { "yes" } else { "no" };
        let detail = entry
            .error_message
            .as_deref()
            .unwrap_or(entry.record.end_dt.as_str());
        println!(
            "{:<16}  {:<4}  {:<14}  {:<28}  {}",
            entry.identifier, ok, entry.record.b_stt, entry.record.tax_type, detail
        );
    }

    // Dashboard-style summary: status code 01 = active, 02 = suspended,
    // 03 = closed.
    let total = snapshot.entries.len();
    let failed = snapshot.entries.iter().filter(|e| !e.success).count();
    let count_code = |code: &str| {
        snapshot
            .entries
            .iter()
            .filter(|e| e.record.b_stt_cd == code)
            .count()
    };
    println!();
    println!(
        "total: {}  active: {}  suspended: {}  closed: {}  failed: {}",
        total,
        count_code("01"),
        count_code("02"),
        count_code("03"),
        failed
    );

    if snapshot.state == RunState::Cancelled {
        println!("(run cancelled before all identifiers were processed)");
    }
}
