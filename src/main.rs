//! FRITZ!Box IPv4 watchdog.
//!
//! Some routers silently lose their public IPv4 while IPv6 keeps working.
//! This daemon polls the router over TR-064 and heals the line when the
//! address stays missing.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                          WATCHDOG                            │
//!   │                                                              │
//!   │  ┌──────────┐   ┌────────┐   ┌────────────┐   ┌──────────┐  │
//!   │  │ interval │──▶│ probe  │──▶│ classifier │──▶│escalation│  │
//!   │  │  ticker  │   │        │   │            │   │  engine  │  │
//!   │  └──────────┘   └───┬────┘   └────────────┘   └────┬─────┘  │
//!   │                     │                              │        │
//!   │                     ▼                              ▼        │
//!   │               ┌───────────┐                 ┌────────────┐  │      ┌──────────┐
//!   │               │  TR-064   │◀────────────────│remediation │  │      │          │
//!   │               │  client   │─────────────────┼────────────┼──┼─────▶│FRITZ!Box │
//!   │               └───────────┘                 └────────────┘  │      │          │
//!   │                                                              │      └──────────┘
//!   │  ┌────────────────────────────────────────────────────────┐ │
//!   │  │                 Cross-Cutting Concerns                  │ │
//!   │  │   ┌─────────┐   ┌───────────────┐   ┌──────────────┐   │ │
//!   │  │   │ config  │   │ observability │   │  lifecycle   │   │ │
//!   │  │   │ + env   │   │ report + logs │   │   shutdown   │   │ │
//!   │  │   └─────────┘   └───────────────┘   └──────────────┘   │ │
//!   │  └────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use fritz_watchdog::lifecycle::{signals, startup};
use fritz_watchdog::observability::metrics;
use fritz_watchdog::Shutdown;

#[derive(Parser)]
#[command(name = "fritz-watchdog")]
#[command(about = "Heal a FRITZ!Box that lost its public IPv4", long_about = None)]
struct Args {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = startup::initialize(args.config.as_deref())?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let watchdog = startup::build_watchdog(&config)?;

    let shutdown = Shutdown::new();
    let run = watchdog.run(shutdown.subscribe());
    tokio::pin!(run);

    let summary = tokio::select! {
        summary = &mut run => summary,
        _ = signals::wait_for_signal() => {
            shutdown.trigger();
            run.await
        }
    };

    tracing::info!(cycles = summary.cycles, "Shutdown complete");
    Ok(())
}
