//! Memory Scramble Simulator
//!
//! Drives several concurrent players against one board to shake out
//! concurrency bugs:
//! 1. Loads the board file
//! 2. Runs `players` tasks making random moves, plus optional watchers
//! 3. Verifies the board's invariants and prints the final grid
//! 4. Writes run statistics to `<data_dir>/simulation_stats.json`

use anyhow::{Context, Result};
use clap::Parser;
use scramble_core::Board;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

mod config;
mod simulation;
mod stats;

use crate::config::Config;
use crate::simulation::Simulation;

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level);
    info!(log_level = %config.log_level, "Tracing initialized");

    let board = Board::from_file(&config.board_file)
        .await
        .with_context(|| format!("failed to load board {}", config.board_file.display()))?;

    let simulation = Arc::new(Simulation::new(config, board));

    let shutdown_simulation = Arc::clone(&simulation);
    let shutdown_handle = tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, stopping players...");
                shutdown_simulation.shutdown();
            }
            Err(e) => warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    let run_result = simulation.run().await;
    shutdown_handle.abort();
    simulation.stats().write_stats();

    match run_result {
        Ok(summary) => {
            let stats = &summary.stats;
            info!(
                flips_ok = stats.flips_ok,
                no_card = stats.no_card,
                controlled = stats.controlled,
                timed_out = stats.timed_out,
                maps = stats.maps,
                changes_observed = stats.changes_observed,
                cards_removed = summary.cards_removed,
                elapsed_secs = stats.runtime_seconds,
                "Simulation complete: {} successful flips, {} failed",
                stats.flips_ok,
                stats.failed_flips()
            );
            println!("{}", summary.final_grid);
            Ok(())
        }
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            Err(e)
        }
    }
}
