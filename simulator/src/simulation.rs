//! The simulation driver.
//!
//! Each player is its own task with its own seeded RNG. A move is two flips,
//! each preceded by a short random delay. Watcher tasks count observed changes
//! and are aborted once every player is done.

use anyhow::{anyhow, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use scramble_core::Board;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

use crate::config::Config;
use crate::stats::{SimulationSnapshot, SimulationStats};

/// Outcome of a completed run.
#[derive(Debug)]
pub struct Summary {
    pub stats: SimulationSnapshot,
    /// Cards taken off the board as matched pairs.
    pub cards_removed: usize,
    pub final_grid: String,
}

pub struct Simulation {
    config: Config,
    board: Arc<Board>,
    stats: Arc<SimulationStats>,
    shutdown_signal: Arc<AtomicBool>,
}

impl Simulation {
    pub fn new(config: Config, board: Board) -> Self {
        let stats = Arc::new(SimulationStats::new(&config.data_dir));
        Self {
            config,
            board: Arc::new(board),
            stats,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask players to stop after their current flip.
    pub fn shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub async fn run(&self) -> Result<Summary> {
        info!(
            players = self.config.players,
            moves_per_player = self.config.moves_per_player,
            watchers = self.config.watchers,
            "Starting simulation on a {}x{} board",
            self.board.rows(),
            self.board.cols()
        );

        let watchers: Vec<JoinHandle<()>> = (0..self.config.watchers)
            .map(|i| {
                tokio::spawn(observe(
                    Arc::clone(&self.board),
                    Arc::clone(&self.stats),
                    format!("watcher{}", i),
                ))
            })
            .collect();

        let players: Vec<JoinHandle<Result<()>>> = (0..self.config.players)
            .map(|i| {
                tokio::spawn(play(
                    Arc::clone(&self.board),
                    Arc::clone(&self.stats),
                    Arc::clone(&self.shutdown_signal),
                    self.config.clone(),
                    i,
                ))
            })
            .collect();

        let mut outcome = Ok(());
        for handle in players {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(anyhow!("player task failed: {}", e)),
            };
            if let Err(e) = result {
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }
        for handle in watchers {
            handle.abort();
        }
        outcome?;

        self.board
            .check_rep()
            .context("board invariants violated after simulation")?;

        let cards_removed = self
            .board
            .look("observer")
            .lines()
            .skip(1)
            .filter(|line| *line == "none")
            .count();

        Ok(Summary {
            stats: self.stats.snapshot(),
            cards_removed,
            final_grid: self.board.snapshot_grid(),
        })
    }
}

fn random_delay(rng: &mut ChaCha20Rng, config: &Config) -> Duration {
    let ms = if config.max_delay_ms > config.min_delay_ms {
        rng.gen_range(config.min_delay_ms..=config.max_delay_ms)
    } else {
        config.min_delay_ms
    };
    Duration::from_secs_f64(ms / 1000.0)
}

async fn play(
    board: Arc<Board>,
    stats: Arc<SimulationStats>,
    shutdown_signal: Arc<AtomicBool>,
    config: Config,
    index: usize,
) -> Result<()> {
    let player = format!("player{}", index);
    let mut rng = ChaCha20Rng::seed_from_u64(config.seed.wrapping_add(index as u64));

    for mv in 0..config.moves_per_player {
        if shutdown_signal.load(Ordering::Relaxed) {
            debug!(player, mv, "stopping early");
            break;
        }

        if index == 0 && config.map_every > 0 && mv > 0 && mv % config.map_every == 0 {
            board
                .map(&player, |card| async move { card })
                .await
                .context("identity map failed")?;
            stats.record_map();
        }

        for _ in 0..2 {
            sleep(random_delay(&mut rng, &config)).await;
            let row = rng.gen_range(0..board.rows());
            let col = rng.gen_range(0..board.cols());

            // Give up on cards held by a player who has already finished.
            match timeout(config.flip_timeout(), board.flip(&player, row, col)).await {
                Err(_) => stats.record_timeout(),
                Ok(Ok(_)) => stats.record_flip_ok(),
                Ok(Err(err)) => {
                    if !stats.record_flip_failure(&err) {
                        return Err(err)
                            .with_context(|| format!("{} flipping ({}, {})", player, row, col));
                    }
                }
            }
        }
    }

    debug!(player, "finished");
    Ok(())
}

async fn observe(board: Arc<Board>, stats: Arc<SimulationStats>, name: String) {
    loop {
        board.watch(&name).await;
        stats.record_change();
    }
}
