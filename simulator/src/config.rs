//! Configuration for the simulator
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use scramble_config::{load_config, CentralConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_board_file() -> PathBuf {
    PathBuf::from(&CENTRAL_CONFIG.board.path)
}

fn default_players() -> usize {
    CENTRAL_CONFIG.simulation.players
}

fn default_moves_per_player() -> usize {
    CENTRAL_CONFIG.simulation.moves_per_player
}

fn default_min_delay_ms() -> f64 {
    CENTRAL_CONFIG.simulation.min_delay_ms
}

fn default_max_delay_ms() -> f64 {
    CENTRAL_CONFIG.simulation.max_delay_ms
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.simulation.seed
}

fn default_map_every() -> usize {
    CENTRAL_CONFIG.simulation.map_every
}

fn default_watchers() -> usize {
    CENTRAL_CONFIG.simulation.watchers
}

fn default_flip_timeout_ms() -> u64 {
    CENTRAL_CONFIG.simulation.flip_timeout_ms
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "scramble-simulator")]
#[command(about = "Memory Scramble simulation - concurrent random players on one board")]
#[command(
    long_about = "Runs several players concurrently against a single board, each making
random moves with small random delays, then checks the board's invariants.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Board file to play on
    #[arg(value_name = "BOARD_FILE", default_value_os_t = default_board_file())]
    pub board_file: PathBuf,

    /// Number of concurrent players
    #[arg(long, default_value_t = default_players())]
    pub players: usize,

    /// Moves (two flips each) per player
    #[arg(long, default_value_t = default_moves_per_player())]
    pub moves_per_player: usize,

    /// Minimum delay before each flip, in milliseconds
    #[arg(long, default_value_t = default_min_delay_ms())]
    pub min_delay_ms: f64,

    /// Maximum delay before each flip, in milliseconds
    #[arg(long, default_value_t = default_max_delay_ms())]
    pub max_delay_ms: f64,

    /// Base random seed; player i uses seed + i
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Player 0 runs an identity map every N moves (0 to disable)
    #[arg(long, default_value_t = default_map_every())]
    pub map_every: usize,

    /// Number of extra tasks looping on watch
    #[arg(long, default_value_t = default_watchers())]
    pub watchers: usize,

    /// Abandon a flip still waiting after this many milliseconds
    #[arg(long, default_value_t = default_flip_timeout_ms())]
    pub flip_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Directory for the stats file
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.players == 0 {
            return Err(anyhow!("players must be greater than 0"));
        }

        if !self.min_delay_ms.is_finite() || self.min_delay_ms < 0.0 {
            return Err(anyhow!("min_delay_ms must be a non-negative number"));
        }

        if !self.max_delay_ms.is_finite() || self.max_delay_ms < self.min_delay_ms {
            return Err(anyhow!(
                "max_delay_ms ({}) must be at least min_delay_ms ({})",
                self.max_delay_ms,
                self.min_delay_ms
            ));
        }

        if self.flip_timeout_ms == 0 {
            return Err(anyhow!("flip_timeout_ms must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn flip_timeout(&self) -> Duration {
        Duration::from_millis(self.flip_timeout_ms)
    }
}
