//! Configuration struct definitions.

use crate::defaults;
use serde::Deserialize;

// Serde default functions (required for #[serde(default = "...")])

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_board_path() -> String {
    defaults::board_path().into()
}
fn d_host() -> String {
    defaults::host().into()
}
fn d_port() -> u16 {
    defaults::port()
}
fn d_allowed_origins() -> Vec<String> {
    defaults::allowed_origins().to_vec()
}
fn d_players() -> usize {
    defaults::players()
}
fn d_moves_per_player() -> usize {
    defaults::moves_per_player()
}
fn d_min_delay_ms() -> f64 {
    defaults::min_delay_ms()
}
fn d_max_delay_ms() -> f64 {
    defaults::max_delay_ms()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_map_every() -> usize {
    defaults::map_every()
}
fn d_watchers() -> usize {
    defaults::watchers()
}
fn d_flip_timeout_ms() -> u64 {
    defaults::flip_timeout_ms()
}

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    /// Where the simulator writes its stats file.
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoardConfig {
    /// Board file loaded at startup.
    #[serde(default = "d_board_path")]
    pub path: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            path: defaults::board_path().into(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    #[serde(default = "d_host")]
    pub host: String,
    /// 0 binds an ephemeral port.
    #[serde(default = "d_port")]
    pub port: u16,
    /// CORS allowed origins. Empty = allow all origins (development mode with warning).
    #[serde(default = "d_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: defaults::host().into(),
            port: defaults::port(),
            allowed_origins: defaults::allowed_origins().to_vec(),
        }
    }
}

/// Randomized concurrent-player simulation
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    #[serde(default = "d_players")]
    pub players: usize,
    /// Each move is two flips.
    #[serde(default = "d_moves_per_player")]
    pub moves_per_player: usize,
    #[serde(default = "d_min_delay_ms")]
    pub min_delay_ms: f64,
    #[serde(default = "d_max_delay_ms")]
    pub max_delay_ms: f64,
    #[serde(default = "d_seed")]
    pub seed: u64,
    /// Player 0 applies an identity map every N moves. 0 disables.
    #[serde(default = "d_map_every")]
    pub map_every: usize,
    /// Extra tasks looping on `watch`.
    #[serde(default = "d_watchers")]
    pub watchers: usize,
    /// A flip still waiting after this long is abandoned.
    #[serde(default = "d_flip_timeout_ms")]
    pub flip_timeout_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: defaults::players(),
            moves_per_player: defaults::moves_per_player(),
            min_delay_ms: defaults::min_delay_ms(),
            max_delay_ms: defaults::max_delay_ms(),
            seed: defaults::seed(),
            map_every: defaults::map_every(),
            watchers: defaults::watchers(),
            flip_timeout_ms: defaults::flip_timeout_ms(),
        }
    }
}
