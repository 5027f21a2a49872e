//! Default configuration values loaded from config.defaults.toml.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    board: BoardDefaults,
    web: WebDefaults,
    simulation: SimulationDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct BoardDefaults {
    path: String,
}

#[derive(Debug, Deserialize)]
struct WebDefaults {
    host: String,
    port: u16,
    allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SimulationDefaults {
    players: usize,
    moves_per_player: usize,
    min_delay_ms: f64,
    max_delay_ms: f64,
    seed: u64,
    map_every: usize,
    watchers: usize,
    flip_timeout_ms: u64,
}

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Board
pub fn board_path() -> &'static str {
    &DEFAULTS.board.path
}

// Web
pub fn host() -> &'static str {
    &DEFAULTS.web.host
}
pub fn port() -> u16 {
    DEFAULTS.web.port
}
pub fn allowed_origins() -> &'static [String] {
    &DEFAULTS.web.allowed_origins
}

// Simulation
pub fn players() -> usize {
    DEFAULTS.simulation.players
}
pub fn moves_per_player() -> usize {
    DEFAULTS.simulation.moves_per_player
}
pub fn min_delay_ms() -> f64 {
    DEFAULTS.simulation.min_delay_ms
}
pub fn max_delay_ms() -> f64 {
    DEFAULTS.simulation.max_delay_ms
}
pub fn seed() -> u64 {
    DEFAULTS.simulation.seed
}
pub fn map_every() -> usize {
    DEFAULTS.simulation.map_every
}
pub fn watchers() -> usize {
    DEFAULTS.simulation.watchers
}
pub fn flip_timeout_ms() -> u64 {
    DEFAULTS.simulation.flip_timeout_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        assert_eq!(data_dir(), "./data");
        assert_eq!(log_level(), "info");
        assert_eq!(board_path(), "boards/ab.txt");
    }

    #[test]
    fn test_web_defaults() {
        assert_eq!(host(), "0.0.0.0");
        assert_eq!(port(), 8080);
        assert!(allowed_origins().is_empty());
    }

    #[test]
    fn test_simulation_defaults() {
        assert_eq!(players(), 4);
        assert_eq!(moves_per_player(), 100);
        assert!((min_delay_ms() - 0.1).abs() < f64::EPSILON);
        assert!((max_delay_ms() - 2.0).abs() < f64::EPSILON);
        assert_eq!(seed(), 42);
        assert_eq!(map_every(), 0);
        assert_eq!(watchers(), 0);
        assert_eq!(flip_timeout_ms(), 100);
    }
}
