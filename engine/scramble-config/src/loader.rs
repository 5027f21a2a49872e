//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from a member crate)
    "/app/config.toml", // Docker container
];

/// Load the central configuration.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the SCRAMBLE_CONFIG environment variable
/// 2. Each entry of [`CONFIG_SEARCH_PATHS`]
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("SCRAMBLE_CONFIG") {
        let path = Path::new(&path);
        if path.exists() {
            info!("Loading config from SCRAMBLE_CONFIG: {}", path.display());
            return load_from_path(path);
        }
        warn!(
            "SCRAMBLE_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// An unreadable or unparsable file is logged and replaced by the defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u16, usize, f64, ...); unparsable values are ignored
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparsable {}", $key),
            Err(_) => {}
        }
    };
    // Comma-separated list
    ($config:expr, $section:ident . $field:ident, $key:expr, list) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: SCRAMBLE_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "SCRAMBLE_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "SCRAMBLE_COMMON_LOG_LEVEL");

    // Board
    env_override!(config, board.path, "SCRAMBLE_BOARD_PATH");

    // Web
    env_override!(config, web.host, "SCRAMBLE_WEB_HOST");
    env_override!(config, web.port, "SCRAMBLE_WEB_PORT", parse);
    env_override!(
        config,
        web.allowed_origins,
        "SCRAMBLE_WEB_ALLOWED_ORIGINS",
        list
    );

    // Simulation
    env_override!(
        config,
        simulation.players,
        "SCRAMBLE_SIMULATION_PLAYERS",
        parse
    );
    env_override!(
        config,
        simulation.moves_per_player,
        "SCRAMBLE_SIMULATION_MOVES_PER_PLAYER",
        parse
    );
    env_override!(
        config,
        simulation.min_delay_ms,
        "SCRAMBLE_SIMULATION_MIN_DELAY_MS",
        parse
    );
    env_override!(
        config,
        simulation.max_delay_ms,
        "SCRAMBLE_SIMULATION_MAX_DELAY_MS",
        parse
    );
    env_override!(config, simulation.seed, "SCRAMBLE_SIMULATION_SEED", parse);
    env_override!(
        config,
        simulation.map_every,
        "SCRAMBLE_SIMULATION_MAP_EVERY",
        parse
    );
    env_override!(
        config,
        simulation.watchers,
        "SCRAMBLE_SIMULATION_WATCHERS",
        parse
    );
    env_override!(
        config,
        simulation.flip_timeout_ms,
        "SCRAMBLE_SIMULATION_FLIP_TIMEOUT_MS",
        parse
    );

    config
}
