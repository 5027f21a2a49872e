//! Tests for the configuration module.
//!
//! Env-var tests each use their own variables since tests run in parallel.

use std::io::Write;

use super::*;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.board.path, "boards/ab.txt");
    assert_eq!(config.web.host, "0.0.0.0");
    assert_eq!(config.web.port, 8080);
    assert!(config.web.allowed_origins.is_empty());
    assert_eq!(config.simulation.players, 4);
    assert_eq!(config.simulation.moves_per_player, 100);
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "debug"

[board]
path = "boards/perfect.txt"

[web]
host = "127.0.0.1"
port = 0
allowed_origins = ["http://localhost:5173"]

[simulation]
players = 8
min_delay_ms = 0.5
map_every = 10
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.board.path, "boards/perfect.txt");
    assert_eq!(config.web.host, "127.0.0.1");
    assert_eq!(config.web.port, 0);
    assert_eq!(config.web.allowed_origins, vec!["http://localhost:5173"]);
    assert_eq!(config.simulation.players, 8);
    assert!((config.simulation.min_delay_ms - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.simulation.map_every, 10);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[simulation]
seed = 7
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.simulation.seed, 7);
    assert_eq!(config.simulation.players, 4); // Default
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config.web.port, 8080); // Default
}

#[test]
fn test_env_overrides() {
    std::env::set_var("SCRAMBLE_BOARD_PATH", "boards/zoo.txt");
    std::env::set_var("SCRAMBLE_SIMULATION_PLAYERS", "9");
    std::env::set_var("SCRAMBLE_SIMULATION_MAX_DELAY_MS", "3.5");
    std::env::set_var(
        "SCRAMBLE_WEB_ALLOWED_ORIGINS",
        "http://a.example, http://b.example,",
    );

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.board.path, "boards/zoo.txt");
    assert_eq!(config.simulation.players, 9);
    assert!((config.simulation.max_delay_ms - 3.5).abs() < f64::EPSILON);
    assert_eq!(
        config.web.allowed_origins,
        vec!["http://a.example", "http://b.example"]
    );

    std::env::remove_var("SCRAMBLE_BOARD_PATH");
    std::env::remove_var("SCRAMBLE_SIMULATION_PLAYERS");
    std::env::remove_var("SCRAMBLE_SIMULATION_MAX_DELAY_MS");
    std::env::remove_var("SCRAMBLE_WEB_ALLOWED_ORIGINS");
}

#[test]
fn test_unparsable_env_override_is_ignored() {
    std::env::set_var("SCRAMBLE_SIMULATION_WATCHERS", "lots");
    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.simulation.watchers, 0);
    std::env::remove_var("SCRAMBLE_SIMULATION_WATCHERS");
}

#[test]
fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[simulation]\nmoves_per_player = 12").unwrap();
    let config = load_from_path(file.path());
    assert_eq!(config.simulation.moves_per_player, 12);
    assert_eq!(config.web.port, 8080);
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[simulation\nplayers = ").unwrap();
    let config = load_from_path(file.path());
    assert_eq!(config.simulation.moves_per_player, 100);

    let dir = tempfile::tempdir().unwrap();
    let config = load_from_path(&dir.path().join("missing.toml"));
    assert_eq!(config.common.log_level, "info");
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.board.path, cloned.board.path);
    assert_eq!(config.simulation.seed, cloned.simulation.seed);
}
