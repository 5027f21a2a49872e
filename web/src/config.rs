//! Server configuration.
//!
//! Defaults come from the central config (config.toml plus `SCRAMBLE_*`
//! env vars); CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use scramble_config::{load_config, CentralConfig};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_board_file() -> PathBuf {
    PathBuf::from(&CENTRAL_CONFIG.board.path)
}

fn default_host() -> String {
    CENTRAL_CONFIG.web.host.clone()
}

fn default_port() -> u16 {
    CENTRAL_CONFIG.web.port
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_allowed_origins() -> Vec<String> {
    CENTRAL_CONFIG.web.allowed_origins.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "scramble-web")]
#[command(about = "Memory Scramble game server")]
pub struct Config {
    /// Board file to serve
    #[arg(value_name = "BOARD_FILE", default_value_os_t = default_board_file())]
    pub board_file: PathBuf,

    /// Address to bind
    #[arg(long, default_value_t = default_host())]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(long, default_value_t = default_port())]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// CORS origins; empty allows any. Config file or env only.
    #[arg(skip = default_allowed_origins())]
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.board_file.as_os_str().is_empty() {
            return Err(anyhow!("board file cannot be empty"));
        }

        if self.host.is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            board_file: "boards/ab.txt".into(),
            host: "127.0.0.1".into(),
            port: 8080,
            log_level: "info".into(),
            allowed_origins: vec![],
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_accepts_port_zero() {
        let mut cfg = base_config();
        cfg.port = 0;
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.addr(), "127.0.0.1:0");
    }

    #[test]
    fn validate_rejects_empty_board_file() {
        let mut cfg = base_config();
        cfg.board_file = PathBuf::new();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("board file"));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "loud".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn cli_overrides_defaults() {
        let cfg = Config::try_parse_from(["scramble-web", "--port", "0", "boards/perfect.txt"])
            .unwrap();
        assert_eq!(cfg.port, 0);
        assert_eq!(cfg.board_file, PathBuf::from("boards/perfect.txt"));
    }
}
