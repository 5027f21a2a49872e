//! Centralized configuration loading from config.toml.
//!
//! Shared by the `web` server and the `simulator`.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Command-line arguments (handled by each binary)
//! 2. Environment variables (`SCRAMBLE_<SECTION>_<KEY>`)
//! 3. config.toml file
//! 4. Built-in defaults (`config.defaults.toml`, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! SCRAMBLE_<SECTION>_<KEY>=value
//!
//! Examples:
//!     SCRAMBLE_COMMON_LOG_LEVEL=debug
//!     SCRAMBLE_BOARD_PATH=boards/perfect.txt
//!     SCRAMBLE_WEB_PORT=3000
//!     SCRAMBLE_WEB_ALLOWED_ORIGINS=http://localhost:5173,https://example.com
//!     SCRAMBLE_SIMULATION_PLAYERS=8
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;

#[cfg(test)]
mod tests;
