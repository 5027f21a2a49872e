//! Response types for the web API.
//!
//! Board views are plain text; only the health check is JSON.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `ROWSxCOLS`.
    pub board: String,
    pub blocked_flips: usize,
    pub pending_watchers: usize,
}
