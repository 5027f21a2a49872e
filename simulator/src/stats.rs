//! Simulation statistics and persistence.
//!
//! Counters are updated lock-free by every player task and written to a JSON
//! file at the end of the run.

use scramble_core::BoardError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct SimulationStats {
    flips_ok: AtomicU64,
    no_card: AtomicU64,
    controlled: AtomicU64,
    out_of_bounds: AtomicU64,
    /// Flips abandoned while waiting on a held card
    timed_out: AtomicU64,
    maps: AtomicU64,
    changes_observed: AtomicU64,
    start_time: Instant,
    stats_path: String,
}

/// Serializable stats for JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub flips_ok: u64,
    pub no_card: u64,
    pub controlled: u64,
    pub out_of_bounds: u64,
    pub timed_out: u64,
    pub maps: u64,
    pub changes_observed: u64,
    pub flips_per_second: f64,
    pub runtime_seconds: f64,
    pub timestamp: u64,
}

impl SimulationSnapshot {
    pub fn failed_flips(&self) -> u64 {
        self.no_card + self.controlled + self.out_of_bounds
    }
}

impl SimulationStats {
    pub fn new(data_dir: &str) -> Self {
        let stats_path = format!("{}/simulation_stats.json", data_dir);

        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory: {}", e);
        }

        Self {
            flips_ok: AtomicU64::new(0),
            no_card: AtomicU64::new(0),
            controlled: AtomicU64::new(0),
            out_of_bounds: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            maps: AtomicU64::new(0),
            changes_observed: AtomicU64::new(0),
            start_time: Instant::now(),
            stats_path,
        }
    }

    pub fn record_flip_ok(&self) {
        self.flips_ok.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an expected rule failure. Returns false for any other error.
    pub fn record_flip_failure(&self, err: &BoardError) -> bool {
        let counter = match err {
            BoardError::NoCard { .. } => &self.no_card,
            BoardError::Controlled { .. } => &self.controlled,
            BoardError::OutOfBounds { .. } => &self.out_of_bounds,
            _ => return false,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub fn record_timeout(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_map(&self) {
        self.maps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_change(&self) {
        self.changes_observed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        let flips_ok = self.flips_ok.load(Ordering::Relaxed);
        let no_card = self.no_card.load(Ordering::Relaxed);
        let controlled = self.controlled.load(Ordering::Relaxed);
        let out_of_bounds = self.out_of_bounds.load(Ordering::Relaxed);
        let runtime = self.start_time.elapsed().as_secs_f64();

        let attempted = flips_ok + no_card + controlled + out_of_bounds;
        let flips_per_second = if runtime > 0.0 {
            attempted as f64 / runtime
        } else {
            0.0
        };

        SimulationSnapshot {
            flips_ok,
            no_card,
            controlled,
            out_of_bounds,
            timed_out: self.timed_out.load(Ordering::Relaxed),
            maps: self.maps.load(Ordering::Relaxed),
            changes_observed: self.changes_observed.load(Ordering::Relaxed),
            flips_per_second,
            runtime_seconds: runtime,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to JSON file (atomic write-then-rename).
    pub fn write_stats(&self) {
        let snapshot = self.snapshot();

        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize simulation stats: {}", e);
                return;
            }
        };

        let temp_path = format!("{}.tmp", self.stats_path);
        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write simulation stats: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp stats file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, &self.stats_path) {
            warn!("Failed to rename stats file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote simulation stats to {}", self.stats_path);
    }

    pub fn stats_path(&self) -> &str {
        &self.stats_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn stats() -> (tempfile::TempDir, SimulationStats) {
        let dir = tempdir().unwrap();
        let stats = SimulationStats::new(dir.path().to_str().unwrap());
        (dir, stats)
    }

    #[test]
    fn test_flip_failures_by_kind() {
        let (_dir, stats) = stats();
        stats.record_flip_ok();
        assert!(stats.record_flip_failure(&BoardError::NoCard { row: 0, col: 0 }));
        assert!(stats.record_flip_failure(&BoardError::NoCard { row: 1, col: 0 }));
        assert!(stats.record_flip_failure(&BoardError::Controlled { row: 0, col: 0 }));
        assert!(!stats.record_flip_failure(&BoardError::InvariantViolated("x".into())));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.flips_ok, 1);
        assert_eq!(snapshot.no_card, 2);
        assert_eq!(snapshot.controlled, 1);
        assert_eq!(snapshot.out_of_bounds, 0);
        assert_eq!(snapshot.failed_flips(), 3);
    }

    #[test]
    fn test_empty_snapshot() {
        let (_dir, stats) = stats();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.failed_flips(), 0);
        assert!(!snapshot.flips_per_second.is_nan());
    }

    #[test]
    fn test_write_stats() {
        let (_dir, stats) = stats();
        stats.record_flip_ok();
        stats.record_timeout();
        stats.record_map();
        stats.record_change();
        stats.write_stats();

        let path = Path::new(stats.stats_path());
        assert!(path.exists());
        let content = fs::read_to_string(path).unwrap();
        let parsed: SimulationSnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.flips_ok, 1);
        assert_eq!(parsed.timed_out, 1);
        assert_eq!(parsed.maps, 1);
        assert_eq!(parsed.changes_observed, 1);
        assert!(!Path::new(&format!("{}.tmp", stats.stats_path())).exists());
    }
}
