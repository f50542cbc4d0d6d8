//! Engine configuration.
//!
//! All knobs have conservative defaults so the engine is usable with
//! `ReconConfig::default()`. A JSON config file (`fs-recon.json`) can
//! override any subset of fields.

use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Paths scanned before any content-driven discovery occurs.
///
/// Ordered by how much further discovery each file tends to unlock:
/// shell profiles first (exports, sources), then system tables.
pub const BOOTSTRAP_PATHS: &[&str] = &[
    "/etc/profile",
    "/etc/passwd",
    "/proc/mounts",
    "/etc/fstab",
    "/etc/hostname",
    "/etc/hosts",
    "/proc/self/status",
    "/proc/self/environ",
    "/proc/self/maps",
    "/proc/version",
    "/proc/cmdline",
    "/etc/os-release",
    "/etc/group",
    "/etc/resolv.conf",
    "/var/log/messages",
];

/// Main configuration for an exploration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Number of paths dispatched to the bridge per batch.
    pub batch_size: usize,
    /// Delay between batches, in milliseconds.
    pub batch_delay_ms: u64,
    /// Per-read timeout for the remote bridge, in milliseconds.
    pub read_timeout_ms: u64,
    /// Consecutive transient failures before the scan auto-pauses.
    pub error_threshold: usize,
    /// Rolling window for failure-rate analysis, in seconds.
    pub error_window_secs: u64,
    /// Recursion ceiling for variable template expansion.
    pub max_template_depth: usize,
    /// Files scanned between incremental persistence snapshots.
    pub snapshot_interval: usize,
    /// Content larger than this is stripped before persistence.
    pub max_stored_content_bytes: usize,
    /// Paths seeded into the queue on scan start.
    pub bootstrap_paths: Vec<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay_ms: 50,
            read_timeout_ms: 10_000,
            error_threshold: 3,
            error_window_secs: 60,
            max_template_depth: 10,
            snapshot_interval: 25,
            max_stored_content_bytes: 256 * 1024,
            bootstrap_paths: BOOTSTRAP_PATHS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ReconConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ReconError::io(path, e))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scan loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ReconError::Config("batch_size must be at least 1".into()));
        }
        if self.error_threshold == 0 {
            return Err(ReconError::Config(
                "error_threshold must be at least 1".into(),
            ));
        }
        if self.bootstrap_paths.is_empty() {
            return Err(ReconError::Config(
                "bootstrap_paths must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.error_threshold, 3);
        assert_eq!(config.max_template_depth, 10);
        assert_eq!(config.read_timeout(), Duration::from_secs(10));
        assert!(config.bootstrap_paths.contains(&"/etc/profile".to_string()));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: ReconConfig = serde_json::from_str(r#"{"batch_size": 8}"#).unwrap();
        assert_eq!(config.batch_size, 8);
        // Untouched fields keep defaults
        assert_eq!(config.error_threshold, 3);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = ReconConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_bootstrap() {
        let config = ReconConfig {
            bootstrap_paths: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fs-recon.json");
        std::fs::write(&path, r#"{"batch_delay_ms": 10, "snapshot_interval": 5}"#).unwrap();

        let config = ReconConfig::from_file(&path).unwrap();
        assert_eq!(config.batch_delay_ms, 10);
        assert_eq!(config.snapshot_interval, 5);
    }
}
