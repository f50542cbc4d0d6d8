//! The remote read seam and its outcome normalization.
//!
//! The engine never talks to a device directly; it issues single-file
//! reads through a [`RemoteBridge`] implementation and treats the three
//! possible answers uniformly: content, a not-found sentinel, or a
//! transport failure.

mod local;

pub use local::LocalBridge;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Errors surfaced by a bridge implementation.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The transport failed (connection dropped, device busy, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The device refused to read the path.
    #[error("Access denied: {0}")]
    AccessDenied(String),
}

/// One logical "read this file" operation against the remote device.
///
/// `Ok(Some(content))` is a successful read, `Ok(None)` is the device's
/// not-found sentinel, `Err` is a transport failure. Timeouts are the
/// scanner's job, not the bridge's.
#[async_trait]
pub trait RemoteBridge: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Option<String>, BridgeError>;
}

/// Normalized outcome of scanning one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The device returned content.
    Success(String),
    /// Permanent: the path does not exist. Never retried.
    NotFound,
    /// Permanent: the device refused access. Never retried.
    AccessDenied(String),
    /// Transient: timeout or transport failure. The path stays
    /// eligible for retry after a resume.
    TransportError(String),
}

impl ScanOutcome {
    /// Permanent outcomes mark the path scanned; transient ones do not.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, ScanOutcome::TransportError(_))
    }
}

/// Wraps a bridge with a bounded per-read timeout and outcome
/// normalization.
#[derive(Clone)]
pub struct RemoteScanner {
    bridge: Arc<dyn RemoteBridge>,
    timeout: Duration,
}

impl RemoteScanner {
    pub fn new(bridge: Arc<dyn RemoteBridge>, timeout: Duration) -> Self {
        Self { bridge, timeout }
    }

    /// Read one path, never returning an error: every failure mode maps
    /// to a [`ScanOutcome`] variant.
    pub async fn scan(&self, path: &str) -> ScanOutcome {
        trace!(path, "Dispatching remote read");
        match tokio::time::timeout(self.timeout, self.bridge.read_file(path)).await {
            Ok(Ok(Some(content))) => ScanOutcome::Success(content),
            Ok(Ok(None)) => ScanOutcome::NotFound,
            Ok(Err(BridgeError::AccessDenied(msg))) => ScanOutcome::AccessDenied(msg),
            Ok(Err(BridgeError::Transport(msg))) => ScanOutcome::TransportError(msg),
            Err(_) => ScanOutcome::TransportError(format!(
                "timeout after {}ms reading {path}",
                self.timeout.as_millis()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedBridge {
        delay: Option<Duration>,
        response: Result<Option<String>, String>,
    }

    #[async_trait]
    impl RemoteBridge for ScriptedBridge {
        async fn read_file(&self, _path: &str) -> Result<Option<String>, BridgeError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.response {
                Ok(content) => Ok(content.clone()),
                Err(msg) => Err(BridgeError::Transport(msg.clone())),
            }
        }
    }

    fn scanner(bridge: ScriptedBridge, timeout_ms: u64) -> RemoteScanner {
        RemoteScanner::new(Arc::new(bridge), Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn test_success_outcome() {
        let s = scanner(
            ScriptedBridge {
                delay: None,
                response: Ok(Some("content".to_string())),
            },
            100,
        );
        assert_eq!(
            s.scan("/etc/profile").await,
            ScanOutcome::Success("content".to_string())
        );
    }

    #[tokio::test]
    async fn test_not_found_outcome() {
        let s = scanner(
            ScriptedBridge {
                delay: None,
                response: Ok(None),
            },
            100,
        );
        let outcome = s.scan("/missing/file.txt").await;
        assert_eq!(outcome, ScanOutcome::NotFound);
        assert!(outcome.is_permanent());
    }

    #[tokio::test]
    async fn test_transport_error_is_transient() {
        let s = scanner(
            ScriptedBridge {
                delay: None,
                response: Err("device busy".to_string()),
            },
            100,
        );
        let outcome = s.scan("/etc/profile").await;
        assert!(!outcome.is_permanent());
        assert!(matches!(outcome, ScanOutcome::TransportError(m) if m.contains("device busy")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_transport_error() {
        let s = scanner(
            ScriptedBridge {
                delay: Some(Duration::from_secs(60)),
                response: Ok(Some("late".to_string())),
            },
            50,
        );
        let outcome = s.scan("/slow/file.bin").await;
        assert!(matches!(outcome, ScanOutcome::TransportError(m) if m.contains("timeout")));
    }
}
