//! Transient-failure analysis and auto-pause decisions.
//!
//! The analyzer watches every transient scan failure, keeps a rolling
//! window of recent events, and tells the orchestrator when an error
//! burst means the transport is down and the scan should pause instead
//! of burning through the queue.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Classification of a transient failure by message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Timeout,
    Transport,
    Unknown,
}

impl FailureKind {
    fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            FailureKind::Timeout
        } else if lower.contains("transport") || lower.contains("connection") {
            FailureKind::Transport
        } else {
            FailureKind::Unknown
        }
    }
}

/// One observed failure.
#[derive(Debug, Clone)]
struct FailureEvent {
    kind: FailureKind,
    at: DateTime<Utc>,
}

/// Result of analyzing one failure.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub kind: FailureKind,
    /// The orchestrator must transition to paused.
    pub should_pause: bool,
    pub consecutive: usize,
    /// Human-readable advice surfaced with the pause.
    pub recommendation: String,
}

/// Rolling-window failure analyzer.
#[derive(Debug)]
pub struct FailureAnalyzer {
    window: Duration,
    threshold: usize,
    events: Vec<FailureEvent>,
    consecutive: usize,
}

impl FailureAnalyzer {
    /// `threshold` consecutive failures trigger a pause; events older
    /// than `window_secs` fall out of the rate window.
    pub fn new(threshold: usize, window_secs: u64) -> Self {
        Self {
            window: Duration::seconds(window_secs as i64),
            threshold,
            events: Vec::new(),
            consecutive: 0,
        }
    }

    /// Record a successful scan: the consecutive counter resets.
    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Record and classify a transient failure.
    pub fn analyze(&mut self, message: &str) -> Analysis {
        let now = Utc::now();
        self.prune(now);

        let kind = FailureKind::from_message(message);
        self.events.push(FailureEvent { kind, at: now });
        self.consecutive += 1;

        let should_pause = self.consecutive >= self.threshold;
        if should_pause {
            warn!(
                consecutive = self.consecutive,
                ?kind,
                "Failure burst: recommending pause"
            );
        }

        Analysis {
            kind,
            should_pause,
            consecutive: self.consecutive,
            recommendation: self.recommendation(kind, should_pause),
        }
    }

    /// Consecutive failures since the last success.
    pub fn consecutive(&self) -> usize {
        self.consecutive
    }

    /// Failures still inside the rolling window.
    pub fn recent_count(&mut self) -> usize {
        self.prune(Utc::now());
        self.events.len()
    }

    /// Reset all counters (used when a paused session resumes).
    pub fn reset(&mut self) {
        self.consecutive = 0;
        self.events.clear();
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        self.events.retain(|e| e.at > cutoff);
    }

    fn recommendation(&self, kind: FailureKind, should_pause: bool) -> String {
        if !should_pause {
            return format!(
                "{} transient failure(s) in a row; will retry remaining paths",
                self.consecutive
            );
        }
        match kind {
            FailureKind::Timeout => {
                "Repeated timeouts: the device or bridge is not answering. \
                 Scan paused; check connectivity, then resume."
                    .to_string()
            }
            FailureKind::Transport => {
                "Repeated transport failures: the bridge connection looks broken. \
                 Scan paused; re-establish the bridge, then resume."
                    .to_string()
            }
            FailureKind::Unknown => {
                "Repeated failures of unknown kind. Scan paused; inspect logs, then resume."
                    .to_string()
            }
        }
    }
}
