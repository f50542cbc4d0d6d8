//! Session state: the discovery queue, scan results, and counters for
//! one exploration run.

mod record;

pub use record::{DiscoveryMethod, FileRecord, ScanStatus};

use crate::vars::VariableTable;
use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;
use uuid::Uuid;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Paused,
    Completed,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scan counters, updated as results land.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Paths ever accepted into the queue.
    pub total: usize,
    /// Paths attempted (terminal outcome recorded).
    pub scanned: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub binary: usize,
    pub text: usize,
}

/// One exploration run: queue, results, provenance, variable state.
///
/// Invariant: a path is in at most one of `queue` / `scanned`; once
/// scanned it is never re-enqueued within the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Incremented on every resume.
    pub run_id: u64,
    pub stats: SessionStats,
    /// Path → record (completed or provenance placeholder).
    pub results: FxHashMap<String, FileRecord>,
    /// Pending paths, FIFO. Discovery order approximates breadth-first.
    pub queue: VecDeque<String>,
    /// Paths with a terminal outcome, plus members of the batch
    /// currently in flight; never re-queued while present here.
    pub scanned: FxHashSet<String>,
    /// Paths in completion order; the snapshotter's diff cursor indexes
    /// into this.
    pub completed_log: Vec<String>,
    /// Variable values and deferred templates mined so far.
    pub vars: VariableTable,
}

impl Session {
    /// Fresh session seeded with the bootstrap paths.
    pub fn new(bootstrap_paths: &[String]) -> Self {
        let mut session = Self {
            id: Uuid::new_v4().to_string(),
            status: SessionStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            run_id: 1,
            stats: SessionStats::default(),
            results: FxHashMap::default(),
            queue: VecDeque::new(),
            scanned: FxHashSet::default(),
            completed_log: Vec::new(),
            vars: VariableTable::default(),
        };
        for path in bootstrap_paths {
            session.enqueue(path, None, DiscoveryMethod::KnownList);
        }
        session
    }

    /// Offer a path to the queue.
    ///
    /// The single choke point enforcing idempotent discovery: a path
    /// already queued or already scanned is rejected. Accepted paths get
    /// a provenance placeholder record.
    pub fn enqueue(
        &mut self,
        path: &str,
        discovered_from: Option<&str>,
        method: DiscoveryMethod,
    ) -> bool {
        if self.scanned.contains(path) || self.queue.iter().any(|p| p == path) {
            return false;
        }

        trace!(path, ?method, from = ?discovered_from, "Path queued");
        self.queue.push_back(path.to_string());
        self.stats.total += 1;
        // The placeholder carries provenance until the real scan
        // overwrites it. Bootstrap paths get one too, so every queued
        // path has a record.
        self.results.insert(
            path.to_string(),
            FileRecord::placeholder(path, discovered_from, method),
        );
        true
    }

    /// Whether a path is already known (queued or scanned).
    pub fn knows(&self, path: &str) -> bool {
        self.scanned.contains(path) || self.queue.iter().any(|p| p == path)
    }

    /// Pull up to `n` paths from the front of the queue.
    ///
    /// Drained paths are marked scanned immediately, so discoveries made
    /// while the batch is in flight cannot re-queue a batch member (or
    /// the source itself). A transient failure unmarks its path again
    /// via [`Session::requeue_front`].
    pub fn next_batch(&mut self, n: usize) -> Vec<String> {
        let take = n.min(self.queue.len());
        let batch: Vec<String> = self.queue.drain(..take).collect();
        for path in &batch {
            self.scanned.insert(path.clone());
        }
        batch
    }

    /// Put transiently failed paths back at the front, preserving order.
    /// Unmarks them as scanned so they stay retryable.
    pub fn requeue_front(&mut self, paths: Vec<String>) {
        for path in paths.into_iter().rev() {
            self.scanned.remove(&path);
            self.queue.push_front(path);
        }
    }

    /// Store a terminal result for a path, preserving any placeholder
    /// provenance, and mark the path scanned.
    pub fn complete(&mut self, record: FileRecord) {
        let path = record.path.clone();
        let record = match self.results.get(&path) {
            Some(existing) if existing.placeholder => record.with_provenance(existing),
            _ => record,
        };

        self.stats.scanned += 1;
        match record.status {
            ScanStatus::Success => {
                self.stats.succeeded += 1;
                if record.is_binary {
                    self.stats.binary += 1;
                } else {
                    self.stats.text += 1;
                }
            }
            _ => self.stats.failed += 1,
        }

        self.scanned.insert(path.clone());
        self.completed_log.push(path.clone());
        self.results.insert(path, record);
    }

    /// Note a transient failure on a still-pending path.
    ///
    /// The record keeps its placeholder flag so the retry overwrites
    /// it; the path is not marked scanned.
    pub fn note_transient(&mut self, path: &str, message: &str) {
        if let Some(record) = self.results.get_mut(path) {
            record.status = ScanStatus::Error;
            record.error = Some(message.to_string());
        }
    }

    /// Mark the session finished.
    pub fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }

    /// Full-session JSON snapshot for offline analysis. Round-trips
    /// through `serde_json::from_str::<Session>`.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
