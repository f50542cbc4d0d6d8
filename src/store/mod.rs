//! The persistence seam: session snapshots, rehydration, resume.

mod json_file;
mod snapshot;

pub use json_file::JsonFileStore;
pub use snapshot::Snapshotter;

use crate::error::Result;
use crate::session::{FileRecord, Session, SessionStats, SessionStatus};
use crate::vars::VariableTable;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a save request should be applied by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAction {
    /// First snapshot of a run: create the stored document.
    Create,
    /// Incremental snapshot: merge new records into the document.
    Merge,
    /// Replace the document wholesale.
    Overwrite,
}

/// What one snapshot carries. Session-level state travels in full;
/// file records only as the diff since the previous snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub run_id: u64,
    pub stats: SessionStats,
    pub queue: Vec<String>,
    pub scanned: Vec<String>,
    pub completed_log: Vec<String>,
    pub vars: VariableTable,
    /// Records completed since the last snapshot (content already
    /// stripped where required), plus provenance placeholders for
    /// still-queued paths.
    pub new_records: Vec<FileRecord>,
}

/// Listing entry for stored sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub stats: SessionStats,
}

/// External storage backend for sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(
        &self,
        session_id: &str,
        action: SaveAction,
        run_id: u64,
        payload: SnapshotPayload,
    ) -> Result<()>;

    /// Rehydrate the full session from the stored document.
    async fn load(&self, session_id: &str) -> Result<Session>;

    /// Load for resumption: the session plus the run id the next run
    /// must use.
    async fn resume(&self, session_id: &str) -> Result<(Session, u64)>;

    async fn list(&self) -> Result<Vec<SessionMeta>>;

    async fn delete(&self, session_id: &str) -> Result<()>;
}

/// Apply a snapshot payload onto a stored session document.
///
/// Shared by store implementations: session-level fields are replaced,
/// new records merged in.
pub(crate) fn apply_payload(session: &mut Session, payload: SnapshotPayload) {
    session.id = payload.id;
    session.status = payload.status;
    session.started_at = payload.started_at;
    session.ended_at = payload.ended_at;
    session.run_id = payload.run_id;
    session.stats = payload.stats;
    session.queue = payload.queue.into();
    session.scanned = payload.scanned.into_iter().collect();
    session.completed_log = payload.completed_log;
    session.vars = payload.vars;
    for record in payload.new_records {
        session.results.insert(record.path.clone(), record);
    }
}

/// Build an empty session shell for `Create` actions.
pub(crate) fn empty_session() -> Session {
    Session::new(&[])
}

impl SnapshotPayload {
    /// Capture session-level state; the caller supplies the record
    /// diff.
    pub fn capture(session: &Session, new_records: Vec<FileRecord>) -> Self {
        Self {
            id: session.id.clone(),
            status: session.status,
            started_at: session.started_at,
            ended_at: session.ended_at,
            run_id: session.run_id,
            stats: session.stats,
            queue: session.queue.iter().cloned().collect(),
            scanned: session.scanned.iter().cloned().collect(),
            completed_log: session.completed_log.clone(),
            vars: session.vars.clone(),
            new_records,
        }
    }
}
