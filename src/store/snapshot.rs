//! Incremental snapshotting with a single in-flight guard.

use super::{SaveAction, SessionStore, SnapshotPayload};
use crate::error::Result;
use crate::session::{FileRecord, Session};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Periodically snapshots a session to a [`SessionStore`].
///
/// Only records completed since the previous snapshot travel in the
/// payload, tracked by a cursor into the session's completion log. A
/// snapshot already in progress causes a new request to be skipped, not
/// queued; with frequent slow writes this can drop a save, which the
/// final stop() snapshot papers over.
pub struct Snapshotter {
    store: Arc<dyn SessionStore>,
    in_flight: Arc<AtomicBool>,
    /// Index into `session.completed_log` of the first unsaved record.
    cursor: usize,
    /// False until the first save of this run has succeeded.
    created: bool,
    max_stored_content_bytes: usize,
}

impl Snapshotter {
    pub fn new(store: Arc<dyn SessionStore>, max_stored_content_bytes: usize) -> Self {
        Self {
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
            cursor: 0,
            created: false,
            max_stored_content_bytes,
        }
    }

    /// Snapshotter for a resumed run: the stored document already
    /// exists and already holds every completed record.
    pub fn resumed(store: Arc<dyn SessionStore>, session: &Session, max_bytes: usize) -> Self {
        let mut snapshotter = Self::new(store, max_bytes);
        snapshotter.created = true;
        snapshotter.cursor = session.completed_log.len();
        snapshotter
    }

    /// Snapshot the session. Returns false when skipped because another
    /// snapshot was still in flight.
    pub async fn snapshot(&mut self, session: &Session) -> Result<bool> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            trace!(session = session.id.as_str(), "Snapshot skipped: save in flight");
            return Ok(false);
        }

        let result = self.snapshot_inner(session).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result.map(|_| true)
    }

    async fn snapshot_inner(&mut self, session: &Session) -> Result<()> {
        let new_paths = &session.completed_log[self.cursor..];
        // Queued paths ride along as provenance placeholders so a
        // resumed run keeps their discovery attribution.
        let pending = session
            .queue
            .iter()
            .filter_map(|path| session.results.get(path))
            .cloned();
        let new_records: Vec<FileRecord> = new_paths
            .iter()
            .filter_map(|path| session.results.get(path))
            .map(|record| self.prepare(record))
            .chain(pending)
            .collect();

        let action = if self.created {
            SaveAction::Merge
        } else {
            SaveAction::Create
        };

        debug!(
            session = session.id.as_str(),
            ?action,
            new_records = new_records.len(),
            "Persisting snapshot"
        );

        let payload = SnapshotPayload::capture(session, new_records);
        self.store
            .save(&session.id, action, session.run_id, payload)
            .await?;

        self.created = true;
        self.cursor = session.completed_log.len();
        Ok(())
    }

    /// Strip content that is never displayed (binary) or too large to
    /// keep in the stored document.
    fn prepare(&self, record: &FileRecord) -> FileRecord {
        let mut record = record.clone();
        if record.is_binary || record.size > self.max_stored_content_bytes {
            record.strip_content();
        }
        record
    }
}
