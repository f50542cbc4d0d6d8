//! Scan progress events.

use crate::failure::FailureKind;
use crate::session::{ScanStatus, SessionStats, SessionStatus};
use tokio::sync::mpsc;

/// Progress notifications emitted while a scan runs.
///
/// Ordering guarantee: a `FileScanned` event for a path is sent only
/// after that path's record has been stored in the session, so a
/// consumer reacting to the event always sees the record.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    StatusChanged {
        session_id: String,
        status: SessionStatus,
    },
    FileScanned {
        path: String,
        status: ScanStatus,
        /// New paths this scan added to the queue.
        discovered: usize,
    },
    StatsUpdated(SessionStats),
    /// The failure analyzer forced a pause.
    AutoPaused {
        kind: FailureKind,
        consecutive: usize,
        recommendation: String,
    },
    SnapshotSaved {
        session_id: String,
    },
}

pub type EventSender = mpsc::UnboundedSender<ScanEvent>;
