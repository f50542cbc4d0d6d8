//! The scan orchestrator: owns the session lifecycle and drives the
//! discovery loop.
//!
//! One instance explores one device. Collaborators sit behind trait
//! seams (`RemoteBridge`, `SessionStore`) so the engine runs unchanged
//! against a live transport, a local directory, or test fixtures.
//!
//! The loop pulls a batch from the queue, dispatches the reads
//! concurrently, then processes the outcomes in order: permanent
//! outcomes become completed records (with extraction feeding the
//! queue), transient ones are noted, re-queued at the front and fed to
//! the failure analyzer, which may force a pause. Pause and stop
//! requests are honored at batch boundaries.

mod events;

pub use events::{EventSender, ScanEvent};

use crate::bridge::{RemoteBridge, RemoteScanner, ScanOutcome};
use crate::classify::classify;
use crate::config::ReconConfig;
use crate::error::{ReconError, Result};
use crate::extract::PathExtractor;
use crate::failure::FailureAnalyzer;
use crate::session::{DiscoveryMethod, FileRecord, ScanStatus, Session, SessionStatus};
use crate::store::{SessionStore, Snapshotter};
use crate::vars::{ProcessOutcome, VariableResolver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle for requesting pause/stop from outside the scan loop.
///
/// Requests take effect at the next batch boundary.
#[derive(Clone, Default)]
pub struct ScanControl {
    pause: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl ScanControl {
    pub fn request_pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn pause_requested(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.pause.store(false, Ordering::SeqCst);
        self.stop.store(false, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    config: ReconConfig,
    scanner: RemoteScanner,
    store: Arc<dyn SessionStore>,
    extractor: PathExtractor,
    resolver: VariableResolver,
    analyzer: FailureAnalyzer,
    snapshotter: Option<Snapshotter>,
    session: Option<Session>,
    control: ScanControl,
    events: Option<EventSender>,
    max_files: Option<usize>,
}

impl Orchestrator {
    pub fn new(
        config: ReconConfig,
        bridge: Arc<dyn RemoteBridge>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        config.validate()?;
        let scanner = RemoteScanner::new(bridge, config.read_timeout());
        let resolver = VariableResolver::new(config.max_template_depth);
        let analyzer = FailureAnalyzer::new(config.error_threshold, config.error_window_secs);
        Ok(Self {
            config,
            scanner,
            store,
            extractor: PathExtractor::new(),
            resolver,
            analyzer,
            snapshotter: None,
            session: None,
            control: ScanControl::default(),
            events: None,
            max_files: None,
        })
    }

    /// Send progress events to `sender`.
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Pause the run after `limit` paths have been scanned.
    pub fn with_max_files(mut self, limit: usize) -> Self {
        self.max_files = Some(limit);
        self
    }

    pub fn control(&self) -> ScanControl {
        self.control.clone()
    }

    /// The session this orchestrator is (or was last) driving.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Start a fresh exploration and run it until the queue drains, a
    /// pause triggers, or stop is requested.
    pub async fn start(&mut self) -> Result<()> {
        self.guard_not_running()?;
        let session = Session::new(&self.config.bootstrap_paths);
        info!(
            session = session.id.as_str(),
            bootstrap = session.queue.len(),
            "Starting scan"
        );
        self.emit(ScanEvent::StatusChanged {
            session_id: session.id.clone(),
            status: SessionStatus::Running,
        });
        self.snapshotter = Some(Snapshotter::new(
            self.store.clone(),
            self.config.max_stored_content_bytes,
        ));
        self.begin(session).await
    }

    /// Resume a previously paused session from the store.
    ///
    /// Transient failures from the previous run are still queued and get
    /// retried; permanently scanned paths are never revisited. The
    /// failure analyzer starts clean.
    pub async fn resume(&mut self, session_id: &str) -> Result<()> {
        self.guard_not_running()?;
        let (mut session, next_run_id) = self.store.resume(session_id).await?;
        if session.status != SessionStatus::Paused {
            return Err(ReconError::InvalidState {
                operation: "resume",
                status: session.status.to_string(),
            });
        }

        session.status = SessionStatus::Running;
        session.ended_at = None;
        session.run_id = next_run_id;
        info!(
            session = session.id.as_str(),
            run_id = next_run_id,
            pending = session.queue.len(),
            "Resuming scan"
        );
        self.emit(ScanEvent::StatusChanged {
            session_id: session.id.clone(),
            status: SessionStatus::Running,
        });
        self.snapshotter = Some(Snapshotter::resumed(
            self.store.clone(),
            &session,
            self.config.max_stored_content_bytes,
        ));
        self.begin(session).await
    }

    /// Finalize the loaded session as completed, discarding the pending
    /// queue. Valid from any non-terminal state.
    pub async fn stop(&mut self) -> Result<()> {
        let mut session = self.session.take().ok_or(ReconError::InvalidState {
            operation: "stop",
            status: "idle".to_string(),
        })?;
        if session.status == SessionStatus::Completed {
            let status = session.status.to_string();
            self.session = Some(session);
            return Err(ReconError::InvalidState {
                operation: "stop",
                status,
            });
        }

        let result = self.finalize(&mut session, SessionStatus::Completed, true).await;
        self.session = Some(session);
        result
    }

    fn guard_not_running(&self) -> Result<()> {
        if let Some(session) = &self.session {
            if session.status == SessionStatus::Running {
                return Err(ReconError::AlreadyRunning(session.id.clone()));
            }
        }
        Ok(())
    }

    async fn begin(&mut self, session: Session) -> Result<()> {
        // Pause/stop requests issued before this run are stale; pause
        // and stop only apply to a running scan.
        self.control.reset();
        self.analyzer.reset();
        let mut session = session;
        let result = self.drive(&mut session).await;
        self.session = Some(session);
        result
    }

    /// The batch loop.
    async fn drive(&mut self, session: &mut Session) -> Result<()> {
        let mut since_snapshot = 0usize;
        loop {
            if self.control.stop_requested() {
                return self.finalize(session, SessionStatus::Completed, true).await;
            }
            if self.control.pause_requested() {
                return self.finalize(session, SessionStatus::Paused, false).await;
            }
            if let Some(limit) = self.max_files {
                if session.stats.scanned >= limit {
                    info!(limit, "File limit reached, pausing");
                    return self.finalize(session, SessionStatus::Paused, false).await;
                }
            }

            let batch = session.next_batch(self.config.batch_size);
            if batch.is_empty() {
                return self.finalize(session, SessionStatus::Completed, false).await;
            }

            let outcomes = self.dispatch(&batch).await;
            let mut transient = Vec::new();
            let mut pause_for = None;

            for (path, outcome) in batch.into_iter().zip(outcomes) {
                let record = match outcome {
                    ScanOutcome::TransportError(message) => {
                        warn!(path = path.as_str(), error = message.as_str(), "Transient failure");
                        session.note_transient(&path, &message);
                        transient.push(path);
                        let analysis = self.analyzer.analyze(&message);
                        if analysis.should_pause {
                            pause_for = Some(analysis);
                        }
                        continue;
                    }
                    ScanOutcome::Success(content) => {
                        self.analyzer.record_success();
                        self.process_success(session, &path, content)
                    }
                    ScanOutcome::NotFound => {
                        // The device answered; only the path is missing.
                        self.analyzer.record_success();
                        FileRecord::failure(&path, ScanStatus::NotFound, None)
                    }
                    ScanOutcome::AccessDenied(message) => {
                        self.analyzer.record_success();
                        FileRecord::failure(&path, ScanStatus::AccessDenied, Some(message))
                    }
                };

                let event = ScanEvent::FileScanned {
                    path: record.path.clone(),
                    status: record.status,
                    discovered: record.extracted_paths.len() + record.generated_paths.len(),
                };
                session.complete(record);
                since_snapshot += 1;
                // Record stored first, then the notification.
                self.emit(event);
            }

            session.requeue_front(transient);
            self.emit(ScanEvent::StatsUpdated(session.stats));

            if let Some(analysis) = pause_for {
                warn!(
                    consecutive = analysis.consecutive,
                    kind = ?analysis.kind,
                    "Auto-pausing scan"
                );
                self.emit(ScanEvent::AutoPaused {
                    kind: analysis.kind,
                    consecutive: analysis.consecutive,
                    recommendation: analysis.recommendation,
                });
                return self.finalize(session, SessionStatus::Paused, false).await;
            }

            if since_snapshot >= self.config.snapshot_interval {
                if self.snapshot(session).await? {
                    self.emit(ScanEvent::SnapshotSaved {
                        session_id: session.id.clone(),
                    });
                }
                since_snapshot = 0;
            }

            if !session.queue.is_empty() {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
        }
    }

    /// Dispatch one batch of reads concurrently, preserving order.
    async fn dispatch(&self, batch: &[String]) -> Vec<ScanOutcome> {
        let handles: Vec<_> = batch
            .iter()
            .map(|path| {
                let scanner = self.scanner.clone();
                let path = path.clone();
                tokio::spawn(async move { scanner.scan(&path).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(match handle.await {
                Ok(outcome) => outcome,
                Err(e) => ScanOutcome::TransportError(format!("scan task failed: {e}")),
            });
        }
        outcomes
    }

    /// Classify the content, mine it for variables and path candidates,
    /// and feed the discoveries back into the queue.
    fn process_success(&self, session: &mut Session, path: &str, content: String) -> FileRecord {
        let classification = classify(content.as_bytes());
        let mut extracted = Vec::new();
        let mut generated = Vec::new();
        let mut ignored = Vec::new();

        let candidates = self
            .extractor
            .extract(path, content.as_bytes(), classification.is_binary);
        let newly_resolved = if classification.is_binary {
            Vec::new()
        } else {
            self.resolver
                .extract_variables(&mut session.vars, &content, path)
        };

        for candidate in candidates {
            match self
                .resolver
                .process_path(&mut session.vars, &candidate.value, path)
            {
                ProcessOutcome::Literal(p) => {
                    if session.enqueue(&p, Some(path), DiscoveryMethod::Extracted) {
                        extracted.push(p);
                    } else {
                        ignored.push(p);
                    }
                }
                ProcessOutcome::Generated(paths) => {
                    for p in paths {
                        if session.enqueue(&p, Some(path), DiscoveryMethod::Generated) {
                            generated.push(p);
                        } else {
                            ignored.push(p);
                        }
                    }
                }
                ProcessOutcome::Deferred => {}
            }
        }

        // A variable gaining its first value can unblock templates from
        // files scanned long before this one. Provenance points at the
        // file the template came from, not this one.
        for name in newly_resolved {
            for gp in self.resolver.retry_deferred(&mut session.vars, &name) {
                if session.enqueue(&gp.path, Some(&gp.template_source), DiscoveryMethod::Generated) {
                    generated.push(gp.path);
                } else {
                    ignored.push(gp.path);
                }
            }
        }

        debug!(
            path,
            file_type = classification.file_type.as_str(),
            extracted = extracted.len(),
            generated = generated.len(),
            "Scanned file"
        );

        let mut record = FileRecord::success(path, content, &classification);
        record.extracted_paths = extracted;
        record.generated_paths = generated;
        record.ignored_paths = ignored;
        record
    }

    async fn finalize(
        &mut self,
        session: &mut Session,
        status: SessionStatus,
        clear_queue: bool,
    ) -> Result<()> {
        if clear_queue {
            session.queue.clear();
        }
        session.finish(status);
        self.snapshot(session).await?;
        info!(
            session = session.id.as_str(),
            status = %status,
            scanned = session.stats.scanned,
            pending = session.queue.len(),
            "Scan run finished"
        );
        self.emit(ScanEvent::StatusChanged {
            session_id: session.id.clone(),
            status,
        });
        Ok(())
    }

    async fn snapshot(&mut self, session: &Session) -> Result<bool> {
        match &mut self.snapshotter {
            Some(snapshotter) => snapshotter.snapshot(session).await,
            None => Ok(false),
        }
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver just means nobody is listening.
            let _ = sender.send(event);
        }
    }
}
