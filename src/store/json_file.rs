//! JSON-file session store: one `<session-id>.json` document per
//! session under a base directory.

use super::{apply_payload, empty_session, SaveAction, SessionMeta, SessionStore, SnapshotPayload};
use crate::error::{ReconError, Result};
use crate::session::Session;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `base_dir`, creating the directory if
    /// needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir).map_err(|e| ReconError::io(&base_dir, e))?;
        Ok(Self { base_dir })
    }

    fn doc_path(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.json"))
    }

    async fn read_doc(&self, path: &Path, session_id: &str) -> Result<Session> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReconError::SessionNotFound(session_id.to_string()));
            }
            Err(e) => return Err(ReconError::io(path, e)),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write_doc(&self, path: &Path, session: &Session) -> Result<()> {
        let raw = serde_json::to_string_pretty(session)?;
        // Write to a sibling temp file then rename so a crash mid-write
        // cannot leave a truncated document.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| ReconError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| ReconError::io(path, e))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn save(
        &self,
        session_id: &str,
        action: SaveAction,
        run_id: u64,
        payload: SnapshotPayload,
    ) -> Result<()> {
        let path = self.doc_path(session_id);
        let mut doc = match action {
            SaveAction::Create | SaveAction::Overwrite => empty_session(),
            SaveAction::Merge => self.read_doc(&path, session_id).await?,
        };
        apply_payload(&mut doc, payload);

        debug!(session = session_id, run_id, ?action, "Writing session document");
        self.write_doc(&path, &doc).await
    }

    async fn load(&self, session_id: &str) -> Result<Session> {
        self.read_doc(&self.doc_path(session_id), session_id).await
    }

    async fn resume(&self, session_id: &str) -> Result<(Session, u64)> {
        let session = self.load(session_id).await?;
        let next_run_id = session.run_id + 1;
        info!(
            session = session_id,
            run_id = next_run_id,
            pending = session.queue.len(),
            "Loaded session for resume"
        );
        Ok((session, next_run_id))
    }

    async fn list(&self) -> Result<Vec<SessionMeta>> {
        let mut entries = tokio::fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| ReconError::io(&self.base_dir, e))?;

        let mut sessions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ReconError::io(&self.base_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ReconError::io(&path, e))?;
            // Skip documents that do not parse instead of failing the
            // whole listing.
            if let Ok(session) = serde_json::from_str::<Session>(&raw) {
                sessions.push(SessionMeta {
                    id: session.id,
                    status: session.status,
                    started_at: session.started_at,
                    ended_at: session.ended_at,
                    stats: session.stats,
                });
            }
        }
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.doc_path(session_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ReconError::SessionNotFound(session_id.to_string()))
            }
            Err(e) => Err(ReconError::io(&path, e)),
        }
    }
}
