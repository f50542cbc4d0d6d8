//! Local-directory bridge adapter.
//!
//! Maps absolute device paths onto a local root directory. Used by the
//! CLI to explore extracted firmware images or mounted rootfs dumps,
//! and by tests as a real but hermetic transport.

use super::{BridgeError, RemoteBridge};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Serves reads from `<root>/<device-path>`.
#[derive(Debug, Clone)]
pub struct LocalBridge {
    root: PathBuf,
}

impl LocalBridge {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a device path under the root, rejecting anything that
    /// would escape it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = path.strip_prefix('/')?;
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl RemoteBridge for LocalBridge {
    async fn read_file(&self, path: &str) -> Result<Option<String>, BridgeError> {
        let Some(local) = self.resolve(path) else {
            // A path that tries to escape the jail is treated the same
            // as one the device does not have.
            return Ok(None);
        };

        match tokio::fs::read(&local).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => match e.kind() {
                std::io::ErrorKind::NotFound => Ok(None),
                std::io::ErrorKind::PermissionDenied => {
                    Err(BridgeError::AccessDenied(path.to_string()))
                }
                // Reading a directory lands here on most platforms
                _ if local.is_dir() => Ok(None),
                _ => Err(BridgeError::Transport(e.to_string())),
            },
        }
    }
}
