//! Per-path scan results.

use crate::classify::Classification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of scanning one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStatus {
    Success,
    NotFound,
    Error,
    AccessDenied,
}

/// How a path entered the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMethod {
    /// From the fixed bootstrap list.
    KnownList,
    /// Found literally in scanned content.
    Extracted,
    /// Produced by variable-template resolution.
    Generated,
}

/// Result of scanning one path, or a placeholder carrying provenance
/// for a path that is queued but not yet scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub status: ScanStatus,
    /// Raw content; stripped before persistence for binary or oversized
    /// files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub size: usize,
    pub is_binary: bool,
    pub file_type: String,
    /// Classification confidence, 0.0–1.0.
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic_bytes: Option<String>,
    /// New literal paths this file's content contributed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extracted_paths: Vec<String>,
    /// New paths produced via variable-template resolution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_paths: Vec<String>,
    /// Paths found but already known; kept for audit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_paths: Vec<String>,
    /// The already-scanned path whose content led here; None for
    /// bootstrap paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_from: Option<String>,
    pub discovery_method: DiscoveryMethod,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True while this record only carries provenance for a queued,
    /// not-yet-scanned path. Overwritten, never duplicated, when the
    /// real scan completes.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placeholder: bool,
}

impl FileRecord {
    /// Provenance placeholder for a queued path.
    pub fn placeholder(
        path: &str,
        discovered_from: Option<&str>,
        method: DiscoveryMethod,
    ) -> Self {
        Self {
            path: path.to_string(),
            status: ScanStatus::NotFound,
            content: None,
            size: 0,
            is_binary: false,
            file_type: "unknown".to_string(),
            confidence: 0.0,
            magic_bytes: None,
            extracted_paths: Vec::new(),
            generated_paths: Vec::new(),
            ignored_paths: Vec::new(),
            discovered_from: discovered_from.map(|s| s.to_string()),
            discovery_method: method,
            timestamp: Utc::now(),
            error: None,
            placeholder: true,
        }
    }

    /// Completed record for a successful read.
    pub fn success(path: &str, content: String, classification: &Classification) -> Self {
        Self {
            path: path.to_string(),
            status: ScanStatus::Success,
            size: content.len(),
            content: Some(content),
            is_binary: classification.is_binary,
            file_type: classification.file_type.clone(),
            confidence: classification.confidence,
            magic_bytes: classification.magic_bytes.clone(),
            extracted_paths: Vec::new(),
            generated_paths: Vec::new(),
            ignored_paths: Vec::new(),
            discovered_from: None,
            discovery_method: DiscoveryMethod::KnownList,
            timestamp: Utc::now(),
            error: None,
            placeholder: false,
        }
    }

    /// Completed record for a failed read.
    pub fn failure(path: &str, status: ScanStatus, error: Option<String>) -> Self {
        Self {
            path: path.to_string(),
            status,
            content: None,
            size: 0,
            is_binary: false,
            file_type: "unknown".to_string(),
            confidence: 0.0,
            magic_bytes: None,
            extracted_paths: Vec::new(),
            generated_paths: Vec::new(),
            ignored_paths: Vec::new(),
            discovered_from: None,
            discovery_method: DiscoveryMethod::KnownList,
            timestamp: Utc::now(),
            error,
            placeholder: false,
        }
    }

    /// Carry provenance over from this record's placeholder.
    pub fn with_provenance(mut self, placeholder: &FileRecord) -> Self {
        self.discovered_from = placeholder.discovered_from.clone();
        self.discovery_method = placeholder.discovery_method;
        self
    }

    /// Drop raw content (binary or oversized) before persistence.
    pub fn strip_content(&mut self) {
        self.content = None;
    }
}
