//! Specialised extractors keyed on the scanned path.
//!
//! Some files are structured tables rather than shell-ish text; these
//! get dedicated parsers instead of the generic rule set.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Dotfiles probed under each home directory found in /etc/passwd.
static HOME_DOTFILES: &[&str] = &[
    ".profile",
    ".bashrc",
    ".bash_profile",
    ".bash_history",
    ".ash_history",
];

static PROC_PID_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/proc/(?:\d+|self)/(status|cmdline|environ|maps)$").unwrap());

static PID_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:Pid|PPid|TracerPid):\s+(\d+)").unwrap());

static MAPPED_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\s(/[^\s]+)\s*$").unwrap());

/// Return true when `path` has a specialised extractor.
///
/// Specialised extraction runs even for content the classifier calls
/// binary: /proc cmdline/environ are NUL-separated and would otherwise
/// never reach the rule set.
pub fn has_special_extractor(path: &str) -> bool {
    path == "/proc/mounts" || path == "/etc/passwd" || PROC_PID_PATH.is_match(path)
}

/// Run the specialised extractor for `path` over raw content bytes.
pub fn extract_special(path: &str, content: &[u8]) -> Vec<String> {
    // NUL separators (cmdline, environ) become line breaks so the
    // per-line parsers below see one token per line.
    let text: String = String::from_utf8_lossy(content).replace('\0', "\n");

    if path == "/proc/mounts" {
        extract_mounts(&text)
    } else if path == "/etc/passwd" {
        extract_passwd(&text)
    } else if let Some(caps) = PROC_PID_PATH.captures(path) {
        match caps.get(1).map(|m| m.as_str()) {
            Some("status") => extract_proc_status(&text),
            Some("maps") => extract_proc_maps(&text),
            // cmdline and environ: plain token lists; absolute paths in
            // them are picked out directly.
            _ => extract_absolute_tokens(&text),
        }
    } else {
        Vec::new()
    }
}

/// Mount table entries are informational only: mount points are
/// directories, and generating file names under them would be blind
/// probing. They are logged for the operator and nothing is queued.
fn extract_mounts(text: &str) -> Vec<String> {
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let device = fields.next();
        let mount_point = fields.next();
        let fs_type = fields.next();
        if let (Some(device), Some(mount_point), Some(fs_type)) = (device, mount_point, fs_type) {
            debug!(device, mount_point, fs_type, "Mount table entry");
        }
    }
    Vec::new()
}

/// /etc/passwd: each home directory yields a fixed set of dotfile
/// candidates, plus the history files of its login shell.
fn extract_passwd(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 7 {
            continue;
        }
        let home = fields[5];
        if !home.starts_with('/') || home == "/" || home == "/nonexistent" {
            continue;
        }
        for dotfile in HOME_DOTFILES {
            candidates.push(format!("{}/{}", home.trim_end_matches('/'), dotfile));
        }
    }
    candidates
}

/// /proc/N/status: Pid/PPid/TracerPid fields cross-reference other
/// processes whose /proc entries are worth reading.
fn extract_proc_status(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for caps in PID_FIELD.captures_iter(text) {
        let pid = &caps[1];
        if pid == "0" {
            continue;
        }
        for entry in ["status", "cmdline", "environ", "maps"] {
            candidates.push(format!("/proc/{pid}/{entry}"));
        }
    }
    candidates
}

/// /proc/N/maps: the trailing column names memory-mapped files.
fn extract_proc_maps(text: &str) -> Vec<String> {
    MAPPED_FILE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .filter(|p| !p.starts_with("/dev/") && !p.starts_with("/memfd"))
        .collect()
}

fn extract_absolute_tokens(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| line.split(['=', ':'])) // environ is KEY=VALUE
        .filter(|token| token.starts_with('/'))
        .map(|token| token.to_string())
        .collect()
}
