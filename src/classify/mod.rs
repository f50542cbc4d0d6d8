//! Binary/text classification for scanned content.
//!
//! Pure functions: same bytes in, same classification out. Checks run in
//! fixed order — magic bytes, NUL byte, shebang, printable-ratio
//! heuristic — so a confident signal always beats a statistical one.

mod magic;

pub use magic::{MAGIC_SIGNATURES, MagicSignature, match_signature, signature_hex};

use serde::{Deserialize, Serialize};

/// Printable-ASCII ratio above which content is considered text.
const TEXT_RATIO: f64 = 0.85;
/// Ratio below which content is considered binary.
const BINARY_RATIO: f64 = 0.70;

/// Result of classifying one file's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub is_binary: bool,
    /// Coarse file-type label ("png", "shell-script", "json", ...).
    pub file_type: String,
    /// 0.0–1.0; signature and shebang matches are 1.0, ratio-based
    /// guesses less.
    pub confidence: f64,
    /// Hex of the matched magic signature, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic_bytes: Option<String>,
}

impl Classification {
    fn binary(file_type: &str, confidence: f64, magic_bytes: Option<String>) -> Self {
        Self {
            is_binary: true,
            file_type: file_type.to_string(),
            confidence,
            magic_bytes,
        }
    }

    fn text(file_type: &str, confidence: f64) -> Self {
        Self {
            is_binary: false,
            file_type: file_type.to_string(),
            confidence,
            magic_bytes: None,
        }
    }
}

/// Classify raw content as binary or text with a coarse type label.
pub fn classify(content: &[u8]) -> Classification {
    if content.is_empty() {
        return Classification::text("empty", 1.0);
    }

    if let Some(sig) = match_signature(content) {
        return Classification::binary(sig.label, 1.0, Some(signature_hex(sig)));
    }

    if content.contains(&0x00) {
        return Classification::binary("binary", 1.0, None);
    }

    if content.starts_with(b"#!") {
        return Classification::text(&shebang_type(content), 1.0);
    }

    let ratio = printable_ratio(content);
    if ratio > TEXT_RATIO {
        Classification::text(guess_text_type(content), 0.9)
    } else if ratio < BINARY_RATIO {
        Classification::binary("binary", 0.8, None)
    } else {
        // Ambiguous region: lean text so path extraction still runs,
        // but flag the low confidence.
        Classification::text("text", 0.5)
    }
}

/// Ratio of printable ASCII (0x20–0x7E plus \n \r \t) to total length.
fn printable_ratio(content: &[u8]) -> f64 {
    let printable = content
        .iter()
        .filter(|&&b| (0x20..=0x7E).contains(&b) || b == b'\n' || b == b'\r' || b == b'\t')
        .count();
    printable as f64 / content.len() as f64
}

/// Infer a script sub-type from the shebang interpreter name.
fn shebang_type(content: &[u8]) -> String {
    let first_line = content
        .split(|&b| b == b'\n')
        .next()
        .map(|l| String::from_utf8_lossy(l).into_owned())
        .unwrap_or_default();

    let interpreter = first_line
        .trim_start_matches("#!")
        .split_whitespace()
        .next_back()
        .unwrap_or("")
        .rsplit('/')
        .next()
        .unwrap_or("");

    match interpreter {
        "sh" | "bash" | "ash" | "dash" | "zsh" | "ksh" => "shell-script".to_string(),
        "python" | "python2" | "python3" => "python-script".to_string(),
        "perl" => "perl-script".to_string(),
        "node" | "nodejs" => "javascript".to_string(),
        "" => "script".to_string(),
        other => format!("{other}-script"),
    }
}

/// Guess a text sub-type from content shape.
fn guess_text_type(content: &[u8]) -> &'static str {
    let text = String::from_utf8_lossy(content);
    let trimmed = text.trim_start();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if serde_json::from_str::<serde_json::Value>(&text).is_ok() {
            return "json";
        }
    }
    if trimmed.starts_with("<?xml") {
        return "xml";
    }
    if trimmed.starts_with("<!DOCTYPE html") || trimmed.starts_with("<html") {
        return "html";
    }
    if looks_like_shell(&text) {
        return "shell-script";
    }
    if looks_like_ini(&text) {
        return "ini";
    }
    if text.contains("function ") || text.contains("=>") || text.contains("var ") {
        return "javascript";
    }
    "text"
}

fn looks_like_shell(text: &str) -> bool {
    let mut hits = 0;
    for line in text.lines().take(50) {
        let t = line.trim_start();
        if t.starts_with("export ")
            || t.starts_with("source ")
            || t.starts_with("if [")
            || t.starts_with("alias ")
            || t.starts_with("unset ")
        {
            hits += 1;
        }
    }
    hits >= 2
}

fn looks_like_ini(text: &str) -> bool {
    let mut sections = 0;
    let mut assignments = 0;
    for line in text.lines().take(50) {
        let t = line.trim();
        if t.starts_with('[') && t.ends_with(']') {
            sections += 1;
        } else if !t.starts_with('#') && t.contains('=') {
            assignments += 1;
        }
    }
    sections >= 1 && assignments >= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_is_binary_with_full_confidence() {
        let content = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let c = classify(&content);
        assert!(c.is_binary);
        assert_eq!(c.file_type, "png");
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.magic_bytes.as_deref(), Some("89 50 4e 47"));
    }

    #[test]
    fn test_nul_byte_is_binary() {
        let c = classify(b"some text\x00more");
        assert!(c.is_binary);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_mostly_printable_is_text() {
        // 95% printable ASCII, no NUL
        let mut content = vec![b'a'; 95];
        content.extend(std::iter::repeat(0x01).take(5));
        let c = classify(&content);
        assert!(!c.is_binary);
    }

    #[test]
    fn test_shebang_shell() {
        let c = classify(b"#!/bin/sh\necho hello\n");
        assert!(!c.is_binary);
        assert_eq!(c.file_type, "shell-script");
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_shebang_env_python() {
        let c = classify(b"#!/usr/bin/env python3\nprint('hi')\n");
        assert_eq!(c.file_type, "python-script");
    }

    #[test]
    fn test_json_detection() {
        let c = classify(br#"{"key": "value", "n": 1}"#);
        assert_eq!(c.file_type, "json");
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let c = classify(b"{not json at all");
        assert!(!c.is_binary);
        assert_ne!(c.file_type, "json");
    }

    #[test]
    fn test_xml_detection() {
        let c = classify(b"<?xml version=\"1.0\"?>\n<root/>");
        assert_eq!(c.file_type, "xml");
    }

    #[test]
    fn test_shell_without_shebang() {
        let c = classify(b"export PATH=/usr/bin\nsource /etc/profile.d/x.sh\n");
        assert_eq!(c.file_type, "shell-script");
    }

    #[test]
    fn test_ini_detection() {
        let c = classify(b"[section]\nkey=value\n");
        assert_eq!(c.file_type, "ini");
    }

    #[test]
    fn test_ambiguous_is_low_confidence_text() {
        // ~78% printable: between the two thresholds
        let mut content = vec![b'a'; 78];
        content.extend(std::iter::repeat(0x02).take(22));
        let c = classify(&content);
        assert!(!c.is_binary);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn test_mostly_unprintable_is_binary() {
        let mut content = vec![0x05u8; 60];
        content.extend(vec![b'a'; 40]);
        let c = classify(&content);
        assert!(c.is_binary);
    }

    #[test]
    fn test_empty_content() {
        let c = classify(b"");
        assert!(!c.is_binary);
        assert_eq!(c.file_type, "empty");
    }

    #[test]
    fn test_determinism() {
        let content = b"export VAR=1\nsource /x.sh\nif [ -f /y ]; then :; fi\n";
        let a = classify(content);
        let b = classify(content);
        assert_eq!(a.is_binary, b.is_binary);
        assert_eq!(a.file_type, b.file_type);
        assert_eq!(a.confidence, b.confidence);
    }
}
