//! Candidate path extraction from scanned text.
//!
//! The generic rule set (`rules`) runs over text files only; the
//! specialised table parsers (`special`) run for paths they claim, even
//! when the classifier called the content binary (NUL-separated /proc
//! files). Literal candidates are validated here; template candidates
//! are handed to the variable resolver untouched.

mod rules;
mod special;
mod validate;

pub use rules::{ExtractionRule, all_rules};
pub use special::{extract_special, has_special_extractor};
pub use validate::{is_valid_path, looks_like_file};

use rustc_hash::FxHashSet;
use tracing::trace;

/// One extracted candidate and the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Literal path or `${VAR}` template.
    pub value: String,
    /// Name of the extraction rule (or special extractor) responsible.
    pub rule: &'static str,
}

impl Candidate {
    /// Whether this candidate still contains variable references.
    pub fn is_template(&self) -> bool {
        self.value.contains('$')
    }
}

/// Applies the extraction rule set to file content.
#[derive(Debug, Default)]
pub struct PathExtractor;

impl PathExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract candidates from content scanned at `source_path`.
    ///
    /// Duplicates are collapsed, first producing rule wins. Literal
    /// candidates that fail validation or look like directories are
    /// dropped; templates pass through for the resolver to judge after
    /// substitution. Binary content yields no generic-rule candidates:
    /// lossy-decoded blobs produce garbage matches.
    pub fn extract(&self, source_path: &str, content: &[u8], is_binary: bool) -> Vec<Candidate> {
        let mut seen = FxHashSet::default();
        let mut candidates = Vec::new();

        if has_special_extractor(source_path) {
            for value in extract_special(source_path, content) {
                push_candidate(&mut candidates, &mut seen, value, "special");
            }
            // Table-shaped files get only their dedicated parser; the
            // generic rules would mis-read passwd/mounts columns.
            return candidates;
        }
        if is_binary {
            return candidates;
        }

        let text = String::from_utf8_lossy(content);
        for rule in all_rules() {
            for caps in rule.pattern.captures_iter(&text) {
                if let Some(m) = caps.get(1) {
                    push_candidate(&mut candidates, &mut seen, m.as_str().to_string(), rule.name);
                }
            }
        }

        trace!(
            source = source_path,
            count = candidates.len(),
            "Extracted candidates"
        );
        candidates
    }
}

fn push_candidate(
    candidates: &mut Vec<Candidate>,
    seen: &mut FxHashSet<String>,
    raw: String,
    rule: &'static str,
) {
    let value = clean_candidate(&raw);
    if value.is_empty() || !seen.insert(value.to_string()) {
        return;
    }

    let is_template = value.contains('$');
    if is_template {
        // Command substitutions are dynamic, not stored paths.
        if value.contains("$(") || value.contains('`') {
            return;
        }
    } else if !is_valid_path(value) || !looks_like_file(value) {
        return;
    }

    candidates.push(Candidate {
        value: value.to_string(),
        rule,
    });
}

/// Strip quoting and sentence punctuation regexes drag along.
fn clean_candidate(raw: &str) -> &str {
    raw.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | ')' | '(' | ',' | ';'))
        .trim_end_matches(['.', ':'])
}
