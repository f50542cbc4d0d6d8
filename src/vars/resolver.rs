//! Shell-variable discovery and deferred-template bookkeeping.

use super::template::{expand_template, find_references, has_references};
use super::{DeferredTemplate, VariableConfidence, VariableTable, VariableValue};
use crate::extract::{is_valid_path, looks_like_file};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:export[ \t]+)?([A-Za-z_][A-Za-z0-9_]*)=("[^"\n]*"|'[^'\n]*'|[^\s;#]+)"#)
        .unwrap()
});

static CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[+\s+"?\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?"?\s*==?\s*("[^"\]]*"|'[^']*'|[^\s\]]+)\s*\]"#)
        .unwrap()
});

/// Directories whose extension-less entries are almost certainly
/// commands rather than stored paths.
static BIN_DIRECTORIES: &[&str] = &["/bin/", "/sbin/", "/usr/bin/", "/usr/sbin/", "/usr/local/bin/"];

/// Outcome of feeding one candidate through the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No variable references: the candidate is already literal.
    Literal(String),
    /// All references resolved: zero or more validated generated paths.
    Generated(Vec<String>),
    /// At least one reference is unknown; the template was deferred.
    Deferred,
}

/// A path produced by re-attempting a deferred template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPath {
    pub path: String,
    /// The template that produced it.
    pub template: String,
    /// The file the template was originally discovered in.
    pub template_source: String,
}

/// Resolves `${VAR}` path templates against variables mined from
/// scanned content.
#[derive(Debug, Clone)]
pub struct VariableResolver {
    max_depth: usize,
}

impl VariableResolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Mine variable definitions from text content.
    ///
    /// Returns the names that gained a value they did not have before;
    /// the caller retries deferred templates for each of them.
    pub fn extract_variables(
        &self,
        table: &mut VariableTable,
        text: &str,
        source_path: &str,
    ) -> Vec<String> {
        let mut newly_resolved = Vec::new();

        for caps in ASSIGNMENT.captures_iter(text) {
            let name = &caps[1];
            let value = unquote(&caps[2]);
            if self.record(table, name, value, source_path, VariableConfidence::Explicit)
                && !newly_resolved.contains(&name.to_string())
            {
                newly_resolved.push(name.to_string());
            }
        }

        for caps in CONDITIONAL.captures_iter(text) {
            let name = &caps[1];
            let value = unquote(&caps[2]);
            if self.record(
                table,
                name,
                value,
                source_path,
                VariableConfidence::Conditional,
            ) && !newly_resolved.contains(&name.to_string())
            {
                newly_resolved.push(name.to_string());
            }
        }

        newly_resolved
    }

    /// Record one (name, value) pair. Returns true when the pair is new.
    fn record(
        &self,
        table: &mut VariableTable,
        name: &str,
        value: &str,
        source_path: &str,
        confidence: VariableConfidence,
    ) -> bool {
        if value.is_empty() {
            return false;
        }
        // Command substitutions are dynamic; their value only exists on
        // the device at run time.
        if value.contains("$(") || value.contains('`') {
            trace!(name, value, "Discarding dynamic variable value");
            return false;
        }
        if looks_like_command(name, value) {
            trace!(name, value, "Discarding executable-looking value");
            return false;
        }

        let values = table.variables.entry(name.to_string()).or_default();
        if values.iter().any(|v| v.value == value) {
            return false;
        }

        debug!(name, value, source = source_path, "Variable discovered");
        values.push(VariableValue {
            name: name.to_string(),
            value: value.to_string(),
            discovered_in: source_path.to_string(),
            confidence,
        });
        true
    }

    /// Resolve a candidate into literal paths, or defer it.
    pub fn process_path(
        &self,
        table: &mut VariableTable,
        candidate: &str,
        discovered_in: &str,
    ) -> ProcessOutcome {
        if !has_references(candidate) {
            return ProcessOutcome::Literal(candidate.to_string());
        }

        let references = find_references(candidate);
        let missing: Vec<String> = references
            .iter()
            .filter(|name| !table.variables.contains_key(*name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            self.defer(table, candidate, missing, discovered_in);
            return ProcessOutcome::Deferred;
        }

        ProcessOutcome::Generated(self.expand_validated(table, candidate))
    }

    /// Re-attempt every deferred template that was waiting on `name`.
    ///
    /// Successfully expanded templates are removed from the deferred
    /// set; templates still missing other variables have their missing
    /// set updated in place.
    pub fn retry_deferred(&self, table: &mut VariableTable, name: &str) -> Vec<GeneratedPath> {
        let mut generated = Vec::new();
        let mut remaining = Vec::new();

        for mut deferred in std::mem::take(&mut table.deferred) {
            if !deferred.missing.contains(&name.to_string()) {
                remaining.push(deferred);
                continue;
            }

            let still_missing: Vec<String> = find_references(&deferred.template)
                .into_iter()
                .filter(|n| !table.variables.contains_key(n))
                .collect();

            if !still_missing.is_empty() {
                deferred.missing = still_missing;
                remaining.push(deferred);
                continue;
            }

            let paths = self.expand_validated(table, &deferred.template);
            if paths.is_empty() {
                // All variables known but expansion failed (depth
                // ceiling or validation); keep waiting for new values.
                deferred.missing = find_references(&deferred.template);
                remaining.push(deferred);
                continue;
            }

            debug!(
                template = deferred.template.as_str(),
                count = paths.len(),
                "Deferred template resolved"
            );
            for path in paths {
                generated.push(GeneratedPath {
                    path,
                    template: deferred.template.clone(),
                    template_source: deferred.discovered_in.clone(),
                });
            }
        }

        table.deferred = remaining;
        generated
    }

    fn expand_validated(&self, table: &VariableTable, template: &str) -> Vec<String> {
        let lookup = |name: &str| -> Vec<String> {
            table
                .variables
                .get(name)
                .map(|vs| vs.iter().map(|v| v.value.clone()).collect())
                .unwrap_or_default()
        };
        expand_template(template, &lookup, self.max_depth)
            .into_iter()
            .filter(|p| is_valid_path(p) && looks_like_file(p))
            .collect()
    }

    /// Store a template for later; idempotent on the template string.
    fn defer(
        &self,
        table: &mut VariableTable,
        template: &str,
        missing: Vec<String>,
        discovered_in: &str,
    ) {
        if table.deferred.iter().any(|d| d.template == template) {
            return;
        }
        let priority = table.next_priority;
        table.next_priority += 1;
        debug!(template, ?missing, "Template deferred");
        table.deferred.push(DeferredTemplate {
            template: template.to_string(),
            missing,
            discovered_in: discovered_in.to_string(),
            priority,
        });
    }
}

/// Strip one level of matched quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Heuristic for values that name a command rather than a stored path:
/// extension-less entries of bin directories, unless the variable name
/// says it is a location.
fn looks_like_command(name: &str, value: &str) -> bool {
    if !BIN_DIRECTORIES.iter().any(|d| value.starts_with(d)) {
        return false;
    }
    if name.ends_with("_PATH") || name.ends_with("_DIR") || name.ends_with("_HOME") {
        return false;
    }
    let basename = value.rsplit('/').next().unwrap_or("");
    !basename.contains('.')
}
