//! Shell-variable tracking and `${VAR}` template resolution.

mod resolver;
mod template;

pub use resolver::{GeneratedPath, ProcessOutcome, VariableResolver};
pub use template::{expand_template, find_references, has_references, substitute};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How a variable value was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableConfidence {
    /// From an assignment statement.
    Explicit,
    /// Inferred from an equality test (`[ "$VAR" == "value" ]`).
    Conditional,
}

/// One discovered value of a shell variable.
///
/// A name can hold several values: conflicting definitions across files
/// are preserved, never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableValue {
    pub name: String,
    pub value: String,
    /// The file the definition was found in.
    pub discovered_in: String,
    pub confidence: VariableConfidence,
}

/// A path template waiting for variables that are not yet known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredTemplate {
    pub template: String,
    /// Names absent from the variable table at deferral time.
    pub missing: Vec<String>,
    /// The file the template was discovered in.
    pub discovered_in: String,
    /// Insertion order.
    pub priority: usize,
}

/// Per-session variable state: discovered values plus templates still
/// waiting on them. Lives inside the session so it persists and resumes
/// with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableTable {
    pub variables: FxHashMap<String, Vec<VariableValue>>,
    pub deferred: Vec<DeferredTemplate>,
    pub(crate) next_priority: usize,
}

impl VariableTable {
    /// Total number of recorded values across all names.
    pub fn value_count(&self) -> usize {
        self.variables.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_serde_roundtrip() {
        let mut table = VariableTable::default();
        table.variables.insert(
            "A".to_string(),
            vec![VariableValue {
                name: "A".to_string(),
                value: "/foo".to_string(),
                discovered_in: "/etc/profile".to_string(),
                confidence: VariableConfidence::Explicit,
            }],
        );
        table.deferred.push(DeferredTemplate {
            template: "${B}/x".to_string(),
            missing: vec!["B".to_string()],
            discovered_in: "/etc/profile".to_string(),
            priority: 0,
        });

        let json = serde_json::to_string(&table).unwrap();
        let back: VariableTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value_count(), 1);
        assert_eq!(back.deferred.len(), 1);
        assert_eq!(back.deferred[0].template, "${B}/x");
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        let json = serde_json::to_string(&VariableConfidence::Conditional).unwrap();
        assert_eq!(json, r#""conditional""#);
    }
}
