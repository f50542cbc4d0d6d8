//! Template expansion: `${VAR}` / `$VAR` substitution.
//!
//! Expansion is recursive and one variable at a time: each step
//! substitutes every occurrence of a single name, then recurses on the
//! result. A variable can hold several conflicting values (discovered in
//! different files), so one template can expand to several paths. Two
//! guards stop runaway expansion: a hard depth ceiling, and abandoning
//! any branch where substitution produced no textual change.

use regex::Regex;
use std::sync::LazyLock;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Variable names referenced by a template, in order of appearance,
/// deduplicated.
pub fn find_references(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in REFERENCE.captures_iter(template) {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string());
        if let Some(name) = name {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Whether the string still contains a variable reference.
pub fn has_references(template: &str) -> bool {
    REFERENCE.is_match(template)
}

/// Substitute every occurrence of `name` in `template` with `value`.
///
/// Handles both `${NAME}` and bare `$NAME` (the latter only at a word
/// boundary, so `$ABC` never fires for name `AB`).
pub fn substitute(template: &str, name: &str, value: &str) -> String {
    let pattern = format!(
        r"\$\{{{name}\}}|\${name}\b",
        name = regex::escape(name)
    );
    // Name comes from a reference match, so the pattern is well-formed.
    let re = Regex::new(&pattern).expect("substitution pattern");
    re.replace_all(template, value).into_owned()
}

/// Expand a template against `lookup`, which maps a variable name to its
/// known values. Returns every complete, fully-literal expansion
/// (deduplicated, in discovery order); empty when a referenced name is
/// unknown or the depth ceiling is hit.
pub fn expand_template<F>(template: &str, lookup: &F, max_depth: usize) -> Vec<String>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut results = Vec::new();
    expand_step(template, lookup, max_depth, 0, &mut results);
    results
}

fn expand_step<F>(
    template: &str,
    lookup: &F,
    max_depth: usize,
    depth: usize,
    results: &mut Vec<String>,
) where
    F: Fn(&str) -> Vec<String>,
{
    if depth >= max_depth {
        return;
    }

    let references = find_references(template);
    let Some(name) = references.first() else {
        if !results.contains(&template.to_string()) {
            results.push(template.to_string());
        }
        return;
    };

    let values = lookup(name);
    if values.is_empty() {
        // Unknown variable: this branch cannot complete.
        return;
    }

    for value in values {
        let substituted = substitute(template, name, &value);
        if substituted == template {
            // No textual change means no progress; abandon the branch
            // rather than recurse forever.
            continue;
        }
        expand_step(&substituted, lookup, max_depth, depth + 1, results);
    }
}
