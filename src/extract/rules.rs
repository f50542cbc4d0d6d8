//! The declarative path-extraction rule set.
//!
//! Each rule is an independent regex applied to every text file; rules
//! are not mutually exclusive, so one line can feed several rules. A
//! captured candidate is either a literal absolute path or a
//! `${VAR}`-style template that the variable resolver takes over.

use regex::Regex;
use std::sync::LazyLock;

/// One extraction rule: a pattern whose first capture group yields a
/// candidate path or template.
#[derive(Debug)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub description: &'static str,
    pub pattern: Regex,
}

/// All generic rules, in evaluation order.
pub fn all_rules() -> &'static [ExtractionRule] {
    static RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
        vec![
            absolute_path(),
            export_assignment(),
            braced_template(),
            plain_template(),
            source_include(),
            file_test(),
            redirection(),
            tee_target(),
            file_command(),
        ]
    });
    &RULES
}

fn absolute_path() -> ExtractionRule {
    ExtractionRule {
        name: "absolute-path",
        description: "Multi-segment absolute Unix paths anywhere in the line",
        pattern: Regex::new(r#"(?:^|[\s"'`=:,(])(/[A-Za-z0-9_.+~-]+(?:/[A-Za-z0-9_.+~-]+)+)"#)
            .unwrap(),
    }
}

fn export_assignment() -> ExtractionRule {
    ExtractionRule {
        name: "export-assignment",
        description: "Values of export statements (paths and templates)",
        pattern: Regex::new(r#"\bexport\s+[A-Za-z_][A-Za-z0-9_]*=([^\s;#"']+)"#).unwrap(),
    }
}

fn braced_template() -> ExtractionRule {
    ExtractionRule {
        name: "braced-template",
        description: "${VAR}/literal-suffix path templates",
        pattern: Regex::new(r"(\$\{[A-Za-z_][A-Za-z0-9_]*\}(?:/[A-Za-z0-9_.${}-]+)+)").unwrap(),
    }
}

fn plain_template() -> ExtractionRule {
    ExtractionRule {
        name: "plain-template",
        description: "$VAR/literal-suffix path templates",
        pattern: Regex::new(r"(\$[A-Za-z_][A-Za-z0-9_]*(?:/[A-Za-z0-9_.${}-]+)+)").unwrap(),
    }
}

fn source_include() -> ExtractionRule {
    ExtractionRule {
        name: "source-include",
        description: "Arguments of source / . / include / require statements",
        pattern: Regex::new(r"(?m)^\s*(?:source|\.|include|require)\s+([^\s;#]+)").unwrap(),
    }
}

fn file_test() -> ExtractionRule {
    ExtractionRule {
        name: "file-test",
        description: "Targets of shell file-test conditions like [ -f path ]",
        pattern: Regex::new(r"\[+\s+-[bcdefgkprsuwxLS]\s+([^\s\]]+)\s*\]").unwrap(),
    }
}

fn redirection() -> ExtractionRule {
    ExtractionRule {
        name: "redirection",
        description: "Targets of >, >> and < redirections",
        pattern: Regex::new(r"(?:>>|>|<)\s*((?:/|\$)[^\s;|&)]+)").unwrap(),
    }
}

fn tee_target() -> ExtractionRule {
    ExtractionRule {
        name: "tee-target",
        description: "Targets of tee in pipelines",
        pattern: Regex::new(r"\btee\s+(?:-[A-Za-z]+\s+)*((?:/|\$)[^\s;|&]+)").unwrap(),
    }
}

fn file_command() -> ExtractionRule {
    ExtractionRule {
        name: "file-command",
        description: "First path argument of touch/rm/cat/cp/mv/ln",
        pattern: Regex::new(
            r"\b(?:touch|rm|cat|cp|mv|ln)\s+(?:-{1,2}[A-Za-z=-]+\s+)*((?:/|\$)[^\s;|&<>]+)",
        )
        .unwrap(),
    }
}
