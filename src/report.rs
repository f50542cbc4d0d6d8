//! Terminal summary of a finished (or paused) exploration run.

use crate::session::{DiscoveryMethod, ScanStatus, Session, SessionStatus};
use colored::Colorize;

pub struct ScanReporter {
    verbose: bool,
}

impl ScanReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn status_label(&self, status: SessionStatus) -> colored::ColoredString {
        let label = status.as_str();
        match status {
            SessionStatus::Completed => label.green().bold(),
            SessionStatus::Running => label.cyan(),
            SessionStatus::Paused => label.yellow().bold(),
            SessionStatus::Error => label.red().bold(),
        }
    }

    pub fn render(&self, session: &Session) -> String {
        let mut out = String::new();
        let stats = &session.stats;

        out.push_str(&format!(
            "\n{} session {} [{}]\n",
            "fs-recon".bold(),
            session.id,
            self.status_label(session.status)
        ));
        out.push_str(&format!(
            "  discovered {} paths, scanned {} ({} ok, {} failed)\n",
            stats.total,
            stats.scanned,
            stats.succeeded.to_string().green(),
            if stats.failed > 0 {
                stats.failed.to_string().red().to_string()
            } else {
                stats.failed.to_string()
            }
        ));
        out.push_str(&format!(
            "  content: {} text, {} binary\n",
            stats.text, stats.binary
        ));
        out.push_str(&format!(
            "  variables: {} values, {} templates still deferred\n",
            session.vars.value_count(),
            session.vars.deferred.len()
        ));
        if !session.queue.is_empty() {
            out.push_str(&format!(
                "  {} paths still queued (resume with `fs-recon resume {}`)\n",
                session.queue.len().to_string().yellow(),
                session.id
            ));
        }

        let generated: Vec<&str> = session
            .results
            .values()
            .filter(|r| {
                !r.placeholder
                    && r.status == ScanStatus::Success
                    && r.discovery_method == DiscoveryMethod::Generated
            })
            .map(|r| r.path.as_str())
            .collect();
        if !generated.is_empty() {
            out.push_str(&format!(
                "  {} paths reached only via variable templates\n",
                generated.len().to_string().cyan()
            ));
            if self.verbose {
                for path in &generated {
                    out.push_str(&format!("    {path}\n"));
                }
            }
        }

        if self.verbose {
            let mut failures: Vec<_> = session
                .results
                .values()
                .filter(|r| !r.placeholder && r.status != ScanStatus::Success)
                .collect();
            failures.sort_by(|a, b| a.path.cmp(&b.path));
            if !failures.is_empty() {
                out.push_str(&format!("\n  {}:\n", "failures".red()));
                for record in failures {
                    let reason = record.error.as_deref().unwrap_or("not found");
                    out.push_str(&format!("    {}: {}\n", record.path, reason));
                }
            }
        }

        out
    }
}
