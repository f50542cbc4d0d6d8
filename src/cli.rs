use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fs-recon",
    version,
    about = "Content-driven filesystem exploration for firmware images and rootfs dumps",
    long_about = "fs-recon reads a small set of well-known files, mines their content for \
                  further paths (literal references, sourced scripts, shell-variable \
                  templates), and keeps scanning until the discovery queue drains."
)]
pub struct Cli {
    /// Directory holding session documents
    #[arg(long, default_value = ".fs-recon", global = true)]
    pub store_dir: PathBuf,

    /// Verbose output (debug logging, per-path report detail)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Explore a local directory standing in for the device filesystem
    Scan {
        /// Root of the extracted image / mounted dump
        root: PathBuf,

        /// JSON config file overriding the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pause the scan after this many files
        #[arg(long)]
        max_files: Option<usize>,
    },

    /// Resume a paused session against the same filesystem root
    Resume {
        session_id: String,

        /// Root of the extracted image / mounted dump
        root: PathBuf,

        /// JSON config file overriding the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List stored sessions
    Sessions,

    /// Export a session document as JSON
    Export {
        session_id: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a stored session
    Delete { session_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["fs-recon", "scan", "./rootfs"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Command::Scan { root, config, max_files } => {
                assert_eq!(root, PathBuf::from("./rootfs"));
                assert!(config.is_none());
                assert!(max_files.is_none());
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_parse_scan_with_options() {
        let cli = Cli::try_parse_from([
            "fs-recon",
            "scan",
            "./rootfs",
            "--max-files",
            "100",
            "--config",
            "custom.json",
        ])
        .unwrap();
        match cli.command {
            Command::Scan { max_files, config, .. } => {
                assert_eq!(max_files, Some(100));
                assert_eq!(config, Some(PathBuf::from("custom.json")));
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_parse_resume() {
        let cli = Cli::try_parse_from(["fs-recon", "resume", "abc-123", "./rootfs"]).unwrap();
        match cli.command {
            Command::Resume { session_id, root, .. } => {
                assert_eq!(session_id, "abc-123");
                assert_eq!(root, PathBuf::from("./rootfs"));
            }
            _ => panic!("expected resume"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fs-recon", "sessions", "--store-dir", "/tmp/s", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.store_dir, PathBuf::from("/tmp/s"));
    }

    #[test]
    fn test_export_default_stdout() {
        let cli = Cli::try_parse_from(["fs-recon", "export", "abc-123"]).unwrap();
        match cli.command {
            Command::Export { output, .. } => assert!(output.is_none()),
            _ => panic!("expected export"),
        }
    }
}
