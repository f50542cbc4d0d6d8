use clap::Parser;
use colored::Colorize;
use fs_recon::{
    Cli, Command, JsonFileStore, LocalBridge, Orchestrator, ReconConfig, ReconError, Result,
    ScanReporter, SessionStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "fs_recon=debug" } else { "fs_recon=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<ReconConfig> {
    match path {
        Some(path) => ReconConfig::from_file(&path),
        None => Ok(ReconConfig::default()),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = Arc::new(JsonFileStore::new(&cli.store_dir)?);

    match cli.command {
        Command::Scan {
            root,
            config,
            max_files,
        } => {
            let config = load_config(config)?;
            let bridge = Arc::new(LocalBridge::new(root));
            let mut orchestrator = Orchestrator::new(config, bridge, store)?;
            if let Some(limit) = max_files {
                orchestrator = orchestrator.with_max_files(limit);
            }
            orchestrator.start().await?;
            report(&orchestrator, cli.verbose);
            Ok(())
        }

        Command::Resume {
            session_id,
            root,
            config,
        } => {
            let config = load_config(config)?;
            let bridge = Arc::new(LocalBridge::new(root));
            let mut orchestrator = Orchestrator::new(config, bridge, store)?;
            orchestrator.resume(&session_id).await?;
            report(&orchestrator, cli.verbose);
            Ok(())
        }

        Command::Sessions => {
            let sessions = store.list().await?;
            if sessions.is_empty() {
                println!("no stored sessions");
                return Ok(());
            }
            for meta in sessions {
                println!(
                    "{}  {}  started {}  scanned {}/{}",
                    meta.id,
                    meta.status,
                    meta.started_at.format("%Y-%m-%d %H:%M:%S"),
                    meta.stats.scanned,
                    meta.stats.total
                );
            }
            Ok(())
        }

        Command::Export { session_id, output } => {
            let session = store.load(&session_id).await?;
            let json = session.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).map_err(|e| ReconError::io(&path, e))?;
                    println!("exported {session_id} to {}", path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }

        Command::Delete { session_id } => {
            store.delete(&session_id).await?;
            println!("deleted session {session_id}");
            Ok(())
        }
    }
}

fn report(orchestrator: &Orchestrator, verbose: bool) {
    if let Some(session) = orchestrator.session() {
        print!("{}", ScanReporter::new(verbose).render(session));
    }
}
