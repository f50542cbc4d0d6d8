pub mod bridge;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod failure;
pub mod orchestrator;
pub mod report;
pub mod session;
pub mod store;
pub mod vars;

pub use bridge::{BridgeError, LocalBridge, RemoteBridge, RemoteScanner, ScanOutcome};
pub use cli::{Cli, Command};
pub use config::ReconConfig;
pub use error::{ReconError, Result};
pub use orchestrator::{EventSender, Orchestrator, ScanControl, ScanEvent};
pub use report::ScanReporter;
pub use session::{DiscoveryMethod, FileRecord, ScanStatus, Session, SessionStatus};
pub use store::{JsonFileStore, SaveAction, SessionMeta, SessionStore, SnapshotPayload, Snapshotter};
