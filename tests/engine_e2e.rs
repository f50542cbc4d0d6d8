//! End-to-end engine tests: orchestrator + local bridge + JSON store.

use async_trait::async_trait;
use fs_recon::{
    BridgeError, DiscoveryMethod, JsonFileStore, LocalBridge, Orchestrator, ReconConfig,
    RemoteBridge, ScanStatus, SessionStatus, SessionStore,
};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn write_fixture(root: &Path) {
    fs::create_dir_all(root.join("etc")).unwrap();
    fs::create_dir_all(root.join("basic/3rd_ini/common")).unwrap();
    fs::create_dir_all(root.join("var/log/app")).unwrap();
    fs::create_dir_all(root.join("lib")).unwrap();

    fs::write(
        root.join("etc/profile"),
        "export LINUX_BASIC_PATH=/basic\n\
         export APP_LOG=/var/log/app/app.log\n\
         . /basic/app_env.sh\n\
         source ${LINUX_BASIC_PATH}/3rd_ini/${INI_3RD}/global_env_setup.ini\n\
         cat /lib/libapp.so\n",
    )
    .unwrap();
    fs::write(
        root.join("basic/app_env.sh"),
        "if [ \"$INI_3RD\" == \"common\" ]; then\n\
         \x20 export APP_MODE=common\n\
         fi\n\
         cat ${APP_LOG}\n",
    )
    .unwrap();
    fs::write(
        root.join("basic/3rd_ini/common/global_env_setup.ini"),
        "[env]\nloaded=1\nsee /etc/missing.conf\n",
    )
    .unwrap();
    fs::write(root.join("var/log/app/app.log"), "started ok\n").unwrap();
    fs::write(root.join("lib/libapp.so"), b"ELF\0\0\0payload\0".as_slice()).unwrap();
}

fn small_config() -> ReconConfig {
    ReconConfig {
        batch_delay_ms: 0,
        read_timeout_ms: 2_000,
        snapshot_interval: 2,
        bootstrap_paths: vec!["/etc/profile".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_profile_chain_end_to_end() {
    let fixture = tempfile::tempdir().unwrap();
    write_fixture(fixture.path());
    let store_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(store_dir.path()).unwrap());

    let bridge = Arc::new(LocalBridge::new(fixture.path()));
    let mut orchestrator = Orchestrator::new(small_config(), bridge, store.clone()).unwrap();
    orchestrator.start().await.unwrap();

    let session = orchestrator.session().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.queue.is_empty());

    // The sourced script was discovered literally
    let app_env = &session.results["/basic/app_env.sh"];
    assert_eq!(app_env.status, ScanStatus::Success);
    assert_eq!(app_env.discovery_method, DiscoveryMethod::Extracted);
    assert_eq!(app_env.discovered_from.as_deref(), Some("/etc/profile"));

    // The ini is reachable only via the two-variable template:
    // LINUX_BASIC_PATH from /etc/profile, INI_3RD from the conditional
    // in app_env.sh. Provenance names the template's source file.
    let ini = &session.results["/basic/3rd_ini/common/global_env_setup.ini"];
    assert_eq!(ini.status, ScanStatus::Success);
    assert_eq!(ini.discovery_method, DiscoveryMethod::Generated);
    assert_eq!(ini.discovered_from.as_deref(), Some("/etc/profile"));

    // The export's literal value was queued at profile scan time, so
    // the later ${APP_LOG} expansion finds it already known
    let log = &session.results["/var/log/app/app.log"];
    assert_eq!(log.discovery_method, DiscoveryMethod::Extracted);
    assert_eq!(log.discovered_from.as_deref(), Some("/etc/profile"));
    assert!(session.results["/basic/app_env.sh"]
        .ignored_paths
        .contains(&"/var/log/app/app.log".to_string()));

    // Missing references end as not-found, not errors
    assert_eq!(
        session.results["/etc/missing.conf"].status,
        ScanStatus::NotFound
    );

    // NUL-laden content classified binary
    let lib = &session.results["/lib/libapp.so"];
    assert!(lib.is_binary);

    // Variable state survived the whole run
    assert!(session.vars.variables.contains_key("LINUX_BASIC_PATH"));
    assert!(session.vars.variables.contains_key("INI_3RD"));
    assert!(session.vars.deferred.is_empty());

    // The stored document matches the in-memory session, except binary
    // content is stripped
    let stored = store.load(&session.id).await.unwrap();
    assert_eq!(stored.stats.scanned, session.stats.scanned);
    assert_eq!(stored.results.len(), session.results.len());
    assert!(stored.results["/lib/libapp.so"].content.is_none());
    assert!(stored.results["/etc/profile"].content.is_some());
}

#[tokio::test]
async fn test_discovery_is_idempotent_across_files() {
    let fixture = tempfile::tempdir().unwrap();
    fs::create_dir_all(fixture.path().join("etc")).unwrap();
    fs::write(
        fixture.path().join("etc/profile"),
        ". /etc/first.sh\n. /etc/second.sh\n",
    )
    .unwrap();
    // Both scripts reference the same file
    fs::write(fixture.path().join("etc/first.sh"), "cat /etc/shared.conf\n").unwrap();
    fs::write(fixture.path().join("etc/second.sh"), "cat /etc/shared.conf\n").unwrap();
    fs::write(fixture.path().join("etc/shared.conf"), "shared=1\n").unwrap();

    let store_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(store_dir.path()).unwrap());
    let mut orchestrator = Orchestrator::new(
        small_config(),
        Arc::new(LocalBridge::new(fixture.path())),
        store,
    )
    .unwrap();
    orchestrator.start().await.unwrap();

    let session = orchestrator.session().unwrap();
    // profile + two scripts + shared.conf, each exactly once
    assert_eq!(session.stats.total, 4);
    assert_eq!(session.stats.scanned, 4);
    let mentions: usize = session
        .results
        .values()
        .map(|r| {
            r.extracted_paths
                .iter()
                .filter(|p| *p == "/etc/shared.conf")
                .count()
        })
        .sum();
    assert_eq!(mentions, 1);
}

/// A bridge that refuses every read until `healthy` is flipped.
struct FlakyBridge {
    inner: LocalBridge,
    healthy: Arc<AtomicBool>,
}

#[async_trait]
impl RemoteBridge for FlakyBridge {
    async fn read_file(&self, path: &str) -> Result<Option<String>, BridgeError> {
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport("connection refused".to_string()));
        }
        self.inner.read_file(path).await
    }
}

#[tokio::test]
async fn test_auto_pause_then_resume_retries_transient() {
    let fixture = tempfile::tempdir().unwrap();
    write_fixture(fixture.path());
    let store_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(store_dir.path()).unwrap());
    let healthy = Arc::new(AtomicBool::new(false));

    let bridge = Arc::new(FlakyBridge {
        inner: LocalBridge::new(fixture.path()),
        healthy: healthy.clone(),
    });
    let mut orchestrator =
        Orchestrator::new(small_config(), bridge.clone(), store.clone()).unwrap();
    orchestrator.start().await.unwrap();

    let session_id = {
        let session = orchestrator.session().unwrap();
        assert_eq!(session.status, SessionStatus::Paused);
        assert_eq!(session.stats.scanned, 0);
        assert_eq!(session.queue[0], "/etc/profile");
        session.id.clone()
    };

    // The paused state survived persistence
    let stored = store.load(&session_id).await.unwrap();
    assert_eq!(stored.status, SessionStatus::Paused);
    assert!(stored.queue.contains(&"/etc/profile".to_string()));

    // Transport recovers; a fresh orchestrator resumes the session
    healthy.store(true, Ordering::SeqCst);
    let mut orchestrator = Orchestrator::new(small_config(), bridge, store.clone()).unwrap();
    orchestrator.resume(&session_id).await.unwrap();

    let session = orchestrator.session().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.run_id, 2);
    assert_eq!(session.results["/etc/profile"].status, ScanStatus::Success);
    // Discovery continued past the retried path
    assert!(session.results.contains_key("/basic/app_env.sh"));

    let stored = store.load(&session_id).await.unwrap();
    assert_eq!(stored.status, SessionStatus::Completed);
    assert_eq!(stored.run_id, 2);
}

#[tokio::test]
async fn test_export_roundtrip_through_store() {
    let fixture = tempfile::tempdir().unwrap();
    write_fixture(fixture.path());
    let store_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(store_dir.path()).unwrap());

    let mut orchestrator = Orchestrator::new(
        small_config(),
        Arc::new(LocalBridge::new(fixture.path())),
        store.clone(),
    )
    .unwrap();
    orchestrator.start().await.unwrap();
    let session_id = orchestrator.session().unwrap().id.clone();

    let exported = store.load(&session_id).await.unwrap().export_json().unwrap();
    let parsed: fs_recon::Session = serde_json::from_str(&exported).unwrap();
    assert_eq!(parsed.id, session_id);
    assert_eq!(parsed.status, SessionStatus::Completed);
    assert!(parsed.vars.variables.contains_key("INI_3RD"));
}
