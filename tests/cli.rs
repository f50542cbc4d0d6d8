//! Binary-level tests for the fs-recon CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn fs_recon() -> Command {
    Command::cargo_bin("fs-recon").unwrap()
}

fn write_rootfs(root: &Path) {
    fs::create_dir_all(root.join("etc")).unwrap();
    fs::create_dir_all(root.join("opt/app/conf")).unwrap();
    fs::write(
        root.join("etc/profile"),
        "export APP_HOME=/opt/app\ncat ${APP_HOME}/conf/app.ini\n",
    )
    .unwrap();
    fs::write(root.join("opt/app/conf/app.ini"), "[app]\nname=demo\n").unwrap();
    fs::write(root.join("etc/hostname"), "device01\n").unwrap();
}

fn stored_session_id(store_dir: &Path) -> String {
    let entry = fs::read_dir(store_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.path().extension().is_some_and(|x| x == "json"))
        .expect("session document written");
    entry
        .path()
        .file_stem()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_scan_reports_completed_session() {
    let rootfs = tempfile::tempdir().unwrap();
    write_rootfs(rootfs.path());
    let store = tempfile::tempdir().unwrap();

    fs_recon()
        .args(["scan", rootfs.path().to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[completed]"))
        .stdout(predicate::str::contains("variable templates"));
}

#[test]
fn test_scan_empty_root_still_succeeds() {
    let rootfs = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();

    // Every bootstrap path is missing; that is a finding, not an error
    fs_recon()
        .args(["scan", rootfs.path().to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[completed]"));
}

#[test]
fn test_sessions_lists_stored_runs() {
    let rootfs = tempfile::tempdir().unwrap();
    write_rootfs(rootfs.path());
    let store = tempfile::tempdir().unwrap();

    fs_recon()
        .args(["scan", rootfs.path().to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success();

    let session_id = stored_session_id(store.path());
    fs_recon()
        .args(["sessions", "--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(&session_id))
        .stdout(predicate::str::contains("completed"));
}

#[test]
fn test_export_prints_session_json() {
    let rootfs = tempfile::tempdir().unwrap();
    write_rootfs(rootfs.path());
    let store = tempfile::tempdir().unwrap();

    fs_recon()
        .args(["scan", rootfs.path().to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success();

    let session_id = stored_session_id(store.path());
    fs_recon()
        .args(["export", &session_id])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/profile"))
        .stdout(predicate::str::contains("\"status\""));
}

#[test]
fn test_delete_removes_session() {
    let rootfs = tempfile::tempdir().unwrap();
    write_rootfs(rootfs.path());
    let store = tempfile::tempdir().unwrap();

    fs_recon()
        .args(["scan", rootfs.path().to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success();

    let session_id = stored_session_id(store.path());
    fs_recon()
        .args(["delete", &session_id])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));

    fs_recon()
        .args(["sessions", "--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("no stored sessions"));
}

#[test]
fn test_resume_unknown_session_fails() {
    let rootfs = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();

    fs_recon()
        .args(["resume", "no-such-id", rootfs.path().to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session not found"));
}

#[test]
fn test_max_files_pauses_and_resume_finishes() {
    let rootfs = tempfile::tempdir().unwrap();
    write_rootfs(rootfs.path());
    let store = tempfile::tempdir().unwrap();

    fs_recon()
        .args(["scan", rootfs.path().to_str().unwrap(), "--max-files", "1"])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[paused]"))
        .stdout(predicate::str::contains("still queued"));

    let session_id = stored_session_id(store.path());
    fs_recon()
        .args(["resume", &session_id, rootfs.path().to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[completed]"));
}

#[test]
fn test_invalid_config_rejected() {
    let rootfs = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    let config = store.path().join("bad.json");
    fs::write(&config, r#"{"batch_size": 0}"#).unwrap();

    fs_recon()
        .args(["scan", rootfs.path().to_str().unwrap()])
        .args(["--config", config.to_str().unwrap()])
        .args(["--store-dir", store.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch_size"));
}
