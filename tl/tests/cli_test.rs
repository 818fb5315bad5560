//! End-to-end tests for the `tl` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated environment: store, config and log dirs all under one temp dir
struct Env {
    root: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    fn store(&self) -> std::path::PathBuf {
        self.root.path().join("store")
    }

    fn tl(&self) -> Command {
        let mut cmd = Command::cargo_bin("tl").expect("tl binary should build");
        cmd.current_dir(self.root.path())
            .env("XDG_DATA_HOME", self.root.path().join("data"))
            .env("XDG_CONFIG_HOME", self.root.path().join("config"))
            .env("NO_COLOR", "1")
            .arg("--store")
            .arg(self.store());
        cmd
    }

    fn stored_json(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.store().join("todos.json")).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

#[test]
fn test_empty_list() {
    let env = Env::new();
    env.tl()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"));

    env.tl()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet. Add one below!"));
}

#[test]
fn test_add_prepends_and_persists() {
    let env = Env::new();
    env.tl()
        .args(["add", "buy", "milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added buy milk"));
    env.tl().args(["add", "walk dog"]).assert().success();

    let stored = env.stored_json();
    let tasks = stored.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["text"], "walk dog");
    assert_eq!(tasks[1]["text"], "buy milk");
    assert_eq!(tasks[0]["completed"], false);
    assert!(tasks[0]["createdAt"].as_str().unwrap().ends_with('Z'));

    env.tl()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. [ ] walk dog"))
        .stdout(predicate::str::contains("2. [ ] buy milk"));
}

#[test]
fn test_add_whitespace_is_noop() {
    let env = Env::new();
    env.tl()
        .args(["add", "   "])
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing added"));

    assert!(!env.store().join("todos.json").exists());
}

#[test]
fn test_toggle_and_stats() {
    let env = Env::new();
    env.tl().args(["add", "one"]).assert().success();
    env.tl().args(["add", "two"]).assert().success();

    env.tl()
        .args(["toggle", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as completed"));

    env.tl()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 tasks completed"));

    let output = env.tl().args(["stats", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["active"], 1);

    // Toggle back
    env.tl().args(["toggle", "2"]).assert().success();
    assert_eq!(env.stored_json()[1]["completed"], false);
}

#[test]
fn test_list_filters_and_json() {
    let env = Env::new();
    env.tl().args(["add", "open task"]).assert().success();
    env.tl().args(["add", "done task"]).assert().success();
    env.tl().args(["toggle", "1"]).assert().success();

    env.tl()
        .args(["list", "--active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("open task"))
        .stdout(predicate::str::contains("done task").not());

    let output = env.tl().args(["list", "--completed", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["text"], "done task");
    assert_eq!(listed[0]["completed"], true);
}

#[test]
fn test_edit_by_id_prefix() {
    let env = Env::new();
    env.tl().args(["add", "draft"]).assert().success();
    let id = env.stored_json()[0]["id"].as_str().unwrap().to_string();

    env.tl()
        .args(["edit", &id[id.len() - 8..], "final", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated final version"));

    assert_eq!(env.stored_json()[0]["text"], "final version");
    assert_eq!(env.stored_json()[0]["id"], id.as_str());
}

#[test]
fn test_edit_to_blank_keeps_text() {
    let env = Env::new();
    env.tl().args(["add", "keep me"]).assert().success();

    env.tl()
        .args(["edit", "1", "  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task unchanged"));

    assert_eq!(env.stored_json()[0]["text"], "keep me");
}

#[test]
fn test_delete_and_clear_completed() {
    let env = Env::new();
    env.tl().args(["add", "a"]).assert().success();
    env.tl().args(["add", "b"]).assert().success();
    env.tl().args(["add", "c"]).assert().success();

    env.tl()
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted c"));

    env.tl().args(["toggle", "1"]).assert().success();
    env.tl()
        .arg("clear-completed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 completed task(s)"));

    let stored = env.stored_json();
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["text"], "a");

    env.tl()
        .arg("clear-completed")
        .assert()
        .success()
        .stdout(predicate::str::contains("No completed tasks"));
}

#[test]
fn test_unknown_task_fails() {
    let env = Env::new();
    env.tl().args(["add", "only"]).assert().success();

    env.tl()
        .args(["toggle", "zzzz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No task matches 'zzzz'"));

    env.tl().args(["delete", "nope"]).assert().failure();
}

#[test]
fn test_corrupt_store_is_set_aside() {
    let env = Env::new();
    std::fs::create_dir_all(env.store()).unwrap();
    std::fs::write(env.store().join("todos.json"), "{not json").unwrap();

    env.tl()
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("set aside"))
        .stdout(predicate::str::contains("No tasks yet"));

    let preserved = std::fs::read_to_string(env.store().join("todos.corrupt.json")).unwrap();
    assert_eq!(preserved, "{not json");
}

#[test]
fn test_quota_exceeded_fails_command() {
    let env = Env::new();
    let config = env.root.path().join("tl.yml");
    std::fs::write(&config, "storage:\n  quota-bytes: 10\n").unwrap();

    env.tl()
        .arg("--config")
        .arg(&config)
        .args(["add", "this will not fit in ten bytes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to save tasks"));
}

#[test]
fn test_custom_key_from_config() {
    let env = Env::new();
    let config = env.root.path().join("tl.yml");
    std::fs::write(&config, "storage:\n  key: nextjs-todos\n").unwrap();

    env.tl()
        .arg("--config")
        .arg(&config)
        .args(["add", "namespaced"])
        .assert()
        .success();

    assert!(env.store().join("nextjs-todos.json").exists());
    assert!(!env.store().join("todos.json").exists());
}

#[test]
fn test_invalid_key_in_config_fails_at_startup() {
    let env = Env::new();
    let config = env.root.path().join("tl.yml");
    std::fs::write(&config, "storage:\n  key: ../outside\n").unwrap();

    env.tl()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid storage key '../outside'"));

    assert!(!env.root.path().join("outside.json").exists());
}

#[test]
fn test_legacy_key_data_is_listed() {
    let env = Env::new();
    std::fs::create_dir_all(env.store()).unwrap();
    std::fs::write(
        env.store().join("nextjs-todos.json"),
        r#"[{"id":"1714564800000","text":"from the old app","completed":false,"createdAt":"2024-05-01T12:00:00.000Z"}]"#,
    )
    .unwrap();
    let config = env.root.path().join("tl.yml");
    std::fs::write(&config, "storage:\n  key: nextjs-todos\n").unwrap();

    env.tl()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. [ ] from the old app"));
}

#[test]
fn test_ephemeral_writes_nothing() {
    let env = Env::new();
    Command::cargo_bin("tl")
        .unwrap()
        .current_dir(env.root.path())
        .env("XDG_DATA_HOME", env.root.path().join("data"))
        .env("XDG_CONFIG_HOME", env.root.path().join("config"))
        .env("NO_COLOR", "1")
        .args(["--ephemeral", "add", "fleeting"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added fleeting"));

    assert!(!env.store().exists());
}
