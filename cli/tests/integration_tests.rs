//! Integration tests driving the compiled `tasklog` binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("tasklog_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn db(&self) -> PathBuf {
        self.path.join("tasklog.db")
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs the binary with `--db` pointing into the temp dir.
fn tasklog(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklog"))
        .arg("--db")
        .arg(dir.db())
        .args(args)
        .output()
        .expect("failed to run tasklog")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn migrate(dir: &TempDir) {
    let out = tasklog(dir, &["migrate"]);
    assert!(out.status.success(), "migrate failed: {}", stderr(&out));
}

#[test]
fn test_migrate_latest_applies_and_is_idempotent() {
    let dir = TempDir::new("migrate_idempotent");

    let first = tasklog(&dir, &["migrate"]);
    assert!(first.status.success());
    let text = stdout(&first);
    assert!(text.contains("migration 'create_todos_table' applied"));
    assert!(text.contains("migration 'add_metadata_to_todos' applied"));

    let second = tasklog(&dir, &["migrate", "latest"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("Nothing pending"));
}

#[test]
fn test_migrate_status_reports_applied_and_pending() {
    let dir = TempDir::new("migrate_status");

    let before = tasklog(&dir, &["migrate", "status"]);
    assert!(before.status.success());
    let text = stdout(&before);
    assert!(text.contains("Applied migrations: 0"));
    assert!(text.contains("Pending migrations: 2"));

    migrate(&dir);
    let after = tasklog(&dir, &["migrate", "status"]);
    let text = stdout(&after);
    assert!(text.contains("Applied migrations: 2"));
    assert!(text.contains("Pending migrations: 0"));
}

#[test]
fn test_migrate_down_reverts_one_step() {
    let dir = TempDir::new("migrate_down");
    migrate(&dir);

    let down = tasklog(&dir, &["migrate", "down"]);
    assert!(down.status.success());
    assert!(stdout(&down).contains("migration 'add_metadata_to_todos' reverted"));

    let up = tasklog(&dir, &["migrate", "up"]);
    assert!(up.status.success());
    assert!(stdout(&up).contains("migration 'add_metadata_to_todos' applied"));
}

#[test]
fn test_add_and_list_round_trip() {
    let dir = TempDir::new("add_list");
    migrate(&dir);

    let added = tasklog(
        &dir,
        &["add", "buy milk", "--metadata", "priority:high,store:corner"],
    );
    assert!(added.status.success());
    let text = stdout(&added);
    assert!(text.contains("Added todo 1: buy milk"));
    assert!(text.contains("  priority: high"));
    assert!(text.contains("  store: corner"));

    let listed = tasklog(&dir, &["list"]);
    assert!(listed.status.success());
    let text = stdout(&listed);
    assert!(text.contains("[ ] 1: buy milk"));
    assert!(text.contains("  priority: high"));
}

#[test]
fn test_list_on_empty_table_succeeds_with_notice() {
    let dir = TempDir::new("list_empty");
    migrate(&dir);

    let listed = tasklog(&dir, &["list"]);
    assert!(listed.status.success());
    assert!(stdout(&listed).contains("No todos found."));
}

#[test]
fn test_show_complete_delete_flow() {
    let dir = TempDir::new("show_complete_delete");
    migrate(&dir);
    tasklog(&dir, &["add", "write tests"]);

    let shown = tasklog(&dir, &["show", "1"]);
    assert!(shown.status.success());
    let text = stdout(&shown);
    assert!(text.contains("Task: write tests"));
    assert!(text.contains("Completed: no"));
    assert!(text.contains("Metadata: (none)"));

    let completed = tasklog(&dir, &["complete", "1"]);
    assert!(completed.status.success());
    assert!(stdout(&completed).contains("Marked todo 1 as complete"));
    assert!(stdout(&tasklog(&dir, &["show", "1"])).contains("Completed: yes"));
    assert!(stdout(&tasklog(&dir, &["list"])).contains("[X] 1: write tests"));

    let deleted = tasklog(&dir, &["delete", "1"]);
    assert!(deleted.status.success());

    let gone = tasklog(&dir, &["show", "1"]);
    assert!(!gone.status.success());
    assert!(stderr(&gone).contains("not found"));
}

#[test]
fn test_not_found_exits_nonzero() {
    let dir = TempDir::new("not_found");
    migrate(&dir);

    for args in [
        ["show", "42"],
        ["complete", "42"],
        ["delete", "42"],
    ] {
        let out = tasklog(&dir, &args);
        assert_eq!(out.status.code(), Some(1), "args: {args:?}");
        assert!(stderr(&out).contains("todo with id 42 not found"));
    }
}

#[test]
fn test_add_rejects_blank_task() {
    let dir = TempDir::new("blank_task");
    migrate(&dir);

    let out = tasklog(&dir, &["add", "   "]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("task must not be empty"));
}

#[test]
fn test_env_var_selects_database() {
    let dir = TempDir::new("env_var");
    let db = dir.db();

    let out = Command::new(env!("CARGO_BIN_EXE_tasklog"))
        .env("TASKLOG_DB", &db)
        .args(["migrate", "status"])
        .output()
        .expect("failed to run tasklog");
    assert!(out.status.success());
    assert!(db.exists(), "database file should be created at env path");
}
