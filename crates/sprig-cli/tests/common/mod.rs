//! Runs the `sprig` binary with a pinned environment.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Identity, dates and config locations fixed so output is deterministic.
fn pin_env(cmd: &mut Command, home: &Path, time: i64) {
    let date = format!("{time} +0000");
    cmd.env("GIT_AUTHOR_NAME", "Test Author")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_NAME", "Test Committer")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_DATE", &date)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("HOME", home)
        .env("SPRIG_LOG", "off")
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .env_remove("GIT_INDEX_FILE")
        .env_remove("GIT_CONFIG_COUNT");
}

fn output(mut cmd: Command) -> CommandResult {
    let output = cmd.output().expect("failed to run sprig");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

/// Run sprig in `dir` with commits dated 1234567890.
pub fn sprig(dir: &Path, args: &[&str]) -> CommandResult {
    sprig_at(dir, args, 1_234_567_890)
}

/// Run sprig in `dir` with commits dated `time`.
pub fn sprig_at(dir: &Path, args: &[&str], time: i64) -> CommandResult {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sprig"));
    cmd.args(args).current_dir(dir);
    pin_env(&mut cmd, dir.parent().unwrap_or(dir), time);
    output(cmd)
}

/// Run sprig with no identity in the environment.
pub fn sprig_anonymous(dir: &Path, home: &Path, args: &[&str]) -> CommandResult {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sprig"));
    cmd.args(args).current_dir(dir);
    pin_env(&mut cmd, home, 1_234_567_890);
    for var in [
        "GIT_AUTHOR_NAME",
        "GIT_AUTHOR_EMAIL",
        "GIT_COMMITTER_NAME",
        "GIT_COMMITTER_EMAIL",
    ] {
        cmd.env_remove(var);
    }
    output(cmd)
}

/// Run sprig, asserting success, and return stdout.
pub fn ok(dir: &Path, args: &[&str]) -> String {
    let result = sprig(dir, args);
    assert_eq!(
        result.exit_code, 0,
        "sprig {args:?} failed\nstdout: {}\nstderr: {}",
        result.stdout, result.stderr
    );
    result.stdout
}

pub fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// A fresh repository in a temp dir nested one level down, so HOME (the
/// parent) holds no config of its own.
pub fn init_repo() -> (tempfile::TempDir, std::path::PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("repo");
    std::fs::create_dir(&dir).unwrap();
    ok(&dir, &["init", "-q"]);
    (root, dir)
}
