//! Shared helpers for tests that drive the `git-remote-run` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Tests that need a real git return early when it is not installed.
pub fn skip_if_no_git() -> bool {
    let found = Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);

    if !found {
        eprintln!("git not found, skipping");
    }

    !found
}

/// A scratch directory holding a bare repository to use as the remote.
pub struct TestRemote {
    pub dir: TempDir,
    pub repo: PathBuf,
}

impl TestRemote {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("remote.git");

        let status = Command::new("git")
            .args(["init", "--bare", "-q"])
            .arg(&repo)
            .status()
            .unwrap();
        assert!(status.success(), "git init --bare failed");

        TestRemote { dir, repo }
    }

    pub fn url(&self) -> &str {
        self.repo.to_str().unwrap()
    }
}

pub fn git_remote_run() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_git-remote-run"));
    command.env("RUST_LOG", "off");
    command
}

pub fn run(args: &[&str]) -> Output {
    git_remote_run().args(args).output().unwrap()
}

/// Runs with a PATH where no git can be found.
pub fn run_without_git(args: &[&str]) -> Output {
    let empty = tempfile::tempdir().unwrap();
    git_remote_run()
        .env("PATH", empty.path())
        .args(args)
        .output()
        .unwrap()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Whether `pid` is a live process. Zombies waiting to be reaped by init do
/// not count.
#[cfg(unix)]
pub fn is_running(pid: libc::pid_t) -> bool {
    if cfg!(target_os = "linux") {
        return match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            // The state follows the parenthesised command name.
            Ok(stat) => stat
                .rsplit_once(") ")
                .map(|(_, rest)| !rest.starts_with('Z'))
                .unwrap_or(false),
            Err(_) => false,
        };
    }

    unsafe { libc::kill(pid, 0) == 0 }
}
