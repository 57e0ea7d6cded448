#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated home for one test: config dir, database and cache all live in a
/// temp dir removed on drop. Day keys are computed in UTC.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("dayclock.conf"), "utc_offset: \"+00:00\"\n").expect("conf");
        Self { dir }
    }

    pub fn db_path(&self) -> String {
        self.dir.path().join("test.sqlite").to_string_lossy().to_string()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// `dayclock --db <tmp> ...`
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("dayclock");
        cmd.env("DAYCLOCK_HOME", self.dir.path())
            .env("DAYCLOCK_LOG", "off")
            .args(["--db", &self.db_path()]);
        cmd
    }

    pub fn init(&self) {
        self.cmd().args(["--test", "init"]).assert().success();
    }

    /// Every log as parsed from `list --json`.
    pub fn logs(&self) -> Vec<serde_json::Value> {
        let out = self.cmd().args(["list", "--json"]).output().expect("list");
        assert!(out.status.success(), "list failed: {out:?}");
        serde_json::from_slice(&out.stdout).expect("list --json output")
    }
}

/// Insert a closed log through the CLI.
pub fn add_closed(env: &TestEnv, category: &str, start: &str, end: &str) {
    env.cmd()
        .args(["add", category, "--start", start, "--end", end])
        .assert()
        .success();
}
