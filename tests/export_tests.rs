use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{TestEnv, add_closed};

fn seeded() -> TestEnv {
    let env = TestEnv::new();
    env.init();
    add_closed(&env, "univ", "2024-01-15T09:00:00Z", "2024-01-15T10:00:00Z");
    add_closed(&env, "intern", "2024-02-03T09:00:00Z", "2024-02-03T17:00:00Z");
    add_closed(&env, "meal", "2024-02-03T12:00:00Z", "2024-02-03T12:45:00Z");
    env
}

#[test]
fn test_export_json_with_range() {
    let env = seeded();
    let out = env.path("feb.json");

    env.cmd()
        .args([
            "export",
            "--format",
            "json",
            "--file",
            out.to_str().unwrap(),
            "--range",
            "2024-02",
        ])
        .assert()
        .success()
        .stdout(contains("JSON export completed"));

    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["day_key"] == "2024-02-03"));

    env.cmd()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("export"));
}

#[test]
fn test_export_csv_all() {
    let env = seeded();
    let out = env.path("all.csv");

    env.cmd()
        .args(["export", "--file", out.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&out).unwrap();
    assert!(
        content.starts_with("id,category_id,category,task_id,start,end,day_key,duration_sec,note")
    );
    assert_eq!(content.lines().count(), 4);
}

#[test]
fn test_export_refuses_overwrite_without_force() {
    let env = seeded();
    let out = env.path("exists.json");
    fs::write(&out, "keep me").unwrap();

    env.cmd()
        .args(["export", "--format", "json", "--file", out.to_str().unwrap()])
        .write_stdin("n\n")
        .assert()
        .code(1);
    assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");

    env.cmd()
        .args([
            "export",
            "--format",
            "json",
            "--file",
            out.to_str().unwrap(),
            "--force",
        ])
        .assert()
        .success();
    assert_ne!(fs::read_to_string(&out).unwrap(), "keep me");
}

#[test]
fn test_export_bad_range() {
    let env = seeded();
    env.cmd()
        .args([
            "export",
            "--file",
            env.path("x.csv").to_str().unwrap(),
            "--range",
            "2024-03:2024-01",
        ])
        .assert()
        .code(1)
        .stderr(contains("Invalid date"));
}

#[test]
fn test_backup_compressed() {
    let env = seeded();
    let dest = env.path("bak/dayclock.sqlite");

    env.cmd()
        .args(["backup", "--file", dest.to_str().unwrap(), "--compress"])
        .assert()
        .success()
        .stdout(contains("Backup created"));

    assert!(env.path("bak/dayclock.zip").exists());
    assert!(!dest.exists());
}

#[test]
fn test_db_info_and_check() {
    let env = seeded();
    env.cmd()
        .args(["db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Total logs").and(contains("Integrity check passed")));
}
