// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `syncq drain` against the local ledger.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn syncq(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("syncq");
    cmd.arg("--dir").arg(temp.path()).env_remove("RUST_LOG");
    cmd
}

fn enqueue(temp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = syncq(temp)
        .arg("enqueue")
        .args(args)
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn ledger_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn empty_queue_has_nothing_to_sync() {
    let temp = TempDir::new().unwrap();
    syncq(&temp)
        .arg("drain")
        .assert()
        .success()
        .stdout("Nothing to sync\n");
}

#[test]
fn create_then_dependent_complete_both_land() {
    let temp = TempDir::new().unwrap();
    let create = enqueue(
        &temp,
        &["create", "course", "-u", "ana", "-d", r#"{"name":"Algebra"}"#],
    );
    let temp_id = create["temp_id"].as_str().unwrap().to_string();
    enqueue(&temp, &["complete", "course", "-u", "ana", "--id", &temp_id]);

    syncq(&temp)
        .arg("drain")
        .assert()
        .success()
        .stdout("Synced 2, retrying 0, failed 0, deferred 0\n");

    let entries = ledger_lines(&temp.path().join("ledger.jsonl"));
    assert_eq!(entries.len(), 2);
    let server_id = entries[0]["resources"][0]["record"]["id"].as_str().unwrap();
    assert_eq!(entries[1]["resources"][0]["record"]["id"], server_id);
    assert_eq!(entries[1]["resources"][0]["completed"], true);
    assert_ne!(server_id, temp_id);

    syncq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn rejected_action_is_kept_for_retry() {
    let temp = TempDir::new().unwrap();
    let action = enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-404"]);
    let id = action["id"].as_str().unwrap();

    syncq(&temp)
        .arg("drain")
        .assert()
        .success()
        .stdout("Synced 0, retrying 1, failed 0, deferred 0\n");

    // Still inside the retry delay
    syncq(&temp)
        .arg("drain")
        .assert()
        .success()
        .stdout("Nothing to sync\n");

    syncq(&temp)
        .args(["show", id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Retries: 1/3"))
        .stdout(predicate::str::contains("Next attempt:"));
}

#[test]
fn ledger_flag_overrides_config() {
    let temp = TempDir::new().unwrap();
    let ledger = temp.path().join("elsewhere").join("l.jsonl");
    std::fs::create_dir_all(ledger.parent().unwrap()).unwrap();
    enqueue(
        &temp,
        &["create", "assignment", "-u", "ana", "-d", r#"{"title":"Essay"}"#],
    );

    syncq(&temp)
        .arg("drain")
        .arg("--ledger")
        .arg(&ledger)
        .assert()
        .success();

    assert_eq!(ledger_lines(&ledger).len(), 1);
    assert!(!temp.path().join("ledger.jsonl").exists());
}

#[test]
fn json_report() {
    let temp = TempDir::new().unwrap();
    enqueue(
        &temp,
        &["create", "assignment", "-u", "ana", "-d", r#"{"title":"Essay"}"#],
    );

    let output = syncq(&temp).args(["drain", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["attempted"], 1);
    assert_eq!(report["synced"], 1);
    assert_eq!(report["breakers"][0]["name"], "backend");
}

#[test]
fn verbose_logs_to_stderr() {
    let temp = TempDir::new().unwrap();
    enqueue(
        &temp,
        &["create", "assignment", "-u", "ana", "-d", r#"{"title":"Essay"}"#],
    );
    syncq(&temp)
        .args(["drain", "-v"])
        .assert()
        .success()
        .stdout("Synced 1, retrying 0, failed 0, deferred 0\n")
        .stderr(predicate::str::contains("drain finished"));
}
