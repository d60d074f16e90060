// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `syncq list`, `show` and `status`.

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

/// Queues a mutation and returns its action id.
fn enqueue(temp: &TempDir, args: &[&str]) -> String {
    let output = syncq(temp)
        .arg("enqueue")
        .args(args)
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let action: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    action["id"].as_str().unwrap().to_string()
}

#[test]
fn empty_queue_lists_nothing() {
    let temp = TempDir::new().unwrap();
    syncq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn list_is_oldest_first() {
    let temp = TempDir::new().unwrap();
    let first = enqueue(&temp, &["create", "assignment", "-u", "ana", "-d", r#"{"title":"Essay"}"#]);
    let second = enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-1"]);

    let output = syncq(&temp).arg("list").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!("- [create assignment] (pending) {}: \"Essay\"", first)
    );
    assert_eq!(lines[1], format!("- [delete lecture] (pending) {}: l-1", second));
}

#[test]
fn list_filters_by_user_and_status() {
    let temp = TempDir::new().unwrap();
    enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-1"]);
    let ben = enqueue(&temp, &["delete", "lecture", "-u", "ben", "--id", "l-2"]);

    syncq(&temp)
        .args(["list", "-u", "ben"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&ben))
        .stdout(predicate::str::contains("l-1").not());

    syncq(&temp)
        .args(["list", "-s", "failed"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    syncq(&temp)
        .args(["list", "-s", "done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid action status: 'done'"));
}

#[test]
fn show_details() {
    let temp = TempDir::new().unwrap();
    let id = enqueue(&temp, &["batch_restore", "course", "-u", "ana", "--items", "c-1,c-2"]);

    syncq(&temp)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("[batch_restore course] {}", id)))
        .stdout(predicate::str::contains("Status: pending"))
        .stdout(predicate::str::contains("Retries: 0/3"))
        .stdout(predicate::str::contains("Items:\n  - c-1\n  - c-2"));
}

#[test]
fn show_unknown_id_fails() {
    let temp = TempDir::new().unwrap();
    syncq(&temp)
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("action not found: nope"));
}

#[test]
fn status_counts() {
    let temp = TempDir::new().unwrap();
    enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-1"]);
    enqueue(&temp, &["complete", "assignment", "-u", "ana", "--id", "a-1"]);

    syncq(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Queued: 2\n  pending: 2\n  syncing: 0\n  failed: 0\n"))
        .stdout(predicate::str::contains("Oldest pending:"));

    let output = syncq(&temp).args(["status", "-o", "json"]).output().unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["total"], 2);
    assert_eq!(status["breaker"]["name"], "backend");
    assert_eq!(status["breaker"]["state"], "closed");
}
