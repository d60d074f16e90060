// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `syncq cancel`, `retry` and `clear`.

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

/// Queues a delete of a resource the ledger has never seen, with a single
/// attempt, and drains so it ends up failed.
fn failed_action(temp: &TempDir) -> String {
    let id = enqueue(
        temp,
        &["delete", "lecture", "-u", "ana", "--id", "l-404", "--max-retries", "1"],
    );
    syncq(temp)
        .arg("drain")
        .assert()
        .success()
        .stdout("Synced 0, retrying 0, failed 1, deferred 0\n");
    id
}

#[test]
fn cancel_removes_actions() {
    let temp = TempDir::new().unwrap();
    let a = enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-1"]);
    let b = enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-2"]);

    syncq(&temp)
        .args(["cancel", &a, &b])
        .assert()
        .success()
        .stdout(format!("Cancelled {}\nCancelled {}\n", a, b));

    syncq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn cancel_unknown_fails() {
    let temp = TempDir::new().unwrap();
    syncq(&temp)
        .args(["cancel", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("action not found: nope"));
}

#[test]
fn failed_action_can_be_retried_or_cancelled() {
    let temp = TempDir::new().unwrap();
    let id = failed_action(&temp);

    syncq(&temp)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: failed"))
        .stdout(predicate::str::contains("Last error:"));

    syncq(&temp)
        .args(["retry", &id])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("Re-armed {}", id)));

    syncq(&temp)
        .args(["list", "-s", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id));

    syncq(&temp)
        .args(["cancel", &id])
        .assert()
        .success();
}

#[test]
fn retry_of_pending_action_fails() {
    let temp = TempDir::new().unwrap();
    let id = enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-1"]);
    syncq(&temp)
        .args(["retry", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot go from pending to pending"));
}

#[test]
fn clear_drops_only_that_user() {
    let temp = TempDir::new().unwrap();
    enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-1"]);
    enqueue(&temp, &["delete", "lecture", "-u", "ana", "--id", "l-2"]);
    let ben = enqueue(&temp, &["delete", "lecture", "-u", "ben", "--id", "l-3"]);

    syncq(&temp)
        .args(["clear", "-u", "ana"])
        .assert()
        .success()
        .stdout("Cleared 2 actions of ana\n");

    syncq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(&ben))
        .stdout(predicate::str::contains("ana").not());
}
