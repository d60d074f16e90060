// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `syncq enqueue`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

fn syncq(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("syncq");
    cmd.arg("--dir").arg(temp.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn create_prints_action_and_temp_id() {
    let temp = TempDir::new().unwrap();
    syncq(&temp)
        .args(["enqueue", "create", "assignment", "-u", "ana"])
        .args(["-d", r#"{"title":"Essay"}"#])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^Queued [0-9a-f-]{36} \(temp id temp_[0-9a-f]+\)\n$").unwrap());
}

#[test]
fn json_output_is_the_stored_action() {
    let temp = TempDir::new().unwrap();
    let output = syncq(&temp)
        .args(["enqueue", "update", "lecture", "-u", "ana", "--id", "l-3"])
        .args(["-d", r#"{"room":"B2"}"#, "--max-retries", "5", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let action: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(action["operation"], "UPDATE");
    assert_eq!(action["resource_type"], "lecture");
    assert_eq!(action["status"], "pending");
    assert_eq!(action["max_retries"], 5);
    assert_eq!(action["payload"]["resource_id"], "l-3");
    assert_eq!(action["payload"]["updates"]["room"], "B2");
}

#[parameterized(
    create_without_data = { &["create", "assignment", "-u", "ana"], "--data is required for create" },
    delete_without_id = { &["delete", "course", "-u", "ana"], "--id is required for delete" },
    batch_without_items = { &["batch_delete", "course", "-u", "ana"], "--items is required for batch_delete" },
    bad_json = { &["create", "assignment", "-u", "ana", "-d", "{nope"], "invalid JSON in --data" },
    unknown_operation = { &["archive", "course", "-u", "ana"], "invalid operation: 'archive'" },
    unknown_type = { &["delete", "quiz", "-u", "ana", "--id", "q"], "invalid resource type: 'quiz'" },
)]
fn invalid_input_fails(args: &[&str], message: &str) {
    let temp = TempDir::new().unwrap();
    syncq(&temp)
        .arg("enqueue")
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
}

#[test]
fn full_queue_is_rejected_with_hint() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[queue]\nmax_queue_size = 2\n",
    )
    .unwrap();

    for id in ["c-1", "c-2"] {
        syncq(&temp)
            .args(["enqueue", "delete", "course", "-u", "ana", "--id", id])
            .assert()
            .success();
    }
    syncq(&temp)
        .args(["enqueue", "delete", "course", "-u", "ana", "--id", "c-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline queue is full (2 actions)"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn data_dir_from_environment() {
    let temp = TempDir::new().unwrap();
    cargo_bin_cmd!("syncq")
        .env("SYNCQ_DIR", temp.path())
        .args(["enqueue", "complete", "assignment", "-u", "ana", "--id", "a-17"])
        .assert()
        .success();
    assert!(temp.path().join("queue.jsonl").exists());
}
