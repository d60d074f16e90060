// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `syncq completion`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn syncq() -> Command {
    cargo_bin_cmd!("syncq")
}

#[yare::parameterized(
    bash = { "bash" },
    zsh = { "zsh" },
    fish = { "fish" },
    powershell = { "powershell" },
    elvish = { "elvish" },
)]
fn completion_generates_non_empty_output(shell: &str) {
    let output = syncq().args(["completion", shell]).output().unwrap();
    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
}

#[test]
fn bash_completion_mentions_commands() {
    let output = syncq().args(["completion", "bash"]).output().unwrap();
    let script = String::from_utf8_lossy(&output.stdout);
    for command in ["enqueue", "list", "show", "status", "cancel", "retry", "clear", "drain"] {
        assert!(script.contains(command), "missing {command}");
    }
}

#[test]
fn completion_without_shell_shows_help() {
    syncq()
        .arg("completion")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn completion_invalid_shell_fails() {
    syncq()
        .args(["completion", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
