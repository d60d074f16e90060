// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::path::PathBuf;

use super::*;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn test_cancel_many() {
    let cli = parse(&["syncq", "cancel", "a", "b"]).unwrap();
    match cli.command {
        Command::Cancel { ids } => assert_eq!(ids, vec!["a", "b"]),
        _ => panic!("Expected Cancel command"),
    }
}

#[test]
fn test_retry_one() {
    let cli = parse(&["syncq", "retry", "a"]).unwrap();
    match cli.command {
        Command::Retry { ids } => assert_eq!(ids, vec!["a"]),
        _ => panic!("Expected Retry command"),
    }
}

#[parameterized(
    cancel = { "cancel" },
    retry = { "retry" },
)]
fn test_ids_required(command: &str) {
    assert!(parse(&["syncq", command]).is_err());
}

#[test]
fn test_clear_requires_user() {
    assert!(parse(&["syncq", "clear"]).is_err());
    let cli = parse(&["syncq", "clear", "-u", "ana"]).unwrap();
    match cli.command {
        Command::Clear { user } => assert_eq!(user, "ana"),
        _ => panic!("Expected Clear command"),
    }
}

#[test]
fn test_drain_ledger_override() {
    let cli = parse(&["syncq", "drain"]).unwrap();
    match cli.command {
        Command::Drain { ledger, output } => {
            assert!(ledger.is_none());
            assert_eq!(output, OutputFormat::Text);
        }
        _ => panic!("Expected Drain command"),
    }

    let cli = parse(&["syncq", "drain", "--ledger", "/tmp/l.jsonl", "-o", "json"]).unwrap();
    match cli.command {
        Command::Drain { ledger, output } => {
            assert_eq!(ledger, Some(PathBuf::from("/tmp/l.jsonl")));
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("Expected Drain command"),
    }
}
