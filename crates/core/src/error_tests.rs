// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    queue_full = { Error::QueueFull { max: 100 }, "100" },
    not_found = { Error::ActionNotFound("a-123".into()), "a-123" },
    bad_operation = { Error::InvalidOperation("merge".into()), "merge" },
    bad_resource = { Error::InvalidResourceType("quiz".into()), "study_session" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn circuit_open_display_names_breaker() {
    let err = Error::CircuitOpen {
        name: "backend".into(),
        retry_in_ms: 1500,
    };
    let msg = err.to_string();
    assert!(msg.contains("backend"));
    assert!(msg.contains("1500ms"));
}

#[test]
fn invalid_cancellation_carries_hint() {
    let err = Error::InvalidCancellation {
        id: "a-1".into(),
        status: "syncing".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("syncing"));
    assert!(msg.contains("hint:"));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
