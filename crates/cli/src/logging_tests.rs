// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    quiet_default = { false, None, "warn" },
    verbose = { true, None, "debug" },
    env_filter = { false, Some("syncq=trace"), "syncq=trace" },
    verbose_beats_env = { true, Some("error"), "debug" },
)]
fn test_filter_directive(verbose: bool, from_env: Option<&str>, expected: &str) {
    assert_eq!(
        filter_directive(verbose, from_env.map(String::from)),
        expected
    );
}

#[test]
fn test_init_twice_is_harmless() {
    init(false);
    init(true);
}
