// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

/// Strip all ANSI escape sequences from a string
fn strip_ansi(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[test]
fn fg256_produces_escape_sequence() {
    assert_eq!(fg256(74), "\x1b[38;5;74m");
    assert_eq!(fg256(250), "\x1b[38;5;250m");
}

#[test]
fn wrappers_reset_after_text() {
    assert_eq!(header("Queue:"), format!("{}Queue:{}", fg256(codes::HEADER), RESET));
    assert_eq!(literal("list"), format!("{}list{}", fg256(codes::LITERAL), RESET));
    assert_eq!(context("<id>"), format!("{}<id>{}", fg256(codes::CONTEXT), RESET));
}

#[parameterized(
    two_spaces = { "cmd  desc", Some(3) },
    many_spaces = { "syncq list -u ana     List", Some(17) },
    single_space = { "syncq list", None },
    trailing_spaces = { "syncq   ", None },
    empty = { "", None },
)]
fn find_description_start_cases(line: &str, expected: Option<usize>) {
    assert_eq!(find_description_start(line), expected);
}

#[test]
fn colorize_command_keeps_text() {
    let cmd = "syncq enqueue create assignment -u ana -d '{\"a\":1}' <id>";
    assert_eq!(strip_ansi(&colorize_command(cmd)), cmd);
}

#[test]
fn colorize_command_marks_flag_values_as_context() {
    let result = colorize_command("syncq list -u ana");
    assert!(result.contains(&literal("-u")));
    assert!(result.contains(&context("ana")));
    assert!(result.contains(&literal("list")));
}

#[test]
fn colorize_command_marks_quotes_and_placeholders() {
    let result = colorize_command("syncq show <id> -d '{}'");
    assert!(result.contains(&context("<id>")));
    assert!(result.contains(&context("'{}'")));
    assert!(!result.contains(&context("show")));
}

#[test]
fn colorize_command_flag_with_equals_takes_no_value() {
    let result = colorize_command("syncq list --status=failed ana");
    assert!(result.contains(&literal("--status=failed")));
    assert!(result.contains(&literal("ana")));
}
