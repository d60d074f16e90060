// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for help output completeness.

#![allow(clippy::unwrap_used)]

use super::*;
use clap::CommandFactory;

/// Strips ANSI sequences so the assertions hold with or without color.
fn plain(s: &str) -> String {
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

/// Every visible subcommand must be listed in the custom command overview.
#[test]
fn all_subcommands_in_help() {
    let cmd = crate::Cli::command();
    let help_text = plain(&commands());

    for sub in cmd.get_subcommands() {
        if sub.is_hide_set() {
            continue;
        }
        let name = sub.get_name();
        assert!(
            help_text.contains(&format!("  {name} ")),
            "Command '{name}' not found in help output"
        );
    }
}

#[test]
fn template_keeps_clap_placeholders() {
    let template = template();
    assert!(template.contains("{usage}"));
    assert!(template.contains("{options}"));
    assert!(template.contains("{after-help}"));
    assert!(plain(&template).contains("Options:"));
}

#[test]
fn quickstart_mentions_drain() {
    assert!(plain(&quickstart()).contains("syncq drain"));
}

#[test]
fn cli_definition_is_valid() {
    crate::Cli::command().debug_assert();
}
