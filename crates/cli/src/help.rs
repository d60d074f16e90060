// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let header = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::HEADER))));
    let literal = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::LITERAL))));
    let context = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::CONTEXT))));

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(literal)
        .placeholder(context)
        .valid(context)
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    format!(
        "\
{header_queue}
  {enqueue}     Queue a mutation for later replay
  {list}        List queued actions
  {show}        Show one queued action
  {status}      Show queue counts
  {cancel}      Drop pending or failed action(s)
  {retry}       Re-arm failed action(s)
  {clear}       Drop a user's actions

{header_sync}
  {drain}       Replay due actions against the local ledger
  {completion}  Generate shell completions
",
        header_queue = colors::header("Queue:"),
        header_sync = colors::header("Sync:"),
        enqueue = colors::literal("enqueue"),
        list = colors::literal("list"),
        show = colors::literal("show"),
        status = colors::literal("status"),
        cancel = colors::literal("cancel"),
        retry = colors::literal("retry"),
        clear = colors::literal("clear"),
        drain = colors::literal("drain"),
        completion = colors::literal("completion"),
    )
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  syncq enqueue create assignment -u ana -d '{}'   Queue a mutation
  syncq list                                       See what is waiting
  syncq drain                                      Replay the queue
  syncq status                                     Check what is left",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
