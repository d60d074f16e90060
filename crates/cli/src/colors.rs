// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for help output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use crate::env;

/// ANSI 256-color codes used in help output.
pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders and quoted values: medium grey
    pub const CONTEXT: u8 = 245;
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

/// Apply header color (section titles) to text.
pub fn header(text: &str) -> String {
    format!("{}{}{}", fg256(codes::HEADER), text, RESET)
}

/// Apply literal color (commands, options) to text.
pub fn literal(text: &str) -> String {
    format!("{}{}{}", fg256(codes::LITERAL), text, RESET)
}

/// Apply context color (placeholders, values) to text.
pub fn context(text: &str) -> String {
    format!("{}{}{}", fg256(codes::CONTEXT), text, RESET)
}

/// Colorize an examples help block.
///
/// Lines ending with `:` are headers. In `command  description` lines the
/// command part is colored, the description left alone.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + 256);
    for line in text.lines() {
        if !result.is_empty() {
            result.push('\n');
        }

        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if trimmed.ends_with(':') && !trimmed.contains("  ") {
            result.push_str(indent);
            result.push_str(&header(trimmed));
            continue;
        }

        if let Some(cmd_end) = find_description_start(trimmed) {
            result.push_str(indent);
            result.push_str(&colorize_command(&trimmed[..cmd_end]));
            result.push_str(&trimmed[cmd_end..]);
            continue;
        }

        result.push_str(line);
    }
    result
}

/// Colorize a command: quoted values and `<placeholders>` as context,
/// the value after a flag as context, everything else as literal.
pub fn colorize_command(cmd: &str) -> String {
    let mut result = String::with_capacity(cmd.len() + 128);
    let mut chars = cmd.char_indices();
    let mut segment_start = 0;
    let mut in_flag_value = false;

    while let Some((i, c)) = chars.next() {
        let closing = match c {
            '"' => '"',
            '\'' => '\'',
            '<' => '>',
            ' ' => {
                push_segment(&mut result, &cmd[segment_start..i], &mut in_flag_value);
                result.push(' ');
                segment_start = i + 1;
                continue;
            }
            _ => continue,
        };

        if i > segment_start {
            let before = &cmd[segment_start..i];
            result.push_str(&literal(before));
        }
        let mut end = cmd.len();
        for (j, ch) in chars.by_ref() {
            if ch == closing {
                end = j + ch.len_utf8();
                break;
            }
        }
        result.push_str(&context(&cmd[i..end]));
        in_flag_value = false;
        segment_start = end;
    }

    push_segment(&mut result, &cmd[segment_start..], &mut in_flag_value);
    result
}

fn push_segment(result: &mut String, segment: &str, in_flag_value: &mut bool) {
    if segment.is_empty() {
        return;
    }
    if *in_flag_value {
        result.push_str(&context(segment));
        *in_flag_value = false;
    } else {
        result.push_str(&literal(segment));
        if segment.starts_with('-') && !segment.contains('=') {
            *in_flag_value = true;
        }
    }
}

/// Find where the description starts (after 2+ spaces following the command).
pub fn find_description_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut space_start = None;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b' ' {
            space_start.get_or_insert(i);
        } else {
            if let Some(start) = space_start {
                if i - start >= 2 {
                    return Some(start);
                }
            }
            space_start = None;
        }
    }
    None
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
