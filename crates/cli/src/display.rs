// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde_json::Value;
use syncq_core::{ActionPayload, OfflineAction};

use crate::sync::{DrainReport, QueueStatus};

/// Maximum line width for wrapped error text (excluding 4-space indent).
const WRAP_WIDTH: usize = 96;

/// Fields tried, in order, when summarizing a CREATE body.
const TITLE_FIELDS: [&str; 3] = ["title", "name", "subject"];

/// Wrap text at word boundaries if it's a single line.
///
/// Multi-line text is returned as-is.
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.len() <= width {
        return content.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in content.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Short description of what an action touches.
///
/// - create: the body's title (or the temp id when it has none)
/// - update: the target and the changed fields
/// - batch: the item count
/// - everything else: the target id
pub fn action_subject(action: &OfflineAction) -> String {
    match &action.payload {
        ActionPayload::Create { data } => TITLE_FIELDS
            .iter()
            .find_map(|field| data.get(*field).and_then(Value::as_str))
            .map(|title| format!("\"{}\"", title))
            .or_else(|| action.temp_id.clone())
            .unwrap_or_default(),
        ActionPayload::Update {
            resource_id,
            updates,
        } => match updates.as_object() {
            Some(fields) if !fields.is_empty() => {
                let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
                format!("{} ({})", resource_id, keys.join(", "))
            }
            _ => resource_id.clone(),
        },
        ActionPayload::Batch { items, .. } => match items.len() {
            1 => "1 item".to_string(),
            n => format!("{} items", n),
        },
        ActionPayload::Delete { resource_id }
        | ActionPayload::Restore { resource_id }
        | ActionPayload::Complete { resource_id } => resource_id.clone(),
    }
}

/// One-line summary used by `list`.
///
/// Format: `- [create assignment] (pending) <id>: "Essay"`
pub fn format_action_line(action: &OfflineAction) -> String {
    format!(
        "- [{} {}] ({}) {}: {}",
        action.operation,
        action.resource_type,
        action.status,
        action.id,
        action_subject(action)
    )
}

/// Full multi-line view used by `show`.
pub fn format_action_details(action: &OfflineAction, now_ms: u64) -> String {
    let mut lines = vec![
        format!("[{} {}] {}", action.operation, action.resource_type, action.id),
        format!("Status: {}", action.status),
        format!("User: {}", action.user_id),
        format!(
            "Queued: {} ({} ago)",
            format_timestamp(action.timestamp),
            format_age(now_ms.saturating_sub(action.timestamp))
        ),
        format!("Retries: {}/{}", action.retry_count, action.max_retries),
    ];

    if let Some(temp_id) = &action.temp_id {
        lines.push(format!("Temp id: {}", temp_id));
    }
    if let Some(next) = action.next_attempt_at.filter(|next| *next > now_ms) {
        lines.push(format!(
            "Next attempt: {} (in {})",
            format_timestamp(next),
            format_age(next - now_ms)
        ));
    }

    match &action.payload {
        ActionPayload::Create { data } => push_json(&mut lines, "Data", data),
        ActionPayload::Update {
            resource_id,
            updates,
        } => {
            lines.push(format!("Target: {}", resource_id));
            push_json(&mut lines, "Updates", updates);
        }
        ActionPayload::Batch { items, .. } => {
            lines.push(String::new());
            lines.push("Items:".to_string());
            lines.extend(items.iter().map(|item| format!("  - {}", item)));
        }
        ActionPayload::Delete { resource_id }
        | ActionPayload::Restore { resource_id }
        | ActionPayload::Complete { resource_id } => {
            lines.push(format!("Target: {}", resource_id));
        }
    }

    if let Some(error) = &action.error {
        lines.push(String::new());
        lines.push("Last error:".to_string());
        for line in wrap_text(error, WRAP_WIDTH).lines() {
            lines.push(format!("    {}", line));
        }
    }

    lines.join("\n")
}

fn push_json(lines: &mut Vec<String>, label: &str, value: &Value) {
    lines.push(String::new());
    lines.push(format!("{}:", label));
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    lines.extend(pretty.lines().map(|line| format!("    {}", line)));
}

/// Queue summary used by `status`.
pub fn format_status(status: &QueueStatus, now_ms: u64) -> String {
    let mut lines = vec![
        format!("Queued: {}", status.total),
        format!("  pending: {}", status.pending),
        format!("  syncing: {}", status.syncing),
        format!("  failed: {}", status.failed),
    ];
    if let Some(age) = status.oldest_pending_age_ms(now_ms) {
        lines.push(format!("Oldest pending: {} ago", format_age(age)));
    }
    lines.join("\n")
}

/// One-line result of a drain.
pub fn format_drain_report(report: &DrainReport) -> String {
    if report.coalesced {
        return "Drain already running".to_string();
    }
    if report.attempted == 0 && report.deferred == 0 {
        return "Nothing to sync".to_string();
    }
    format!(
        "Synced {}, retrying {}, failed {}, deferred {}",
        report.synced, report.retried, report.failed, report.deferred
    )
}

/// Compact human duration: `just now`, `42s`, `5m`, `3h`, `2d`.
pub fn format_age(ms: u64) -> String {
    let secs = ms / 1000;
    match secs {
        0 => "just now".to_string(),
        s if s < 60 => format!("{}s", s),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}

/// UTC wall-clock rendering of an epoch-millisecond timestamp.
pub fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
