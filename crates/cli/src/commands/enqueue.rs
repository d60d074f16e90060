// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serde_json::Value;
use syncq_core::{ActionPayload, BatchAction, Operation, ResourceType};

use crate::cli::{OutputFormat, TargetArgs};
use crate::error::{Error, Result};
use crate::sync::{EnqueueOptions, SyncManager};

use super::{emit, open_queue};

pub fn run(
    dir: Option<&Path>,
    operation: &str,
    resource_type: &str,
    user: &str,
    target: &TargetArgs,
    max_retries: Option<u32>,
    output: OutputFormat,
) -> Result<()> {
    let ctx = open_queue(dir)?;
    emit(&run_impl(
        &ctx.manager,
        operation,
        resource_type,
        user,
        target,
        max_retries,
        output,
    )?);
    Ok(())
}

/// Internal implementation that accepts a manager for testing.
pub(crate) fn run_impl(
    manager: &SyncManager,
    operation: &str,
    resource_type: &str,
    user: &str,
    target: &TargetArgs,
    max_retries: Option<u32>,
    output: OutputFormat,
) -> Result<String> {
    let operation: Operation = operation.parse()?;
    let resource_type: ResourceType = resource_type.parse()?;
    let payload = build_payload(operation, target)?;

    let action = manager.add_to_queue(
        operation,
        resource_type,
        payload,
        user,
        EnqueueOptions {
            max_retries,
            sync_immediately: false,
        },
    )?;

    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&action)?),
        OutputFormat::Text => Ok(match &action.temp_id {
            Some(temp_id) => format!("Queued {} (temp id {})", action.id, temp_id),
            None => format!("Queued {}", action.id),
        }),
    }
}

/// Builds the payload `operation` needs from the target flags.
pub(crate) fn build_payload(operation: Operation, target: &TargetArgs) -> Result<ActionPayload> {
    let require_id = || {
        target.id.clone().ok_or_else(|| Error::RequiredFor {
            field: "--id",
            operation: operation.to_string(),
        })
    };
    let require_data = || -> Result<Value> {
        let raw = target.data.as_deref().ok_or_else(|| Error::RequiredFor {
            field: "--data",
            operation: operation.to_string(),
        })?;
        serde_json::from_str(raw).map_err(|e| Error::InvalidData {
            reason: e.to_string(),
        })
    };
    let require_items = || {
        if target.items.is_empty() {
            Err(Error::RequiredFor {
                field: "--items",
                operation: operation.to_string(),
            })
        } else {
            Ok(target.items.clone())
        }
    };

    Ok(match operation {
        Operation::Create => ActionPayload::create(require_data()?),
        Operation::Update => {
            let id = require_id()?;
            ActionPayload::update(id, require_data()?)
        }
        Operation::Delete => ActionPayload::delete(require_id()?),
        Operation::Restore => ActionPayload::restore(require_id()?),
        Operation::Complete => ActionPayload::complete(require_id()?),
        Operation::BatchDelete => ActionPayload::batch(BatchAction::Delete, require_items()?),
        Operation::BatchRestore => ActionPayload::batch(BatchAction::Restore, require_items()?),
    })
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
