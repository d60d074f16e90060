// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL (JSON Lines) file utilities.
//!
//! Durable storage for the offline queue and the local ledger. Appends are
//! fsynced; full rewrites go through a sibling temp file and an atomic rename
//! so a crash mid-rewrite leaves the previous contents intact.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Appends a record to a JSONL file with fsync for durability.
pub fn append<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{json}")?;
    file.sync_all()?;

    Ok(())
}

/// Reads all records from a JSONL file.
///
/// Skips empty lines and returns an empty vec if the file doesn't exist.
/// A malformed final line is treated as a torn append and dropped with a
/// warning; malformed lines anywhere else are reported as corruption.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let lines: Vec<String> = BufReader::new(file).lines().collect::<std::io::Result<_>>()?;
    let last_content_line = lines.iter().rposition(|l| !l.trim().is_empty());
    let mut records = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) if Some(index) == last_content_line => {
                tracing::warn!(
                    "dropping torn trailing record in {} (line {}): {}",
                    path.display(),
                    index + 1,
                    e
                );
            }
            Err(e) => {
                return Err(Error::InvalidInput(format!(
                    "corrupted record in {} at line {}: {}",
                    path.display(),
                    index + 1,
                    e
                )));
            }
        }
    }

    Ok(records)
}

/// Writes all records to a JSONL file, replacing existing content atomically.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp_path = temp_path(path);
    {
        let mut file = File::create(&tmp_path)?;
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{json}")?;
        }
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
