//! Quoted CSV writer and its matching reader.
//!
//! Headers come from the first record's keys in serde field order; every
//! data field is wrapped in double quotes with inner quotes doubled, so
//! values with commas, quotes or newlines survive a round trip.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// No records, no file
    NothingToExport,
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Render records as CSV text, `None` when there is nothing to render.
pub fn encode_csv<T: Serialize>(records: &[T]) -> Result<Option<String>> {
    let rows = records
        .iter()
        .map(|record| match serde_json::to_value(record).context("Failed to serialize record")? {
            Value::Object(map) => Ok(map),
            other => bail!("CSV records must serialize to objects, got {}", other),
        })
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(","));
    for row in &rows {
        let line = headers
            .iter()
            .map(|key| quote(&cell(row.get(key.as_str()))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(Some(lines.join("\n")))
}

/// Parse CSV text (quoted fields, doubled quotes, embedded newlines).
pub fn read_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // A quoted field is a field even when empty
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if quoted || !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Writes CSV reports into one directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write `<base_name>_<timestamp>.csv`. Empty input writes nothing.
    pub async fn export_to_csv<T: Serialize>(&self, records: &[T], base_name: &str) -> Result<ExportOutcome> {
        let Some(content) = encode_csv(records)? else {
            warn!("Nothing to export for {}", base_name);
            return Ok(ExportOutcome::NothingToExport);
        };

        fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("Failed to create export directory {}", self.out_dir.display()))?;

        let path = self.next_free_path(base_name);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Exported {} records to {}", records.len(), path.display());
        Ok(ExportOutcome::Written(path))
    }

    fn next_free_path(&self, base_name: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
        let mut path = self.out_dir.join(format!("{base_name}_{stamp}.csv"));
        let mut n = 1;
        while path.exists() {
            path = self.out_dir.join(format!("{base_name}_{stamp}_{n}.csv"));
            n += 1;
        }
        path
    }
}
