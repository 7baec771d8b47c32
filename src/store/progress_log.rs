//! Markdown progress log
//!
//! One table row per recorded day. The file is never parsed as a table; the
//! guard is a plain substring search for `| YYYY-MM-DD |`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Write;
use std::path::PathBuf;

/// Outcome glyph for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Both snapshots were fetched
    Operational,
    /// At least one snapshot fell back to the sentinel
    PartialData,
}

impl RunStatus {
    pub fn from_fetches(weather_ok: bool, crypto_ok: bool) -> Self {
        if weather_ok && crypto_ok {
            RunStatus::Operational
        } else {
            RunStatus::PartialData
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Operational => write!(f, "✅ Operational"),
            RunStatus::PartialData => write!(f, "⚠️ Partial Data"),
        }
    }
}

/// A single table row
#[derive(Debug, Clone)]
pub struct ProgressRow {
    pub date: NaiveDate,
    pub status: RunStatus,
    pub commit_count: u64,
    pub summary: String,
}

impl ProgressRow {
    /// Summary text: a 20-character preview of the price payload plus the
    /// experiment accuracy. A missing payload previews as `null`.
    pub fn summarize(crypto: Option<&serde_json::Value>, accuracy: &str) -> String {
        let serialized = crypto
            .map(|value| value.to_string())
            .unwrap_or_else(|| "null".to_string());
        let preview: String = serialized.chars().take(20).collect();
        format!("Auto-update. Crypto: {}... Exp Acc: {}", preview, accuracy)
    }
}

impl std::fmt::Display for ProgressRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "| {} | {} | {} | {} |",
            date_key(self.date),
            self.status,
            self.commit_count,
            self.summary
        )
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File contents, lossily decoded; a missing file reads as empty
    pub fn read(&self) -> Result<String> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read progress log {}", self.path.display())),
        }
    }

    /// Whether a row for `date` is already present
    pub fn has_entry_for(&self, date: NaiveDate) -> Result<bool> {
        let token = format!("| {} |", date_key(date));
        Ok(self.read()?.contains(&token))
    }

    /// Append one row, creating the file (without a header) if needed
    pub fn append_row(&self, row: &ProgressRow) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open progress log {}", self.path.display()))?;

        file.write_all(row.to_string().as_bytes())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        Ok(())
    }
}
