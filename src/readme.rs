//! README marker substitution
//!
//! Three HTML-comment markers are rewritten in place. Everything from a
//! marker to the end of its line is replaced; the rest of the document is
//! left alone.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::store::atomic_write;

pub const LAST_UPDATED_MARKER: &str = "<!-- LAST_UPDATED -->";
pub const STREAK_MARKER: &str = "<!-- STREAK -->";
pub const TOTAL_COMMITS_MARKER: &str = "<!-- TOTAL_COMMITS -->";

/// Values written next to the markers
#[derive(Debug, Clone)]
pub struct ReadmeValues {
    pub last_updated: NaiveDate,
    pub streak: u64,
    pub total_commits: u64,
}

fn marker_patterns() -> &'static [(Regex, &'static str); 3] {
    static PATTERNS: OnceLock<[(Regex, &'static str); 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [LAST_UPDATED_MARKER, STREAK_MARKER, TOTAL_COMMITS_MARKER].map(|marker| {
            let pattern = format!(r"{}[^\r\n]*", regex::escape(marker));
            // Escaped literal, always valid
            (Regex::new(&pattern).unwrap(), marker)
        })
    })
}

/// Apply all three substitutions to `text`. Every occurrence of a marker is
/// rewritten; absent markers are ignored.
pub fn apply_markers(text: &str, values: &ReadmeValues) -> String {
    let rendered = [
        values.last_updated.format("%Y-%m-%d").to_string(),
        values.streak.to_string(),
        values.total_commits.to_string(),
    ];

    let mut out = text.to_string();
    for ((pattern, marker), value) in marker_patterns().iter().zip(rendered) {
        let replacement = format!("{} **{}**", marker, value);
        out = pattern
            .replace_all(&out, regex::NoExpand(&replacement))
            .into_owned();
    }
    out
}

/// Rewrite the README at `path`. Returns `false` when the file does not exist.
///
/// Invalid UTF-8 is decoded lossily; those bytes come back as U+FFFD if the
/// file is rewritten.
pub fn update_readme(path: &Path, values: &ReadmeValues) -> Result<bool> {
    let original = match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No README at {}, skipping marker update", path.display());
            return Ok(false);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let updated = apply_markers(&original, values);
    if updated != original {
        atomic_write(path, &updated)?;
    }
    Ok(true)
}
