//! Consecutive-day streak
//!
//! The streak grows by one when the previous update happened on the calendar
//! day before the current run (UTC) and restarts at 1 otherwise.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::json_log::atomic_write;

/// RFC 3339 with millisecond precision and a `Z` suffix
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Persisted streak record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    #[serde(default)]
    pub current_streak: u64,
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default = "epoch_timestamp")]
    pub last_updated: String,
}

fn epoch_timestamp() -> String {
    format_timestamp(DateTime::<Utc>::default())
}

impl Default for StreakState {
    fn default() -> Self {
        Self {
            current_streak: 0,
            total_commits: 0,
            last_updated: epoch_timestamp(),
        }
    }
}

impl StreakState {
    /// Calendar date of the last update; unparsable values count as the epoch
    pub fn last_updated_date(&self) -> NaiveDate {
        DateTime::parse_from_rfc3339(&self.last_updated)
            .map(|at| at.with_timezone(&Utc).date_naive())
            .unwrap_or(DateTime::<Utc>::default().date_naive())
    }

    /// State after a run at `now` that saw `total_commits` commits
    pub fn advance(&self, now: DateTime<Utc>, total_commits: u64) -> StreakState {
        let today = now.date_naive();
        let consecutive = today
            .checked_sub_days(Days::new(1))
            .is_some_and(|yesterday| self.last_updated_date() == yesterday);

        let current_streak = if consecutive {
            self.current_streak.saturating_add(1)
        } else {
            1
        };

        StreakState {
            current_streak,
            total_commits,
            last_updated: format_timestamp(now),
        }
    }
}

pub struct StreakTracker {
    path: PathBuf,
}

impl StreakTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stored state, or the default when the file is missing or malformed
    pub fn load(&self) -> StreakState {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return StreakState::default(),
        };
        serde_json::from_str(&String::from_utf8_lossy(&bytes)).unwrap_or_else(|e| {
            debug!("Ignoring malformed {}: {}", self.path.display(), e);
            StreakState::default()
        })
    }

    pub fn save(&self, state: &StreakState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state)
            .context("Failed to serialize streak state")?;
        atomic_write(&self.path, &contents)
    }

    /// Load, advance and persist in one step
    pub fn record(&self, now: DateTime<Utc>, total_commits: u64) -> Result<StreakState> {
        let next = self.load().advance(now, total_commits);
        self.save(&next)?;
        Ok(next)
    }
}
