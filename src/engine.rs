//! The daily run
//!
//! One invocation walks the whole sequence once: guard, commit count,
//! snapshots, data log, experiment log, streak, README, progress row.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::experiment::generate_experiment;
use crate::fetch::{HttpFetcher, JsonSource};
use crate::git::{CommitCounter, GitCommitCounter};
use crate::readme::{update_readme, ReadmeValues};
use crate::store::streak::format_timestamp;
use crate::store::{JsonArrayLog, ProgressLog, ProgressRow, RunStatus, StreakTracker};
use crate::types::DailyEntry;

/// What a single invocation did
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Today already has a progress row; nothing was written
    AlreadyRecorded(NaiveDate),
    Completed(RunReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub date: NaiveDate,
    pub status: RunStatus,
    pub commit_count: u64,
    pub streak: u64,
    pub experiment_id: String,
    pub accuracy: String,
    pub readme_updated: bool,
}

pub struct DailyEngine {
    config: EngineConfig,
    source: Box<dyn JsonSource>,
    commits: Box<dyn CommitCounter>,
}

impl DailyEngine {
    pub fn new(
        config: EngineConfig,
        source: Box<dyn JsonSource>,
        commits: Box<dyn CommitCounter>,
    ) -> Self {
        Self { config, source, commits }
    }

    /// Production wiring: reqwest fetcher and `git` in the root directory
    pub fn with_http(config: EngineConfig) -> Result<Self> {
        let source = HttpFetcher::new(&config.sources)?;
        let commits = GitCommitCounter::new(&config.root);
        Ok(Self::new(config, Box::new(source), Box::new(commits)))
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_at(Utc::now()).await
    }

    /// Run the sequence as if the clock read `now`
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let config = &self.config;
        config.ensure_dirs()?;

        let today = now.date_naive();
        info!("Starting Daily Engine for {}...", today);

        let progress = ProgressLog::new(config.progress_log_path());
        if progress.has_entry_for(today)? {
            info!("Update for today already exists. Exiting.");
            return Ok(RunOutcome::AlreadyRecorded(today));
        }

        let commit_count = match self.commits.count_commits().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not get git commit count, defaulting to 0: {}", e);
                0
            }
        };

        let (weather, crypto) = tokio::join!(
            self.source.fetch(&config.sources.weather_url),
            self.source.fetch(&config.sources.crypto_url),
        );

        let timestamp = format_timestamp(now);
        let daily = DailyEntry {
            date: today.format("%Y-%m-%d").to_string(),
            timestamp,
            weather: weather.field_or_sentinel(|w| w.get("current_weather")),
            crypto: crypto.field_or_sentinel(|c| Some(c)),
        };
        JsonArrayLog::new(config.daily_data_path()).append(&daily)?;

        let experiment = generate_experiment(&mut rand::rng(), today);
        JsonArrayLog::new(config.metrics_path()).append(&experiment)?;

        let streak = StreakTracker::new(config.streak_path()).record(now, commit_count)?;

        let readme_updated = update_readme(
            &config.readme_path(),
            &ReadmeValues {
                last_updated: today,
                streak: streak.current_streak,
                total_commits: commit_count,
            },
        )?;

        let status = RunStatus::from_fetches(weather.is_fetched(), crypto.is_fetched());
        progress.append_row(&ProgressRow {
            date: today,
            status,
            commit_count,
            summary: ProgressRow::summarize(crypto.payload(), &experiment.accuracy),
        })?;

        info!("Daily Engine finished successfully.");
        Ok(RunOutcome::Completed(RunReport {
            date: today,
            status,
            commit_count,
            streak: streak.current_streak,
            experiment_id: experiment.experiment_id,
            accuracy: experiment.accuracy,
            readme_updated,
        }))
    }
}
