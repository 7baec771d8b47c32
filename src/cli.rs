//! CLI interface for daily-engine

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::engine::{DailyEngine, RunOutcome};
use crate::store::{JsonArrayLog, ProgressLog, StreakTracker};

#[derive(Parser)]
#[command(name = "daily-engine")]
#[command(about = "Record one day of weather, prices and progress, at most once per day", long_about = None)]
#[command(version = crate::VERSION)]
struct Cli {
    /// Installation directory holding the logs (default: current directory)
    #[arg(long, global = true, env = "DAILY_ENGINE_ROOT")]
    root: Option<PathBuf>,

    /// Configuration file (default: <root>/daily-engine.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run today's update (default when no command given)
    Run,
    /// Show streak and store sizes without writing anything
    Status,
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = EngineConfig::load(root, cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_once(config).await,
        Commands::Status => show_status(&config),
    }
}

async fn run_once(config: EngineConfig) -> Result<()> {
    let engine = DailyEngine::with_http(config)?;
    match engine.run().await? {
        RunOutcome::AlreadyRecorded(date) => {
            println!("{} already recorded, nothing to do.", date);
        }
        RunOutcome::Completed(report) => {
            println!(
                "{} recorded: {} | commits {} | streak {} | {} (acc {})",
                report.date,
                report.status,
                report.commit_count,
                report.streak,
                report.experiment_id,
                report.accuracy
            );
        }
    }
    Ok(())
}

fn show_status(config: &EngineConfig) -> Result<()> {
    let today = Utc::now().date_naive();
    let streak = StreakTracker::new(config.streak_path()).load();
    let recorded = ProgressLog::new(config.progress_log_path()).has_entry_for(today)?;

    println!("Root:            {}", config.root.display());
    println!("Current streak:  {}", streak.current_streak);
    println!("Total commits:   {}", streak.total_commits);
    println!("Last updated:    {}", streak.last_updated);
    println!("Daily entries:   {}", JsonArrayLog::new(config.daily_data_path()).len());
    println!("Experiments:     {}", JsonArrayLog::new(config.metrics_path()).len());
    println!("Today ({}):  {}", today, if recorded { "recorded" } else { "pending" });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_version_flag_reports_crate_version() {
        let rendered = Cli::command().render_version();
        assert!(rendered.contains(crate::VERSION), "{}", rendered);
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["daily-engine", "--root", "/tmp/engine"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/engine")));
    }
}
