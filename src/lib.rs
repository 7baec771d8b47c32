//! Daily Engine Library
//!
//! A once-per-day automation run:
//! - Guard against a second run on the same calendar day
//! - Weather and crypto price snapshots appended to JSON logs
//! - A synthetic experiment record
//! - Consecutive-day streak tracking
//! - README marker and progress log updates
//!
//! # Example
//!
//! ```ignore
//! use daily_engine::{DailyEngine, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::load(".", None)?;
//!     let outcome = DailyEngine::with_http(config)?.run().await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod config;
pub mod fetch;
pub mod git;
pub mod store;
pub mod readme;
pub mod experiment;
pub mod engine;
pub mod cli;

pub use config::EngineConfig;
pub use engine::{DailyEngine, RunOutcome, RunReport};
pub use fetch::{FetchError, FetchOutcome, HttpFetcher, JsonSource};
pub use git::{CommitCountError, CommitCounter, GitCommitCounter};
pub use store::{JsonArrayLog, ProgressLog, ProgressRow, RunStatus, StreakState, StreakTracker};
pub use types::{DailyEntry, ExperimentEntry, UNAVAILABLE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
