//! File-backed stores
//!
//! - `json_log`: append-only JSON array files (daily data, experiment metrics)
//! - `progress_log`: the markdown progress table and the once-per-day guard
//! - `streak`: consecutive-day streak state

pub mod json_log;
pub mod progress_log;
pub mod streak;

pub use json_log::{atomic_write, JsonArrayLog};
pub use progress_log::{ProgressLog, ProgressRow, RunStatus};
pub use streak::{StreakState, StreakTracker};
