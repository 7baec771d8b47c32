//! Commit counting
//!
//! The engine only needs one number from version control, so the tool sits
//! behind `CommitCounter` and tests swap in a stub.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum CommitCountError {
    /// The tool could not be started at all
    #[error("git is not available: {0}")]
    ToolUnavailable(String),

    #[error("git exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("unexpected git output: {0:?}")]
    InvalidOutput(String),
}

/// Source of the total commit count for the current history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitCounter: Send + Sync {
    async fn count_commits(&self) -> Result<u64, CommitCountError>;
}

/// Runs `git rev-list --count HEAD` inside a working tree
pub struct GitCommitCounter {
    repo_dir: PathBuf,
    program: String,
}

impl GitCommitCounter {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            program: "git".to_string(),
        }
    }

    /// Use a different executable in place of `git`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl CommitCounter for GitCommitCounter {
    async fn count_commits(&self) -> Result<u64, CommitCountError> {
        let output = Command::new(&self.program)
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CommitCountError::ToolUnavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(CommitCountError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_count(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the single integer `rev-list --count` prints
fn parse_count(stdout: &str) -> Result<u64, CommitCountError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<u64>()
        .map_err(|_| CommitCountError::InvalidOutput(trimmed.to_string()))
}
