//! Execution result models
//!
//! Defines per-item outcomes and the batch summary derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Exit status recorded when no real process exit code exists
pub const FAILURE_SENTINEL: i32 = 1;

/// Highest exit status used to report a failure count
pub const MAX_FAILURE_EXIT: i32 = 254;

/// Terminal state of a work item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    TimedOut,
    LaunchError,
}

impl Outcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Passed => "✓",
            Outcome::Failed => "✗",
            Outcome::TimedOut => "⏱",
            Outcome::LaunchError => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => write!(f, "PASS"),
            Outcome::Failed => write!(f, "FAIL"),
            Outcome::TimedOut => write!(f, "TIMEOUT"),
            Outcome::LaunchError => write!(f, "ERROR"),
        }
    }
}

/// Outcome record for one work item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub item: String,
    pub outcome: Outcome,
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Result of a process that ran to completion
    pub fn completed(
        item: impl Into<String>,
        exit_status: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let succeeded = exit_status == 0;
        Self {
            item: item.into(),
            outcome: if succeeded {
                Outcome::Passed
            } else {
                Outcome::Failed
            },
            succeeded,
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_status,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Result of a process killed after exceeding `limit`
    pub fn timed_out(item: impl Into<String>, limit: Duration) -> Self {
        Self {
            item: item.into(),
            outcome: Outcome::TimedOut,
            succeeded: false,
            stdout: String::new(),
            stderr: timeout_message(limit),
            exit_status: FAILURE_SENTINEL,
            duration_ms: limit.as_millis() as u64,
        }
    }

    /// Result of a process that could not be launched or read
    pub fn launch_error(item: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            outcome: Outcome::LaunchError,
            succeeded: false,
            stdout: String::new(),
            stderr: error.into(),
            exit_status: FAILURE_SENTINEL,
            duration_ms: 0,
        }
    }

    /// Error text shown for a failure, if any was captured
    pub fn error_text(&self) -> Option<&str> {
        let text = self.stderr.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.outcome.symbol(),
            self.item,
            self.duration_ms
        )?;
        if !self.succeeded {
            write!(f, " (exit {})", self.exit_status)?;
        }
        Ok(())
    }
}

/// Message stored in `stderr` for timed-out items
fn timeout_message(limit: Duration) -> String {
    if limit.subsec_millis() == 0 {
        format!("Test execution timed out after {} seconds", limit.as_secs())
    } else {
        format!(
            "Test execution timed out after {:.2} seconds",
            limit.as_secs_f64()
        )
    }
}

/// Aggregate of one dispatched batch
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Wall-clock time from dispatch start to the last completion
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Every result, in completion order
    pub results: Vec<ExecutionResult>,
}

impl RunSummary {
    pub fn new(
        results: Vec<ExecutionResult>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.outcome.is_success()).count();

        Self {
            total,
            passed,
            failed: total - passed,
            duration_ms: elapsed.as_millis() as u64,
            started_at,
            completed_at: Utc::now(),
            results,
        }
    }

    /// Failed results in completion order
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration().as_secs_f64()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status: the failure count, capped to stay representable
    pub fn exit_code(&self) -> i32 {
        i32::try_from(self.failed)
            .unwrap_or(MAX_FAILURE_EXIT)
            .min(MAX_FAILURE_EXIT)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary: {} passed, {} failed", self.passed, self.failed)?;
        write!(f, "Total execution time: {:.2} seconds", self.duration_secs())
    }
}
