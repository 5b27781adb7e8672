//! Feature execution engine
//!
//! Provides single-item execution and bounded parallel dispatch.

mod parallel;
mod runner;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ExecutionResult, WorkItem};

pub use parallel::ParallelDispatcher;
pub use runner::{FeatureRunner, DEFAULT_TIMEOUT_SECS};

/// Runs a single work item to a result.
///
/// Implementations must absorb every failure into the returned
/// [`ExecutionResult`]; nothing is allowed to escape as an error.
#[async_trait]
pub trait Execute: Send + Sync {
    async fn execute(&self, item: &WorkItem) -> ExecutionResult;
}

/// Exit status for a run with nothing to execute
pub const EMPTY_INPUT_EXIT: i32 = 255;

/// Conditions that abort a whole batch
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No feature files found!")]
    NoWorkItems,
}

impl DispatchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::NoWorkItems => EMPTY_INPUT_EXIT,
        }
    }
}
