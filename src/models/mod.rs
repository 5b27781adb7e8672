//! Data models for feature dispatching
//!
//! This module contains all data structures used throughout the application.

mod execution_result;
mod work_item;

pub use execution_result::{ExecutionResult, Outcome, RunSummary, FAILURE_SENTINEL};
pub use work_item::{InvocationOptions, WorkItem, DEFAULT_FORMAT};
