//! Parallel feature dispatch
//!
//! Fans work items out over a bounded pool of workers and aggregates their
//! results in completion order.

use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use super::{DispatchError, Execute};
use crate::models::{ExecutionResult, RunSummary, WorkItem};
use crate::utils::Timer;

/// Bounded parallel dispatcher
pub struct ParallelDispatcher<E> {
    executor: Arc<E>,
    max_workers: usize,
}

impl<E> ParallelDispatcher<E>
where
    E: Execute + 'static,
{
    pub fn new(executor: E, max_workers: usize) -> Self {
        Self::with_shared(Arc::new(executor), max_workers)
    }

    pub fn with_shared(executor: Arc<E>, max_workers: usize) -> Self {
        Self {
            executor,
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run every item and summarize the batch.
    ///
    /// `on_result` sees each result as soon as its item completes. Only an
    /// empty batch is an error; item failures are part of the summary.
    pub async fn dispatch<F>(
        &self,
        items: Vec<WorkItem>,
        mut on_result: F,
    ) -> Result<RunSummary, DispatchError>
    where
        F: FnMut(&ExecutionResult),
    {
        if items.is_empty() {
            return Err(DispatchError::NoWorkItems);
        }

        let total = items.len();
        info!(
            "Dispatching {} feature files (max {} workers)",
            total, self.max_workers
        );

        let started_at = Utc::now();
        let timer = Timer::start("dispatch");
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut pending = FuturesUnordered::new();

        for item in items {
            let semaphore = semaphore.clone();
            let executor = self.executor.clone();
            let id = item.id();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return ExecutionResult::launch_error(
                        item.id(),
                        "worker pool closed before the item started",
                    );
                };

                debug!("Starting {}", item);
                executor.execute(&item).await
            });

            pending.push(async move { (id, handle.await) });
        }

        let mut results = Vec::with_capacity(total);
        while let Some((id, joined)) = pending.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Worker for {} aborted: {}", id, e);
                    ExecutionResult::launch_error(id, format!("worker task failed: {e}"))
                }
            };

            debug!("  {}", result);
            on_result(&result);
            results.push(result);
        }

        let summary = RunSummary::new(results, started_at, timer.stop());

        info!(
            "Dispatch completed in {}ms - Pass: {}/{} ({:.1}%)",
            summary.duration_ms,
            summary.passed,
            summary.total,
            summary.pass_rate()
        );

        Ok(summary)
    }
}
