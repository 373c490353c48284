//! Search worker group
//!
//! Runs blocking data-source calls off the async runtime, with a fixed
//! number of permits so a burst of misses cannot flood the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::warn;

use crate::error::{Result, SuggestError};

/// Bounded group of blocking workers for searches and write-throughs.
#[derive(Debug)]
pub struct SearchPool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    timeout: Duration,
}

impl SearchPool {
    /// Creates a pool running at most `workers` jobs at once; `run` gives up after `timeout`.
    pub fn new(workers: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            tracker: TaskTracker::new(),
            timeout,
        }
    }

    // == Run ==
    /// Runs `job` on a worker, failing with `Timeout` if it (including the
    /// wait for a free worker) takes longer than the pool timeout.
    ///
    /// A timed-out job keeps its worker until it returns; only the caller stops waiting.
    pub async fn run<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(self.timeout, self.run_to_completion(job)).await {
            Ok(result) => result,
            Err(_) => Err(SuggestError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    // == Run To Completion ==
    /// Runs `job` on a worker and waits for it however long it takes.
    pub async fn run_to_completion<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| SuggestError::ShuttingDown)?;

        let handle = self.tracker.spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        handle
            .await
            .map_err(|err| SuggestError::Worker(err.to_string()))?
    }

    /// Jobs currently running or queued on the blocking threads.
    pub fn active_jobs(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    // == Shutdown ==
    /// Stops accepting jobs and waits up to `grace` for running ones.
    ///
    /// Returns false if jobs were still running when the grace period ran
    /// out; blocking jobs cannot be interrupted, so they are left to finish
    /// on their own and their results are dropped.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.permits.close();
        self.tracker.close();

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            true
        } else {
            warn!(
                remaining = self.tracker.len(),
                grace_ms = grace.as_millis() as u64,
                "Search workers did not drain within grace period"
            );
            false
        }
    }
}
