//! Maintenance Scheduler
//!
//! Runs each periodic maintenance task on its own timer. A task that fails
//! or panics is logged and runs again on its next tick; the others are
//! unaffected.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::state::CacheState;
use crate::tasks::{emit_metrics, run_full_refresh, run_incremental_pass, run_sweep};

/// Owner of the periodic maintenance tasks.
#[derive(Debug, Default)]
pub struct MaintenanceScheduler {
    cancel: CancellationToken,
    tracker: TaskTracker,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl MaintenanceScheduler {
    /// Creates a scheduler with no tasks.
    pub fn new() -> Self {
        Self::default()
    }

    // == Start ==
    /// Starts the incremental pass, full refresh, TTL sweep and metrics tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(state: Arc<CacheState>, config: &Config) -> Self {
        let scheduler = Self::new();

        let incremental_state = Arc::clone(&state);
        scheduler.spawn_periodic(
            "incremental_pass",
            config.incremental_pass_interval(),
            move || {
                run_incremental_pass(&incremental_state);
                Ok(())
            },
        );

        let refresh_state = Arc::clone(&state);
        let skip_threshold = config.hit_ratio_skip_threshold;
        let recent_window = config.refresh_recent_window_millis;
        scheduler.spawn_periodic("full_refresh", config.full_refresh_interval(), move || {
            run_full_refresh(&refresh_state, skip_threshold, recent_window);
            Ok(())
        });

        let sweep_state = Arc::clone(&state);
        scheduler.spawn_periodic("ttl_sweep", config.sweep_interval(), move || {
            run_sweep(&sweep_state);
            Ok(())
        });

        let report_config = config.clone();
        scheduler.spawn_periodic("metrics", config.metrics_interval(), move || {
            emit_metrics(&state, &report_config).map(|_| ())
        });

        info!(
            incremental_ms = config.incremental_pass_interval_millis,
            refresh_ms = config.full_refresh_interval_millis,
            sweep_ms = config.sweep_interval_millis,
            metrics_ms = config.metrics_interval_millis,
            "Maintenance scheduler started"
        );
        scheduler
    }

    // == Spawn Periodic ==
    /// Runs `task` every `period`, first after one full period, until shutdown.
    ///
    /// Ticks missed while a run was slow are delayed, not bunched up.
    pub fn spawn_periodic<F>(&self, name: &'static str, period: Duration, mut task: F)
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let cancel = self.cancel.child_token();
        let handle = self.tracker.spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => run_isolated(name, &mut task),
                }
            }
            debug!(task = name, "Maintenance task stopped");
        });
        self.handles.lock().push(handle);
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub fn task_count(&self) -> usize {
        self.tracker.len()
    }

    // == Shutdown ==
    /// Stops scheduling new runs, waits up to `grace` for running ones, then
    /// aborts whatever is left.
    ///
    /// Returns false if anything had to be aborted.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.cancel.cancel();
        self.tracker.close();

        let drained = time::timeout(grace, self.tracker.wait()).await.is_ok();
        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        if !drained {
            warn!(
                remaining = self.tracker.len(),
                grace_ms = grace.as_millis() as u64,
                "Maintenance tasks did not stop within grace period, aborting"
            );
            for handle in &handles {
                handle.abort();
            }
        }
        drained
    }
}

impl Drop for MaintenanceScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn run_isolated<F>(name: &'static str, task: &mut F)
where
    F: FnMut() -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| task())) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(task = name, error = %err, "Maintenance task failed"),
        Err(payload) => error!(
            task = name,
            panic = %panic_message(payload.as_ref()),
            "Maintenance task panicked"
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
