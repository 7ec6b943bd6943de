//! Cron scheduler wrapping `tokio-cron-scheduler`.
//!
//! The scheduler is deliberately a thin seam: it owns the clock, and the
//! trigger logic lives entirely in the registered callback, so the runner
//! can be unit-tested by invoking it directly without waiting on a schedule.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur during scheduling operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Failed to create, start, or stop the underlying scheduler.
    #[error("scheduler error: {0}")]
    JobError(String),

    /// Invalid cron expression.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

// ---------------------------------------------------------------------------
// Schedule normalization
// ---------------------------------------------------------------------------

/// Normalize a cron expression for the 6-field engine underneath.
///
/// Deployments supply standard 5-field cron syntax; a `0` seconds field is
/// prepended so the job fires at the top of the matching minute. A native
/// 6-field expression is passed through unchanged. Anything else is rejected.
pub fn normalize_schedule(input: &str) -> Result<String, SchedulerError> {
    let trimmed = input.trim();
    let fields = trimmed.split_whitespace().count();
    match fields {
        5 => Ok(format!("0 {trimmed}")),
        6 => Ok(trimmed.to_string()),
        _ => Err(SchedulerError::InvalidSchedule(format!(
            "expected 5 or 6 cron fields, got {fields}: '{trimmed}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// TriggerScheduler
// ---------------------------------------------------------------------------

/// Callback type invoked on each tick, with the firing timestamp.
pub type TickCallback =
    Arc<dyn Fn(DateTime<Utc>) -> futures_util::future::BoxFuture<'static, ()> + Send + Sync>;

/// Recurring-timer host for the trigger callback.
///
/// Lifecycle: [`start`](Self::start), then [`schedule`](Self::schedule),
/// then eventually [`stop`](Self::stop). Consecutive firings may overlap if
/// a tick's network call outlives the schedule interval; the callback is
/// spawned per firing with no coordination between invocations.
pub struct TriggerScheduler {
    inner: Arc<RwLock<Option<JobScheduler>>>,
}

impl TriggerScheduler {
    /// Create a new scheduler (not yet started).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Start the scheduler. Must be called before [`schedule`](Self::schedule).
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        let mut inner = self.inner.write().await;
        *inner = Some(scheduler);

        tracing::debug!("cron scheduler started");
        Ok(())
    }

    /// Stop the scheduler and drop all jobs.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let mut inner = self.inner.write().await;
        if let Some(mut scheduler) = inner.take() {
            scheduler
                .shutdown()
                .await
                .map_err(|e| SchedulerError::JobError(e.to_string()))?;
            tracing::debug!("cron scheduler stopped");
        }
        Ok(())
    }

    /// Register the periodic callback.
    ///
    /// `schedule` may be a 5- or 6-field cron expression (see
    /// [`normalize_schedule`]). The callback is invoked on every firing with
    /// the firing timestamp.
    pub async fn schedule(
        &self,
        schedule: &str,
        callback: TickCallback,
    ) -> Result<(), SchedulerError> {
        let cron_expr = normalize_schedule(schedule)?;

        let inner = self.inner.read().await;
        let scheduler = inner
            .as_ref()
            .ok_or_else(|| SchedulerError::JobError("scheduler not started".to_string()))?;

        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _lock| {
            let cb = callback.clone();
            Box::pin(async move {
                let now = Utc::now();
                tracing::debug!(%now, "cron tick fired");
                cb(now).await;
            })
        })
        .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        tracing::info!(schedule = %cron_expr, "trigger scheduled");
        Ok(())
    }
}

impl Default for TriggerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
