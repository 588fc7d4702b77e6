//! Completion polling
//!
//! [`CompletionPoller`] re-fetches a job until it reaches a terminal state.
//! It never trusts a cached handle: every observation is a fresh `get_job`.
//! Waiting is cooperative; a cancellation signal is checked before each fetch
//! and raced against every sleep.

use crate::adapters::warehouse::RemoteJobService;
use crate::config::PollingConfig;
use crate::core::classify::classify_at;
use crate::core::submit::check_job_identity;
use crate::domain::{
    ErrorClass, JobHandle, JobReference, ProjectId, RemoteServiceError, Result, Stage,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Invoked once per poll attempt, e.g. to report liveness to a supervisor
pub trait LivenessCallback {
    fn tick(&mut self);
}

impl<F: FnMut()> LivenessCallback for F {
    fn tick(&mut self) {
        self()
    }
}

/// Liveness callback that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLiveness;

impl LivenessCallback for NoopLiveness {
    fn tick(&mut self) {}
}

/// How a wait ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job reached DONE or ERROR; the handle is the final observation
    Completed(JobHandle),
    /// The cancellation signal fired before the job finished
    Cancelled,
}

/// Waits for remote jobs to finish
pub struct CompletionPoller<S: RemoteJobService + ?Sized> {
    service: Arc<S>,
    config: PollingConfig,
}

impl<S: RemoteJobService + ?Sized> Clone for CompletionPoller<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: self.config.clone(),
        }
    }
}

impl<S: RemoteJobService + ?Sized> CompletionPoller<S> {
    /// Create a poller with the given cadence
    pub fn new(service: Arc<S>, config: PollingConfig) -> Self {
        Self { service, config }
    }

    /// Fetch the current state of a job once
    ///
    /// # Errors
    ///
    /// `Remote` (stage `Polling`) if the fetch fails, `Integrity` if the
    /// service answers for a different job.
    pub async fn fetch_status(
        &self,
        project: &ProjectId,
        reference: &JobReference,
    ) -> Result<JobHandle> {
        let handle = self
            .service
            .get_job(project, &reference.job_id, reference.location.as_deref())
            .await
            .map_err(|e| classify_at(Stage::Polling, e))?;
        check_job_identity(reference, &handle.reference)?;
        Ok(handle)
    }

    /// Poll until the job is terminal or `cancel` turns true
    ///
    /// The first fetch happens immediately. `tick` runs once per fetch
    /// attempt, failed attempts included. A dropped cancellation sender means
    /// the wait can no longer be cancelled.
    ///
    /// # Errors
    ///
    /// - `Remote` (stage `Polling`) for a non-transient fetch failure, or a
    ///   `Fatal` one once more than `max_transient_errors` consecutive
    ///   transient failures have been seen
    /// - `Integrity` if the service answers for a different job
    pub async fn await_completion<L>(
        &self,
        project: &ProjectId,
        handle: &JobHandle,
        tick: &mut L,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<PollOutcome>
    where
        L: LivenessCallback + ?Sized,
    {
        let reference = &handle.reference;
        let mut interval = self.config.initial_interval();
        let mut transient_errors: u32 = 0;
        let mut attempt: u64 = 0;

        loop {
            if *cancel.borrow() {
                tracing::info!(job_id = %reference.job_id, "Wait cancelled before fetch");
                return Ok(PollOutcome::Cancelled);
            }

            attempt += 1;
            let fetched = self.fetch_status(project, reference).await;
            tick.tick();

            match fetched {
                Ok(current) if current.is_terminal() => {
                    tracing::debug!(
                        job_id = %reference.job_id,
                        state = %current.state,
                        attempt = attempt,
                        "Job reached terminal state"
                    );
                    return Ok(PollOutcome::Completed(current));
                }
                Ok(current) => {
                    transient_errors = 0;
                    tracing::debug!(
                        job_id = %reference.job_id,
                        state = %current.state,
                        attempt = attempt,
                        next_poll_ms = interval.as_millis() as u64,
                        "Job not finished yet"
                    );
                }
                Err(err) => {
                    let cause = err
                        .as_remote()
                        .filter(|remote| remote.class.is_transient())
                        .map(|remote| remote.cause.clone());
                    let Some(cause) = cause else {
                        return Err(err);
                    };

                    transient_errors += 1;
                    if transient_errors > self.config.max_transient_errors {
                        tracing::warn!(
                            job_id = %reference.job_id,
                            consecutive_errors = transient_errors,
                            "Giving up on job after repeated transient errors"
                        );
                        return Err(
                            RemoteServiceError::new(ErrorClass::Fatal, Stage::Polling, cause)
                                .into(),
                        );
                    }

                    crate::log_retry_attempt!(
                        transient_errors,
                        self.config.max_transient_errors,
                        cause
                    );
                }
            }

            if sleep_or_cancel(interval, cancel).await {
                tracing::info!(job_id = %reference.job_id, "Wait cancelled");
                return Ok(PollOutcome::Cancelled);
            }
            interval = self.next_interval(interval);
        }
    }

    fn next_interval(&self, current: Duration) -> Duration {
        let max = self.config.max_interval();
        Duration::try_from_secs_f64(current.as_secs_f64() * self.config.backoff_multiplier)
            .map_or(max, |next| next.min(max))
    }
}

/// Sleep for `duration`; returns true if cancellation fired first
async fn sleep_or_cancel(duration: Duration, cancel: &mut watch::Receiver<bool>) -> bool {
    let deadline = Instant::now() + duration;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => return false,
            changed = cancel.changed() => match changed {
                Ok(()) => {
                    if *cancel.borrow_and_update() {
                        return true;
                    }
                }
                Err(_) => {
                    // Sender gone: nothing can cancel this wait any more
                    tokio::time::sleep_until(deadline).await;
                    return false;
                }
            },
        }
    }
}
