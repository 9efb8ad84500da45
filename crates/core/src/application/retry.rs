// Retry logic for queued jobs
//
// The pipeline never retries; once a job is accepted the worker applies this
// policy. `attempts` counts executions started, so max_attempts = 3 means at
// most three executions.
use crate::domain::Job;
use crate::port::TimeProvider;
use std::sync::Arc;
use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the job (with backoff delay in ms)
    Retry(i64),
    /// Do not retry, job has failed permanently
    Failed,
}

pub struct RetryPolicy {
    time_provider: Arc<dyn TimeProvider>,
    base_delay_ms: i64,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for current time
    /// * `base_delay_ms` - Delay before the second attempt
    pub fn new(time_provider: Arc<dyn TimeProvider>, base_delay_ms: i64) -> Self {
        Self {
            time_provider,
            base_delay_ms,
        }
    }

    /// Decide what happens after a failed execution
    ///
    /// delay = base_delay * backoff_factor ^ (attempts - 1), with ±10% jitter
    pub fn should_retry(&self, job: &Job) -> RetryDecision {
        if job.attempts_exhausted() {
            warn!(
                job_id = %job.id,
                attempts = %job.attempts,
                max_attempts = %job.max_attempts,
                "Max retry attempts reached"
            );
            return RetryDecision::Failed;
        }

        let exponent = (job.attempts - 1).max(0);
        let base_delay_ms = self.base_delay_ms as f64 * job.backoff_factor.powi(exponent);

        // Jitter seeded by job id: spreads retries of jobs that failed together,
        // stays deterministic per job
        let jitter_seed = job.id.chars().map(|c| c as u32).sum::<u32>();
        let jitter_factor = 0.9 + ((jitter_seed % 21) as f64 / 100.0); // 0.9 to 1.1

        let delay_ms = (base_delay_ms * jitter_factor) as i64;

        info!(
            job_id = %job.id,
            attempt = %job.attempts,
            max_attempts = %job.max_attempts,
            delay_ms = %delay_ms,
            "Scheduling retry"
        );

        RetryDecision::Retry(delay_ms)
    }

    /// Put the job back in the queue, due after `delay_ms`
    pub fn prepare_for_retry(&self, job: &mut Job, delay_ms: i64, error: impl Into<String>) {
        let run_at = self.time_provider.now_millis() + delay_ms;
        job.requeue(run_at, Some(error.into()));

        info!(
            job_id = %job.id,
            attempt = %job.attempts,
            run_at = %run_at,
            "Job prepared for retry"
        );
    }
}
