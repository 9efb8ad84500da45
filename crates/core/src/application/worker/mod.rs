// Worker - Job execution loop

mod batch_create;
pub mod constants;
mod shutdown;

pub use batch_create::BatchCreateHandler;
use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::retry::{RetryDecision, RetryPolicy};
use crate::error::Result;
use crate::port::{JobHandler, JobRepository, TimeProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Worker consuming one queue, dispatching jobs to handlers by name
pub struct Worker {
    queue: String,
    job_repo: Arc<dyn JobRepository>,
    handlers: HashMap<String, Arc<dyn JobHandler>>,
    retry_policy: Arc<RetryPolicy>,
    time_provider: Arc<dyn TimeProvider>, // For deterministic testing
}

impl Worker {
    pub fn new(
        queue: impl Into<String>,
        job_repo: Arc<dyn JobRepository>,
        handlers: Vec<Arc<dyn JobHandler>>,
        retry_policy: Arc<RetryPolicy>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let handlers = handlers
            .into_iter()
            .map(|h| (h.job_type().to_string(), h))
            .collect();
        Self {
            queue: queue.into(),
            job_repo,
            handlers,
            retry_policy,
            time_provider,
        }
    }

    /// Run worker loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!("Worker started for queue: {}", self.queue);
        loop {
            if shutdown.is_shutdown() {
                info!("Worker shutting down for queue: {}", self.queue);
                break;
            }
            match self.process_next_job().await {
                Ok(true) => {}
                Ok(false) => {
                    // Nothing due, sleep briefly (or wait for shutdown)
                    tokio::select! {
                        _ = sleep(IDLE_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => {
                            info!("Worker interrupted during idle");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!("Worker error: {}", e);
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => {
                            info!("Worker interrupted during error recovery");
                            break;
                        }
                    }
                }
            }
        }
        info!("Worker stopped for queue: {}", self.queue);
        Ok(())
    }

    /// Process next due job from queue (returns true if a job was processed)
    pub async fn process_next_job(&self) -> Result<bool> {
        // Claimed atomically: RUNNING, attempts + 1
        let mut job = match self
            .job_repo
            .pop_next(&self.queue, self.time_provider.now_millis())
            .await?
        {
            Some(j) => j,
            None => return Ok(false),
        };

        let handler = match self.handlers.get(job.job_type.as_str()) {
            Some(h) => Arc::clone(h),
            None => {
                error!(job_id = %job.id, job_type = %job.job_type.as_str(), "No handler registered");
                let reason = format!("no handler for job type {}", job.job_type.as_str());
                job.fail(self.time_provider.now_millis(), reason);
                self.job_repo.update(&job).await?;
                return Ok(true);
            }
        };

        info!(
            job_id = %job.id,
            job_type = %job.job_type.as_str(),
            attempt = %job.attempts,
            "Processing job"
        );

        // Run in its own task: a panicking handler must not take the worker down
        let job_arc = Arc::new(job);
        let job_for_exec = Arc::clone(&job_arc);
        let execution_result =
            tokio::task::spawn(async move { handler.handle(&job_for_exec).await }).await;

        let mut job = Arc::try_unwrap(job_arc).unwrap_or_else(|arc| (*arc).clone());

        let failure = match execution_result {
            Ok(Ok(())) => {
                job.complete(self.time_provider.now_millis())?;
                info!(job_id = %job.id, "Job completed");
                self.job_repo.update(&job).await?;
                return Ok(true);
            }
            Ok(Err(e)) if !e.is_retryable() => {
                error!(job_id = %job.id, error = %e, "Job failed with non-retryable error");
                job.fail(self.time_provider.now_millis(), e.to_string());
                self.job_repo.update(&job).await?;
                return Ok(true);
            }
            Ok(Err(e)) => e.to_string(),
            Err(join_err) if join_err.is_panic() => {
                warn!(job_id = %job.id, "Job handler panicked");
                "handler panicked".to_string()
            }
            Err(join_err) => {
                warn!(job_id = %job.id, error = ?join_err, "Job handler cancelled");
                "handler cancelled".to_string()
            }
        };

        match self.retry_policy.should_retry(&job) {
            RetryDecision::Retry(delay_ms) => {
                info!(
                    job_id = %job.id,
                    attempt = %job.attempts,
                    delay_ms = %delay_ms,
                    error = %failure,
                    "Retrying job after failure"
                );
                self.retry_policy
                    .prepare_for_retry(&mut job, delay_ms, failure);
            }
            RetryDecision::Failed => {
                // Dead-letter: stays FAILED with last_error for operators
                error!(
                    job_id = %job.id,
                    attempts = %job.attempts,
                    error = %failure,
                    "Job failed after max retries"
                );
                job.fail(self.time_provider.now_millis(), failure);
            }
        }
        self.job_repo.update(&job).await?;
        Ok(true)
    }
}
