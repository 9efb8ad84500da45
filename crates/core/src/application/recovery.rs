// Crash recovery for queued work
use crate::domain::JobState;
use crate::port::{JobRepository, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::worker::constants::DEFAULT_RECOVERY_WINDOW_MS;

/// Crash recovery service
///
/// Returns jobs left RUNNING by a crashed or hung process to the queue so
/// that accepted batches are still delivered at least once.
pub struct RecoveryService {
    job_repo: Arc<dyn JobRepository>,
    time_provider: Arc<dyn TimeProvider>,
    recovery_window_ms: i64,
}

impl RecoveryService {
    /// Create a new recovery service
    ///
    /// # Arguments
    /// * `job_repo` - Job repository
    /// * `time_provider` - Time provider
    /// * `recovery_window_ms` - Optional custom recovery window (default: 5 minutes)
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        time_provider: Arc<dyn TimeProvider>,
        recovery_window_ms: Option<i64>,
    ) -> Self {
        Self {
            job_repo,
            time_provider,
            recovery_window_ms: recovery_window_ms.unwrap_or(DEFAULT_RECOVERY_WINDOW_MS),
        }
    }

    /// Requeue every RUNNING job
    ///
    /// Called once at daemon startup, before the worker starts: the daemon is
    /// the queue's only consumer, so anything still RUNNING was interrupted
    /// by the previous process regardless of how recently it started.
    ///
    /// # Returns
    /// Number of jobs recovered
    pub async fn requeue_interrupted_jobs(&self) -> crate::error::Result<usize> {
        info!("Starting interrupted job recovery");
        self.recover(None).await
    }

    /// Requeue orphaned jobs
    ///
    /// A RUNNING job started before `now - recovery_window` is orphaned:
    /// - attempts left: back to QUEUED, due immediately
    /// - attempts exhausted: FAILED
    ///
    /// Safe to run periodically while the worker is live.
    ///
    /// # Returns
    /// Number of jobs recovered
    pub async fn requeue_orphaned_jobs(&self) -> crate::error::Result<usize> {
        let cutoff = self.time_provider.now_millis() - self.recovery_window_ms;

        info!(
            cutoff_time = %cutoff,
            recovery_window_ms = %self.recovery_window_ms,
            "Starting orphaned job recovery"
        );

        self.recover(Some(cutoff)).await
    }

    /// Recovery window as a sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.recovery_window_ms.max(1) as u64)
    }

    async fn recover(&self, cutoff: Option<i64>) -> crate::error::Result<usize> {
        let now = self.time_provider.now_millis();
        let running_jobs = self.job_repo.find_by_state(JobState::Running).await?;
        let mut recovered_count = 0;

        for mut job in running_jobs {
            match (job.started_at, cutoff) {
                (Some(started_at), Some(cutoff)) if started_at >= cutoff => continue,
                (None, _) => {
                    warn!(job_id = %job.id, "RUNNING job without started_at");
                }
                _ => {}
            }

            if job.attempts_exhausted() {
                warn!(
                    job_id = %job.id,
                    attempts = %job.attempts,
                    "Orphaned job has no attempts left, marking as FAILED"
                );
                job.fail(now, "interrupted before completion");
            } else {
                info!(job_id = %job.id, attempts = %job.attempts, "Orphaned job requeued");
                job.requeue(now, Some("interrupted before completion".to_string()));
            }

            self.job_repo.update(&job).await?;
            recovered_count += 1;
        }

        info!(recovered_count = %recovered_count, "Job recovery complete");
        Ok(recovered_count)
    }
}
