// Job Repository Port (Interface) - consumer side of the queue

use crate::domain::{Job, JobId, JobState};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for durable job rows
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Update job
    async fn update(&self, job: &Job) -> Result<()>;

    /// Claim the oldest due QUEUED job (run_at <= now): atomically RUNNING,
    /// attempts + 1, started_at = now
    async fn pop_next(&self, queue: &str, now_millis: i64) -> Result<Option<Job>>;

    /// Count jobs by state
    async fn count_by_state(&self, queue: &str, state: JobState) -> Result<i64>;

    /// Find all jobs by state (for recovery)
    async fn find_by_state(&self, state: JobState) -> Result<Vec<Job>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryJobRepository {
        jobs: Mutex<Vec<Job>>,
    }

    impl InMemoryJobRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn snapshot(&self, id: &str) -> Option<Job> {
            self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned()
        }
    }

    #[async_trait]
    impl JobRepository for InMemoryJobRepository {
        async fn insert(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
            Ok(self.snapshot(id))
        }

        async fn update(&self, job: &Job) -> Result<()> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(row) = jobs.iter_mut().find(|j| j.id == job.id) {
                *row = job.clone();
            }
            Ok(())
        }

        async fn pop_next(&self, queue: &str, now_millis: i64) -> Result<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            let next = jobs
                .iter_mut()
                .filter(|j| j.queue == queue && j.state == JobState::Queued)
                .filter(|j| j.run_at <= now_millis)
                .min_by_key(|j| (j.created_at, j.id.clone()));
            match next {
                Some(job) => {
                    job.start(now_millis)?;
                    Ok(Some(job.clone()))
                }
                None => Ok(None),
            }
        }

        async fn count_by_state(&self, queue: &str, state: JobState) -> Result<i64> {
            Ok(self
                .jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.queue == queue && j.state == state)
                .count() as i64)
        }

        async fn find_by_state(&self, state: JobState) -> Result<Vec<Job>> {
            Ok(self
                .jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.state == state)
                .cloned()
                .collect())
        }
    }
}
