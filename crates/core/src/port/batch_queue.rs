// Batch Queue Port (Interface)

use crate::domain::{EnqueuedJob, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// Asynchronous work queue for batch ingestion.
///
/// Acceptance means the job will be delivered to a worker at least once,
/// independent of the caller. Ordering across jobs is not guaranteed.
/// A rejected submission is reported as `AppError::Queue`.
#[async_trait]
pub trait BatchQueue: Send + Sync {
    async fn enqueue(&self, job: EnqueuedJob) -> Result<JobId>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// Records every accepted job; can be switched to reject submissions
    #[derive(Default)]
    pub struct RecordingBatchQueue {
        jobs: Mutex<Vec<EnqueuedJob>>,
        calls: Mutex<usize>,
        reject: Mutex<bool>,
    }

    impl RecordingBatchQueue {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting() -> Self {
            let queue = Self::default();
            *queue.reject.lock().unwrap() = true;
            queue
        }

        pub fn jobs(&self) -> Vec<EnqueuedJob> {
            self.jobs.lock().unwrap().clone()
        }

        /// Every `enqueue` call, accepted or rejected
        pub fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl BatchQueue for RecordingBatchQueue {
        async fn enqueue(&self, job: EnqueuedJob) -> Result<JobId> {
            *self.calls.lock().unwrap() += 1;
            if *self.reject.lock().unwrap() {
                return Err(AppError::Queue("queue rejected submission".to_string()));
            }
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(job);
            Ok(format!("queued-{}", jobs.len()))
        }
    }
}
