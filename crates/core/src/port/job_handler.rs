// Job Handler Port
// Executes one delivery of a job; the worker owns retries and state.

use crate::domain::Job;
use crate::error::Result;
use async_trait::async_trait;

/// Handler for a single job name
///
/// Deliveries are at-least-once, so `handle` must tolerate seeing the same
/// job again after a failed or interrupted attempt.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Job name this handler consumes (e.g. "batch-create")
    fn job_type(&self) -> &str;

    async fn handle(&self, job: &Job) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// Mock handler behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Fail with a retryable error the first N calls, then succeed
        FailTimes(usize),
        /// Always fail with a retryable error
        AlwaysFail,
        /// Panic (for isolation testing)
        Panic,
    }

    pub struct MockJobHandler {
        name: String,
        behavior: MockBehavior,
        call_count: Mutex<usize>,
    }

    impl MockJobHandler {
        pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
            Self {
                name: name.into(),
                behavior,
                call_count: Mutex::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl JobHandler for MockJobHandler {
        fn job_type(&self) -> &str {
            &self.name
        }

        async fn handle(&self, _job: &Job) -> Result<()> {
            let call = {
                let mut count = self.call_count.lock().unwrap();
                *count += 1;
                *count
            };

            match &self.behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::FailTimes(n) if call <= *n => {
                    Err(AppError::Database("transient failure".to_string()))
                }
                MockBehavior::FailTimes(_) => Ok(()),
                MockBehavior::AlwaysFail => {
                    Err(AppError::Database("permanent outage".to_string()))
                }
                MockBehavior::Panic => panic!("handler panicked"),
            }
        }
    }
}
