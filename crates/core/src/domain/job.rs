// Job Domain Model (durable queue entries)

use serde::{Deserialize, Serialize};

/// Job ID (UUID v4)
pub type JobId = String;

/// Queue identifier
pub type QueueId = String;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "QUEUED",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "QUEUED" => Some(JobState::Queued),
            "RUNNING" => Some(JobState::Running),
            "DONE" => Some(JobState::Done),
            "FAILED" => Some(JobState::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job name, e.g. "batch-create"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobType(String);

impl JobType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Job Payload (JSON serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload(serde_json::Value);

impl JobPayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Job Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub queue: QueueId,
    pub job_type: JobType,
    pub state: JobState,
    pub payload: JobPayload,

    /// Executions started so far
    pub attempts: i32,
    pub max_attempts: i32,
    pub backoff_factor: f64,

    /// Earliest start, epoch ms
    pub run_at: i64,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub last_error: Option<String>,
}

impl Job {
    /// Create a new Job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `queue` - Queue name
    /// * `job_type` - Job name
    /// * `payload` - Job payload
    /// * `max_attempts` - Total executions allowed
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        queue: impl Into<String>,
        job_type: JobType,
        payload: JobPayload,
        max_attempts: i32,
    ) -> Self {
        Self {
            id: id.into(),
            queue: queue.into(),
            job_type,
            state: JobState::Queued,
            payload,
            attempts: 0,
            max_attempts,
            backoff_factor: 2.0,
            run_at: created_at,
            created_at,
            started_at: None,
            finished_at: None,
            last_error: None,
        }
    }

    /// Create a test job with deterministic ID and timestamp.
    ///
    /// Uses a simple counter for deterministic test IDs (test-1, test-2, ...).
    /// Timestamps start at 1000 and increment by 1000.
    ///
    /// **Note**: only for tests. Production code injects ID and time via providers.
    pub fn new_test(queue: impl Into<String>, job_type: JobType, payload: JobPayload) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let id = format!("test-{}", counter);
        let created_at = (counter * 1000) as i64;

        Self::new(id, created_at, queue, job_type, payload, 3)
    }

    /// QUEUED -> RUNNING, counting the attempt
    pub fn start(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.state != JobState::Queued {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "RUNNING".to_string(),
            });
        }
        self.state = JobState::Running;
        self.attempts += 1;
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// RUNNING -> DONE
    pub fn complete(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.state != JobState::Running {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "DONE".to_string(),
            });
        }
        self.state = JobState::Done;
        self.finished_at = Some(now_millis);
        self.last_error = None;
        Ok(())
    }

    /// Back to QUEUED, not before `run_at`
    pub fn requeue(&mut self, run_at: i64, error: Option<String>) {
        self.state = JobState::Queued;
        self.run_at = run_at;
        self.started_at = None;
        if error.is_some() {
            self.last_error = error;
        }
    }

    /// Terminal failure (dead-letter)
    pub fn fail(&mut self, now_millis: i64, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.finished_at = Some(now_millis);
        self.last_error = Some(error.into());
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::new(
            "job-1",
            1000,
            "payable",
            JobType::new("batch-create"),
            JobPayload::new(serde_json::json!([])),
            3,
        )
    }

    #[test]
    fn test_lifecycle() {
        let mut job = job();
        assert_eq!(job.state, JobState::Queued);
        assert_eq!(job.run_at, 1000);

        job.start(2000).unwrap();
        assert_eq!(job.state, JobState::Running);
        assert_eq!(job.attempts, 1);

        job.complete(3000).unwrap();
        assert_eq!(job.state, JobState::Done);
        assert_eq!(job.finished_at, Some(3000));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut job = job();
        assert!(job.complete(2000).is_err());

        job.start(2000).unwrap();
        assert!(job.start(2500).is_err());
    }

    #[test]
    fn test_requeue_then_exhaust() {
        let mut job = job();
        for attempt in 1..=3 {
            job.start(attempt * 100).unwrap();
            assert_eq!(job.attempts as i64, attempt);
            if !job.attempts_exhausted() {
                job.requeue(attempt * 100 + 50, Some("store down".to_string()));
                assert_eq!(job.state, JobState::Queued);
                assert!(job.started_at.is_none());
            }
        }
        assert!(job.attempts_exhausted());
        job.fail(999, "store down");
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.last_error.as_deref(), Some("store down"));
    }

    #[test]
    fn test_state_round_trip_names() {
        for state in [
            JobState::Queued,
            JobState::Running,
            JobState::Done,
            JobState::Failed,
        ] {
            assert_eq!(JobState::parse(state.as_str()), Some(state));
        }
        assert_eq!(JobState::parse("SUPERSEDED"), None);
    }
}
