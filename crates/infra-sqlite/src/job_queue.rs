// SQLite durable job queue (producer + consumer side)

use crate::error::{map_queue_error, map_sqlx_error};
use async_trait::async_trait;
use payables_core::domain::{
    EnqueuedJob, Job, JobId, JobPayload, JobState, JobType, PAYABLE_QUEUE,
};
use payables_core::error::{AppError, Result};
use payables_core::port::{BatchQueue, IdProvider, JobRepository, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, warn};

/// Jobs table acting as the batch queue.
///
/// A job row written by `enqueue` survives restarts; workers claim it with
/// `pop_next` and the row records attempts and the last failure.
pub struct SqliteJobQueue {
    pool: SqlitePool,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteJobQueue {
    pub fn new(
        pool: SqlitePool,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            pool,
            id_provider,
            time_provider,
        }
    }

    async fn insert_job(&self, job: &Job) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, queue, job_type, state, payload,
                attempts, max_attempts, backoff_factor,
                run_at, created_at, started_at, finished_at, last_error
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.queue)
        .bind(job.job_type.as_str())
        .bind(job.state.as_str())
        .bind(job.payload.as_value().to_string())
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(job.backoff_factor)
        .bind(job.run_at)
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.finished_at)
        .bind(&job.last_error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BatchQueue for SqliteJobQueue {
    async fn enqueue(&self, job: EnqueuedJob) -> Result<JobId> {
        let payload = serde_json::to_value(job.payload())?;
        let max_attempts = i32::try_from(job.options().attempts)
            .map_err(|_| AppError::Queue("attempt budget out of range".to_string()))?;

        let row = Job::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
            PAYABLE_QUEUE,
            JobType::new(job.name()),
            JobPayload::new(payload),
            max_attempts,
        );

        self.insert_job(&row).await.map_err(map_queue_error)?;

        debug!(job_id = %row.id, job_type = %job.name(), "Job enqueued");
        Ok(row.id)
    }
}

#[async_trait]
impl JobRepository for SqliteJobQueue {
    async fn insert(&self, job: &Job) -> Result<()> {
        self.insert_job(job).await.map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_job()))
    }

    async fn update(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET state = ?, attempts = ?, run_at = ?, started_at = ?,
                finished_at = ?, last_error = ?
            WHERE id = ?
            "#,
        )
        .bind(job.state.as_str())
        .bind(job.attempts)
        .bind(job.run_at)
        .bind(job.started_at)
        .bind(job.finished_at)
        .bind(&job.last_error)
        .bind(&job.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn pop_next(&self, queue: &str, now_millis: i64) -> Result<Option<Job>> {
        // Single statement: two workers can never claim the same row
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET state = ?, started_at = ?, attempts = attempts + 1
            WHERE id = (
                SELECT id FROM jobs
                WHERE queue = ? AND state = ? AND run_at <= ?
                ORDER BY run_at ASC, created_at ASC, rowid ASC
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(JobState::Running.as_str())
        .bind(now_millis)
        .bind(queue)
        .bind(JobState::Queued.as_str())
        .bind(now_millis)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_job()))
    }

    async fn count_by_state(&self, queue: &str, state: JobState) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE queue = ? AND state = ?")
                .bind(queue)
                .bind(state.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn find_by_state(&self, state: JobState) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> =
            sqlx::query_as("SELECT * FROM jobs WHERE state = ? ORDER BY created_at ASC")
                .bind(state.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_job()).collect())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    queue: String,
    job_type: String,
    state: String,
    payload: String,
    attempts: i32,
    max_attempts: i32,
    backoff_factor: f64,
    run_at: i64,
    created_at: i64,
    started_at: Option<i64>,
    finished_at: Option<i64>,
    last_error: Option<String>,
}

impl JobRow {
    fn into_job(self) -> Job {
        let state = JobState::parse(&self.state).unwrap_or_else(|| {
            warn!(job_id = %self.id, state = %self.state, "Unknown job state, treating as FAILED");
            JobState::Failed
        });

        // Unparseable payload reaches the handler as null and fails validation there
        let payload: serde_json::Value =
            serde_json::from_str(&self.payload).unwrap_or(serde_json::Value::Null);

        Job {
            id: self.id,
            queue: self.queue,
            job_type: JobType::new(self.job_type),
            state,
            payload: JobPayload::new(payload),
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            backoff_factor: self.backoff_factor,
            run_at: self.run_at,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            last_error: self.last_error,
        }
    }
}
