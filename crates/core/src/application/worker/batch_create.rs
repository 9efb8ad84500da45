// Batch Create Handler - worker side of "batch-create" jobs

use crate::domain::{Batch, Job, Payable, BATCH_CREATE_JOB};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobHandler, PayableStore, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Persists every draft of a batch, attributed to the worker actor.
///
/// The whole batch is written in one store transaction, so a redelivered job
/// after a failed attempt never finds half a batch already stored. The
/// assignor is not re-checked: the pipeline vetted it at acceptance time.
pub struct BatchCreateHandler {
    store: Arc<dyn PayableStore>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    actor: String,
}

impl BatchCreateHandler {
    pub fn new(
        store: Arc<dyn PayableStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            store,
            id_provider,
            time_provider,
            actor: actor.into(),
        }
    }
}

#[async_trait]
impl JobHandler for BatchCreateHandler {
    fn job_type(&self) -> &str {
        BATCH_CREATE_JOB
    }

    async fn handle(&self, job: &Job) -> Result<()> {
        let batch: Batch = serde_json::from_value(job.payload.as_value().clone())
            .map_err(|e| AppError::Validation(format!("invalid batch payload: {}", e)))?;

        let now = self.time_provider.now_millis();
        let assignor_id = batch.assignor_id().to_string();
        let payables: Vec<Payable> = batch
            .into_drafts()
            .into_iter()
            .map(|draft| {
                Payable::from_draft(self.id_provider.generate_id(), draft, &self.actor, now)
            })
            .collect();

        self.store.insert_many(&payables).await?;

        info!(
            job_id = %job.id,
            assignor_id = %assignor_id,
            stored = payables.len(),
            "Batch persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobPayload, JobType, PayableDraft};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::payable_store::mocks::InMemoryPayableStore;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::ErrorKind;

    fn handler(store: Arc<InMemoryPayableStore>) -> BatchCreateHandler {
        BatchCreateHandler::new(
            store,
            Arc::new(SequentialIdProvider::new("payable")),
            Arc::new(FixedTimeProvider::new(42_000)),
            "batch-worker",
        )
    }

    fn job_for(payload: serde_json::Value) -> Job {
        Job::new_test("payable", JobType::new(BATCH_CREATE_JOB), JobPayload::new(payload))
    }

    #[tokio::test]
    async fn test_persists_all_drafts_in_order() {
        let store = Arc::new(InMemoryPayableStore::new());
        let batch = Batch::new(vec![
            PayableDraft::new("A", "2024-01-01", 10_000),
            PayableDraft::new("A", "2024-01-02", 20_000),
        ])
        .unwrap();
        let job = job_for(serde_json::to_value(&batch).unwrap());

        handler(store.clone()).handle(&job).await.unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(store.write_calls(), 1, "one transactional write per batch");
        assert_eq!(rows[0].value_in_cents, 10_000);
        assert_eq!(rows[1].value_in_cents, 20_000);
        for row in &rows {
            assert_eq!(row.assignor_id, "A");
            assert_eq!(row.created_by, "batch-worker");
            assert_eq!(row.updated_by, "batch-worker");
            assert_eq!(row.created_at, 42_000);
        }
    }

    #[tokio::test]
    async fn test_store_failure_leaves_nothing_behind() {
        let store = Arc::new(InMemoryPayableStore::new());
        store.fail_next_writes(1);
        let batch = Batch::new(vec![PayableDraft::new("A", "2024-01-01", 1)]).unwrap();
        let job = job_for(serde_json::to_value(&batch).unwrap());

        let err = handler(store.clone()).handle(&job).await.unwrap_err();

        assert!(err.is_infrastructure());
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_not_retryable() {
        let store = Arc::new(InMemoryPayableStore::new());
        let job = job_for(serde_json::json!({"not": "a batch"}));

        let err = handler(store.clone()).handle(&job).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.is_retryable());
        assert_eq!(store.write_calls(), 0);
    }
}
