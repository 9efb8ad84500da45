//! Shared wiring for the integration suites

#![allow(dead_code)]

use payables_core::application::{
    BatchCreateHandler, IngestionPipeline, PayableService, RetryPolicy, Worker,
};
use payables_core::domain::{Assignor, NewAssignor, PayableDraft, PAYABLE_QUEUE};
use payables_core::port::id_provider::mocks::SequentialIdProvider;
use payables_core::port::time_provider::mocks::FixedTimeProvider;
use payables_core::port::{AssignorRepository, JobHandler, PayableStore};
use payables_infra_sqlite::{
    create_pool, run_migrations, SqliteAssignorRepository, SqliteJobQueue, SqlitePayableStore,
};
use sqlx::SqlitePool;
use std::sync::Arc;

pub const START_MILLIS: i64 = 1_700_000_000_000;

pub struct Harness {
    pub pool: SqlitePool,
    pub clock: Arc<FixedTimeProvider>,
    pub ids: Arc<SequentialIdProvider>,
    pub store: Arc<SqlitePayableStore>,
    pub assignors: Arc<SqliteAssignorRepository>,
    pub queue: Arc<SqliteJobQueue>,
    pub pipeline: IngestionPipeline,
}

impl Harness {
    pub async fn in_memory() -> Self {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let clock = Arc::new(FixedTimeProvider::new(START_MILLIS));
        let ids = Arc::new(SequentialIdProvider::new(format!("id-{}", uuid::Uuid::new_v4())));
        let store = Arc::new(SqlitePayableStore::new(pool.clone()));
        let assignors = Arc::new(SqliteAssignorRepository::new(pool.clone()));
        let queue = Arc::new(SqliteJobQueue::new(pool.clone(), ids.clone(), clock.clone()));
        let pipeline = IngestionPipeline::new(assignors.clone(), queue.clone());

        Self {
            pool,
            clock,
            ids,
            store,
            assignors,
            queue,
            pipeline,
        }
    }

    pub async fn register_assignor(&self, id: &str) {
        let assignor = Assignor::register(
            id,
            NewAssignor {
                document: format!("doc-{}", id),
                email: format!("{}@example.com", id),
                phone: "5511999999999".to_string(),
                name: format!("Assignor {}", id),
            },
            START_MILLIS,
        );
        self.assignors.insert(&assignor).await.unwrap();
    }

    pub fn payable_service(&self, actor: &str) -> PayableService {
        PayableService::new(
            self.store.clone(),
            self.assignors.clone(),
            self.ids.clone(),
            self.clock.clone(),
            actor,
        )
    }

    /// Worker persisting through `store` (defaults to the SQLite store)
    pub fn worker_with_store(&self, store: Arc<dyn PayableStore>) -> Worker {
        let handlers: Vec<Arc<dyn JobHandler>> = vec![Arc::new(BatchCreateHandler::new(
            store,
            self.ids.clone(),
            self.clock.clone(),
            "batch-worker",
        ))];
        Worker::new(
            PAYABLE_QUEUE,
            self.queue.clone(),
            handlers,
            Arc::new(RetryPolicy::new(self.clock.clone(), 1_000)),
            self.clock.clone(),
        )
    }

    pub fn worker(&self) -> Worker {
        self.worker_with_store(self.store.clone())
    }

    /// Process until nothing is due, jumping the clock over backoff delays
    pub async fn drain(&self, worker: &Worker) {
        for _ in 0..20 {
            if !worker.process_next_job().await.unwrap() {
                self.clock.advance(60_000);
            }
        }
    }
}

pub fn drafts(assignor: &str, values: &[u64]) -> Vec<PayableDraft> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| PayableDraft::new(assignor, format!("2024-07-{:02}", i + 1), *v))
        .collect()
}

pub fn temp_db_url(name: &str) -> (String, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("payables-{}-{}.db", name, uuid::Uuid::new_v4()));
    (format!("sqlite://{}", path.display()), path)
}
