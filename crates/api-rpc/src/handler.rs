//! RPC Method Handlers
//!
//! Thin adapters from request types to the application services.

use crate::error::to_rpc_error;
use crate::types::{
    BatchCreateRequest, FindAllRequest, IdRequest, MessageResponse, QueueStatsResponse,
    UpdatePayableRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use payables_core::application::{AssignorService, IngestionPipeline, PayableService};
use payables_core::domain::{
    Assignor, BatchAccepted, JobState, NewAssignor, Page, Payable, PayableDraft, PayableFilter,
    DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE, PAYABLE_QUEUE,
};
use payables_core::error::AppError;
use payables_core::port::JobRepository;
use std::sync::Arc;

pub const PAYABLE_DELETED: &str = "Payable deleted with success";
pub const ASSIGNOR_DELETED: &str = "Assignor deleted with success";

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    pipeline: Arc<IngestionPipeline>,
    payables: Arc<PayableService>,
    assignors: Arc<AssignorService>,
    job_repo: Arc<dyn JobRepository>,
}

impl RpcHandler {
    pub fn new(
        pipeline: Arc<IngestionPipeline>,
        payables: Arc<PayableService>,
        assignors: Arc<AssignorService>,
        job_repo: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            pipeline,
            payables,
            assignors,
            job_repo,
        }
    }

    /// payable.batch_create.v1
    pub async fn batch_create(&self, params: BatchCreateRequest) -> RpcResult<BatchAccepted> {
        self.pipeline
            .batch_create(params.payables)
            .await
            .map_err(to_rpc_error)
    }

    /// payable.create.v1
    pub async fn create_payable(&self, draft: PayableDraft) -> RpcResult<Payable> {
        self.payables.create(draft).await.map_err(to_rpc_error)
    }

    /// payable.find_one.v1
    pub async fn find_payable(&self, params: IdRequest) -> RpcResult<Option<Payable>> {
        self.payables
            .find_one(&params.id)
            .await
            .map_err(to_rpc_error)
    }

    /// payable.find_all.v1
    pub async fn find_all_payables(&self, params: FindAllRequest) -> RpcResult<Vec<Payable>> {
        let page = Page::new(
            params.page.unwrap_or(DEFAULT_PAGE),
            params.items_per_page.unwrap_or(DEFAULT_ITEMS_PER_PAGE),
        )
        .map_err(|e| to_rpc_error(AppError::from(e)))?;
        let filter = PayableFilter {
            assignor_id: params.assignor_id,
        };

        self.payables
            .find_all(filter, page)
            .await
            .map_err(to_rpc_error)
    }

    /// payable.update.v1
    pub async fn update_payable(&self, params: UpdatePayableRequest) -> RpcResult<Payable> {
        self.payables
            .update(&params.id, params.data)
            .await
            .map_err(to_rpc_error)
    }

    /// payable.remove.v1
    pub async fn remove_payable(&self, params: IdRequest) -> RpcResult<MessageResponse> {
        self.payables
            .remove(&params.id)
            .await
            .map_err(to_rpc_error)?;
        Ok(MessageResponse::new(PAYABLE_DELETED))
    }

    /// assignor.create.v1
    pub async fn create_assignor(&self, req: NewAssignor) -> RpcResult<Assignor> {
        self.assignors.register(req).await.map_err(to_rpc_error)
    }

    /// assignor.find_one.v1
    pub async fn find_assignor(&self, params: IdRequest) -> RpcResult<Option<Assignor>> {
        self.assignors
            .find_one(&params.id)
            .await
            .map_err(to_rpc_error)
    }

    /// assignor.remove.v1
    pub async fn remove_assignor(&self, params: IdRequest) -> RpcResult<MessageResponse> {
        self.assignors
            .remove(&params.id)
            .await
            .map_err(to_rpc_error)?;
        Ok(MessageResponse::new(ASSIGNOR_DELETED))
    }

    /// admin.queue_stats.v1
    pub async fn queue_stats(&self) -> RpcResult<QueueStatsResponse> {
        Ok(QueueStatsResponse {
            queue: PAYABLE_QUEUE.to_string(),
            queued: self.count(JobState::Queued).await?,
            running: self.count(JobState::Running).await?,
            done: self.count(JobState::Done).await?,
            failed: self.count(JobState::Failed).await?,
        })
    }

    async fn count(&self, state: JobState) -> RpcResult<i64> {
        self.job_repo
            .count_by_state(PAYABLE_QUEUE, state)
            .await
            .map_err(to_rpc_error)
    }
}
