// Ingestion Pipeline - validation gate in front of the batch queue

pub mod batch_create;

use crate::domain::{BatchAccepted, PayableDraft};
use crate::error::Result;
use crate::port::{AssignorLookup, BatchQueue};
use std::sync::Arc;

/// Stateless pipeline; safe to share across concurrent callers.
///
/// Never writes to the payable store itself: accepted batches are persisted
/// later by the worker consuming the queue.
pub struct IngestionPipeline {
    assignors: Arc<dyn AssignorLookup>,
    queue: Arc<dyn BatchQueue>,
}

impl IngestionPipeline {
    pub fn new(assignors: Arc<dyn AssignorLookup>, queue: Arc<dyn BatchQueue>) -> Self {
        Self { assignors, queue }
    }

    /// Validate and hand off a batch; see [`batch_create::execute`]
    pub async fn batch_create(&self, drafts: Vec<PayableDraft>) -> Result<BatchAccepted> {
        batch_create::execute(self.assignors.as_ref(), self.queue.as_ref(), drafts).await
    }
}
