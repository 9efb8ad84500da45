// Batch Create Use Case

use crate::domain::{Batch, BatchAccepted, EnqueuedJob, PayableDraft, ASSIGNOR_NOT_FOUND};
use crate::error::{AppError, Result};
use crate::port::{AssignorLookup, BatchQueue};
use tracing::{info, warn};

/// Execute batch ingestion
///
/// 1. Homogeneity and storable values (no I/O before this passes)
/// 2. Assignor existence: one lookup for the whole batch
/// 3. Enqueue one "batch-create" job with 3 attempts
/// 4. Acknowledge: accepted for processing, not stored
///
/// Steps 1 and 2 reject the whole batch. A queue rejection surfaces as
/// `AppError::Queue` and is not retried here.
///
/// # Arguments
///
/// * `assignors` - Assignor existence lookup
/// * `queue` - Batch queue
/// * `drafts` - Submitted drafts, in order
pub async fn execute(
    assignors: &dyn AssignorLookup,
    queue: &dyn BatchQueue,
    drafts: Vec<PayableDraft>,
) -> Result<BatchAccepted> {
    let batch = Batch::new(drafts).map_err(|e| {
        warn!(error = %e, "Batch rejected by validation");
        AppError::from(e)
    })?;

    let assignor_id = batch.assignor_id().to_string();
    let batch_size = batch.len();

    if !assignors.exists(&assignor_id).await? {
        warn!(assignor_id = %assignor_id, batch_size, "Batch rejected: assignor absent");
        return Err(AppError::NotFound(ASSIGNOR_NOT_FOUND.to_string()));
    }

    let job_id = queue.enqueue(EnqueuedJob::batch_create(batch)).await?;

    info!(
        job_id = %job_id,
        assignor_id = %assignor_id,
        batch_size,
        "Batch accepted for processing"
    );

    Ok(BatchAccepted::accepted())
}
