// Batch Ingestion Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::job::JobType;
use crate::domain::payable::PayableDraft;
use serde::{Deserialize, Deserializer, Serialize};

/// Job name used for batch ingestion
pub const BATCH_CREATE_JOB: &str = "batch-create";

/// Attempt budget for batch ingestion jobs. Fixed; never varied per call.
pub const BATCH_CREATE_ATTEMPTS: u32 = 3;

/// Queue carrying payable jobs
pub const PAYABLE_QUEUE: &str = "payable";

/// Fixed message for a batch whose assignor is absent or deleted
pub const ASSIGNOR_NOT_FOUND: &str = "assignor not found, operation canceled";

/// Non-empty, single-assignor sequence of drafts.
///
/// Holding a `Batch` proves both invariants; draft order is kept as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Batch(Vec<PayableDraft>);

impl Batch {
    /// Validate homogeneity, then that every draft is storable. Pure, no I/O.
    pub fn new(drafts: Vec<PayableDraft>) -> Result<Self> {
        let first = drafts.first().ok_or(DomainError::EmptyBatch)?;
        if drafts
            .iter()
            .any(|draft| draft.assignor_id != first.assignor_id)
        {
            return Err(DomainError::MixedAssignors);
        }
        for draft in &drafts {
            draft.validate()?;
        }
        Ok(Self(drafts))
    }

    /// The assignor every draft is scoped to
    pub fn assignor_id(&self) -> &str {
        &self.0[0].assignor_id
    }

    pub fn drafts(&self) -> &[PayableDraft] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_drafts(self) -> Vec<PayableDraft> {
        self.0
    }
}

impl TryFrom<Vec<PayableDraft>> for Batch {
    type Error = DomainError;

    fn try_from(drafts: Vec<PayableDraft>) -> Result<Self> {
        Self::new(drafts)
    }
}

// Payloads read back from the queue go through the same gate
impl<'de> Deserialize<'de> for Batch {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let drafts = Vec::<PayableDraft>::deserialize(deserializer)?;
        Batch::new(drafts).map_err(serde::de::Error::custom)
    }
}

/// Delivery options handed to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueOptions {
    pub attempts: u32,
}

/// Unit of work handed to the batch queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueuedJob {
    name: JobType,
    payload: Batch,
    options: EnqueueOptions,
}

impl EnqueuedJob {
    /// The only way to build a job: name and attempt budget are fixed.
    pub fn batch_create(batch: Batch) -> Self {
        Self {
            name: JobType::new(BATCH_CREATE_JOB),
            payload: batch,
            options: EnqueueOptions {
                attempts: BATCH_CREATE_ATTEMPTS,
            },
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn payload(&self) -> &Batch {
        &self.payload
    }

    pub fn options(&self) -> EnqueueOptions {
        self.options
    }
}

/// Acknowledgment of a batch: accepted for processing, NOT stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAccepted {
    pub success: bool,
}

impl BatchAccepted {
    pub fn accepted() -> Self {
        Self { success: true }
    }
}
