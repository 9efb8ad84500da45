// Domain Layer - Pure business logic and entities

pub mod assignor;
pub mod batch;
pub mod error;
pub mod job;
pub mod payable;

// Re-exports
pub use assignor::{Assignor, NewAssignor};
pub use batch::{
    Batch, BatchAccepted, EnqueueOptions, EnqueuedJob, ASSIGNOR_NOT_FOUND, BATCH_CREATE_ATTEMPTS,
    BATCH_CREATE_JOB, PAYABLE_QUEUE,
};
pub use error::DomainError;
pub use job::{Job, JobId, JobPayload, JobState, JobType, QueueId};
pub use payable::{
    AssignorId, Page, Payable, PayableDraft, PayableFilter, PayableId, PayablePatch,
    DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE, MAX_VALUE_IN_CENTS,
};
