// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("batch operation restricted to a single assignor")]
    MixedAssignors,

    #[error("batch must contain at least one payable")]
    EmptyBatch,

    #[error("valueInCents out of range: {0}")]
    ValueOutOfRange(u64),

    #[error("invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("record {0} is already deleted")]
    AlreadyDeleted(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
