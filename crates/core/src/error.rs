// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classes exposed to callers.
///
/// Input problems (`Validation`, `NotFound`, `Unauthorized`) are final for a
/// given request; `Infrastructure` means the request may succeed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Infrastructure,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(_) | AppError::Validation(_) | AppError::Serialization(_) => {
                ErrorKind::Validation
            }
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Database(_) | AppError::Queue(_) => ErrorKind::Infrastructure,
            AppError::Config(_) | AppError::InvalidState(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Store or queue unreachable / rejecting work
    pub fn is_infrastructure(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }

    /// Whether a background job failing with this error is worth another attempt.
    /// A payload that does not validate now never will.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Validation)
    }

    /// Message without the variant prefix, suitable for API clients
    pub fn public_message(&self) -> String {
        match self {
            AppError::Domain(e) => e.to_string(),
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Database(msg)
            | AppError::Queue(msg)
            | AppError::Config(msg)
            | AppError::InvalidState(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Serialization(e) => e.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in the infra-sqlite crate
// by converting to AppError::Database(String)
