//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes. 4xxx codes are caller
//! mistakes, 5xxx codes are failures on our side.

use jsonrpsee::types::ErrorObjectOwned;
use payables_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const UNAUTHORIZED: i32 = 4010;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const QUEUE_ERROR: i32 = 5003;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = match &err {
        AppError::Domain(_) | AppError::Validation(_) | AppError::Serialization(_) => {
            code::VALIDATION_ERROR
        }
        AppError::NotFound(_) => code::NOT_FOUND,
        AppError::Unauthorized(_) => code::UNAUTHORIZED,
        AppError::Database(_) => code::DB_ERROR,
        AppError::Queue(_) => code::QUEUE_ERROR,
        AppError::Config(_) | AppError::InvalidState(_) | AppError::Internal(_) => {
            code::INTERNAL_ERROR
        }
    };
    ErrorObjectOwned::owned(code, err.public_message(), None::<()>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use payables_core::domain::DomainError;

    #[test]
    fn test_input_errors_are_4xxx() {
        let err = to_rpc_error(AppError::Domain(DomainError::MixedAssignors));
        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert_eq!(err.message(), "batch operation restricted to a single assignor");

        let err = to_rpc_error(AppError::NotFound("payable not found".to_string()));
        assert_eq!(err.code(), code::NOT_FOUND);
        assert_eq!(err.message(), "payable not found");

        let err = to_rpc_error(AppError::Unauthorized("assignor does not exist".to_string()));
        assert_eq!(err.code(), code::UNAUTHORIZED);
    }

    #[test]
    fn test_infrastructure_errors_are_5xxx() {
        assert_eq!(
            to_rpc_error(AppError::Database("locked".to_string())).code(),
            code::DB_ERROR
        );
        assert_eq!(
            to_rpc_error(AppError::Queue("down".to_string())).code(),
            code::QUEUE_ERROR
        );
        assert_eq!(
            to_rpc_error(AppError::Internal("boom".to_string())).code(),
            code::INTERNAL_ERROR
        );
    }
}
