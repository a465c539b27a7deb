//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation Error? ─── ValidationError / CoreError ──► VALIDATION_ERROR │
//! │         │              (raised before any storage call)                 │
//! │         ▼                                                               │
//! │  Storage Error? ────── DbError ──────────────────────► DATABASE_ERROR   │
//! │         │              (logged, underlying message kept)                │
//! │         ▼                                                               │
//! │  Success ─────────────────────────────────────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is retried here. A failed action is reported and the operator
//! repeats it.

use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;
use thiserror::Error;

/// API error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Transaction not found: tx_123"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Storage operation failed
    DatabaseError,

    /// Business rule violated (e.g. cancelling twice)
    BusinessLogic,

    /// Internal error
    Internal,

    /// Current-sale operation failed
    CartError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts database errors to API errors.
///
/// Storage failures keep their underlying message so the operator sees what
/// went wrong.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                tracing::error!(%field, %value, "Duplicate record rejected by storage");
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("{} '{}' already exists", field, value),
                )
            }
            other => {
                tracing::error!(error = %other, transient = other.is_transient(), "Storage operation failed");
                ApiError::new(ErrorCode::DatabaseError, other.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptySale => ApiError::cart(err.to_string()),
            CoreError::CustomerRequired | CoreError::InvalidDocumentNumber(_) => {
                ApiError::validation(err.to_string())
            }
            CoreError::Validation(e) => ApiError::from(e),
            CoreError::AlreadyCancelled(_)
            | CoreError::DocumentNumberMismatch { .. }
            | CoreError::TotalMismatch { .. }
            | CoreError::SequenceExhausted { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Result type for terminal commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_in_screaming_snake_case() {
        let err = ApiError::not_found("Transaction", "tx_1");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Transaction not found: tx_1");
    }

    #[test]
    fn test_storage_errors_keep_their_message() {
        let err = ApiError::from(DbError::ConnectionFailed("Pool is closed".to_string()));

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("Pool is closed"));
    }

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(ApiError::from(CoreError::EmptySale).code, ErrorCode::CartError);
        assert_eq!(
            ApiError::from(CoreError::CustomerRequired).code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            ApiError::from(CoreError::AlreadyCancelled("tx_1".into())).code,
            ErrorCode::BusinessLogic
        );

        let wrapped = CoreError::from(ValidationError::MustBePositive {
            field: "amount".into(),
        });
        let err = ApiError::from(wrapped);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "amount must be positive");
    }
}
