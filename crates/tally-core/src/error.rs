//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Operator     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed stored values are never errors here: they are coerced to safe
//! defaults so that the ledger always renders.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale was completed with nothing in it.
    #[error("No items in sale")]
    EmptySale,

    /// Credit sales must name the customer who owes the money.
    #[error("Customer name is required for credit sales")]
    CustomerRequired,

    /// Cancellation is a one-way tombstone.
    #[error("Transaction {0} is already cancelled")]
    AlreadyCancelled(String),

    /// Receipt/invoice numbers do not match the payment method and type.
    ///
    /// ## When This Occurs
    /// - A cash sale carries an invoice number
    /// - A credit sale has no invoice number
    /// - A cash-in/cash-out voucher has no receipt number
    #[error("Transaction {id} has inconsistent document numbers: {reason}")]
    DocumentNumberMismatch { id: String, reason: String },

    /// Stored total is not the sum of its line subtotals.
    #[error("Transaction {id} total {total} does not equal line sum {expected}")]
    TotalMismatch {
        id: String,
        total: i64,
        expected: i64,
    },

    /// A document number string is not `YYMMDDNNNN`.
    #[error("Invalid document number: {0}")]
    InvalidDocumentNumber(String),

    /// The four-digit daily sequence ran out.
    #[error("Daily sequence exhausted for {day}: {sequence} exceeds 9999")]
    SequenceExhausted { day: String, sequence: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage call; nothing is mutated when one is returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparsable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TotalMismatch {
            id: "tx_1".to_string(),
            total: 700,
            expected: 650,
        };
        assert_eq!(
            err.to_string(),
            "Transaction tx_1 total 700 does not equal line sum 650"
        );

        assert_eq!(
            CoreError::CustomerRequired.to_string(),
            "Customer name is required for credit sales"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "reason".to_string(),
        };
        assert_eq!(err.to_string(), "reason is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
