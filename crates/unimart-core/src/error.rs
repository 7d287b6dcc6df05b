//! # Error Types
//!
//! Domain-specific error types for unimart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  unimart-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  unimart-db errors       → DbError                                     │
//! │  unimart-handoff errors  → HandoffError                                │
//! │  apps/desk               → ApiError (what the caller sees)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → HandoffError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A computed fee came out larger than the amount it was taken from.
    ///
    /// The split formulas cannot produce this for non-negative input; it
    /// exists so a broken rate table surfaces as an error rather than a
    /// negative vendor payout.
    #[error("Fee {fee} exceeds amount {amount}")]
    FeeExceedsAmount { fee: i64, amount: i64 },

    /// The scanned QR payload could not be decoded.
    #[error("Malformed scan payload: {0}")]
    MalformedScan(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true when the error was caused by caller input.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CoreError::MalformedScan(_) | CoreError::Validation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These map to `INVALID_ARGUMENT` at the boundary.
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

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
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
        let err = CoreError::FeeExceedsAmount { fee: 120, amount: 100 };
        assert_eq!(err.to_string(), "Fee 120 exceeds amount 100");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "user_id".to_string(),
        };
        assert_eq!(err.to_string(), "user_id is required");

        let err = ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 0,
            max: 10,
        };
        assert_eq!(err.to_string(), "amount must be between 0 and 10");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "order_id".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_invalid_argument());
        assert!(!CoreError::FeeExceedsAmount { fee: 1, amount: 0 }.is_invalid_argument());
    }
}
