//! # API Error Type
//!
//! Unified error type for desk commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command Function  ──►  Result<T, ApiError>                             │
//! │                                                                         │
//! │  ValidationError / CoreError ──┐                                        │
//! │  DbError ──────────────────────┼──► ApiError { code, message }          │
//! │  HandoffError ─────────────────┘          │                             │
//! │                                           ▼                             │
//! │                         stderr: {"code":"NOT_FOUND","message":"..."}    │
//! │                         exit code 1                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every code carries the HTTP status a web front end would answer with, so
//! a server wrapping these commands needs no second mapping.

use serde::Serialize;
use tracing::error;
use unimart_core::{CoreError, ValidationError};
use unimart_db::DbError;
use unimart_handoff::HandoffError;

/// API error returned from desk commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "RECONCILIATION_REQUIRED",
///   "message": "Order ord-1 handoff was audited (ab12..) but its status was not updated: ..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller input failed validation (400)
    InvalidArgument,

    /// Order or cart item not found (404)
    NotFound,

    /// The same scan is being confirmed right now (409)
    AlreadyInFlight,

    /// Audit or order service failed, nothing changed (502)
    DependencyFailure,

    /// Audit recorded but the order status was not updated (500)
    ReconciliationRequired,

    /// Anything else (500)
    Unexpected,
}

impl ErrorCode {
    /// HTTP status equivalent.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidArgument => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::AlreadyInFlight => 409,
            ErrorCode::DependencyFailure => 502,
            ErrorCode::ReconciliationRequired | ErrorCode::Unexpected => 500,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidArgument, message)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an unexpected error and logs it.
    pub fn unexpected(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(%message, "Unexpected desk error");
        ApiError::new(ErrorCode::Unexpected, message)
    }

    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_argument(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            e if e.is_invalid_argument() => ApiError::invalid_argument(e.to_string()),
            e => ApiError::unexpected(e.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::invalid_argument(format!("{} '{}' already exists", field, value))
            }
            DbError::ConstraintViolation { message } => ApiError::invalid_argument(message),
            e => {
                // Log the actual error but return a generic message
                error!(error = %e, "Database operation failed");
                ApiError::new(ErrorCode::Unexpected, "Database operation failed")
            }
        }
    }
}

impl From<HandoffError> for ApiError {
    fn from(err: HandoffError) -> Self {
        let message = err.to_string();
        match err {
            HandoffError::InvalidArgument(_) => ApiError::invalid_argument(message),
            HandoffError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            HandoffError::AlreadyInFlight { .. } => {
                ApiError::new(ErrorCode::AlreadyInFlight, message)
            }
            HandoffError::DependencyFailure { .. }
            | HandoffError::Unavailable { .. }
            | HandoffError::Rejected { .. } => ApiError::new(ErrorCode::DependencyFailure, message),
            HandoffError::ReconciliationRequired { .. } => {
                error!(%message, "Handoff needs reconciliation");
                ApiError::new(ErrorCode::ReconciliationRequired, message)
            }
            e if e.is_config_error() => ApiError::invalid_argument(message),
            _ => ApiError::unexpected(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use unimart_core::HandoffAction;

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Order", "ord-9");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: ord-9");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn test_handoff_error_codes() {
        let cases = [
            (HandoffError::InvalidArgument("bad".into()), ErrorCode::InvalidArgument, 400),
            (HandoffError::AlreadyInFlight { key: "o:handoff".into() }, ErrorCode::AlreadyInFlight, 409),
            (
                HandoffError::DependencyFailure { service: "audit".into(), reason: "down".into() },
                ErrorCode::DependencyFailure,
                502,
            ),
            (
                HandoffError::ReconciliationRequired {
                    order_id: "o".into(),
                    action: HandoffAction::Pickup,
                    tx_hash: "abc".into(),
                    reason: "timeout".into(),
                },
                ErrorCode::ReconciliationRequired,
                500,
            ),
            (HandoffError::Internal("boom".into()), ErrorCode::Unexpected, 500),
        ];

        for (err, code, status) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.code, code);
            assert_eq!(api.http_status(), status);
        }
    }

    #[test]
    fn test_reconciliation_message_keeps_hash() {
        let api = ApiError::from(HandoffError::ReconciliationRequired {
            order_id: "ord-1".into(),
            action: HandoffAction::Handoff,
            tx_hash: "deadbeef".into(),
            reason: "orders unavailable".into(),
        });
        assert!(api.message.contains("deadbeef"));
    }

    #[test]
    fn test_core_and_db_errors() {
        let api = ApiError::from(CoreError::MalformedScan("eof".into()));
        assert_eq!(api.code, ErrorCode::InvalidArgument);

        let api = ApiError::from(DbError::not_found("CartItem", "c-1"));
        assert_eq!(api.code, ErrorCode::NotFound);

        let api = ApiError::from(DbError::ConstraintViolation {
            message: "quantity cannot go below 1".into(),
        });
        assert_eq!(api.code, ErrorCode::InvalidArgument);
        assert_eq!(api.message, "quantity cannot go below 1");

        let api = ApiError::from(DbError::QueryFailed("disk I/O error".into()));
        assert_eq!(api.code, ErrorCode::Unexpected);
        assert_eq!(api.message, "Database operation failed");
    }
}
