//! # Handoff Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HandoffError                                     │
//! │                                                                         │
//! │  Input            InvalidArgument, NotFound                            │
//! │  Coordination     AlreadyInFlight                                      │
//! │  Collaborators    Unavailable (retryable), Rejected                    │
//! │  Outcome          DependencyFailure    nothing changed                 │
//! │                   ReconciliationRequired  audited, status not updated  │
//! │  Configuration    InvalidConfig, ConfigLoadFailed, ConfigSaveFailed    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collaborators report `Unavailable` or `Rejected`; the desk turns those
//! into one of the two outcome variants before returning to its caller.

use thiserror::Error;
use unimart_core::{CoreError, HandoffAction};
use unimart_db::DbError;

/// Result type alias for handoff operations.
pub type HandoffResult<T> = Result<T, HandoffError>;

#[derive(Debug, Error)]
pub enum HandoffError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Caller input failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // =========================================================================
    // Coordination Errors
    // =========================================================================
    /// The same scan is being confirmed by another request right now.
    #[error("Handoff {key} is already being processed")]
    AlreadyInFlight { key: String },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// A collaborator is temporarily unreachable.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    /// A collaborator refused or failed the call.
    #[error("{service} rejected the request: {reason}")]
    Rejected { service: String, reason: String },

    // =========================================================================
    // Handoff Outcomes
    // =========================================================================
    /// A collaborator failed before anything was changed.
    #[error("{service} failed, order left untouched: {reason}")]
    DependencyFailure { service: String, reason: String },

    /// The audit entry exists but the status update never landed.
    #[error(
        "Order {order_id} {action} was audited ({tx_hash}) but its status was not updated: {reason}"
    )]
    ReconciliationRequired {
        order_id: String,
        action: HandoffAction,
        tx_hash: String,
        reason: String,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid desk configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Internal desk error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandoffError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        HandoffError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn unavailable(service: impl Into<String>, reason: impl ToString) -> Self {
        HandoffError::Unavailable {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    pub fn rejected(service: impl Into<String>, reason: impl ToString) -> Self {
        HandoffError::Rejected {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the failed call may succeed when repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HandoffError::Unavailable { .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            HandoffError::InvalidConfig(_)
                | HandoffError::ConfigLoadFailed(_)
                | HandoffError::ConfigSaveFailed(_)
        )
    }

    /// Re-labels a collaborator failure as "nothing was changed".
    pub(crate) fn into_dependency_failure(self, service: &str) -> Self {
        match self {
            HandoffError::Unavailable { reason, .. } | HandoffError::Rejected { reason, .. } => {
                HandoffError::DependencyFailure {
                    service: service.to_string(),
                    reason,
                }
            }
            HandoffError::NotFound { .. }
            | HandoffError::InvalidArgument(_)
            | HandoffError::DependencyFailure { .. } => self,
            other => HandoffError::DependencyFailure {
                service: service.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for HandoffError {
    fn from(err: CoreError) -> Self {
        if err.is_invalid_argument() {
            HandoffError::InvalidArgument(err.to_string())
        } else {
            HandoffError::Internal(err.to_string())
        }
    }
}

impl From<DbError> for HandoffError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HandoffError::NotFound { entity, id },
            e if e.is_transient() => HandoffError::unavailable("database", e),
            e => HandoffError::rejected("database", e),
        }
    }
}

impl From<std::io::Error> for HandoffError {
    fn from(err: std::io::Error) -> Self {
        HandoffError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for HandoffError {
    fn from(err: toml::de::Error) -> Self {
        HandoffError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for HandoffError {
    fn from(err: toml::ser::Error) -> Self {
        HandoffError::ConfigSaveFailed(err.to_string())
    }
}
