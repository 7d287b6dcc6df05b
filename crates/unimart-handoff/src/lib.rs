//! # UniMart Handoff
//!
//! Post-office desk service: turns a scanned QR code into an audited order
//! status change.
//!
//! ## Modules
//! - [`desk`]: `HandoffDesk`, inspect and confirm
//! - [`collaborators`]: audit ledger and order service seams
//! - [`config`]: desk configuration (TOML + environment)
//! - [`error`]: `HandoffError`
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("unimart.db")).await?;
//! let desk = HandoffDesk::new(
//!     Arc::new(SqliteAuditLedger::new(db.clone())),
//!     Arc::new(SqliteOrderService::new(db.clone())),
//!     config.retry.clone(),
//! );
//!
//! let inspection = desk.inspect(raw_qr).await?;
//! let outcome = desk.confirm(&inspection.scan, &operator).await?;
//! ```

pub mod collaborators;
pub mod config;
pub mod desk;
pub mod error;

pub use collaborators::{
    AuditLedger, LedgerRecord, OrderService, SqliteAuditLedger, SqliteOrderService,
};
pub use config::{DatabaseSettings, DeskConfig, DeskSettings, RetrySettings};
pub use desk::{HandoffDesk, HandoffOutcome, Inspection, OperatorContext};
pub use error::{HandoffError, HandoffResult};
