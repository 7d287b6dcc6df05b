//! # unimart-db: Database Layer for UniMart
//!
//! SQLite storage for the post-office desk, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        UniMart Data Flow                                │
//! │                                                                         │
//! │  HandoffDesk / desk commands                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    unimart-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo     │    │ 001_initial_ │  │   │
//! │  │   │ SqlitePool    │◄───│ CartRepo      │    │   schema.sql │  │   │
//! │  │   │ Audit lock    │    │ AuditRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (unimart.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unimart_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("unimart.db")).await?;
//! let removed = db.cart().clear_for_user("user-1").await?;
//! let report = db.audit_log().verify_chain().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::audit::{AuditEntry, AuditRepository, ChainVerification, GENESIS_HASH};
pub use repository::cart::CartRepository;
pub use repository::order::OrderRepository;
