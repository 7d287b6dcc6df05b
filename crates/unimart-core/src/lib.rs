//! # unimart-core: Pure Business Logic for UniMart
//!
//! Settlement and handoff rules for the campus marketplace, written as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        UniMart Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Storefront / Post-Office Scanner (web)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            apps/desk (commands) + unimart-handoff               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ unimart-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌──────────┐ ┌───────────┐ ┌────────────────┐  │   │
//! │  │  │ commission │ │  split   │ │  handoff  │ │   validation   │  │   │
//! │  │  │ tiers+floor│ │ 2.5%+100 │ │ soft gate │ │  ids, amounts  │  │   │
//! │  │  └────────────┘ └──────────┘ └───────────┘ └────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` (whole Naira) and `Rate` (basis points)
//! - [`commission`] - Category-tiered commission with a minimum floor
//! - [`split`] - Platform fee / vendor payout split
//! - [`handoff`] - Scan parsing and the handoff/pickup status check
//! - [`types`] - Domain types (Order, CartItem, AuditEvent, ...)
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use unimart_core::{calculate_commission, calculate_split, Money};
//!
//! let commission = calculate_commission("Electronics", Money::from_naira(10_000)).unwrap();
//! assert_eq!(commission.naira(), 900);
//!
//! let split = calculate_split(Money::from_naira(2_000)).unwrap();
//! assert_eq!(split.platform_fee, 150);
//! assert_eq!(split.vendor_amount, 1_850);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod error;
pub mod handoff;
pub mod money;
pub mod split;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use commission::{
    calculate_commission, CategoryClassifier, CommissionPolicy, ExactClassifier,
    KeywordClassifier,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use handoff::{assess, parse_scan, HandoffCheck};
pub use money::{Money, Rate};
pub use split::{calculate_split, PaymentSplit};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single cart line.
///
/// Stops a runaway increment loop from the storefront.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of any record identifier accepted from the outside.
pub const MAX_ID_LENGTH: usize = 64;
