//! # Desk Commands
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── pricing.rs  ◄─── Commission and payment split quotes
//! ├── cart.rs     ◄─── Cart quantity fixes, clearing
//! └── handoff.rs  ◄─── Scan inspect/confirm, audit verification
//! ```
//!
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Pure
//! fn quote_split(subtotal: i64)
//!
//! // Only needs database
//! async fn clear_cart(db: &Database, user_id: &str)
//!
//! // Needs the desk service and who is operating it
//! async fn confirm_scan(desk: &HandoffDesk, operator: &OperatorContext, raw_scan: &str)
//! ```

pub mod cart;
pub mod handoff;
pub mod pricing;
