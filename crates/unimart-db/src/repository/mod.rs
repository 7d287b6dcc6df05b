//! # Repository Module
//!
//! One repository per table family. Repositories are cheap handles over the
//! shared pool; get them from [`crate::Database`].
//!
//! ```text
//!   Database ──► orders()     ──► OrderRepository   (orders)
//!            ──► cart()       ──► CartRepository    (cart_items)
//!            ──► audit_log()  ──► AuditRepository   (audit_log, append-only)
//! ```

pub mod audit;
pub mod cart;
pub mod order;
