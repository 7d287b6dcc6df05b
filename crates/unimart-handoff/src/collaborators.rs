//! # Collaborators
//!
//! The two services the desk talks to, plus their SQLite implementations.
//!
//! ```text
//!   HandoffDesk ──► dyn AuditLedger   ──► SqliteAuditLedger  ──► audit_log
//!               └─► dyn OrderService  ──► SqliteOrderService ──► orders
//! ```
//!
//! Implementations report transient trouble as `HandoffError::Unavailable`
//! and everything else as `Rejected` or `NotFound`; the desk decides what a
//! failure means for the handoff.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{HandoffError, HandoffResult};
use unimart_core::{AuditEvent, AuditReceipt, HandoffAction, Order, OrderStatus};
use unimart_db::Database;

/// An event already stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub receipt: AuditReceipt,
    pub event: AuditEvent,
    /// True when the same order has a later entry for another action.
    pub superseded: bool,
}

/// Append-only record of handoff events.
#[async_trait]
pub trait AuditLedger: Send + Sync {
    /// Stores the event and returns a reference to it.
    async fn record(&self, event: &AuditEvent) -> HandoffResult<AuditReceipt>;

    /// Latest stored event for this order and action, if any.
    async fn find(
        &self,
        order_id: &str,
        action: HandoffAction,
    ) -> HandoffResult<Option<LedgerRecord>>;
}

/// Source of truth for orders.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn fetch_order(&self, order_id: &str) -> HandoffResult<Order>;

    /// Sets the status and returns the updated order.
    ///
    /// Must be safe to repeat with the same arguments.
    async fn update_status(&self, order_id: &str, status: OrderStatus) -> HandoffResult<Order>;
}

// =============================================================================
// SQLite Implementations
// =============================================================================

/// Ledger backed by the hash-chained `audit_log` table.
#[derive(Debug, Clone)]
pub struct SqliteAuditLedger {
    db: Database,
}

impl SqliteAuditLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditLedger for SqliteAuditLedger {
    async fn record(&self, event: &AuditEvent) -> HandoffResult<AuditReceipt> {
        let entry = self.db.audit_log().append(event).await?;
        debug!(order_id = %event.order_id, sequence = entry.sequence, "Audit recorded");
        Ok(entry.receipt())
    }

    async fn find(
        &self,
        order_id: &str,
        action: HandoffAction,
    ) -> HandoffResult<Option<LedgerRecord>> {
        let entries = self.db.audit_log().list_for_order(order_id).await?;
        let last = entries.len();

        Ok(entries
            .into_iter()
            .enumerate()
            .filter(|(_, entry)| entry.action == action)
            .last()
            .map(|(i, entry)| LedgerRecord {
                receipt: entry.receipt(),
                superseded: i + 1 < last,
                event: AuditEvent {
                    order_id: entry.order_id,
                    action: entry.action,
                    seller_id: entry.seller_id,
                    timestamp: entry.timestamp,
                    metadata: entry.metadata,
                },
            }))
    }
}

/// Order service backed by the local `orders` table.
#[derive(Debug, Clone)]
pub struct SqliteOrderService {
    db: Database,
}

impl SqliteOrderService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderService for SqliteOrderService {
    async fn fetch_order(&self, order_id: &str) -> HandoffResult<Order> {
        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| HandoffError::not_found("Order", order_id))
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> HandoffResult<Order> {
        Ok(self.db.orders().update_status(order_id, status).await?)
    }
}
