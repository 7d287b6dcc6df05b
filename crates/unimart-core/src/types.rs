//! # Domain Types
//!
//! Core domain types used throughout UniMart.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   ScanPayload   │   │   AuditEvent    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  order_id       │   │  order_id       │       │
//! │  │  status ────────┼──►│  action         │──►│  action         │       │
//! │  │  total_amount   │   │  seller_id?     │   │  metadata       │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                        ▼                │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderStatus   │   │  HandoffAction  │   │  AuditReceipt   │       │
//! │  │  processing     │   │  Handoff        │   │  tx_hash        │       │
//! │  │  sent_to_po...  │   │  Pickup         │   │  block_height   │       │
//! │  │  delivered      │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders and cart items are owned by the marketplace backend; these types
//! are the shapes this workspace reads and proposes changes to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle stage of a marketplace order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment confirmation.
    Pending,
    /// Paid, vendor is preparing it.
    Processing,
    /// Vendor has confirmed the order.
    Confirmed,
    /// Vendor shipped it directly (bypasses the post office).
    Shipped,
    /// Vendor dropped it at the campus post office.
    SentToPostOffice,
    /// Customer collected it.
    Delivered,
    /// Cancelled by customer, vendor or admin.
    Cancelled,
}

impl OrderStatus {
    /// All known statuses in lifecycle order.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::SentToPostOffice,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Wire/storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::SentToPostOffice => "sent_to_post_office",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Handoff Action
// =============================================================================

/// What the post-office operator is doing with a scanned parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum HandoffAction {
    /// Vendor → post office.
    Handoff,
    /// Post office → customer.
    Pickup,
}

impl HandoffAction {
    /// Wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            HandoffAction::Handoff => "handoff",
            HandoffAction::Pickup => "pickup",
        }
    }

    /// Statuses the order is expected to be in before this action.
    pub const fn expected_statuses(&self) -> &'static [OrderStatus] {
        match self {
            HandoffAction::Handoff => &[OrderStatus::Processing, OrderStatus::Confirmed],
            HandoffAction::Pickup => &[OrderStatus::SentToPostOffice],
        }
    }

    /// Status the order moves to once the action is confirmed.
    pub const fn target_status(&self) -> OrderStatus {
        match self {
            HandoffAction::Handoff => OrderStatus::SentToPostOffice,
            HandoffAction::Pickup => OrderStatus::Delivered,
        }
    }
}

impl fmt::Display for HandoffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandoffAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "handoff" => Ok(HandoffAction::Handoff),
            "pickup" => Ok(HandoffAction::Pickup),
            _ => Err(ValidationError::NotAllowed {
                field: "action".to_string(),
                allowed: vec!["handoff".to_string(), "pickup".to_string()],
            }),
        }
    }
}

// =============================================================================
// Scan Payload
// =============================================================================

/// Decoded contents of a parcel QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanPayload {
    #[serde(alias = "orderId")]
    pub order_id: String,
    pub action: HandoffAction,
    #[serde(default, alias = "sellerId")]
    pub seller_id: Option<String>,
}

impl ScanPayload {
    /// Key used to detect a resubmitted scan.
    pub fn idempotency_key(&self) -> String {
        format!("{}:{}", self.order_id, self.action)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A marketplace order as seen by the handoff desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub seller_id: Option<String>,
    pub status: OrderStatus,
    /// Customer-facing total in whole Naira.
    pub total_amount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line in a customer's cart.
///
/// ## Invariants
/// - `quantity >= 1`; removing the last unit is a delete, not a decrement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Audit
// =============================================================================

/// Where and by whom a handoff was performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditMetadata {
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub operator: String,
    /// Order status when the scan was confirmed. Absent on older entries.
    #[serde(default)]
    pub previous_status: Option<OrderStatus>,
}

/// Record sent to the audit ledger before an order status is changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditEvent {
    pub order_id: String,
    pub action: HandoffAction,
    pub seller_id: Option<String>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub metadata: AuditMetadata,
}

/// What the audit ledger hands back for a recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditReceipt {
    /// Reference to the stored record (hash of the ledger entry).
    pub tx_hash: String,
    pub status: String,
    /// Position of the entry in the ledger.
    pub block_height: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
