//! # Handoff Check
//!
//! Pure half of the post-office scanner flow: decode the QR payload and
//! decide whether the requested action fits the order's current status.
//!
//! ```text
//!   vendor ──handoff──► post office ──pickup──► customer
//!
//!   processing ┐
//!              ├─ handoff ─► sent_to_post_office ─ pickup ─► delivered
//!   confirmed ─┘
//! ```
//!
//! The check is a soft gate. An unexpected status produces a warning for
//! the operator; it never blocks the confirm.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{HandoffAction, OrderStatus, ScanPayload};
use crate::validation::{validate_optional_id, validate_record_id};

/// Outcome of checking an action against the order status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HandoffCheck {
    pub consistent: bool,
    pub warning: Option<String>,
}

impl HandoffCheck {
    fn ok() -> Self {
        Self {
            consistent: true,
            warning: None,
        }
    }

    fn warn(message: String) -> Self {
        Self {
            consistent: false,
            warning: Some(message),
        }
    }
}

/// Decodes and validates a scanned QR payload.
///
/// ## Example
/// ```rust
/// use unimart_core::{parse_scan, HandoffAction};
///
/// let scan = parse_scan(r#"{"orderId":" ord-42 ","action":"pickup"}"#).unwrap();
/// assert_eq!(scan.order_id, "ord-42");
/// assert_eq!(scan.action, HandoffAction::Pickup);
/// assert!(parse_scan("not json").is_err());
/// ```
pub fn parse_scan(raw: &str) -> CoreResult<ScanPayload> {
    let scan: ScanPayload =
        serde_json::from_str(raw.trim()).map_err(|e| CoreError::MalformedScan(e.to_string()))?;

    Ok(ScanPayload {
        order_id: validate_record_id("order_id", &scan.order_id)?,
        action: scan.action,
        seller_id: validate_optional_id("seller_id", scan.seller_id.as_deref())?,
    })
}

/// Checks whether `action` is expected for an order in `current` status.
pub fn assess(action: HandoffAction, current: OrderStatus) -> HandoffCheck {
    if action.expected_statuses().contains(&current) {
        return HandoffCheck::ok();
    }

    match action {
        HandoffAction::Handoff => HandoffCheck::warn(format!(
            "Order is {current}, expected processing or confirmed before handoff"
        )),
        HandoffAction::Pickup => HandoffCheck::warn(format!(
            "Order is {current}, item might not be at Post Office yet"
        )),
    }
}
