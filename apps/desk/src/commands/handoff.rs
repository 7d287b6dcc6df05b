//! # Handoff Commands
//!
//! Scanner commands for the post-office desk.
//!
//! ## Operator Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Vendor drops off a parcel / customer collects one                      │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  scan QR ──► inspect_scan                                               │
//! │               shows order, target status and any warning                │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  operator confirms ──► confirm_scan                                     │
//! │               audit entry, then status update                           │
//! │                                                                         │
//! │  end of shift ──► verify_audit (walks the hash chain)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, error, info};

use crate::error::ApiError;
use unimart_core::parse_scan;
use unimart_db::{ChainVerification, Database};
use unimart_handoff::{HandoffDesk, HandoffOutcome, Inspection, OperatorContext};

/// Decodes a scanned QR payload and checks it against the order.
pub async fn inspect_scan(desk: &HandoffDesk, raw_scan: &str) -> Result<Inspection, ApiError> {
    debug!("inspect_scan command");
    Ok(desk.inspect(raw_scan).await?)
}

/// Confirms a scanned handoff or pickup.
pub async fn confirm_scan(
    desk: &HandoffDesk,
    operator: &OperatorContext,
    raw_scan: &str,
) -> Result<HandoffOutcome, ApiError> {
    let scan = parse_scan(raw_scan)?;
    debug!(order_id = %scan.order_id, action = %scan.action, "confirm_scan command");

    Ok(desk.confirm(&scan, operator).await?)
}

/// Recomputes every audit hash.
pub async fn verify_audit(db: &Database) -> Result<ChainVerification, ApiError> {
    let report = db.audit_log().verify_chain().await?;

    match report.first_broken {
        None => info!(entries = report.entries_checked, "Audit chain intact"),
        Some(sequence) => error!(sequence, "Audit chain broken"),
    }

    Ok(report)
}
