//! # Payment Split
//!
//! Divides an order subtotal between the platform and the vendor.
//!
//! ```text
//!   subtotal < 1,000   →  platform_fee = round(subtotal × 2.5%)
//!   subtotal ≥ 1,000   →  platform_fee = round(subtotal × 2.5% + 100)
//!
//!   vendor_amount = subtotal − platform_fee
//!   total_amount  = subtotal
//! ```
//!
//! This is a separate fee model from [`crate::commission`]; the two are
//! deliberately not merged.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::validation::validate_amount;

/// Subtotal at which the flat part of the fee starts.
pub const FLAT_FEE_THRESHOLD: Money = Money::from_naira(1_000);

/// Flat part of the fee above the threshold.
pub const SPLIT_FLAT_FEE: Money = Money::from_naira(100);

/// Percentage part of the fee (2.5%).
pub const SPLIT_RATE: Rate = Rate::from_bps(250);

/// Result of splitting an order subtotal. All amounts in whole Naira.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSplit {
    pub subtotal: i64,
    pub platform_fee: i64,
    pub vendor_amount: i64,
    pub total_amount: i64,
}

/// Splits `subtotal` into platform fee and vendor payout.
///
/// ## Errors
/// - `ValidationError::OutOfRange` for a negative subtotal
/// - `CoreError::FeeExceedsAmount` if the fee would exceed the subtotal
pub fn calculate_split(subtotal: Money) -> CoreResult<PaymentSplit> {
    validate_amount("subtotal", subtotal.naira())?;

    // the flat fee is a whole number, so rounding before adding it is exact
    let mut platform_fee = subtotal.apply_rate(SPLIT_RATE);
    if subtotal >= FLAT_FEE_THRESHOLD {
        platform_fee += SPLIT_FLAT_FEE;
    }

    if platform_fee > subtotal {
        return Err(CoreError::FeeExceedsAmount {
            fee: platform_fee.naira(),
            amount: subtotal.naira(),
        });
    }

    Ok(PaymentSplit {
        subtotal: subtotal.naira(),
        platform_fee: platform_fee.naira(),
        vendor_amount: (subtotal - platform_fee).naira(),
        total_amount: subtotal.naira(),
    })
}
