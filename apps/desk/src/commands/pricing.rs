//! # Pricing Commands
//!
//! Fee quotes for the counter. Both are pure and touch no state.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use unimart_core::{calculate_commission, calculate_split, Money, PaymentSplit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuote {
    pub category: String,
    pub amount: i64,
    pub commission: i64,
    /// What the vendor keeps after commission.
    pub vendor_amount: i64,
}

/// Quotes the platform commission on a sale.
pub fn quote_commission(category: &str, amount: i64) -> Result<CommissionQuote, ApiError> {
    debug!(category, amount, "quote_commission command");

    let amount = Money::from_naira(amount);
    let commission = calculate_commission(category, amount)?;

    Ok(CommissionQuote {
        category: category.to_string(),
        amount: amount.naira(),
        commission: commission.naira(),
        vendor_amount: (amount - commission).naira(),
    })
}

/// Quotes how a payment is split between the platform and the vendor.
pub fn quote_split(subtotal: i64) -> Result<PaymentSplit, ApiError> {
    debug!(subtotal, "quote_split command");
    Ok(calculate_split(Money::from_naira(subtotal))?)
}
