//! # Commission Module
//!
//! Platform commission on a vendor sale: a category-tiered percentage plus a
//! flat fee, never less than a minimum floor, never more than the sale.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Commission Calculation                             │
//! │                                                                         │
//! │   category ──► CategoryClassifier::classify ──► rate (5% / 8%)          │
//! │                                                     │                   │
//! │   amount ───────────────────────────────────────────┤                   │
//! │                                                     ▼                   │
//! │                    total = round(amount × rate) + flat_fee              │
//! │                                                     │                   │
//! │                    min   = round(amount × 2.5%) + flat_fee              │
//! │                                                     │                   │
//! │                    total = max(total, min)          │                   │
//! │                                                     ▼                   │
//! │                    total = min(total, amount)  ──► commission           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use unimart_core::{calculate_commission, Money};
//!
//! // 8% of 10,000 = 800, + 100 flat
//! let fee = calculate_commission("Electronics", Money::from_naira(10_000)).unwrap();
//! assert_eq!(fee.naira(), 900);
//!
//! // 105 would exceed the 100 sale, so the sale amount is returned
//! let fee = calculate_commission("", Money::from_naira(100)).unwrap();
//! assert_eq!(fee.naira(), 100);
//! ```

use std::collections::HashMap;

use crate::error::CoreResult;
use crate::money::{Money, Rate};
use crate::validation::validate_amount;

// =============================================================================
// Constants
// =============================================================================

/// Rate applied when a category matches nothing (5%).
pub const DEFAULT_RATE: Rate = Rate::from_bps(500);

/// Rate for tech and gadget listings (8%).
pub const TECH_RATE: Rate = Rate::from_bps(800);

/// Percentage part of the minimum fee (2.5%).
pub const MINIMUM_RATE: Rate = Rate::from_bps(250);

/// Fixed fee added on top of the percentage, in Naira.
pub const FLAT_FEE: Money = Money::from_naira(100);

// =============================================================================
// Classifiers
// =============================================================================

/// Maps a free-text listing category to a commission rate.
///
/// Swap implementations to move from fuzzy matching to a fixed category
/// table without touching callers.
pub trait CategoryClassifier {
    fn classify(&self, category: &str) -> Rate;
}

/// Case-insensitive substring matcher over ordered keyword groups.
///
/// Groups are checked in order and the first hit wins, so
/// "Tech Accessories for Fashionistas" lands in the 5% fashion group.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    groups: Vec<(Vec<String>, Rate)>,
    fallback: Rate,
}

impl KeywordClassifier {
    /// Creates an empty classifier that always returns `fallback`.
    pub fn new(fallback: Rate) -> Self {
        Self {
            groups: Vec::new(),
            fallback,
        }
    }

    /// Appends a keyword group. Keywords are matched lower-cased.
    pub fn with_group<I, S>(mut self, keywords: I, rate: Rate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .collect();
        self.groups.push((keywords, rate));
        self
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        KeywordClassifier::new(DEFAULT_RATE)
            .with_group(["food", "fashion", "clothing"], DEFAULT_RATE)
            .with_group(["tech", "electronic", "gadget"], TECH_RATE)
    }
}

impl CategoryClassifier for KeywordClassifier {
    fn classify(&self, category: &str) -> Rate {
        let category = category.trim().to_lowercase();
        if category.is_empty() {
            return self.fallback;
        }

        self.groups
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| category.contains(k.as_str())))
            .map(|(_, rate)| *rate)
            .unwrap_or(self.fallback)
    }
}

/// Case-insensitive exact lookup with a fallback rate.
#[derive(Debug, Clone)]
pub struct ExactClassifier {
    rates: HashMap<String, Rate>,
    fallback: Rate,
}

impl ExactClassifier {
    pub fn new(fallback: Rate) -> Self {
        Self {
            rates: HashMap::new(),
            fallback,
        }
    }

    pub fn with_category(mut self, category: &str, rate: Rate) -> Self {
        self.rates.insert(category.trim().to_lowercase(), rate);
        self
    }
}

impl CategoryClassifier for ExactClassifier {
    fn classify(&self, category: &str) -> Rate {
        self.rates
            .get(&category.trim().to_lowercase())
            .copied()
            .unwrap_or(self.fallback)
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Commission parameters plus the classifier that picks the rate.
#[derive(Debug, Clone)]
pub struct CommissionPolicy<C = KeywordClassifier> {
    pub classifier: C,
    pub flat_fee: Money,
    pub minimum_rate: Rate,
}

impl Default for CommissionPolicy<KeywordClassifier> {
    fn default() -> Self {
        CommissionPolicy::with_classifier(KeywordClassifier::default())
    }
}

impl<C: CategoryClassifier> CommissionPolicy<C> {
    /// Standard fees around a custom classifier.
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            flat_fee: FLAT_FEE,
            minimum_rate: MINIMUM_RATE,
        }
    }

    /// Smallest commission charged before the clamp to `amount`.
    pub fn minimum_fee(&self, amount: Money) -> Money {
        amount.apply_rate(self.minimum_rate) + self.flat_fee
    }

    /// Computes the commission for a sale.
    ///
    /// ## Errors
    /// `ValidationError::OutOfRange` when `amount` is negative.
    pub fn commission(&self, category: &str, amount: Money) -> CoreResult<Money> {
        validate_amount("amount", amount.naira())?;

        let rate = self.classifier.classify(category);
        let total = (amount.apply_rate(rate) + self.flat_fee).max(self.minimum_fee(amount));

        Ok(total.min(amount))
    }
}

/// Commission under the default keyword policy.
pub fn calculate_commission(category: &str, amount: Money) -> CoreResult<Money> {
    CommissionPolicy::<KeywordClassifier>::default().commission(category, amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};

    #[test]
    fn test_electronics_uses_tech_rate() {
        let fee = calculate_commission("Electronics", Money::from_naira(10_000)).unwrap();
        assert_eq!(fee.naira(), 900);
    }

    #[test]
    fn test_empty_category_is_clamped_to_amount() {
        let fee = calculate_commission("", Money::from_naira(100)).unwrap();
        assert_eq!(fee.naira(), 100);
    }

    #[test]
    fn test_zero_amount_yields_zero() {
        let fee = calculate_commission("Food", Money::zero()).unwrap();
        assert!(fee.is_zero());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = calculate_commission("Food", Money::from_naira(-1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, min: 0, .. }) if field == "amount"
        ));
    }

    #[test]
    fn test_commission_bounded_by_amount() {
        for category in ["", "Food", "Gadgets", "Books", "Clothing & Shoes"] {
            for amount in [0, 1, 50, 99, 100, 101, 104, 105, 999, 1_000, 4_321, 1_000_000] {
                let amount = Money::from_naira(amount);
                let fee = calculate_commission(category, amount).unwrap();
                assert!(fee >= Money::zero(), "{category} {amount}");
                assert!(fee <= amount, "{category} {amount}");
            }
        }
    }

    #[test]
    fn test_commission_is_deterministic() {
        let a = calculate_commission("Tech", Money::from_naira(7_777)).unwrap();
        let b = calculate_commission("Tech", Money::from_naira(7_777)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keyword_order_decides_overlap() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("Tech Accessories for Fashionistas"), DEFAULT_RATE);
        assert_eq!(classifier.classify("  GADGET corner "), TECH_RATE);
        assert_eq!(classifier.classify("Stationery"), DEFAULT_RATE);
        assert_eq!(classifier.classify(""), DEFAULT_RATE);
    }

    #[test]
    fn test_exact_classifier_ignores_substrings() {
        let classifier = ExactClassifier::new(DEFAULT_RATE).with_category("Electronics", TECH_RATE);
        assert_eq!(classifier.classify("electronics"), TECH_RATE);
        assert_eq!(classifier.classify("Consumer Electronics"), DEFAULT_RATE);

        let policy = CommissionPolicy::with_classifier(classifier);
        let fee = policy.commission("Consumer Electronics", Money::from_naira(10_000)).unwrap();
        assert_eq!(fee.naira(), 600);
    }

    #[test]
    fn test_minimum_fee_floor_applies() {
        let classifier = ExactClassifier::new(Rate::zero());
        let policy = CommissionPolicy::with_classifier(classifier);
        // 0% + 100 is below 2.5% of 10,000 + 100
        let fee = policy.commission("anything", Money::from_naira(10_000)).unwrap();
        assert_eq!(fee.naira(), 350);
        assert_eq!(policy.minimum_fee(Money::from_naira(10_000)).naira(), 350);
    }
}
