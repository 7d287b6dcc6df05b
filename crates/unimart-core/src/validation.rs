//! # Validation Module
//!
//! Input validation for values arriving from the storefront and scanner.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Desk command (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: ids, amounts, quantity floor                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── CHECK (quantity >= 1), NOT NULL, foreign keys                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use unimart_core::validation::{validate_record_id, validate_amount};
//!
//! assert_eq!(validate_record_id("user_id", " 65f0c1a2 ").unwrap(), "65f0c1a2");
//! assert!(validate_amount("amount", -1).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_ID_LENGTH, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a record identifier (user, order, cart item, seller).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_ID_LENGTH` characters
/// - Letters, digits, hyphens, underscores only (Mongo ObjectIds and UUIDs
///   both pass)
///
/// ## Returns
/// The trimmed identifier.
pub fn validate_record_id(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(id.to_string())
}

/// Validates an optional identifier, treating blank as absent.
pub fn validate_optional_id(field: &str, id: Option<&str>) -> ValidationResult<Option<String>> {
    match id.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => validate_record_id(field, id).map(Some),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount in whole Naira.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed
pub fn validate_amount(field: &str, naira: i64) -> ValidationResult<()> {
    if naira < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Checks that one more unit can be added to a cart line.
pub fn validate_increment(current_quantity: i64) -> ValidationResult<()> {
    if current_quantity >= MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Checks that one unit can be removed from a cart line.
///
/// ## User Workflow
/// ```text
/// Cart line: "Jollof Rice x1"  ──►  click "−"
///      │
///      ▼
/// validate_decrement(1) ← THIS FUNCTION
///      │
///      └── Error: quantity cannot go below 1 (use remove instead)
/// ```
pub fn validate_decrement(current_quantity: i64) -> ValidationResult<()> {
    if current_quantity <= 1 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Text Validators
// =============================================================================

/// Validates a short free-text label such as an operator name or desk
/// location.
pub fn validate_label(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_record_id() {
        assert_eq!(
            validate_record_id("order_id", "65f0c1a2b3c4d5e6f7a8b9c0").unwrap(),
            "65f0c1a2b3c4d5e6f7a8b9c0"
        );
        assert!(validate_record_id("order_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_record_id("order_id", "ord_7").is_ok());

        assert!(matches!(
            validate_record_id("user_id", "   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_record_id("user_id", "has space"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_record_id("user_id", &"a".repeat(MAX_ID_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_optional_id() {
        assert_eq!(validate_optional_id("seller_id", None).unwrap(), None);
        assert_eq!(validate_optional_id("seller_id", Some("  ")).unwrap(), None);
        assert_eq!(
            validate_optional_id("seller_id", Some("v-1")).unwrap(),
            Some("v-1".to_string())
        );
        assert!(validate_optional_id("seller_id", Some("v 1")).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("amount", 0).is_ok());
        assert!(validate_amount("amount", 10_000).is_ok());
        assert!(validate_amount("amount", -1).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_decrement(2).is_ok());
        assert!(validate_decrement(1).is_err());
        assert!(validate_decrement(0).is_err());

        assert!(validate_increment(1).is_ok());
        assert!(validate_increment(MAX_ITEM_QUANTITY - 1).is_ok());
        assert!(validate_increment(MAX_ITEM_QUANTITY).is_err());
    }

    #[test]
    fn test_validate_label() {
        assert_eq!(validate_label("location", " Gate A ", 80).unwrap(), "Gate A");
        assert!(validate_label("location", "", 80).is_err());
        assert!(validate_label("location", "abcdef", 5).is_err());
    }
}
