//! # Cart Commands
//!
//! Quantity fixes and cart clearing for a customer standing at the desk.
//!
//! ```text
//!   "Jollof Rice x2"
//!        │
//!        ├── increase_cart_item ──► x3   (stops at MAX_ITEM_QUANTITY)
//!        ├── decrease_cart_item ──► x1   (never below 1)
//!        └── clear_cart(user)   ──► every line for the customer removed
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use unimart_core::validation::{validate_decrement, validate_increment, validate_record_id};
use unimart_core::CartItem;
use unimart_db::Database;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCartResponse {
    pub user_id: String,
    pub removed: u64,
}

/// Removes every cart line belonging to `user_id`.
pub async fn clear_cart(db: &Database, user_id: &str) -> Result<ClearCartResponse, ApiError> {
    let user_id = validate_record_id("user_id", user_id)?;
    debug!(user_id = %user_id, "clear_cart command");

    let removed = db.cart().clear_for_user(&user_id).await?;
    info!(user_id = %user_id, removed, "Cart cleared");

    Ok(ClearCartResponse { user_id, removed })
}

/// Adds one unit to a cart line.
pub async fn increase_cart_item(db: &Database, item_id: &str) -> Result<CartItem, ApiError> {
    let item_id = validate_record_id("item_id", item_id)?;
    debug!(item_id = %item_id, "increase_cart_item command");

    let item = fetch_item(db, &item_id).await?;
    validate_increment(item.quantity)?;

    Ok(db.cart().increment(&item_id).await?)
}

/// Removes one unit from a cart line. A line at quantity 1 is left alone;
/// the customer should remove it instead.
pub async fn decrease_cart_item(db: &Database, item_id: &str) -> Result<CartItem, ApiError> {
    let item_id = validate_record_id("item_id", item_id)?;
    debug!(item_id = %item_id, "decrease_cart_item command");

    let item = fetch_item(db, &item_id).await?;
    if validate_decrement(item.quantity).is_err() {
        return Err(ApiError::invalid_argument("quantity cannot go below 1"));
    }

    Ok(db.cart().decrement(&item_id).await?)
}

async fn fetch_item(db: &Database, item_id: &str) -> Result<CartItem, ApiError> {
    db.cart()
        .get_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("CartItem", item_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use unimart_core::MAX_ITEM_QUANTITY;
    use unimart_db::DbConfig;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let db = setup().await;
        db.cart().add_item("student-1", "prod-a", 2).await.unwrap();
        db.cart().add_item("student-1", "prod-b", 1).await.unwrap();
        db.cart().add_item("student-2", "prod-a", 1).await.unwrap();

        let response = clear_cart(&db, " student-1 ").await.unwrap();
        assert_eq!(response.user_id, "student-1");
        assert_eq!(response.removed, 2);
        assert_eq!(db.cart().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_cart_requires_user() {
        let db = setup().await;
        let err = clear_cart(&db, "   ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn test_increase_and_decrease() {
        let db = setup().await;
        let item = db.cart().add_item("student-1", "prod-a", 2).await.unwrap();

        assert_eq!(increase_cart_item(&db, &item.id).await.unwrap().quantity, 3);
        assert_eq!(decrease_cart_item(&db, &item.id).await.unwrap().quantity, 2);
        assert_eq!(decrease_cart_item(&db, &item.id).await.unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_decrease_stops_at_one() {
        let db = setup().await;
        let item = db.cart().add_item("student-1", "prod-a", 1).await.unwrap();

        let err = decrease_cart_item(&db, &item.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert_eq!(err.message, "quantity cannot go below 1");

        let stored = db.cart().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 1);
    }

    #[tokio::test]
    async fn test_increase_stops_at_max() {
        let db = setup().await;
        let item = db
            .cart()
            .add_item("student-1", "prod-a", MAX_ITEM_QUANTITY)
            .await
            .unwrap();

        let err = increase_cart_item(&db, &item.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn test_missing_item() {
        let db = setup().await;

        let err = increase_cart_item(&db, "no-such-line").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = decrease_cart_item(&db, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }
}
