//! # Cart Repository
//!
//! Customer cart lines.
//!
//! The `quantity >= 1` floor is held twice: callers pre-check with
//! `unimart_core::validation`, and the quantity updates below are
//! conditional so two racing decrements cannot take a line to zero.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use unimart_core::{CartItem, MAX_ITEM_QUANTITY};

const CART_COLUMNS: &str = "id, user_id, product_id, quantity, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: String,
    user_id: String,
    product_id: String,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Gets a cart line by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CartItem>> {
        let sql = format!("SELECT {CART_COLUMNS} FROM cart_items WHERE id = ?1");

        let row: Option<CartItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CartItem::from))
    }

    /// Adds a new cart line.
    pub async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<CartItem> {
        let now = Utc::now();
        let item = CartItem {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, user_id = %user_id, product_id = %product_id, "Adding cart item");

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.user_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists a user's cart, oldest line first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<CartItem>> {
        let sql =
            format!("SELECT {CART_COLUMNS} FROM cart_items WHERE user_id = ?1 ORDER BY created_at");

        let rows: Vec<CartItemRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Deletes every line in a user's cart.
    ///
    /// ## Returns
    /// Number of deleted lines (0 for an already-empty cart).
    pub async fn clear_for_user(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id = %user_id, deleted = result.rows_affected(), "Cleared cart");
        Ok(result.rows_affected())
    }

    /// Adds one unit to a line, up to `MAX_ITEM_QUANTITY`.
    pub async fn increment(&self, id: &str) -> DbResult<CartItem> {
        let sql = format!(
            r#"
            UPDATE cart_items SET quantity = quantity + 1, updated_at = ?2
            WHERE id = ?1 AND quantity < ?3
            RETURNING {CART_COLUMNS}
            "#
        );

        let row: Option<CartItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Utc::now())
            .bind(MAX_ITEM_QUANTITY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self
                .unchanged(id, &format!("quantity cannot exceed {MAX_ITEM_QUANTITY}"))
                .await?),
        }
    }

    /// Removes one unit from a line that has more than one.
    pub async fn decrement(&self, id: &str) -> DbResult<CartItem> {
        let sql = format!(
            r#"
            UPDATE cart_items SET quantity = quantity - 1, updated_at = ?2
            WHERE id = ?1 AND quantity > 1
            RETURNING {CART_COLUMNS}
            "#
        );

        let row: Option<CartItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.unchanged(id, "quantity cannot go below 1").await?),
        }
    }

    /// Explains a conditional update that matched no row: either the line
    /// is gone or its quantity is already at the limit.
    async fn unchanged(&self, id: &str, limit: &str) -> DbResult<DbError> {
        Ok(match self.get_by_id(id).await? {
            Some(_) => DbError::ConstraintViolation {
                message: limit.to_string(),
            },
            None => DbError::not_found("CartItem", id),
        })
    }

    /// Counts all cart lines.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_clear_only_touches_one_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cart = db.cart();

        cart.add_item("u-1", "p-1", 1).await.unwrap();
        cart.add_item("u-1", "p-2", 3).await.unwrap();
        cart.add_item("u-2", "p-1", 1).await.unwrap();

        assert_eq!(cart.clear_for_user("u-1").await.unwrap(), 2);
        assert_eq!(cart.clear_for_user("u-1").await.unwrap(), 0);
        assert!(cart.list_for_user("u-1").await.unwrap().is_empty());
        assert_eq!(cart.list_for_user("u-2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_increment_and_decrement() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cart = db.cart();
        let item = cart.add_item("u-1", "p-1", 1).await.unwrap();

        let up = cart.increment(&item.id).await.unwrap();
        assert_eq!(up.quantity, 2);

        let down = cart.decrement(&item.id).await.unwrap();
        assert_eq!(down.quantity, 1);

        let err = cart.decrement(&item.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::ConstraintViolation { ref message } if message == "quantity cannot go below 1"
        ));
        assert_eq!(cart.get_by_id(&item.id).await.unwrap().unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_increment_stops_at_max() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cart = db.cart();
        let item = cart
            .add_item("u-1", "p-1", unimart_core::MAX_ITEM_QUANTITY)
            .await
            .unwrap();

        let err = cart.increment(&item.id).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_missing_line_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cart = db.cart();

        assert!(matches!(
            cart.increment("gone").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            cart.decrement("gone").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.cart().add_item("u-1", "p-1", 0).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
        assert_eq!(db.cart().count().await.unwrap(), 0);
    }
}
