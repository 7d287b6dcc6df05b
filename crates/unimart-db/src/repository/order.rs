//! # Order Repository
//!
//! Local store of marketplace orders as the handoff desk sees them.
//!
//! ## Status Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_status(id, target)                                              │
//! │                                                                         │
//! │    UPDATE orders SET status = target ... WHERE id = ?                   │
//! │    RETURNING *                                                          │
//! │                                                                         │
//! │  Setting the same target twice leaves the same row behind, so the      │
//! │  desk can retry this call freely after a transient failure.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use unimart_core::{Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, seller_id, status, total_amount, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    seller_id: Option<String>,
    status: String,
    total_amount: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| DbError::corrupt("Order", e))?;

        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            seller_id: row.seller_id,
            status,
            total_amount: row.total_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Inserts an order as received from the marketplace.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, status = %order.status, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, seller_id, status, total_amount, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.seller_id)
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates a new order with a generated ID.
    pub async fn create(
        &self,
        user_id: &str,
        seller_id: Option<&str>,
        status: OrderStatus,
        total_amount: i64,
    ) -> DbResult<Order> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            seller_id: seller_id.map(str::to_string),
            status,
            total_amount,
            created_at: now,
            updated_at: now,
        };

        self.insert(&order).await?;
        Ok(order)
    }

    /// Sets an order's status and returns the updated order.
    ///
    /// No transition rules are enforced here; the desk decides what is
    /// allowed and only warns on unexpected transitions.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        debug!(id = %id, status = %status, "Updating order status");

        let sql = format!(
            "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {ORDER_COLUMNS}"
        );

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from)
            .transpose()?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Lists orders in a given status, oldest first.
    pub async fn list_by_status(&self, status: OrderStatus, limit: i64) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 ORDER BY created_at LIMIT ?2"
        );

        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(status.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
