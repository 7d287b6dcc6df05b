//! # Audit Log Repository
//!
//! Append-only, hash-chained record of every confirmed handoff and pickup.
//!
//! ## Chain Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  seq 1                   seq 2                   seq 3                  │
//! │  prev = "genesis"  ┌───► prev = h1        ┌────► prev = h2             │
//! │  curr = h1 ────────┘     curr = h2 ───────┘      curr = h3             │
//! │                                                                         │
//! │  h(n) = SHA-256(prev ∥ seq ∥ ts_ms ∥ order_id ∥ action ∥ seller? ∥ meta)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no update or delete API, and the schema rejects both with
//! triggers. Appends are serialized by a lock shared through `Database`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use unimart_core::{AuditEvent, AuditMetadata, AuditReceipt, HandoffAction};

/// `prev_hash` of the first entry.
pub const GENESIS_HASH: &str = "genesis";

/// Receipt status for a stored entry.
pub const RECORDED: &str = "recorded";

const AUDIT_COLUMNS: &str =
    "sequence, order_id, action, seller_id, timestamp, metadata, prev_hash, curr_hash";

// =============================================================================
// Types
// =============================================================================

/// One stored audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub sequence: i64,
    pub order_id: String,
    pub action: HandoffAction,
    pub seller_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub metadata: AuditMetadata,
    pub prev_hash: String,
    pub curr_hash: String,
}

impl AuditEntry {
    /// The receipt handed back to whoever recorded this entry.
    pub fn receipt(&self) -> AuditReceipt {
        AuditReceipt {
            tx_hash: self.curr_hash.clone(),
            status: RECORDED.to_string(),
            block_height: self.sequence,
        }
    }
}

/// Result of walking the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainVerification {
    pub entries_checked: i64,
    /// Sequence of the first entry whose link or hash does not match.
    pub first_broken: Option<i64>,
}

impl ChainVerification {
    pub fn is_intact(&self) -> bool {
        self.first_broken.is_none()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    sequence: i64,
    order_id: String,
    action: String,
    seller_id: Option<String>,
    timestamp: DateTime<Utc>,
    metadata: String,
    prev_hash: String,
    curr_hash: String,
}

impl AuditRow {
    fn computed_hash(&self) -> String {
        compute_entry_hash(
            &self.prev_hash,
            self.sequence,
            self.timestamp.timestamp_millis(),
            &self.order_id,
            &self.action,
            self.seller_id.as_deref(),
            &self.metadata,
        )
    }
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = DbError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = row
            .action
            .parse::<HandoffAction>()
            .map_err(|e| DbError::corrupt("AuditEntry", e))?;
        let metadata: AuditMetadata =
            serde_json::from_str(&row.metadata).map_err(|e| DbError::corrupt("AuditEntry", e))?;

        Ok(AuditEntry {
            sequence: row.sequence,
            order_id: row.order_id,
            action,
            seller_id: row.seller_id,
            timestamp: row.timestamp,
            metadata,
            prev_hash: row.prev_hash,
            curr_hash: row.curr_hash,
        })
    }
}

// =============================================================================
// Hashing
// =============================================================================

/// SHA-256 over every stored field, NUL-separated, hex encoded.
fn compute_entry_hash(
    prev_hash: &str,
    sequence: i64,
    timestamp_ms: i64,
    order_id: &str,
    action: &str,
    seller_id: Option<&str>,
    metadata_json: &str,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(prev_hash.as_bytes());
    hasher.update(b"\x00");

    hasher.update(sequence.to_le_bytes());
    hasher.update(timestamp_ms.to_le_bytes());

    hasher.update(order_id.as_bytes());
    hasher.update(b"\x00");
    hasher.update(action.as_bytes());
    hasher.update(b"\x00");

    // tag byte keeps None distinct from Some("")
    match seller_id {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update(v.as_bytes());
        }
        None => hasher.update(b"\x00"),
    }
    hasher.update(b"\x00");

    hasher.update(metadata_json.as_bytes());

    hex::encode(hasher.finalize())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the audit log.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
    append_lock: Arc<Mutex<()>>,
}

impl AuditRepository {
    /// Creates a repository. Pass the same lock to every instance that
    /// shares a pool; `Database::audit_log` does this.
    pub fn new(pool: SqlitePool, append_lock: Arc<Mutex<()>>) -> Self {
        AuditRepository { pool, append_lock }
    }

    /// Appends an event to the chain.
    ///
    /// ## What This Does
    /// 1. Takes the append lock
    /// 2. Reads the tail entry (or starts from `"genesis"`)
    /// 3. Hashes the new entry over the previous hash
    /// 4. Inserts it
    pub async fn append(&self, event: &AuditEvent) -> DbResult<AuditEntry> {
        let _guard = self.append_lock.lock().await;

        let tail: Option<(i64, String)> = sqlx::query_as(
            "SELECT sequence, curr_hash FROM audit_log ORDER BY sequence DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let (sequence, prev_hash) = match tail {
            Some((last, hash)) => (last + 1, hash),
            None => (1, GENESIS_HASH.to_string()),
        };

        // stored at millisecond precision so the hash survives a round trip
        let timestamp = DateTime::<Utc>::from_timestamp_millis(event.timestamp.timestamp_millis())
            .ok_or_else(|| DbError::Internal("audit timestamp out of range".to_string()))?;
        let metadata =
            serde_json::to_string(&event.metadata).map_err(|e| DbError::Internal(e.to_string()))?;

        let curr_hash = compute_entry_hash(
            &prev_hash,
            sequence,
            timestamp.timestamp_millis(),
            &event.order_id,
            event.action.as_str(),
            event.seller_id.as_deref(),
            &metadata,
        );

        sqlx::query(
            r#"
            INSERT INTO audit_log (
                sequence, order_id, action, seller_id, timestamp, metadata, prev_hash, curr_hash
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(sequence)
        .bind(&event.order_id)
        .bind(event.action.as_str())
        .bind(&event.seller_id)
        .bind(timestamp)
        .bind(&metadata)
        .bind(&prev_hash)
        .bind(&curr_hash)
        .execute(&self.pool)
        .await?;

        debug!(
            sequence,
            order_id = %event.order_id,
            action = %event.action,
            hash = %curr_hash,
            "Audit entry appended"
        );

        Ok(AuditEntry {
            sequence,
            order_id: event.order_id.clone(),
            action: event.action,
            seller_id: event.seller_id.clone(),
            timestamp,
            metadata: event.metadata.clone(),
            prev_hash,
            curr_hash,
        })
    }

    /// Gets an entry by its sequence number.
    pub async fn get_by_sequence(&self, sequence: i64) -> DbResult<Option<AuditEntry>> {
        let sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_log WHERE sequence = ?1");

        let row: Option<AuditRow> = sqlx::query_as(&sql)
            .bind(sequence)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AuditEntry::try_from).transpose()
    }

    /// Lists every entry recorded for an order, in chain order.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<AuditEntry>> {
        let sql =
            format!("SELECT {AUDIT_COLUMNS} FROM audit_log WHERE order_id = ?1 ORDER BY sequence");

        let rows: Vec<AuditRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }

    /// Recomputes every hash and checks every link.
    pub async fn verify_chain(&self) -> DbResult<ChainVerification> {
        let sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_log ORDER BY sequence");
        let rows: Vec<AuditRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let mut expected_prev = GENESIS_HASH.to_string();
        let mut expected_seq = 1;
        let mut checked = 0;

        for row in &rows {
            checked += 1;

            if row.sequence != expected_seq
                || row.prev_hash != expected_prev
                || row.computed_hash() != row.curr_hash
            {
                warn!(sequence = row.sequence, "Audit chain broken");
                return Ok(ChainVerification {
                    entries_checked: checked,
                    first_broken: Some(row.sequence),
                });
            }

            expected_prev = row.curr_hash.clone();
            expected_seq += 1;
        }

        info!(entries = checked, "Audit chain verified");
        Ok(ChainVerification {
            entries_checked: checked,
            first_broken: None,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
