//! # Desk State
//!
//! Everything a command may need, opened once per process.
//!
//! ```text
//!   AppState
//!   ├── db        Database (SqlitePool, safe to share)
//!   ├── desk      Arc<HandoffDesk> (SQLite ledger + order service)
//!   ├── operator  OperatorContext from [desk] settings
//!   └── config    DeskConfig as loaded
//! ```
//!
//! Commands borrow only the piece they use: cart commands take `&Database`,
//! scan commands take the desk and operator.

use std::sync::Arc;
use tracing::info;

use unimart_db::{Database, DbConfig};
use unimart_handoff::{
    DeskConfig, HandoffDesk, OperatorContext, SqliteAuditLedger, SqliteOrderService,
};

use crate::error::ApiError;

pub struct AppState {
    pub db: Database,
    pub desk: Arc<HandoffDesk>,
    pub operator: OperatorContext,
    pub config: DeskConfig,
}

impl AppState {
    /// Opens the configured database (running migrations) and wires the desk.
    pub async fn open(config: DeskConfig) -> Result<Self, ApiError> {
        let db = Database::new(DbConfig::new(&config.database.path)).await?;
        info!(path = %config.database.path.display(), "Desk database ready");
        Ok(Self::with_database(db, config))
    }

    /// Wires the desk around an already open database.
    pub fn with_database(db: Database, config: DeskConfig) -> Self {
        let desk = HandoffDesk::new(
            Arc::new(SqliteAuditLedger::new(db.clone())),
            Arc::new(SqliteOrderService::new(db.clone())),
            config.retry.clone(),
        );

        let operator = OperatorContext {
            location: config.desk.location.trim().to_string(),
            operator: config.desk.operator.trim().to_string(),
        };

        AppState {
            db,
            desk: Arc::new(desk),
            operator,
            config,
        }
    }
}
