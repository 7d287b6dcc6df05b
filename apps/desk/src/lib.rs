//! # UniMart Desk Library
//!
//! Operator-facing layer of the post-office desk.
//!
//! ## Module Organization
//! ```text
//! unimart_desk/
//! ├── lib.rs          ◄─── You are here (logging setup)
//! ├── cli.rs          ◄─── Argument parsing and dispatch
//! ├── state.rs        ◄─── AppState: database, desk service, operator
//! ├── commands/
//! │   ├── pricing.rs  ◄─── Fee quotes
//! │   ├── cart.rs     ◄─── Cart fixes
//! │   └── handoff.rs  ◄─── Scan inspect/confirm, audit verification
//! └── error.rs        ◄─── ApiError for every command
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout carries only command output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=unimart_handoff=trace` - Trace the desk service only
/// - Default: INFO level
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
