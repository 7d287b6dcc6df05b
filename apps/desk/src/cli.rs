//! # Command Line
//!
//! ```text
//! desk [--config PATH] <command> [args]
//!
//!   commission <category> <amount>    quote platform commission
//!   split <subtotal>                  quote payment split
//!   inspect <scan-json>               check a scanned QR code
//!   confirm <scan-json>               audit and apply a handoff/pickup
//!   cart-clear <user-id>              remove a customer's cart
//!   cart-inc <item-id>                add one unit to a cart line
//!   cart-dec <item-id>                remove one unit from a cart line
//!   verify-audit                      walk the audit hash chain
//! ```

use serde::Serialize;
use std::path::PathBuf;

use crate::commands::{cart, handoff, pricing};
use crate::error::ApiError;
use crate::state::AppState;
use unimart_handoff::DeskConfig;

pub const USAGE: &str = "\
UniMart Desk

Usage: desk [--config PATH] <command> [args]

Commands:
  commission <category> <amount>    Quote platform commission
  split <subtotal>                  Quote payment split
  inspect <scan-json>               Check a scanned QR code
  confirm <scan-json>               Audit and apply a handoff or pickup
  cart-clear <user-id>              Remove every line in a customer's cart
  cart-inc <item-id>                Add one unit to a cart line
  cart-dec <item-id>                Remove one unit from a cart line
  verify-audit                      Verify the audit hash chain

Options:
  -c, --config <PATH>    Config file (default: platform config dir/desk.toml)
  -h, --help             Show this help message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Commission { category: String, amount: i64 },
    Split { subtotal: i64 },
    Inspect { scan: String },
    Confirm { scan: String },
    CartClear { user_id: String },
    CartInc { item_id: String },
    CartDec { item_id: String },
    VerifyAudit,
    Help,
}

/// Parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

impl Command {
    /// True for commands that never open the database.
    pub fn is_pure(&self) -> bool {
        matches!(
            self,
            Command::Commission { .. } | Command::Split { .. } | Command::Help
        )
    }
}

/// Parses arguments, excluding the program name.
pub fn parse(args: &[String]) -> Result<Invocation, ApiError> {
    let mut config_path = None;
    let mut rest = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| ApiError::invalid_argument("--config needs a path"))?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => {
                return Ok(Invocation {
                    config_path,
                    command: Command::Help,
                })
            }
            other => rest.push(other),
        }
        i += 1;
    }

    let command = match rest.as_slice() {
        ["commission", category, amount] => Command::Commission {
            category: category.to_string(),
            amount: parse_naira("amount", amount)?,
        },
        ["split", subtotal] => Command::Split {
            subtotal: parse_naira("subtotal", subtotal)?,
        },
        ["inspect", scan] => Command::Inspect {
            scan: scan.to_string(),
        },
        ["confirm", scan] => Command::Confirm {
            scan: scan.to_string(),
        },
        ["cart-clear", user_id] => Command::CartClear {
            user_id: user_id.to_string(),
        },
        ["cart-inc", item_id] => Command::CartInc {
            item_id: item_id.to_string(),
        },
        ["cart-dec", item_id] => Command::CartDec {
            item_id: item_id.to_string(),
        },
        ["verify-audit"] => Command::VerifyAudit,
        [] => Command::Help,
        [name, ..] => {
            return Err(ApiError::invalid_argument(format!(
                "unknown command or wrong arguments: {name} (see --help)"
            )))
        }
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

fn parse_naira(field: &str, value: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_argument(format!("{field} must be a whole number of Naira")))
}

/// Runs a command and returns its JSON result.
pub async fn execute(invocation: Invocation) -> Result<serde_json::Value, ApiError> {
    match invocation.command {
        Command::Help => Ok(serde_json::Value::String(USAGE.to_string())),
        Command::Commission { category, amount } => {
            to_json(pricing::quote_commission(&category, amount)?)
        }
        Command::Split { subtotal } => to_json(pricing::quote_split(subtotal)?),
        command => {
            let config = DeskConfig::load(invocation.config_path)?;
            let state = AppState::open(config).await?;
            let result = run_stateful(&state, command).await;
            state.db.close().await;
            result
        }
    }
}

async fn run_stateful(state: &AppState, command: Command) -> Result<serde_json::Value, ApiError> {
    match command {
        Command::Inspect { scan } => to_json(handoff::inspect_scan(&state.desk, &scan).await?),
        Command::Confirm { scan } => {
            to_json(handoff::confirm_scan(&state.desk, &state.operator, &scan).await?)
        }
        Command::CartClear { user_id } => to_json(cart::clear_cart(&state.db, &user_id).await?),
        Command::CartInc { item_id } => {
            to_json(cart::increase_cart_item(&state.db, &item_id).await?)
        }
        Command::CartDec { item_id } => {
            to_json(cart::decrease_cart_item(&state.db, &item_id).await?)
        }
        Command::VerifyAudit => to_json(handoff::verify_audit(&state.db).await?),
        Command::Commission { .. } | Command::Split { .. } | Command::Help => Err(
            ApiError::unexpected("pure command routed to database runner"),
        ),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::unexpected(e.to_string()))
}
