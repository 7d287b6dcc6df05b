//! # UniMart Desk Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Parse the command line
//! 3. Pure commands run immediately; the rest load `DeskConfig`, open the
//!    database (running migrations) and wire the handoff desk
//! 4. Print the result as JSON on stdout, or the `ApiError` on stderr

use std::process::ExitCode;
use tracing::info;

use unimart_desk::cli::{self, Command, USAGE};

#[tokio::main]
async fn main() -> ExitCode {
    unimart_desk::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let invocation = match cli::parse(&args) {
        Ok(invocation) => invocation,
        Err(err) => return report(&err),
    };

    if invocation.command == Command::Help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    info!(command = ?invocation.command, "Running desk command");

    match cli::execute(invocation).await {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => report(&unimart_desk::error::ApiError::unexpected(e.to_string())),
        },
        Err(err) => report(&err),
    }
}

fn report(err: &unimart_desk::error::ApiError) -> ExitCode {
    match serde_json::to_string_pretty(err) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err}"),
    }
    ExitCode::FAILURE
}
