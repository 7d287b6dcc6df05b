//! # Seed Data Generator
//!
//! Populates the desk database with demo orders and cart lines.
//!
//! ## Usage
//! ```bash
//! # 40 orders (default)
//! cargo run -p unimart-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p unimart-db --bin seed -- --count 200 --db ./data/unimart.db
//! ```
//!
//! Orders are spread across statuses so both the handoff and the pickup
//! paths have something to scan. Every third customer also gets a cart.

use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use unimart_core::OrderStatus;
use unimart_db::{Database, DbConfig};

/// Status mix for generated orders.
const STATUSES: &[OrderStatus] = &[
    OrderStatus::Processing,
    OrderStatus::Confirmed,
    OrderStatus::SentToPostOffice,
    OrderStatus::Processing,
    OrderStatus::Pending,
    OrderStatus::Delivered,
];

/// Demo vendors (seller ids).
const VENDORS: &[&str] = &["vendor-mama-put", "vendor-gadget-hub", "vendor-threads"];

/// Demo products for carts.
const PRODUCTS: &[&str] = &[
    "prod-jollof-rice",
    "prod-power-bank",
    "prod-ankara-shirt",
    "prod-usb-cable",
    "prod-suya-wrap",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 40;
    let mut db_path = String::from("./unimart_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("UniMart Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of orders to generate (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: ./unimart_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.orders().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has orders, skipping seed");
        return Ok(());
    }

    let mut carts = 0;
    for n in 0..count {
        let user_id = format!("student-{:03}", n % 25);
        let status = STATUSES[n % STATUSES.len()];
        let seller = VENDORS[n % VENDORS.len()];
        let total = 500 + ((n * 737) % 20_000) as i64;

        let order = db
            .orders()
            .create(&user_id, Some(seller), status, total)
            .await?;

        // scanner QR payload for this order, handy for `desk confirm`
        let action = if status == OrderStatus::SentToPostOffice {
            "pickup"
        } else {
            "handoff"
        };
        println!(
            r#"{{"order_id":"{}","action":"{}","seller_id":"{}"}}"#,
            order.id, action, seller
        );

        if n % 3 == 0 {
            let product = PRODUCTS[n % PRODUCTS.len()];
            db.cart().add_item(&user_id, product, 1 + (n % 4) as i64).await?;
            carts += 1;
        }
    }

    info!(
        orders = db.orders().count().await?,
        cart_items = carts,
        "Seed complete"
    );

    Ok(())
}
