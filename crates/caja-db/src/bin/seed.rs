//! # Seed Data Generator
//!
//! Populates a development database with a small-retail catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p caja-db --bin seed
//! cargo run -p caja-db --bin seed -- --db ./data/caja.db
//! ```

use std::env;

use caja_core::types::Category;
use caja_core::Money;
use caja_db::{NewProduct, Store, StoreConfig};
use tracing_subscriber::EnvFilter;

/// (name, category, cost, market, sale, wholesale, stock, min_stock, backorder)
const CATALOG: &[(&str, Category, i64, i64, i64, i64, i64, Option<i64>, bool)] = &[
    ("Claw hammer 16oz", Category::Tools, 6000, 12000, 9900, 8500, 8, Some(2), false),
    ("Screwdriver set", Category::Tools, 4500, 9000, 7500, 6500, 12, Some(3), false),
    ("Tape measure 5m", Category::Tools, 2000, 4500, 3500, 3000, 15, Some(5), false),
    ("Nails 1kg", Category::Tools, 1200, 2500, 2000, 1700, 40, Some(10), false),
    ("Screws 1kg", Category::Tools, 1500, 3000, 2400, 2000, 35, Some(10), false),
    ("Paint 1L white", Category::General, 5500, 11000, 9000, 8000, 10, Some(3), false),
    ("Paint brush 2in", Category::General, 1000, 2200, 1800, 1500, 20, Some(5), false),
    ("Extension cord 5m", Category::General, 3500, 7500, 6000, 5200, 6, Some(2), false),
    ("Light bulb LED", Category::General, 800, 1800, 1500, 1200, 50, Some(15), false),
    ("Duct tape", Category::General, 900, 2000, 1600, 1300, 25, Some(8), false),
    ("Potato chips", Category::Snacks, 500, 1200, 1000, 850, 60, Some(20), false),
    ("Chocolate bar", Category::Snacks, 400, 1000, 800, 700, 80, Some(25), false),
    ("Cookies pack", Category::Snacks, 600, 1400, 1100, 950, 45, Some(15), false),
    ("Soda 600ml", Category::Snacks, 450, 1100, 900, 750, 70, Some(20), false),
    ("Shampoo 400ml", Category::Beauty, 2200, 4800, 3900, 3400, 18, Some(5), false),
    ("Hand soap", Category::Beauty, 700, 1600, 1300, 1100, 30, Some(10), false),
    ("Face cream", Category::Beauty, 3000, 6500, 5500, 4800, 8, Some(2), false),
    ("Nail polish", Category::Beauty, 900, 2200, 1800, 1500, 22, Some(6), false),
    // Made to order: sold past zero, stock goes negative until restocked.
    ("Custom picture frame", Category::Other, 20000, 55000, 45000, 40000, 0, None, true),
    ("Engraved plaque", Category::Other, 15000, 40000, 32000, 28000, 0, None, true),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./caja_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caja POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./caja_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Caja POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let store = Store::open(StoreConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = store.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let products = store.products();
    for (name, category, cost, market, sale, wholesale, stock, min_stock, backorder) in CATALOG {
        products
            .create(NewProduct {
                name: name.to_string(),
                barcode: None,
                category: *category,
                cost_price: Money::from_cents(*cost),
                market_price: Money::from_cents(*market),
                sale_price: Money::from_cents(*sale),
                wholesale_price: Money::from_cents(*wholesale),
                stock: *stock,
                min_stock: *min_stock,
                backorder: *backorder,
            })
            .await?;
    }

    println!("✓ Seeded {} products", CATALOG.len());
    Ok(())
}
