//! # Seed Data Generator
//!
//! Populates an empty database with the demo café catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p till-db --bin seed
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```

use std::env;

use till_core::{Engine, Money, NewProduct, Product, StoreKey};
use till_db::{Database, DbConfig};

/// (name, price, stock, category)
const PRODUCTS: &[(&str, i64, i64, &str)] = &[
    ("Café Americano", 2500, 50, "Bebidas Calientes"),
    ("Cappuccino", 3500, 30, "Bebidas Calientes"),
    ("Latte", 4000, 25, "Bebidas Calientes"),
    ("Espresso", 2000, 40, "Bebidas Calientes"),
    ("Frappé", 4500, 20, "Bebidas Frías"),
    ("Jugo Natural", 3000, 15, "Bebidas Frías"),
    ("Croissant", 2800, 12, "Panadería"),
    ("Muffin", 2200, 8, "Panadería"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./till_dev.db");

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
                println!("Till POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.documents();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing: Vec<Product> = store.load(StoreKey::Catalog).await?.unwrap_or_default();
    if !existing.is_empty() {
        println!("⚠ Catalog already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut engine = Engine::default();
    let mut writes = Vec::new();

    for (name, price, stock, category) in PRODUCTS {
        let outcome = engine.add_product(NewProduct {
            name: name.to_string(),
            price: Money::from_minor(*price),
            category: category.to_string(),
            stock: *stock,
        })?;
        writes.extend(outcome.writes);
    }

    store.apply(&writes).await?;

    println!("✓ Seeded {} products", engine.catalog().len());
    Ok(())
}
