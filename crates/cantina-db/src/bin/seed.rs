//! # Seed Data Generator
//!
//! Populates a fresh local store with a starter cafeteria catalog and the
//! default settings, for development and manual testing.
//!
//! ## Usage
//! ```bash
//! cargo run -p cantina-db --bin seed
//!
//! # Specify database path
//! cargo run -p cantina-db --bin seed -- --db ./data/cantina.db
//! ```

use chrono::Utc;
use std::env;

use cantina_db::{Database, DbConfig, ProductRepository};

/// Starter catalog: (name, unit, initial stock).
const STARTER_CATALOG: &[(&str, &str, i64)] = &[
    ("Orange juice", "bottle", 24),
    ("Chocolate cookie", "unit", 40),
    ("Ham sandwich", "unit", 15),
    ("Bottled water", "bottle", 36),
    ("Coffee", "cup", 50),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cantina_dev.db");

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
                println!("Cantina Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cantina_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cantina Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Never seed on top of real data.
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding settings defaults...");
    db.settings().ensure_defaults().await?;
    println!("✓ Settings seeded");

    println!();
    println!("Seeding starter catalog...");
    let now = Utc::now();

    let mut tx = db.pool().begin().await?;
    for (name, unit, stock) in STARTER_CATALOG {
        let id = ProductRepository::insert_in(&mut tx, name, unit, *stock, true, now).await?;
        println!("  [{}] {} ({} {})", id, name, stock, unit);
    }
    tx.commit().await?;

    println!();
    println!("✓ Seeded {} products", STARTER_CATALOG.len());
    println!("✓ Seed complete!");

    Ok(())
}
