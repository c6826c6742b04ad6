//! # Seed Data Generator
//!
//! Populates the catalog with test products for development.
//!
//! ## Usage
//! ```bash
//! # Generate the default catalog
//! cargo run -p tally-store --bin seed
//!
//! # Generate a custom amount
//! cargo run -p tally-store --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p tally-store --bin seed -- --db ./data/tally.db
//! ```
//!
//! Creates products across the standard categories (beverages, snacks,
//! dairy, frozen, grocery) with deterministic pseudo-random prices between
//! $0.99 and $19.99.

use std::env;

use tally_core::Money;
use tally_store::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Cola", "Root Beer", "Ginger Ale", "Sparkling Water", "Still Water",
            "Orange Juice", "Apple Juice", "Lemonade", "Iced Tea", "Cold Brew",
        ],
    ),
    (
        "SNK",
        &[
            "Potato Chips", "Tortilla Chips", "Pretzels", "Trail Mix", "Granola Bar",
            "Chocolate Bar", "Gummy Bears", "Cookies", "Crackers", "Popcorn",
        ],
    ),
    (
        "DRY",
        &[
            "Whole Milk", "2% Milk", "Oat Milk", "Cheddar Cheese", "Mozzarella",
            "Butter", "Greek Yogurt", "Sour Cream", "Eggs Dozen", "Cream Cheese",
        ],
    ),
    (
        "FRZ",
        &[
            "Vanilla Ice Cream", "Chocolate Ice Cream", "Frozen Pizza",
            "Frozen Vegetables", "Frozen Fruit", "Ice Cream Bars", "Popsicles",
            "Frozen Waffles", "Fish Sticks", "Frozen Fries",
        ],
    ),
    (
        "GRO",
        &[
            "White Bread", "Wheat Bread", "Spaghetti", "Penne", "White Rice",
            "Canned Beans", "Canned Soup", "Cereal", "Peanut Butter", "Honey",
        ],
    ),
];

/// Size variants, with a price addon in cents
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("12oz", 0),
    ("20oz", 100),
    ("6-Pack", 300),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 300;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(300);
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
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 300)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().list_active(1).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 1000 + name_idx * 20 + size_idx;
                // Deterministic pseudo-random base price, $0.99 - $18.99
                let base = 99 + ((seed * 17) % 1800) as i64;
                let price = Money::from_cents(base + price_addon);
                let full_name = format!("{} {}", name, size);

                if let Err(e) = db.catalog().insert(&full_name, category, price).await {
                    eprintln!("Failed to insert {}: {}", full_name, e);
                    continue;
                }

                generated += 1;
                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
