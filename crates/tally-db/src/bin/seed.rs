//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p tally-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tally-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Catalog
//! One category per group below, then products named `{item} {size}`:
//! - Unique SKU: `{CODE}-{ITEM}-{INDEX}`
//! - Price: 1.99 - 9.99 plus a size surcharge
//! - Stock: 0 - 100, restock threshold 5 - 14
//!
//! Some products start at or below their threshold so the low-stock
//! dashboard has something to show.

use std::env;
use tally_core::Money;
use tally_db::repository::product::NewProduct;
use tally_db::{Database, DbConfig};

/// Product groups: (category name, SKU code, items)
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "Beverages",
        "BEV",
        &[
            "Kopi Susu",
            "Es Teh Manis",
            "Air Mineral",
            "Jus Jeruk",
            "Teh Botol",
            "Cola",
            "Lemonade",
            "Susu Coklat",
        ],
    ),
    (
        "Snacks",
        "SNK",
        &[
            "Keripik Singkong",
            "Kacang Goreng",
            "Biskuit Kelapa",
            "Wafer Coklat",
            "Roti Bakar",
            "Pisang Goreng",
        ],
    ),
    (
        "Meals",
        "MEL",
        &[
            "Nasi Goreng",
            "Mie Goreng",
            "Ayam Geprek",
            "Soto Ayam",
            "Nasi Uduk",
        ],
    ),
    (
        "Household",
        "HSE",
        &["Sabun Cuci", "Tisu", "Sikat Gigi", "Pasta Gigi", "Korek Api"],
    ),
];

/// Size variants and their price surcharge in minor units
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Regular", 100),
    ("Large", 250),
    ("Family", 500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
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

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'groups: for (group_idx, (category_name, code, items)) in CATALOG.iter().enumerate() {
        let category = db.categories().insert(category_name).await?;

        for (item_idx, item) in items.iter().enumerate() {
            for (size_idx, (size, surcharge)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'groups;
                }

                let seed = group_idx * 1000 + item_idx * 20 + size_idx;
                let mut product = generate_product(code, item, size, *surcharge, seed);
                product.category_id = Some(category.id.clone());

                if let Err(e) = db.products().insert(product).await {
                    eprintln!("Failed to insert {} {}: {}", item, size, e);
                    continue;
                }

                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let low = db.reports().low_stock_products(100).await?;
    println!("  Low stock: {} products", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(code: &str, item: &str, size: &str, surcharge: i64, seed: usize) -> NewProduct {
    let short: String = item
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{}-{}-{:04}", code, short, seed);

    // 1.99 - 9.99 plus surcharge
    let base_price = 199 + ((seed * 17) % 800) as i64;
    let price = Money::from_cents(base_price + surcharge);

    let stock = (seed % 101) as i64;

    NewProduct {
        category_id: None,
        sku,
        name: format!("{} {}", item, size),
        selling_price: price,
        stock_quantity: stock,
        min_stock: 5 + (seed % 10) as i64,
    }
}
