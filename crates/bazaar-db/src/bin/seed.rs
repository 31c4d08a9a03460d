//! # Seed Data Generator
//!
//! Populates the database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Generate 400 products (default)
//! cargo run -p bazaar-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p bazaar-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db
//! ```
//!
//! ## Generated Data
//! Products across storefront categories (tees, hoodies, mugs, posters,
//! bags), each with:
//! - Unique SKU: `{CATEGORY}-{NAME}-{INDEX}`
//! - Price in minor units, varying by edition
//! - A mix of percent, flat, and no discount
//! - Tax rates: 0%, 5%, 10%, 19%
//! - Mostly unlimited stock, some stock-limited
//! - A few unpublished/unapproved rows to exercise the orderable gate
//!
//! Plus a fixed set of coupons covering every validity state
//! (active, expired, not-yet-started, disabled).

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use bazaar_core::{AdjustmentKind, Coupon, CouponStatus, Product};
use bazaar_db::{Database, DbConfig};

/// Product categories with typical unit weight in grams
const CATEGORIES: &[(&str, i64, &[&str])] = &[
    (
        "TEE",
        180,
        &[
            "Crewneck Tee",
            "V-Neck Tee",
            "Pocket Tee",
            "Longsleeve Tee",
            "Ringer Tee",
            "Striped Tee",
            "Graphic Tee",
            "Raglan Tee",
        ],
    ),
    (
        "HOOD",
        650,
        &[
            "Pullover Hoodie",
            "Zip Hoodie",
            "Fleece Hoodie",
            "Cropped Hoodie",
            "Oversized Hoodie",
            "Sherpa Hoodie",
        ],
    ),
    (
        "MUG",
        380,
        &[
            "Ceramic Mug",
            "Enamel Mug",
            "Travel Mug",
            "Espresso Cup",
            "Tea Mug",
        ],
    ),
    (
        "POST",
        120,
        &[
            "City Map Poster",
            "Botanical Poster",
            "Typography Poster",
            "Film Poster",
            "Abstract Poster",
        ],
    ),
    (
        "BAG",
        420,
        &[
            "Canvas Tote",
            "Drawstring Bag",
            "Messenger Bag",
            "Laptop Sleeve",
            "Weekender Bag",
        ],
    ),
];

/// Edition variants with price addon in minor units
const EDITIONS: &[(&str, i64)] = &[
    ("Classic", 0),
    ("Premium", 50_000),
    ("Organic", 80_000),
    ("Vintage", 30_000),
    ("Limited", 150_000),
];

/// Tax rates in basis points
const TAX_RATES: &[i64] = &[0, 500, 1000, 1900];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 400;
    let mut db_path = String::from("./bazaar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(400);
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
                println!("Bazaar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 400)");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bazaar Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for (category_idx, (category_code, weight_grams, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (edition_idx, (edition, price_addon)) in EDITIONS.iter().enumerate() {
                if generated >= count {
                    break;
                }

                let product = generate_product(
                    category_code,
                    name,
                    edition,
                    *price_addon,
                    *weight_grams,
                    category_idx * 1000 + name_idx * 20 + edition_idx,
                );

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.sku, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }

            if generated >= count {
                break;
            }
        }

        if generated >= count {
            break;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Seed coupons
    println!();
    println!("Generating coupons...");

    for coupon in demo_coupons() {
        if let Err(e) = db.coupons().insert(&coupon).await {
            eprintln!("Failed to insert {}: {}", coupon.code, e);
            continue;
        }
        println!("  {} ({:?} {})", coupon.code, coupon.discount_kind, coupon.discount_value);
    }

    // Verify
    println!();
    println!("Verifying...");
    let orderable = db.products().list_orderable(10).await?;
    println!("  Orderable sample: {} products", orderable.len());
    if let Some(p) = db.products().get_by_sku("TEE-CRE-000").await? {
        println!("  Lookup TEE-CRE-000: {} ({} minor)", p.name, p.unit_price_minor);
    }
    let coupons = db.coupons().count().await?;
    println!("  Coupons: {}", coupons);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(
    category: &str,
    name: &str,
    edition: &str,
    price_addon: i64,
    weight_grams: i64,
    seed: usize,
) -> Product {
    let now = Utc::now();

    // Generate unique SKU
    let sku = format!(
        "{}-{}-{:03}",
        category,
        &name.replace(' ', "")[..3].to_uppercase(),
        seed
    );

    // Base price plus edition addon
    let base_price = 49_900 + ((seed * 17) % 350_000) as i64;
    let unit_price_minor = base_price + price_addon;

    // A mix of discounts: percent, flat, mostly none
    let (discount_value, discount_kind) = if seed % 5 == 0 {
        (1000, AdjustmentKind::Percent)
    } else if seed % 7 == 0 {
        (20_000, AdjustmentKind::Flat)
    } else {
        (0, AdjustmentKind::Percent)
    };

    // Tax rate from the fixed set
    let tax_value = TAX_RATES[seed % TAX_RATES.len()];

    // Shipping: a flat line fee, occasionally per-unit
    let shipping_cost_minor = 15_000 + ((seed % 4) as i64) * 5_000;
    let shipping_quantity_multiplied = seed % 6 == 0;

    // Mostly unlimited stock, every fourth product stock-limited
    let current_stock = if seed % 4 == 0 { (seed % 50) as i64 + 1 } else { 0 };

    // A few rows exercise the orderable gate
    let published = seed % 23 != 0;
    let approved = seed % 31 != 0;

    let full_name = format!("{} {}", edition, name);

    Product {
        id: Uuid::new_v4().to_string(),
        sku,
        name: full_name,
        unit_price_minor,
        discount_value,
        discount_kind,
        tax_value,
        tax_kind: AdjustmentKind::Percent,
        shipping_cost_minor,
        shipping_quantity_multiplied,
        current_stock,
        weight_grams,
        published,
        approved,
        created_at: now,
        updated_at: now,
    }
}

/// The fixed coupon set: one per validity state.
fn demo_coupons() -> Vec<Coupon> {
    let now = Utc::now();

    let coupon = |code: &str, value: i64, kind: AdjustmentKind| Coupon {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        discount_value: value,
        discount_kind: kind,
        status: CouponStatus::Active,
        starts_at: None,
        ends_at: None,
        created_at: now,
        updated_at: now,
    };

    vec![
        // Always valid
        coupon("WELCOME10", 1000, AdjustmentKind::Percent),
        coupon("FLAT50", 50_000, AdjustmentKind::Flat),
        // Valid inside a window
        Coupon {
            starts_at: Some(now - Duration::days(1)),
            ends_at: Some(now + Duration::days(30)),
            ..coupon("LAUNCH20", 2000, AdjustmentKind::Percent)
        },
        // Window already closed
        Coupon {
            starts_at: Some(now - Duration::days(60)),
            ends_at: Some(now - Duration::days(1)),
            ..coupon("EXPIRED10", 1000, AdjustmentKind::Percent)
        },
        // Window not open yet
        Coupon {
            starts_at: Some(now + Duration::days(7)),
            ..coupon("SOON25", 2500, AdjustmentKind::Percent)
        },
        // Disabled by the merchant
        Coupon {
            status: CouponStatus::Disabled,
            ..coupon("PAUSED15", 1500, AdjustmentKind::Percent)
        },
    ]
}
