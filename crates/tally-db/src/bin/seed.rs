//! # Seed Data Generator
//!
//! Populates a development database with a catalog and a few days of
//! ledger activity.
//!
//! ## Usage
//! ```bash
//! # Seed 3 days of activity (default)
//! cargo run -p tally-db --bin seed
//!
//! # Custom number of days
//! cargo run -p tally-db --bin seed -- --days 10
//!
//! # Specify database path and shop
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db --shop my-shop
//! ```
//!
//! ## Generated Data
//! - A small catalog across a few categories
//! - Per day: cash sales, one credit sale, one cash-out and one cash-in,
//!   each numbered through the daily counter like the terminal does
//! - One cancelled sale on the most recent day

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::env;
use tally_core::ids::IdGenerator;
use tally_core::{CashDirection, Item, LineItem, Money, PaymentMethod, Transaction, DEFAULT_SHOP_ID};
use tally_db::{Database, DbConfig};

/// Catalog for realistic test data: (category, name, price in cents)
const CATALOG: &[(&str, &str, i64)] = &[
    ("Drinks", "Coffee", 350),
    ("Drinks", "Tea", 250),
    ("Drinks", "Orange Juice", 400),
    ("Drinks", "Water", 150),
    ("Bakery", "Croissant", 275),
    ("Bakery", "Bagel", 225),
    ("Bakery", "Muffin", 300),
    ("Grocery", "Milk 1L", 189),
    ("Grocery", "Eggs Dozen", 499),
    ("Grocery", "Bread Loaf", 329),
];

const CUSTOMERS: &[&str] = &["Jane", "Omar", "Priya", "Luis"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut days: u32 = 3;
    let mut db_path = String::from("./tally_dev.db");
    let mut shop_id = String::from(DEFAULT_SHOP_ID);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--shop" | "-s" => {
                if i + 1 < args.len() {
                    shop_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of activity to generate (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -s, --shop <ID>    Shop id (default: {})", DEFAULT_SHOP_ID);
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
    println!("Shop:     {}", shop_id);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.transactions().count(&shop_id).await?;
    if existing > 0 {
        println!("⚠ Shop already has {} transactions", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let ids = IdGenerator::detect();
    let now = Utc::now();

    let catalog: Vec<Item> = CATALOG
        .iter()
        .map(|(category, name, cents)| Item {
            id: ids.item_id(now),
            shop_id: shop_id.clone(),
            name: name.to_string(),
            price_cents: *cents,
            category: category.to_string(),
            color: None,
            created_at: now,
        })
        .collect();
    db.items().replace_items(&shop_id, &catalog).await?;
    println!("✓ Catalog: {} items", catalog.len());

    let today = now.date_naive();
    let mut generated = 0;

    for offset in (0..days).rev() {
        let date = today - Duration::days(i64::from(offset));
        for tx in build_day(&db, &ids, &shop_id, &catalog, date, offset).await? {
            db.transactions().insert(&shop_id, &tx).await?;
            generated += 1;
        }
        println!("  {} seeded", date);
    }

    println!();
    println!("✓ Generated {} transactions", generated);
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one day of activity, numbering each document as it is built.
async fn build_day(
    db: &Database,
    ids: &IdGenerator,
    shop_id: &str,
    catalog: &[Item],
    date: NaiveDate,
    seed: u32,
) -> Result<Vec<Transaction>, Box<dyn std::error::Error>> {
    let at = |h: u32, m: u32| {
        let time = NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        Utc.from_utc_datetime(&date.and_time(time))
    };
    let line = |idx: usize, qty: i64| {
        let item = &catalog[idx % catalog.len()];
        LineItem::new(item.name.clone(), item.price(), qty)
    };

    let mut txs = Vec::new();
    let counters = db.counters();
    let seed = seed as usize;

    txs.push(Transaction::cash_movement(
        ids.transaction_id(at(8, 0)),
        shop_id,
        at(8, 0),
        CashDirection::In,
        "Opening float",
        Money::from_cents(10_000),
        counters.next_daily_number(shop_id, date).await?.to_string(),
    ));

    for (n, hour) in [9_u32, 10, 12, 15].into_iter().enumerate() {
        let mut sale = Transaction::sale(
            ids.transaction_id(at(hour, 15)),
            shop_id,
            at(hour, 15),
            None,
            vec![line(seed + n, 1 + (n as i64 % 3)), line(seed + n + 4, 1)],
            PaymentMethod::Cash,
            counters.next_daily_number(shop_id, date).await?.to_string(),
        );
        if seed == 0 && n == 1 {
            sale.cancel()?;
        }
        txs.push(sale);
    }

    txs.push(Transaction::sale(
        ids.transaction_id(at(13, 30)),
        shop_id,
        at(13, 30),
        Some(CUSTOMERS[seed % CUSTOMERS.len()].to_string()),
        vec![line(seed + 7, 2)],
        PaymentMethod::Credit,
        counters.next_daily_number(shop_id, date).await?.to_string(),
    ));

    txs.push(Transaction::cash_movement(
        ids.transaction_id(at(17, 45)),
        shop_id,
        at(17, 45),
        CashDirection::Out,
        "Supplies",
        Money::from_cents(2_000),
        counters.next_daily_number(shop_id, date).await?.to_string(),
    ));

    Ok(txs)
}
