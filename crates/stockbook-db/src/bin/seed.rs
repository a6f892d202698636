//! # Seed Data Generator
//!
//! Populates a database with a small shop for development: customers, a
//! catalog, an admin login and a handful of finalized orders. Prints the
//! dashboard and the reports for a period when done.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by STOCKBOOK_DB_PATH (default ./stockbook.db)
//! cargo run -p stockbook-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockbook-db --bin seed -- --db ./data/dev.db
//!
//! # Report period (defaults to today)
//! cargo run -p stockbook-db --bin seed -- --from 01-03-2024 --to 31-03-2024
//! ```
//!
//! The admin account is `admin` / `admin123`.

use std::env;

use chrono::Utc;
use stockbook_core::export::ReportDocument;
use stockbook_core::format::{format_datetime, parse_date};
use stockbook_core::report::{DateRange, SalesFilter};
use stockbook_core::{CheckoutRequest, Money, NewCustomer, NewItem, PaymentMode, Session};
use stockbook_db::{Database, DbConfig, ReportSettings};
use tracing_subscriber::EnvFilter;

/// (name, phone, address)
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Ali Traders", "0300-1234567", "Mall Road, Lahore"),
    ("Bilal General Store", "0321-7654321", "Saddar, Karachi"),
    ("Crescent Mart", "0333-5550000", "Blue Area, Islamabad"),
];

/// (name, stock, cost cents, selling cents)
const ITEMS: &[(&str, i64, i64, i64)] = &[
    ("Basmati Rice 5kg", 40, 120000, 145000),
    ("Cooking Oil 1L", 60, 42000, 49500),
    ("Tea 950g", 25, 98000, 115000),
    ("Sugar 1kg", 80, 13000, 15500),
    ("Dish Soap 500ml", 6, 21000, 26000),
    ("Lentils 1kg", 3, 28000, 33500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env()?;
    let today = Utc::now().date_naive();
    let mut from = today;
    let mut to = today;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config = DbConfig::new(&args[i + 1]);
                    i += 1;
                }
            }
            "--from" => {
                if i + 1 < args.len() {
                    from = parse_date(&args[i + 1])?;
                    i += 1;
                }
            }
            "--to" => {
                if i + 1 < args.len() {
                    to = parse_date(&args[i + 1])?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $STOCKBOOK_DB_PATH)");
                println!("      --from <DATE>  Report start, dd-mm-yyyy (default: today)");
                println!("      --to <DATE>    Report end, dd-mm-yyyy (default: today)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let period = DateRange::new(from, to)?;
    let settings = ReportSettings::from_env()?;

    println!("Stockbook Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut customers = Vec::new();
    for (name, phone, address) in CUSTOMERS {
        customers.push(db.customers().create(&NewCustomer::new(*name, *phone, *address)).await?);
    }
    println!("✓ Created {} customers", customers.len());

    let mut items = Vec::new();
    for (name, stock, cost, selling) in ITEMS {
        let input = NewItem::new(
            *name,
            *stock,
            Money::from_cents(*cost),
            Money::from_cents(*selling),
        );
        items.push(db.items().create(&input).await?);
    }
    println!("✓ Created {} items", items.len());

    db.auth().create_credential("admin", "admin123", "admin123").await?;
    println!("✓ Created admin login");

    // (customer index, [(item index, qty)], mode, received cents, cheque)
    let orders: &[(usize, &[(usize, i64)], PaymentMode, i64, Option<&str>)] = &[
        (0, &[(0, 2), (1, 4)], PaymentMode::Cash, 488000, None),
        (1, &[(2, 1), (3, 10)], PaymentMode::Credit, 0, None),
        (2, &[(4, 2), (5, 1)], PaymentMode::Cheque, 50000, Some("CHQ-100234")),
        (0, &[(3, 5)], PaymentMode::Cash, 80000, None),
    ];

    let mut session = Session::new();
    db.auth().login(&mut session, "admin", "admin123").await?;

    for (customer_idx, lines, mode, received, cheque) in orders {
        for (item_idx, qty) in lines.iter() {
            db.cart_builder()
                .add_line(&mut session, items[*item_idx].id, *qty)
                .await?;
        }

        let mut request =
            CheckoutRequest::new(customers[*customer_idx].id, *mode, Money::from_cents(*received));
        if let Some(cheque_no) = cheque {
            request = request.with_cheque_no(*cheque_no);
        }

        let finalized = db.finalizer().finalize(&mut session, &request).await?;
        println!(
            "  Bill {:>3}  {:<7} total {:>14}  balance {:>14}",
            finalized.bill_no,
            mode,
            finalized.total.to_string(),
            finalized.balance.to_string()
        );
    }
    db.auth().logout(&mut session);
    println!("✓ Finalized {} orders", orders.len());

    // Reports
    println!();
    let dashboard = db.reports().dashboard(settings.recent_orders).await?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    println!();
    for order in &dashboard.recent_orders {
        println!(
            "  {}  Bill {:>3}  {:<20} {}",
            format_datetime(order.created_at),
            order.bill_no,
            order.customer_name,
            order.items_summary()
        );
    }

    println!();
    for level in db.reports().low_stock().await? {
        println!("  Low stock: {} ({} left)", level.name, level.quantity);
    }

    let history = db.reports().sales_history(&SalesFilter::new(period)).await?;
    println!();
    println!("{}", ReportDocument::sales_report(&history).render_text());

    let summary = db.reports().transaction_summary(&period).await?;
    println!();
    println!("{}", ReportDocument::transaction_report(&summary).render_text());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockbook=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
