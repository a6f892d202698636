//! # stockbook-db: Database Layer for Stockbook
//!
//! SQLite storage, the repositories over it, and the workflows that need a
//! database: cart assembly against live stock, atomic order finalization,
//! reporting joins and credential checks.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  Order form / tables / report export (external callers)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │   Services   │   │   │
//! │  │   │   (pool.rs)   │    │               │    │              │   │   │
//! │  │   │               │    │ Customer      │    │ CartBuilder  │   │   │
//! │  │   │ SqlitePool    │◄───│ Item, Order   │◄───│ Finalizer    │   │   │
//! │  │   │ Migrations    │    │ Transaction   │    │ Authenticator│   │   │
//! │  │   │               │    │ Report, Cred. │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   $STOCKBOOK_DB_PATH (default ./stockbook.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Per-entity storage and reporting queries
//! - [`service`] - Cart, checkout and authentication workflows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_core::{CheckoutRequest, Money, PaymentMode, Session};
//! use stockbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let mut session = Session::new();
//! db.cart_builder().add_line(&mut session, item_id, 3).await?;
//!
//! let request = CheckoutRequest::new(customer_id, PaymentMode::Cash, Money::from_cents(50000));
//! let order = db.finalizer().finalize(&mut session, &request).await?;
//! println!("Bill {} balance {}", order.bill_no, order.balance);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, ReportSettings};
pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::credential::CredentialRepository;
pub use repository::customer::CustomerRepository;
pub use repository::item::ItemRepository;
pub use repository::order::OrderRepository;
pub use repository::report::ReportRepository;
pub use repository::transaction::TransactionRepository;

pub use service::auth::Authenticator;
pub use service::cart::CartBuilder;
pub use service::checkout::OrderFinalizer;
