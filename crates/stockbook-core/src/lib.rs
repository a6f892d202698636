//! # stockbook-core: Pure Domain Logic for Stockbook
//!
//! Everything Stockbook knows about customers, items, carts, checkout math
//! and report layout, as plain Rust with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation (forms, tables, PDF writer)           │   │
//! │  │   Order form ──► Cart table ──► Finalize ──► Reports / export   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            stockbook-db (storage + services)                    │   │
//! │  │   repositories, CartBuilder, OrderFinalizer, Authenticator      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │   cart   │ │checkout │ │ report │  │   │
//! │  │   │Customer │ │  Money  │ │ CartLine │ │ Request │ │  rows  │  │   │
//! │  │   │  Item   │ │  PKR    │ │ Session  │ │ Draft   │ │ export │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Customer, Item, Order, OrderItem, Transaction)
//! - [`money`] - Integer paisa arithmetic and `PKR 0.00` display
//! - [`cart`] - In-memory cart with merge-on-add semantics
//! - [`session`] - Per-session context (user + cart)
//! - [`checkout`] - Payment validation and order drafting
//! - [`report`] - Report row types, filters and aggregation
//! - [`export`] - Report document layout and text rendering
//! - [`format`] - Date and currency display helpers
//! - [`validation`] - Input rules for forms
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::money::Money;
//!
//! let price = Money::from_cents(10000); // PKR 100.00
//! let total = price.multiply_quantity(3) + Money::from_cents(25000);
//! assert_eq!(total.to_string(), "PKR 550.00");
//!
//! let received = Money::from_cents(60000);
//! assert_eq!((total - received).to_string(), "PKR -50.00"); // overpaid
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod export;
pub mod format;
pub mod money;
pub mod report;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use checkout::{CheckoutRequest, FinalizedOrder, OrderDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::Session;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Literal prefix on every displayed currency amount.
pub const CURRENCY_PREFIX: &str = "PKR";

/// Items at or below this quantity are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Minimum password length at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Number of orders shown on the dashboard unless configured otherwise.
pub const DEFAULT_RECENT_ORDERS: usize = 10;
