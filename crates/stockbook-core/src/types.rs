//! # Domain Types
//!
//! Entity shapes shared by the store, the cart and the reports.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐ 1    * ┌──────────────┐ 1    * ┌──────────────┐      │
//! │  │   Customer   │───────►│    Order     │───────►│  OrderItem   │      │
//! │  │  name/phone  │        │  total       │        │  qty, price  │      │
//! │  │  address     │        │  status      │        │  (snapshots) │      │
//! │  └──────┬───────┘        └──────┬───────┘        └──────┬───────┘      │
//! │         │ 1                     │ 1                     │ *            │
//! │         │                       │ 1                     │ 1            │
//! │         │ *              ┌──────▼───────┐        ┌──────┴───────┐      │
//! │         └───────────────►│ Transaction  │        │     Item     │      │
//! │                          │ bill_no      │        │  quantity    │      │
//! │                          │ issue/recv/  │        │  cost/selling│      │
//! │                          │ balance      │        └──────────────┘      │
//! │                          └──────────────┘                              │
//! │                                                                         │
//! │  Deleting a Customer cascades to its Orders and Transactions;          │
//! │  deleting an Order or an Item cascades to OrderItems.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary fields are stored as `*_cents` integers and exposed as
//! [`Money`] through accessor methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Customer
// =============================================================================

/// A customer that places orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Form input for creating or editing a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl NewCustomer {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        NewCustomer {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Checks every field; all three are required.
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::validation::validate_name("name", &self.name)?;
        crate::validation::validate_phone(&self.phone)?;
        crate::validation::validate_address(&self.address)?;
        Ok(())
    }
}

// =============================================================================
// Item
// =============================================================================

/// A product held in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    pub id: i64,
    pub name: String,
    /// Units on hand. Never negative; decremented only by order finalization
    /// (or edited by hand).
    pub quantity: i64,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// At or below the reorder level.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= LOW_STOCK_THRESHOLD
    }

    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

/// Form input for creating or editing an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: i64, cost_price: Money, selling_price: Money) -> Self {
        NewItem {
            name: name.into(),
            quantity,
            cost_price_cents: cost_price.cents(),
            selling_price_cents: selling_price.cents(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::validation::validate_name("name", &self.name)?;
        crate::validation::validate_stock_level(self.quantity)?;
        crate::validation::validate_price_cents("cost price", self.cost_price_cents)?;
        crate::validation::validate_price_cents("selling price", self.selling_price_cents)?;
        Ok(())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order, chosen when the order is finalized and
/// editable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "order status".to_string(),
                reason: format!("unknown status '{}'", s),
            })
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How the customer settled (or will settle) the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Credit,
    /// Requires a cheque number.
    Cheque,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 3] = [PaymentMode::Cash, PaymentMode::Credit, PaymentMode::Cheque];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Credit => "Credit",
            PaymentMode::Cheque => "Cheque",
        }
    }

    #[inline]
    pub fn requires_cheque_number(&self) -> bool {
        matches!(self, PaymentMode::Cheque)
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "payment mode".to_string(),
                reason: format!("unknown mode '{}'", s),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Σ line quantity × snapshot price at creation time.
    pub total_amount_cents: i64,
    pub status: OrderStatus,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Human-facing bill number for this order.
    #[inline]
    pub fn bill_no(&self) -> String {
        bill_no_for(self.id)
    }
}

/// Renders the bill number of an order: its id as decimal text.
pub fn bill_no_for(order_id: i64) -> String {
    order_id.to_string()
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of a committed order.
/// Uses the snapshot pattern: prices are frozen when the line entered the
/// cart and never follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub quantity: i64,
    /// Selling price at cart-add time (frozen).
    pub price_cents: i64,
    /// Cost price at cart-add time (frozen).
    pub cost_price_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// The payment record created alongside every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    /// Owning order (one transaction per order).
    pub order_id: i64,
    /// Display identifier; equals `order_id` as decimal text.
    pub bill_no: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub customer_id: i64,
    /// Customer name copied at transaction time.
    pub party_name: String,
    /// Customer address copied at transaction time.
    pub address: String,
    pub mode: PaymentMode,
    pub cheque_no: Option<String>,
    pub issue_amount_cents: i64,
    pub received_cents: i64,
    /// issue − received; negative when overpaid.
    pub balance_cents: i64,
}

impl Transaction {
    #[inline]
    pub fn issue_amount(&self) -> Money {
        Money::from_cents(self.issue_amount_cents)
    }

    #[inline]
    pub fn received(&self) -> Money {
        Money::from_cents(self.received_cents)
    }

    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Credential
// =============================================================================

/// A login account. Only the argon2 PHC string is ever stored.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Credential {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
