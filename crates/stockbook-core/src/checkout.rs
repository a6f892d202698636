//! # Checkout
//!
//! The pure half of order finalization: validating the payment form and
//! turning a cart into an [`OrderDraft`] whose totals are already settled.
//! The storage half (stock re-check, inserts, decrements) lives in
//! `stockbook-db`'s `OrderFinalizer`.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Flow                                    │
//! │                                                                         │
//! │  Session cart + CheckoutRequest                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  OrderDraft::from_cart  (THIS MODULE, no I/O)                           │
//! │        ├── cart empty?              → EmptyCart                         │
//! │        ├── cheque without number?   → MissingChequeNumber               │
//! │        ├── received < 0?            → ValidationError                   │
//! │        └── total = Σ snapshot × qty, balance = total − received         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  OrderFinalizer (stockbook-db, one SQLite transaction)                  │
//! │        ├── re-check stock, insert order + lines + transaction           │
//! │        └── commit → FinalizedOrder { order_id, bill_no, ... }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{OrderStatus, PaymentMode};
use crate::validation::{normalize_cheque_no, validate_received_cents};

// =============================================================================
// Checkout Request
// =============================================================================

/// What the order form submits alongside the session's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub customer_id: i64,
    pub mode: PaymentMode,
    /// Required when `mode` is cheque; dropped otherwise.
    pub cheque_no: Option<String>,
    /// Initial order status.
    #[serde(default)]
    pub status: OrderStatus,
    pub received_cents: i64,
}

impl CheckoutRequest {
    /// A request with pending status and no cheque number.
    pub fn new(customer_id: i64, mode: PaymentMode, received: Money) -> Self {
        CheckoutRequest {
            customer_id,
            mode,
            cheque_no: None,
            status: OrderStatus::Pending,
            received_cents: received.cents(),
        }
    }

    pub fn with_cheque_no(mut self, cheque_no: impl Into<String>) -> Self {
        self.cheque_no = Some(cheque_no.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    #[inline]
    pub fn received(&self) -> Money {
        Money::from_cents(self.received_cents)
    }

    /// Validates the payment fields and returns the cheque number to store.
    ///
    /// A cheque number given with cash or credit is discarded so the stored
    /// transaction always satisfies "cheque_no present iff mode is cheque".
    pub fn validated_cheque_no(&self) -> CoreResult<Option<String>> {
        let cheque_no = normalize_cheque_no(self.cheque_no.as_deref())?;
        match (self.mode.requires_cheque_number(), cheque_no) {
            (true, None) => Err(CoreError::MissingChequeNumber),
            (true, some) => Ok(some),
            (false, _) => Ok(None),
        }
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// A line ready to be written as an OrderItem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
    pub cost_price_cents: i64,
}

/// A fully validated order waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer_id: i64,
    pub status: OrderStatus,
    pub mode: PaymentMode,
    pub cheque_no: Option<String>,
    pub lines: Vec<DraftLine>,
    pub total: Money,
    pub received: Money,
}

impl OrderDraft {
    /// Builds a draft from the session cart and the payment form.
    ///
    /// ## Errors
    /// `EmptyCart`, `MissingChequeNumber`, or `Validation` for a negative
    /// received amount or a total that overflows. Checked in that order.
    pub fn from_cart(cart: &Cart, request: &CheckoutRequest) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let cheque_no = request.validated_cheque_no()?;
        validate_received_cents(request.received_cents)?;

        let lines: Vec<DraftLine> = cart
            .lines()
            .iter()
            .map(|line| DraftLine {
                item_id: line.item_id,
                name: line.name.clone(),
                quantity: line.quantity,
                price_cents: line.unit_price_cents,
                cost_price_cents: line.cost_price_cents,
            })
            .collect();

        let total = lines
            .iter()
            .try_fold(Money::zero(), |total, l| {
                Money::from_cents(l.price_cents)
                    .checked_multiply_quantity(l.quantity)
                    .and_then(|line_total| total.checked_add(line_total))
            })
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "order total".to_string(),
                min: 0,
                max: i64::MAX,
            })?;

        Ok(OrderDraft {
            customer_id: request.customer_id,
            status: request.status,
            mode: request.mode,
            cheque_no,
            lines,
            total,
            received: request.received(),
        })
    }

    /// issue − received. Negative when the customer overpaid.
    #[inline]
    pub fn balance(&self) -> Money {
        self.total - self.received
    }
}

// =============================================================================
// Finalized Order
// =============================================================================

/// Result of a committed finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalizedOrder {
    pub order_id: i64,
    pub bill_no: String,
    pub total: Money,
    pub received: Money,
    pub balance: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
