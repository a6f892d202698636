//! # Cart
//!
//! The in-memory list of lines a session is assembling into an order.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Order form action        Operation               Cart change           │
//! │  ─────────────────        ─────────               ───────────           │
//! │                                                                         │
//! │  Add to cart ────────────► add_line(item, qty) ─► merge or push line   │
//! │                                                                         │
//! │  Remove (row) ───────────► remove_line(id) ─────► lines.retain(..)     │
//! │                                                                         │
//! │  Remove all ─────────────► remove_all() ────────► lines.clear()        │
//! │                                                                         │
//! │  Show cart table ────────► lines() / total() ───► (read only)          │
//! │                                                                         │
//! │  NOTE: add_line is given the Item as it is persisted right now;         │
//! │        the stock check compares against that, never a cached copy.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is not persisted. It lives inside a [`crate::session::Session`]
//! and is cleared after a successful finalize or on logout.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Item;
use crate::validation::{validate_cart_size, validate_line_quantity};
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the cart.
///
/// ## Design Notes
/// Name and prices are frozen when the item first enters the cart. Merging
/// more of the same item keeps the original snapshot, and finalization
/// charges the snapshot, not whatever the catalog says at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub item_id: i64,
    /// Item name at time of adding (frozen).
    pub name: String,
    pub quantity: i64,
    /// Selling price at time of adding (frozen).
    pub unit_price_cents: i64,
    /// Cost price at time of adding (frozen).
    pub cost_price_cents: i64,
    /// Always `unit_price_cents × quantity`.
    pub line_total_cents: i64,
}

impl CartLine {
    /// Creates a line from a persisted item, freezing its prices.
    ///
    /// ## Errors
    /// `Validation` when price × quantity does not fit in an `i64`.
    pub fn from_item(item: &Item, quantity: i64) -> CoreResult<Self> {
        let line_total = item
            .selling_price()
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| amount_out_of_range("line total"))?;

        Ok(CartLine {
            item_id: item.id,
            name: item.name.clone(),
            quantity,
            unit_price_cents: item.selling_price_cents,
            cost_price_cents: item.cost_price_cents,
            line_total_cents: line_total.cents(),
        })
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// The line after adding `quantity` more, or `None` on overflow.
    fn increased(&self, quantity: i64) -> Option<CartLine> {
        let quantity = self.quantity.checked_add(quantity)?;
        let line_total = self.unit_price().checked_multiply_quantity(quantity)?;

        Some(CartLine {
            quantity,
            line_total_cents: line_total.cents(),
            ..self.clone()
        })
    }
}

fn amount_out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A session's cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item merges)
/// - Every line quantity is > 0
/// - Every line quantity ≤ the item's stock at the time it was last added to
/// - At most [`MAX_CART_LINES`] lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` of `item`, merging into an existing line for the same
    /// item.
    ///
    /// ## Errors
    /// - `Validation` when `quantity <= 0`
    /// - `InsufficientStock` when the cart's quantity for this item plus
    ///   `quantity` exceeds `item.quantity`; `requested` is that combined
    ///   figure
    /// - `Validation` when the line or cart total would overflow
    /// - `CartTooLarge` when a new line would exceed [`MAX_CART_LINES`]
    ///
    /// The cart is unchanged on error.
    pub fn add_line(&mut self, item: &Item, quantity: i64) -> CoreResult<()> {
        validate_line_quantity(quantity)?;

        let requested = self.quantity_of(item.id).saturating_add(quantity);
        if requested > item.quantity {
            return Err(CoreError::InsufficientStock {
                item_id: item.id,
                name: item.name.clone(),
                requested,
                available: item.quantity,
            });
        }

        if let Some(pos) = self.lines.iter().position(|l| l.item_id == item.id) {
            let merged = self.lines[pos]
                .increased(quantity)
                .ok_or_else(|| amount_out_of_range("line total"))?;
            let added = merged.line_total_cents - self.lines[pos].line_total_cents;
            self.check_total_fits(Money::from_cents(added))?;
            self.lines[pos] = merged;
            return Ok(());
        }

        validate_cart_size(self.lines.len())
            .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_LINES })?;

        let line = CartLine::from_item(item, quantity)?;
        self.check_total_fits(line.line_total())?;
        self.lines.push(line);
        Ok(())
    }

    fn check_total_fits(&self, added: Money) -> CoreResult<()> {
        self.total()
            .checked_add(added)
            .ok_or_else(|| amount_out_of_range("order total"))?;
        Ok(())
    }

    /// Removes the line for `item_id`. Returns whether a line was removed.
    pub fn remove_line(&mut self, item_id: i64) -> bool {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.item_id != item_id);
        self.lines.len() != initial_len
    }

    /// Clears every line.
    pub fn remove_all(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `item_id` already in the cart (0 when absent).
    pub fn quantity_of(&self, item_id: i64) -> i64 {
        self.lines
            .iter()
            .find(|l| l.item_id == item_id)
            .map_or(0, |l| l.quantity)
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ snapshot price × quantity.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// Cart summary for display next to the cart table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            total_cents: cart.total().cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_item(id: i64, quantity: i64, selling_price_cents: i64) -> Item {
        Item {
            id,
            name: format!("Item {}", id),
            quantity,
            cost_price_cents: selling_price_cents / 2,
            selling_price_cents,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_line_snapshots_prices() {
        let mut cart = Cart::new();
        let item = test_item(1, 10, 10000);

        cart.add_line(&item, 3).unwrap();

        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price_cents, 10000);
        assert_eq!(line.cost_price_cents, 5000);
        assert_eq!(line.line_total_cents, 30000);
    }

    #[test]
    fn test_add_same_item_merges_and_keeps_snapshot() {
        let mut cart = Cart::new();
        let mut item = test_item(1, 10, 10000);

        cart.add_line(&item, 2).unwrap();
        item.selling_price_cents = 12000;
        cart.add_line(&item, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 5);
        assert_eq!(line.unit_price_cents, 10000);
        assert_eq!(line.line_total_cents, 50000);
    }

    #[test]
    fn test_add_line_counts_existing_quantity_against_stock() {
        let mut cart = Cart::new();
        let item = test_item(7, 4, 1000);

        cart.add_line(&item, 2).unwrap();
        let err = cart.add_line(&item, 3).unwrap_err();

        match err {
            CoreError::InsufficientStock {
                item_id,
                requested,
                available,
                ..
            } => {
                assert_eq!(item_id, 7);
                assert_eq!(requested, 5);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(cart.quantity_of(7), 2);
    }

    #[test]
    fn test_add_line_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let item = test_item(1, 10, 1000);

        assert!(matches!(
            cart.add_line(&item, 0),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for id in 0..MAX_CART_LINES as i64 {
            cart.add_line(&test_item(id, 1, 100), 1).unwrap();
        }

        let err = cart.add_line(&test_item(999, 1, 100), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));

        // Merging into an existing line is still allowed at the limit.
        let first = test_item(0, 2, 100);
        assert!(cart.add_line(&first, 1).is_ok());
    }

    #[test]
    fn test_remove_line_and_remove_all() {
        let mut cart = Cart::new();
        cart.add_line(&test_item(1, 5, 100), 1).unwrap();
        cart.add_line(&test_item(2, 5, 200), 2).unwrap();

        assert!(cart.remove_line(1));
        assert!(!cart.remove_line(1));
        assert_eq!(cart.line_count(), 1);

        cart.remove_all();
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_line(&test_item(1, 10, 10000), 3).unwrap();
        cart.add_line(&test_item(2, 10, 25000), 1).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_quantity, 4);
        assert_eq!(totals.total_cents, 55000);
    }

    #[test]
    fn test_oversized_line_total_is_rejected() {
        let mut cart = Cart::new();
        let item = test_item(1, 10, i64::MAX / 2);

        let err = cart.add_line(&item, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert!(cart.is_empty());

        cart.add_line(&item, 1).unwrap();
        assert!(cart.add_line(&item, 2).is_err());
        assert_eq!(cart.quantity_of(1), 1);
    }

    #[test]
    fn test_oversized_cart_total_is_rejected() {
        let mut cart = Cart::new();
        let first = test_item(1, 10, i64::MAX / 2);
        let second = test_item(2, 10, i64::MAX / 2);
        let third = test_item(3, 10, 2);

        cart.add_line(&first, 1).unwrap();
        cart.add_line(&second, 1).unwrap();
        assert!(cart.add_line(&third, 1).is_err());
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total().cents(), i64::MAX - 1);
    }
}
