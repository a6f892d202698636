//! # Order Repository
//!
//! Reads of committed orders plus the single mutation orders allow after
//! creation: a status change. Orders, their lines and their transaction are
//! only ever created by [`crate::service::checkout::OrderFinalizer`].
//!
//! ## Overview Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Query 1: orders ⋈ customers ⋈ transactions     (one row per order)   │
//! │  Query 2: order_items ⋈ items                    (one row per line)    │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  group lines by order_id ──► Vec<OrderOverview>                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbResult, ServiceResult};
use stockbook_core::report::{OrderLineSummary, OrderOverview};
use stockbook_core::{CoreError, Money, Order, OrderItem, OrderStatus, PaymentMode};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

/// Which end of the order history an overview query reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chronology {
    OldestFirst,
    NewestFirst,
}

impl Chronology {
    fn sql(&self) -> &'static str {
        match self {
            Chronology::OldestFirst => "o.created_at ASC, o.id ASC",
            Chronology::NewestFirst => "o.created_at DESC, o.id DESC",
        }
    }
}

#[derive(sqlx::FromRow)]
struct OverviewRow {
    order_id: i64,
    created_at: DateTime<Utc>,
    customer_id: i64,
    customer_name: String,
    status: OrderStatus,
    total_amount_cents: i64,
    bill_no: String,
    mode: PaymentMode,
    cheque_no: Option<String>,
    received_cents: i64,
    balance_cents: i64,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    order_id: i64,
    item_id: i64,
    product_name: String,
    quantity: i64,
    price_cents: i64,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, customer_id, created_at, total_amount_cents, status
             FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lines of an order in insertion order.
    pub async fn get_items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let lines = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, item_id, quantity, price_cents, cost_price_cents
             FROM order_items WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Every order, oldest first, joined with customer, lines and
    /// transaction.
    pub async fn list(&self) -> DbResult<Vec<OrderOverview>> {
        load_overviews(&self.pool, Chronology::OldestFirst, None).await
    }

    /// Changes the status of an existing order. Stock is not touched, even
    /// on cancellation.
    pub async fn update_status(&self, id: i64, status: OrderStatus) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::OrderNotFound(id).into());
        }

        debug!(order_id = id, status = %status, "Order status updated");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Loads order overviews in the given order, optionally capped at `limit`
/// orders.
pub(crate) async fn load_overviews(
    pool: &SqlitePool,
    chronology: Chronology,
    limit: Option<usize>,
) -> DbResult<Vec<OrderOverview>> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map_or(-1, |n| n as i64);
    let order_by = chronology.sql();

    let headers = sqlx::query_as::<_, OverviewRow>(&format!(
        "SELECT o.id AS order_id, o.created_at, o.customer_id, c.name AS customer_name,
                o.status, o.total_amount_cents, t.bill_no, t.mode, t.cheque_no,
                t.received_cents, t.balance_cents
         FROM orders o
         JOIN customers c ON c.id = o.customer_id
         JOIN transactions t ON t.order_id = o.id
         ORDER BY {order_by}
         LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let lines = sqlx::query_as::<_, LineRow>(&format!(
        "SELECT oi.order_id, oi.item_id, i.name AS product_name, oi.quantity, oi.price_cents
         FROM order_items oi
         JOIN items i ON i.id = oi.item_id
         WHERE oi.order_id IN (SELECT o.id FROM orders o ORDER BY {order_by} LIMIT ?1)
         ORDER BY oi.order_id, oi.id"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut lines_by_order: HashMap<i64, Vec<OrderLineSummary>> = HashMap::new();
    for line in lines {
        let price = Money::from_cents(line.price_cents);
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLineSummary {
                item_id: line.item_id,
                product_name: line.product_name,
                quantity: line.quantity,
                price,
                line_total: price.multiply_quantity(line.quantity),
            });
    }

    let overviews = headers
        .into_iter()
        .map(|h| OrderOverview {
            order_id: h.order_id,
            bill_no: h.bill_no,
            created_at: h.created_at,
            customer_id: h.customer_id,
            customer_name: h.customer_name,
            status: h.status,
            total: Money::from_cents(h.total_amount_cents),
            lines: lines_by_order.remove(&h.order_id).unwrap_or_default(),
            mode: h.mode,
            cheque_no: h.cheque_no,
            received: Money::from_cents(h.received_cents),
            balance: Money::from_cents(h.balance_cents),
        })
        .collect();

    Ok(overviews)
}

// =============================================================================
// Unit Tests
// =============================================================================
