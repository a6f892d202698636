//! # Report Repository
//!
//! Read-only reporting queries. Every query has a total ORDER BY, so the
//! same storage state always yields the same report.
//!
//! ## Sales History Join
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   order_items ──► orders ──► customers                                 │
//! │        │             │                                                  │
//! │        ▼             └─────► transactions (one per order)              │
//! │      items                                                              │
//! │   (name, current cost)                                                  │
//! │                                                                         │
//! │   WHERE o.created_at in [start 00:00, end+1 00:00)                     │
//! │     AND customer? AND item? AND mode?                                  │
//! │   ORDER BY o.created_at, o.id, oi.id                                   │
//! │                                                                         │
//! │   one row per order line ──► SalesHistory::from_rows (totals, daily)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::order::{load_overviews, Chronology};
use stockbook_core::report::{
    line_profit, DashboardSummary, DateRange, ProfitBasis, SalesFilter, SalesHistory, SalesRow,
    StockLevel, TransactionSummary,
};
use stockbook_core::{Item, Money, PaymentMode, LOW_STOCK_THRESHOLD};

use super::transaction::TransactionRepository;

const ITEM_COLUMNS: &str =
    "id, name, quantity, cost_price_cents, selling_price_cents, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct SalesLineRow {
    bill_no: String,
    order_id: i64,
    order_date: DateTime<Utc>,
    customer_name: String,
    customer_phone: String,
    customer_address: String,
    product_name: String,
    quantity: i64,
    price_cents: i64,
    snapshot_cost_cents: i64,
    current_cost_cents: i64,
    total_amount_cents: i64,
    mode: PaymentMode,
    received_cents: i64,
    balance_cents: i64,
}

impl SalesLineRow {
    fn into_sales_row(self, basis: ProfitBasis) -> SalesRow {
        let price = Money::from_cents(self.price_cents);
        let cost = match basis {
            ProfitBasis::CurrentCost => Money::from_cents(self.current_cost_cents),
            ProfitBasis::SnapshotCost => Money::from_cents(self.snapshot_cost_cents),
        };

        SalesRow {
            bill_no: self.bill_no,
            order_id: self.order_id,
            order_date: self.order_date,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_address: self.customer_address,
            product_name: self.product_name,
            quantity: self.quantity,
            line_revenue: price.multiply_quantity(self.quantity),
            order_total: Money::from_cents(self.total_amount_cents),
            mode: self.mode,
            received: Money::from_cents(self.received_cents),
            balance: Money::from_cents(self.balance_cents),
            line_profit: line_profit(price, cost, self.quantity),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Landing-page metrics plus the `recent_orders` newest orders.
    pub async fn dashboard(&self, recent_orders: usize) -> DbResult<DashboardSummary> {
        let (total_products, total_units_in_stock, low_stock_count): (i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*),
                        COALESCE(SUM(quantity), 0),
                        COALESCE(SUM(CASE WHEN quantity <= ?1 THEN 1 ELSE 0 END), 0)
                 FROM items",
            )
            .bind(LOW_STOCK_THRESHOLD)
            .fetch_one(&self.pool)
            .await?;

        let recent_orders =
            load_overviews(&self.pool, Chronology::NewestFirst, Some(recent_orders)).await?;

        Ok(DashboardSummary {
            total_products,
            total_units_in_stock,
            low_stock_count,
            recent_orders,
        })
    }

    /// One row per order line matching `filter`, with revenue and profit
    /// totals and a per-day breakdown.
    pub async fn sales_history(&self, filter: &SalesFilter) -> DbResult<SalesHistory> {
        let (from, until) = filter.range.utc_bounds();

        let lines = sqlx::query_as::<_, SalesLineRow>(
            "SELECT t.bill_no, o.id AS order_id, o.created_at AS order_date,
                    c.name AS customer_name, c.phone AS customer_phone,
                    c.address AS customer_address,
                    i.name AS product_name, oi.quantity, oi.price_cents,
                    oi.cost_price_cents AS snapshot_cost_cents,
                    i.cost_price_cents AS current_cost_cents,
                    o.total_amount_cents, t.mode, t.received_cents, t.balance_cents
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             JOIN customers c ON c.id = o.customer_id
             JOIN items i ON i.id = oi.item_id
             JOIN transactions t ON t.order_id = o.id
             WHERE o.created_at >= ?1 AND o.created_at < ?2
               AND (?3 IS NULL OR o.customer_id = ?3)
               AND (?4 IS NULL OR oi.item_id = ?4)
               AND (?5 IS NULL OR t.mode = ?5)
             ORDER BY o.created_at, o.id, oi.id",
        )
        .bind(from)
        .bind(until)
        .bind(filter.customer_id)
        .bind(filter.item_id)
        .bind(filter.mode)
        .fetch_all(&self.pool)
        .await?;

        let rows = lines
            .into_iter()
            .map(|line| line.into_sales_row(filter.profit_basis))
            .collect();

        Ok(SalesHistory::from_rows(filter.range, rows))
    }

    /// Every item, lowest stock first.
    pub async fn stock_levels(&self) -> DbResult<Vec<StockLevel>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY quantity, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items.iter().map(StockLevel::from).collect())
    }

    /// Items at or below the reorder level, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<StockLevel>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE quantity <= ?1 ORDER BY quantity, id"
        ))
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(&self.pool)
        .await?;

        Ok(items.iter().map(StockLevel::from).collect())
    }

    /// Transactions in the range with per-mode and overall totals.
    pub async fn transaction_summary(&self, range: &DateRange) -> DbResult<TransactionSummary> {
        let rows = TransactionRepository::new(self.pool.clone())
            .list_between(range)
            .await?;

        Ok(TransactionSummary::from_rows(*range, rows))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
