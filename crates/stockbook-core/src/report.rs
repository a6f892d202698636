//! # Report Types
//!
//! Row shapes, filters and the pure aggregation behind the dashboard, sales
//! history, stock and transaction reports. The queries that fill these live
//! in `stockbook-db`'s `ReportRepository`; everything here is arithmetic on
//! rows already read.
//!
//! ## Report Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report                 Input                   Output                  │
//! │  ──────                 ─────                   ──────                  │
//! │  Dashboard              recent N                DashboardSummary        │
//! │  Sales history          SalesFilter             SalesHistory            │
//! │                                                 ├── rows (per line)     │
//! │                                                 ├── revenue / profit    │
//! │                                                 └── daily breakdown     │
//! │  Stock levels           -                       Vec<StockLevel>         │
//! │  Low stock              -                       Vec<StockLevel> (≤ 5)   │
//! │  Transaction summary    DateRange               TransactionSummary      │
//! │                                                 ├── rows                │
//! │                                                 ├── by payment mode     │
//! │                                                 └── issued/recv/balance │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Item, OrderStatus, PaymentMode, Transaction};
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    start: NaiveDate,
    #[ts(as = "String")]
    end: NaiveDate,
}

impl DateRange {
    /// ## Errors
    /// `InvalidRange` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange {
                field: "date range".to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Half-open timestamp bounds `[start 00:00, end + 1 day 00:00)` for
    /// querying `created_at` columns.
    pub fn utc_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let lower = self.start.and_time(NaiveTime::MIN).and_utc();
        let upper = self
            .end
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (lower, upper)
    }
}

// =============================================================================
// Order Overview (dashboard + "all orders" table)
// =============================================================================

/// One line of an order as shown in overviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineSummary {
    pub item_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub line_total: Money,
}

/// An order joined with its customer, lines and transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderOverview {
    pub order_id: i64,
    pub bill_no: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub customer_id: i64,
    pub customer_name: String,
    pub status: OrderStatus,
    pub total: Money,
    pub lines: Vec<OrderLineSummary>,
    pub mode: PaymentMode,
    pub cheque_no: Option<String>,
    pub received: Money,
    pub balance: Money,
}

impl OrderOverview {
    /// `"Widget x3, Gadget x1"`
    pub fn items_summary(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{} x{}", l.product_name, l.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Landing-page metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_units_in_stock: i64,
    pub low_stock_count: i64,
    /// Most recent first.
    pub recent_orders: Vec<OrderOverview>,
}

// =============================================================================
// Sales History
// =============================================================================

/// Which cost price profit is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProfitBasis {
    /// The item's cost price as it is now.
    #[default]
    CurrentCost,
    /// The cost price captured on the order line at cart-add time.
    SnapshotCost,
}

/// Sales history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesFilter {
    pub range: DateRange,
    pub customer_id: Option<i64>,
    pub item_id: Option<i64>,
    pub mode: Option<PaymentMode>,
    #[serde(default)]
    pub profit_basis: ProfitBasis,
}

impl SalesFilter {
    pub fn new(range: DateRange) -> Self {
        SalesFilter {
            range,
            customer_id: None,
            item_id: None,
            mode: None,
            profit_basis: ProfitBasis::default(),
        }
    }

    pub fn customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn item(mut self, item_id: i64) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn mode(mut self, mode: PaymentMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn profit_basis(mut self, basis: ProfitBasis) -> Self {
        self.profit_basis = basis;
        self
    }
}

/// One order line in the sales history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesRow {
    pub bill_no: String,
    pub order_id: i64,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub product_name: String,
    pub quantity: i64,
    pub line_revenue: Money,
    pub order_total: Money,
    pub mode: PaymentMode,
    pub received: Money,
    pub balance: Money,
    /// Internal only; not printed on exports.
    pub line_profit: Money,
}

/// Revenue and profit of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesHistory {
    pub range: DateRange,
    pub rows: Vec<SalesRow>,
    pub total_revenue: Money,
    pub total_profit: Money,
    /// Ascending by date; days without sales are omitted.
    pub daily: Vec<DailySales>,
}

impl SalesHistory {
    /// Aggregates rows already filtered and ordered by the query.
    pub fn from_rows(range: DateRange, rows: Vec<SalesRow>) -> Self {
        let total_revenue = rows.iter().map(|r| r.line_revenue).sum();
        let total_profit = rows.iter().map(|r| r.line_profit).sum();

        let mut by_day: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();
        for row in &rows {
            let entry = by_day
                .entry(row.order_date.date_naive())
                .or_insert((Money::zero(), Money::zero()));
            entry.0 += row.line_revenue;
            entry.1 += row.line_profit;
        }

        let daily = by_day
            .into_iter()
            .map(|(date, (revenue, profit))| DailySales {
                date,
                revenue,
                profit,
            })
            .collect();

        SalesHistory {
            range,
            rows,
            total_revenue,
            total_profit,
            daily,
        }
    }
}

/// (selling − cost) × quantity.
pub fn line_profit(price: Money, cost: Money, quantity: i64) -> Money {
    (price - cost).multiply_quantity(quantity)
}

// =============================================================================
// Stock
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockLevel {
    pub item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub cost_price: Money,
    pub selling_price: Money,
    pub reorder_level: i64,
    pub low_stock: bool,
    pub out_of_stock: bool,
}

impl From<&Item> for StockLevel {
    fn from(item: &Item) -> Self {
        StockLevel {
            item_id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            cost_price: item.cost_price(),
            selling_price: item.selling_price(),
            reorder_level: LOW_STOCK_THRESHOLD,
            low_stock: item.is_low_stock(),
            out_of_stock: item.is_out_of_stock(),
        }
    }
}

// =============================================================================
// Transaction Summary
// =============================================================================

/// Count and issued total for one payment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ModeTotal {
    pub mode: PaymentMode,
    pub count: i64,
    pub issued: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionSummary {
    pub range: DateRange,
    pub rows: Vec<Transaction>,
    /// Only modes that occur, in Cash, Credit, Cheque order.
    pub by_mode: Vec<ModeTotal>,
    pub total_issued: Money,
    pub total_received: Money,
    pub total_balance: Money,
}

impl TransactionSummary {
    pub fn from_rows(range: DateRange, rows: Vec<Transaction>) -> Self {
        let total_issued = rows.iter().map(Transaction::issue_amount).sum();
        let total_received = rows.iter().map(Transaction::received).sum();
        let total_balance = rows.iter().map(Transaction::balance).sum();

        let mut by_mode: BTreeMap<PaymentMode, (i64, Money)> = BTreeMap::new();
        for tx in &rows {
            let entry = by_mode.entry(tx.mode).or_insert((0, Money::zero()));
            entry.0 += 1;
            entry.1 += tx.issue_amount();
        }

        let by_mode = by_mode
            .into_iter()
            .map(|(mode, (count, issued))| ModeTotal {
                mode,
                count,
                issued,
            })
            .collect();

        TransactionSummary {
            range,
            rows,
            by_mode,
            total_issued,
            total_received,
            total_balance,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sales_row(date: u32, revenue: i64, profit: i64) -> SalesRow {
        SalesRow {
            bill_no: "1".to_string(),
            order_id: 1,
            order_date: Utc.with_ymd_and_hms(2024, 3, date, 10, 0, 0).unwrap(),
            customer_name: "Ali".to_string(),
            customer_phone: "0300".to_string(),
            customer_address: "Lahore".to_string(),
            product_name: "Widget".to_string(),
            quantity: 1,
            line_revenue: Money::from_cents(revenue),
            order_total: Money::from_cents(revenue),
            mode: PaymentMode::Cash,
            received: Money::zero(),
            balance: Money::from_cents(revenue),
            line_profit: Money::from_cents(profit),
        }
    }

    fn transaction(mode: PaymentMode, issue: i64, received: i64) -> Transaction {
        Transaction {
            id: 1,
            order_id: 1,
            bill_no: "1".to_string(),
            created_at: Utc::now(),
            customer_id: 1,
            party_name: "Ali".to_string(),
            address: "Lahore".to_string(),
            mode,
            cheque_no: None,
            issue_amount_cents: issue,
            received_cents: received,
            balance_cents: issue - received,
        }
    }

    #[test]
    fn test_date_range_validation() {
        assert!(DateRange::new(day(2), day(1)).is_err());
        let range = DateRange::new(day(1), day(3)).unwrap();
        assert!(range.contains(day(1)));
        assert!(range.contains(day(3)));
        assert!(!range.contains(day(4)));
    }

    #[test]
    fn test_utc_bounds_cover_whole_end_day() {
        let (lower, upper) = DateRange::single_day(day(5)).utc_bounds();
        assert_eq!(lower, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(upper, Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_sales_history_aggregation() {
        let range = DateRange::new(day(1), day(5)).unwrap();
        let rows = vec![
            sales_row(2, 30000, 12000),
            sales_row(1, 25000, 5000),
            sales_row(2, 1000, 200),
        ];

        let history = SalesHistory::from_rows(range, rows);

        assert_eq!(history.total_revenue.cents(), 56000);
        assert_eq!(history.total_profit.cents(), 17200);
        assert_eq!(history.daily.len(), 2);
        assert_eq!(history.daily[0].date, day(1));
        assert_eq!(history.daily[1].revenue.cents(), 31000);
        assert_eq!(history.daily[1].profit.cents(), 12200);
    }

    #[test]
    fn test_line_profit() {
        let profit = line_profit(Money::from_cents(10000), Money::from_cents(6000), 3);
        assert_eq!(profit.cents(), 12000);
    }

    #[test]
    fn test_transaction_summary_totals() {
        let range = DateRange::single_day(day(1));
        let rows = vec![
            transaction(PaymentMode::Credit, 10000, 0),
            transaction(PaymentMode::Cash, 55000, 50000),
            transaction(PaymentMode::Cash, 1000, 2000),
        ];

        let summary = TransactionSummary::from_rows(range, rows);

        assert_eq!(summary.total_issued.cents(), 66000);
        assert_eq!(summary.total_received.cents(), 52000);
        assert_eq!(summary.total_balance.cents(), 14000);
        assert_eq!(summary.by_mode.len(), 2);
        assert_eq!(summary.by_mode[0].mode, PaymentMode::Cash);
        assert_eq!(summary.by_mode[0].count, 2);
        assert_eq!(summary.by_mode[0].issued.cents(), 56000);
    }

    #[test]
    fn test_items_summary() {
        let overview = OrderOverview {
            order_id: 1,
            bill_no: "1".to_string(),
            created_at: Utc::now(),
            customer_id: 1,
            customer_name: "Ali".to_string(),
            status: OrderStatus::Pending,
            total: Money::from_cents(55000),
            lines: vec![
                OrderLineSummary {
                    item_id: 1,
                    product_name: "Widget".to_string(),
                    quantity: 3,
                    price: Money::from_cents(10000),
                    line_total: Money::from_cents(30000),
                },
                OrderLineSummary {
                    item_id: 2,
                    product_name: "Gadget".to_string(),
                    quantity: 1,
                    price: Money::from_cents(25000),
                    line_total: Money::from_cents(25000),
                },
            ],
            mode: PaymentMode::Cash,
            cheque_no: None,
            received: Money::from_cents(50000),
            balance: Money::from_cents(5000),
        };
        assert_eq!(overview.items_summary(), "Widget x3, Gadget x1");
    }
}
