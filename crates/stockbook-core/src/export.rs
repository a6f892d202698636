//! # Report Export Layout
//!
//! Turns a report into a [`ReportDocument`]: a title, a period line, a fixed
//! column layout, pre-formatted cells and right-aligned summary lines. A PDF
//! writer consumes the document as-is; [`ReportDocument::render_text`] gives
//! a fixed-width rendering for terminals and tests.
//!
//! ## Document Shape
//! ```text
//!                        Sales Report
//!               From 01-03-2024 to 31-03-2024
//!
//! | Bill No | Order ID | Date | ... | Item Total | Order Total | Paid | Balance |
//! |   12    |    12    | ...  | ... |   300.00   |   550.00    | ...  | -50.00  |
//!
//!                                         Total Revenue: PKR 550.00
//!                                          Total Profit: PKR 170.00
//! ```
//!
//! Currency cells carry no prefix; summary lines do.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::format::{format_date, format_file_date};
use crate::money::Money;
use crate::report::{DateRange, SalesHistory, TransactionSummary};

/// A column header and its width (PDF millimetres, text characters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    fn new(header: &str, width: usize) -> Self {
        Column {
            header: header.to_string(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportDocument {
    pub title: String,
    /// `From dd-mm-yyyy to dd-mm-yyyy`
    pub period: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub summary: Vec<String>,
}

const SALES_COLUMNS: [(&str, usize); 11] = [
    ("Bill No", 15),
    ("Order ID", 15),
    ("Date", 20),
    ("Customer Name", 20),
    ("Customer Phone", 20),
    ("Product Name", 25),
    ("Qty", 12),
    ("Item Total", 16),
    ("Order Total", 16),
    ("Paid", 15),
    ("Balance", 15),
];

const TRANSACTION_COLUMNS: [(&str, usize); 9] = [
    ("Trans ID", 14),
    ("Bill No", 10),
    ("Date", 15),
    ("Customer", 23),
    ("Address", 50),
    ("Mode", 11),
    ("Issued", 12),
    ("Received", 15),
    ("Balance", 12),
];

fn period_line(range: &DateRange) -> String {
    format!(
        "From {} to {}",
        format_date(range.start()),
        format_date(range.end())
    )
}

fn summary_line(label: &str, amount: Money) -> String {
    format!("{}: {}", label, amount)
}

impl ReportDocument {
    /// Sales report: one row per order line. Profit appears only in the
    /// summary.
    pub fn sales_report(history: &SalesHistory) -> Self {
        let rows = history
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.bill_no.clone(),
                    row.order_id.to_string(),
                    format_date(row.order_date.date_naive()),
                    row.customer_name.clone(),
                    row.customer_phone.clone(),
                    row.product_name.clone(),
                    row.quantity.to_string(),
                    row.line_revenue.amount_string(),
                    row.order_total.amount_string(),
                    row.received.amount_string(),
                    row.balance.amount_string(),
                ]
            })
            .collect();

        ReportDocument {
            title: "Sales Report".to_string(),
            period: period_line(&history.range),
            columns: SALES_COLUMNS
                .iter()
                .map(|(header, width)| Column::new(header, *width))
                .collect(),
            rows,
            summary: vec![
                summary_line("Total Revenue", history.total_revenue),
                summary_line("Total Profit", history.total_profit),
            ],
        }
    }

    pub fn transaction_report(summary: &TransactionSummary) -> Self {
        let rows = summary
            .rows
            .iter()
            .map(|tx| {
                vec![
                    tx.id.to_string(),
                    tx.bill_no.clone(),
                    format_date(tx.created_at.date_naive()),
                    tx.party_name.clone(),
                    tx.address.clone(),
                    tx.mode.to_string(),
                    tx.issue_amount().amount_string(),
                    tx.received().amount_string(),
                    tx.balance().amount_string(),
                ]
            })
            .collect();

        ReportDocument {
            title: "Transaction Summary Report".to_string(),
            period: period_line(&summary.range),
            columns: TRANSACTION_COLUMNS
                .iter()
                .map(|(header, width)| Column::new(header, *width))
                .collect(),
            rows,
            summary: vec![
                summary_line("Total Issued", summary.total_issued),
                summary_line("Total Received", summary.total_received),
                summary_line("Total Balance", summary.total_balance),
            ],
        }
    }

    /// Width of a rendered table line, borders included.
    pub fn table_width(&self) -> usize {
        self.columns.iter().map(|c| c.width + 1).sum::<usize>() + 1
    }

    /// Fixed-width text rendering. Cells are centred and clipped to their
    /// column width.
    pub fn render_text(&self) -> String {
        let width = self.table_width();
        let mut out = String::new();

        out.push_str(&format!("{:^width$}\n", self.title));
        out.push_str(&format!("{:^width$}\n\n", self.period));

        let headers: Vec<&str> = self.columns.iter().map(|c| c.header.as_str()).collect();
        out.push_str(&self.render_row(&headers));
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            out.push_str(&self.render_row(&cells));
        }

        out.push('\n');
        for line in &self.summary {
            out.push_str(&format!("{:>width$}\n", line));
        }
        out
    }

    fn render_row(&self, cells: &[&str]) -> String {
        let mut line = String::from("|");
        for (column, cell) in self.columns.iter().zip(cells) {
            let clipped: String = cell.chars().take(column.width).collect();
            line.push_str(&format!("{:^w$}|", clipped, w = column.width));
        }
        line.push('\n');
        line
    }
}

fn file_name(prefix: &str, range: &DateRange) -> String {
    format!(
        "{}_{}_to_{}.pdf",
        prefix,
        format_file_date(range.start()),
        format_file_date(range.end())
    )
}

/// `sales_report_01032024_to_31032024.pdf`
pub fn sales_report_file_name(range: &DateRange) -> String {
    file_name("sales_report", range)
}

/// `transaction_summary_01032024_to_31032024.pdf`
pub fn transaction_summary_file_name(range: &DateRange) -> String {
    file_name("transaction_summary", range)
}

// =============================================================================
// Unit Tests
// =============================================================================
