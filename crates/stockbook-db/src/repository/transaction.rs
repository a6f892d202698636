//! # Transaction Repository
//!
//! Read access to payment records. Transactions are written once, by the
//! order finalizer, and never updated.

use sqlx::SqlitePool;

use crate::error::DbResult;
use stockbook_core::report::DateRange;
use stockbook_core::Transaction;

const COLUMNS: &str = "id, order_id, bill_no, created_at, customer_id, party_name, address, \
                       mode, cheque_no, issue_amount_cents, received_cents, balance_cents";

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    pub async fn get_by_order_id(&self, order_id: i64) -> DbResult<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE order_id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    pub async fn get_by_bill_no(&self, bill_no: &str) -> DbResult<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE bill_no = ?1"
        ))
        .bind(bill_no.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    /// Transactions created within the inclusive day range, oldest first.
    pub async fn list_between(&self, range: &DateRange) -> DbResult<Vec<Transaction>> {
        let (from, until) = range.utc_bounds();

        let rows = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE created_at >= ?1 AND created_at < ?2
             ORDER BY created_at, id"
        ))
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use crate::pool::{Database, DbConfig};
    use stockbook_core::report::DateRange;
    use stockbook_core::{CheckoutRequest, Money, NewCustomer, NewItem, PaymentMode, Session};

    #[tokio::test]
    async fn test_lookup_and_range() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer::new("Ali", "0300", "Lahore"))
            .await
            .unwrap();
        let item = db
            .items()
            .create(&NewItem::new("Widget", 5, Money::zero(), Money::from_cents(1000)))
            .await
            .unwrap();

        let mut session = Session::new();
        db.cart_builder().add_line(&mut session, item.id, 1).await.unwrap();
        let request = CheckoutRequest::new(customer.id, PaymentMode::Cheque, Money::from_cents(1000))
            .with_cheque_no("CHQ-42");
        let finalized = db.finalizer().finalize(&mut session, &request).await.unwrap();

        let by_order = db
            .transactions()
            .get_by_order_id(finalized.order_id)
            .await
            .unwrap()
            .unwrap();
        let by_bill = db
            .transactions()
            .get_by_bill_no(&finalized.bill_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_order, by_bill);
        assert_eq!(by_order.cheque_no.as_deref(), Some("CHQ-42"));
        assert_eq!(by_order.balance_cents, 0);

        let committed_on = by_order.created_at.date_naive();
        let rows = db
            .transactions()
            .list_between(&DateRange::single_day(committed_on))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let yesterday = committed_on.checked_sub_days(Days::new(1)).unwrap();
        let rows = db
            .transactions()
            .list_between(&DateRange::single_day(yesterday))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
