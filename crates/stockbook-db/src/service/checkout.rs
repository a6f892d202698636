//! # Order Finalizer
//!
//! Turns a session cart into a committed order, its lines, the stock
//! decrements and exactly one payment transaction, all or nothing.
//!
//! ## Finalization Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     finalize(session, request)                          │
//! │                                                                         │
//! │  OrderDraft::from_cart ── EmptyCart / MissingChequeNumber / Validation  │
//! │       │                                                   (no I/O)      │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE ───────────────────────────────────────────────────┐  │
//! │  │ 1. SELECT customer ─────────────── missing ─► CustomerNotFound    │  │
//! │  │ 2. SELECT quantity per line ────── short ───► InsufficientStock   │  │
//! │  │ 3. INSERT orders (total = Σ snapshot price × qty)                 │  │
//! │  │ 4. per line: INSERT order_items                                   │  │
//! │  │             UPDATE items SET quantity = quantity - n              │  │
//! │  │               WHERE id = ? AND quantity >= n ── 0 rows ─► Short   │  │
//! │  │ 5. INSERT transactions (bill_no = order id, balance = issue-recv) │  │
//! │  └─ COMMIT ───────────────────────────────────────────────────────────┘  │
//! │       │                  any error before COMMIT: tx dropped = ROLLBACK │
//! │       ▼                                                                 │
//! │  clear session cart ──► FinalizedOrder { order_id, bill_no, ... }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every statement inside the transaction runs on the transaction's own
//! connection. The write lock is held from BEGIN to COMMIT, so finalizations
//! run one at a time and the stock re-check sees every earlier commit.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, ServiceResult};
use stockbook_core::checkout::OrderDraft;
use stockbook_core::{
    bill_no_for, CheckoutRequest, CoreError, Customer, FinalizedOrder, Session,
};

#[derive(Debug, Clone)]
pub struct OrderFinalizer {
    pool: SqlitePool,
}

impl OrderFinalizer {
    pub fn new(pool: SqlitePool) -> Self {
        OrderFinalizer { pool }
    }

    /// Commits the session cart as an order.
    ///
    /// On success the cart is cleared. On any error nothing is written and
    /// the cart is left exactly as it was, so the user can fix the problem
    /// and resubmit.
    pub async fn finalize(
        &self,
        session: &mut Session,
        request: &CheckoutRequest,
    ) -> ServiceResult<FinalizedOrder> {
        let draft = OrderDraft::from_cart(session.cart(), request)?;

        let finalized = self.commit(&draft).await?;
        session.cart_mut().remove_all();

        info!(
            order_id = finalized.order_id,
            customer_id = draft.customer_id,
            lines = draft.lines.len(),
            total = %finalized.total,
            mode = %draft.mode,
            "Order finalized"
        );
        Ok(finalized)
    }

    async fn commit(&self, draft: &OrderDraft) -> ServiceResult<FinalizedOrder> {
        // IMMEDIATE takes the write lock up front, so concurrent finalizers
        // queue on the busy timeout instead of failing the lock upgrade.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, address, created_at FROM customers WHERE id = ?1",
        )
        .bind(draft.customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::CustomerNotFound(draft.customer_id))?;

        // First shortfall aborts before anything is written.
        for line in &draft.lines {
            let available = current_stock(&mut tx, line.item_id)
                .await?
                .ok_or(CoreError::ItemNotFound(line.item_id))?;

            if available < line.quantity {
                warn!(
                    item_id = line.item_id,
                    requested = line.quantity,
                    available,
                    "Stock changed since the line was added"
                );
                return Err(CoreError::InsufficientStock {
                    item_id: line.item_id,
                    name: line.name.clone(),
                    requested: line.quantity,
                    available,
                }
                .into());
            }
        }

        let now = Utc::now();
        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_id, created_at, total_amount_cents, status)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )
        .bind(customer.id)
        .bind(now)
        .bind(draft.total.cents())
        .bind(draft.status)
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, item_id, quantity, price_cents, cost_price_cents)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(order_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.price_cents)
            .bind(line.cost_price_cents)
            .execute(&mut *tx)
            .await?;

            let decremented = sqlx::query(
                "UPDATE items SET quantity = quantity - ?2, updated_at = ?3
                 WHERE id = ?1 AND quantity >= ?2",
            )
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                let available = current_stock(&mut tx, line.item_id).await?.unwrap_or(0);
                warn!(
                    item_id = line.item_id,
                    requested = line.quantity,
                    available,
                    "Conditional stock decrement failed"
                );
                return Err(CoreError::InsufficientStock {
                    item_id: line.item_id,
                    name: line.name.clone(),
                    requested: line.quantity,
                    available,
                }
                .into());
            }

            debug!(order_id, item_id = line.item_id, quantity = line.quantity, "Order line written");
        }

        let bill_no = bill_no_for(order_id);
        let balance = draft.balance();

        sqlx::query(
            "INSERT INTO transactions (order_id, bill_no, created_at, customer_id, party_name, address,
                                       mode, cheque_no, issue_amount_cents, received_cents, balance_cents)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(order_id)
        .bind(&bill_no)
        .bind(now)
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(draft.mode)
        .bind(draft.cheque_no.as_deref())
        .bind(draft.total.cents())
        .bind(draft.received.cents())
        .bind(balance.cents())
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(FinalizedOrder {
            order_id,
            bill_no,
            total: draft.total,
            received: draft.received,
            balance,
        })
    }
}

async fn current_stock(
    tx: &mut Transaction<'_, Sqlite>,
    item_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT quantity FROM items WHERE id = ?1")
        .bind(item_id)
        .fetch_optional(&mut **tx)
        .await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::ServiceError;
    use crate::pool::{Database, DbConfig};
    use stockbook_core::{
        CheckoutRequest, CoreError, Customer, Item, Money, NewCustomer, NewItem, OrderStatus,
        PaymentMode, Session,
    };

    struct Shop {
        db: Database,
        customer: Customer,
        a: Item,
        b: Item,
    }

    /// A: 10 in stock @ PKR 100.00, B: 5 in stock @ PKR 250.00.
    async fn shop() -> Shop {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer::new("Ali Traders", "0300-1234567", "Mall Road, Lahore"))
            .await
            .unwrap();
        let a = db
            .items()
            .create(&NewItem::new("A", 10, Money::from_cents(6000), Money::from_cents(10000)))
            .await
            .unwrap();
        let b = db
            .items()
            .create(&NewItem::new("B", 5, Money::from_cents(20000), Money::from_cents(25000)))
            .await
            .unwrap();
        Shop { db, customer, a, b }
    }

    async fn row_counts(db: &Database) -> (i64, i64, i64) {
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let txs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (orders, lines, txs)
    }

    async fn stock_of(db: &Database, item: &Item) -> i64 {
        db.items().get_by_id(item.id).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_cash_order_underpaid() {
        let s = shop().await;
        let mut session = Session::new();
        s.db.cart_builder().add_line(&mut session, s.a.id, 3).await.unwrap();
        s.db.cart_builder().add_line(&mut session, s.b.id, 1).await.unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::from_cents(50000));
        let finalized = s.db.finalizer().finalize(&mut session, &request).await.unwrap();

        assert_eq!(finalized.total.to_string(), "PKR 550.00");
        assert_eq!(finalized.received.to_string(), "PKR 500.00");
        assert_eq!(finalized.balance.to_string(), "PKR 50.00");
        assert_eq!(finalized.bill_no, finalized.order_id.to_string());

        let tx = s
            .db
            .transactions()
            .get_by_order_id(finalized.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.issue_amount().cents(), 55000);
        assert_eq!(tx.balance().cents(), 5000);
        assert_eq!(tx.party_name, "Ali Traders");
        assert_eq!(tx.address, "Mall Road, Lahore");
        assert_eq!(tx.mode, PaymentMode::Cash);
        assert_eq!(tx.cheque_no, None);

        assert_eq!(stock_of(&s.db, &s.a).await, 7);
        assert_eq!(stock_of(&s.db, &s.b).await, 4);
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_cash_order_overpaid() {
        let s = shop().await;
        let mut session = Session::new();
        s.db.cart_builder().add_line(&mut session, s.a.id, 3).await.unwrap();
        s.db.cart_builder().add_line(&mut session, s.b.id, 1).await.unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::from_cents(60000));
        let finalized = s.db.finalizer().finalize(&mut session, &request).await.unwrap();

        assert_eq!(finalized.balance.to_string(), "PKR -50.00");
        let tx = s
            .db
            .transactions()
            .get_by_order_id(finalized.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.balance_cents, -5000);
    }

    #[tokio::test]
    async fn test_transaction_keeps_customer_snapshot() {
        let s = shop().await;
        let mut session = Session::new();
        s.db.cart_builder().add_line(&mut session, s.a.id, 1).await.unwrap();
        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::zero());
        let finalized = s.db.finalizer().finalize(&mut session, &request).await.unwrap();

        s.db.customers()
            .update(
                s.customer.id,
                &NewCustomer::new("Ali & Sons", "0300-1234567", "Gulberg, Lahore"),
            )
            .await
            .unwrap();

        let tx = s
            .db
            .transactions()
            .get_by_order_id(finalized.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.party_name, "Ali Traders");
        assert_eq!(tx.address, "Mall Road, Lahore");
    }

    #[tokio::test]
    async fn test_order_total_equals_sum_of_lines() {
        let s = shop().await;
        let mut session = Session::new();
        s.db.cart_builder().add_line(&mut session, s.a.id, 4).await.unwrap();
        s.db.cart_builder().add_line(&mut session, s.b.id, 2).await.unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Credit, Money::zero())
            .with_status(OrderStatus::Completed);
        let finalized = s.db.finalizer().finalize(&mut session, &request).await.unwrap();

        let order = s.db.orders().get_by_id(finalized.order_id).await.unwrap().unwrap();
        let lines = s.db.orders().get_items(finalized.order_id).await.unwrap();
        let sum: Money = lines.iter().map(|l| l.line_total()).sum();

        assert_eq!(order.total_amount(), sum);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(finalized.balance, finalized.total);
    }

    #[tokio::test]
    async fn test_charges_snapshot_price_not_current_price() {
        let s = shop().await;
        let mut session = Session::new();
        s.db.cart_builder().add_line(&mut session, s.a.id, 2).await.unwrap();

        s.db.items()
            .update(
                s.a.id,
                &NewItem::new("A", 10, Money::from_cents(6000), Money::from_cents(99900)),
            )
            .await
            .unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::zero());
        let finalized = s.db.finalizer().finalize(&mut session, &request).await.unwrap();
        assert_eq!(finalized.total.cents(), 20000);
    }

    #[tokio::test]
    async fn test_insufficient_stock_at_cart_add_writes_nothing() {
        let s = shop().await;
        s.db.items()
            .update(s.a.id, &NewItem::new("A", 2, Money::zero(), Money::from_cents(10000)))
            .await
            .unwrap();
        let mut session = Session::new();

        let err = s
            .db
            .cart_builder()
            .add_line(&mut session, s.a.id, 3)
            .await
            .unwrap_err();

        assert!(err.is_insufficient_stock());
        assert_eq!(row_counts(&s.db).await, (0, 0, 0));
        assert_eq!(stock_of(&s.db, &s.a).await, 2);
    }

    #[tokio::test]
    async fn test_shortfall_at_finalize_rolls_back_and_keeps_cart() {
        let s = shop().await;
        let mut session = Session::new();
        s.db.cart_builder().add_line(&mut session, s.a.id, 1).await.unwrap();
        s.db.cart_builder().add_line(&mut session, s.b.id, 3).await.unwrap();

        // B drops below the cart quantity before checkout.
        s.db.items()
            .update(s.b.id, &NewItem::new("B", 2, Money::zero(), Money::from_cents(25000)))
            .await
            .unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::zero());
        let err = s.db.finalizer().finalize(&mut session, &request).await.unwrap_err();

        match err {
            ServiceError::Domain(CoreError::InsufficientStock {
                item_id,
                requested,
                available,
                ..
            }) => {
                assert_eq!(item_id, s.b.id);
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(row_counts(&s.db).await, (0, 0, 0));
        assert_eq!(stock_of(&s.db, &s.a).await, 10);
        assert_eq!(stock_of(&s.db, &s.b).await, 2);
        assert_eq!(session.cart().line_count(), 2);
    }

    #[tokio::test]
    async fn test_two_sessions_competing_for_last_units() {
        let s = shop().await;
        let mut first = Session::new();
        let mut second = Session::new();
        s.db.cart_builder().add_line(&mut first, s.b.id, 4).await.unwrap();
        s.db.cart_builder().add_line(&mut second, s.b.id, 4).await.unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::zero());
        s.db.finalizer().finalize(&mut first, &request).await.unwrap();
        let err = s.db.finalizer().finalize(&mut second, &request).await.unwrap_err();

        assert!(err.is_insufficient_stock());
        assert_eq!(stock_of(&s.db, &s.b).await, 1);
        assert_eq!(row_counts(&s.db).await, (1, 1, 1));
    }

    #[tokio::test]
    async fn test_pre_checks() {
        let s = shop().await;
        let mut session = Session::new();
        let finalizer = s.db.finalizer();

        let cash = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::zero());
        let err = finalizer.finalize(&mut session, &cash).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::EmptyCart)));

        s.db.cart_builder().add_line(&mut session, s.a.id, 1).await.unwrap();

        let cheque = CheckoutRequest::new(s.customer.id, PaymentMode::Cheque, Money::zero());
        let err = finalizer.finalize(&mut session, &cheque).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::MissingChequeNumber)));

        let negative = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::from_cents(-100));
        assert!(finalizer.finalize(&mut session, &negative).await.unwrap_err().is_validation());

        let stranger = CheckoutRequest::new(s.customer.id + 99, PaymentMode::Cash, Money::zero());
        let err = finalizer.finalize(&mut session, &stranger).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::CustomerNotFound(_))));

        assert_eq!(row_counts(&s.db).await, (0, 0, 0));
        assert_eq!(session.cart().line_count(), 1);
    }

    #[tokio::test]
    async fn test_cheque_payment_records_number() {
        let s = shop().await;
        let mut session = Session::new();
        s.db.cart_builder().add_line(&mut session, s.b.id, 2).await.unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cheque, Money::from_cents(20000))
            .with_cheque_no(" CHQ-7781 ");
        let finalized = s.db.finalizer().finalize(&mut session, &request).await.unwrap();

        let tx = s
            .db
            .transactions()
            .get_by_bill_no(&finalized.bill_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.cheque_no.as_deref(), Some("CHQ-7781"));
        assert_eq!(tx.balance().cents(), 30000);
    }

    #[tokio::test]
    async fn test_each_order_gets_one_transaction() {
        let s = shop().await;
        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::zero());

        let mut ids = Vec::new();
        for _ in 0..3 {
            let mut session = Session::new();
            s.db.cart_builder().add_line(&mut session, s.a.id, 1).await.unwrap();
            ids.push(s.db.finalizer().finalize(&mut session, &request).await.unwrap().order_id);
        }

        assert_eq!(row_counts(&s.db).await, (3, 3, 3));
        for id in ids {
            let tx = s.db.transactions().get_by_order_id(id).await.unwrap().unwrap();
            assert_eq!(tx.bill_no, id.to_string());
            assert_eq!(tx.balance_cents, tx.issue_amount_cents - tx.received_cents);
        }
        assert_eq!(stock_of(&s.db, &s.a).await, 7);
    }

    #[tokio::test]
    async fn test_duplicate_lines_hit_the_decrement_guard() {
        let s = shop().await;

        // Two lines for B that each fit in stock (5) but not together.
        let line = serde_json::json!({
            "item_id": s.b.id,
            "name": "B",
            "quantity": 3,
            "unit_price_cents": 25000,
            "cost_price_cents": 20000,
            "line_total_cents": 75000,
        });
        let mut session = Session::new();
        *session.cart_mut() =
            serde_json::from_value(serde_json::json!({ "lines": [line.clone(), line] })).unwrap();

        let request = CheckoutRequest::new(s.customer.id, PaymentMode::Cash, Money::zero());
        let err = s.db.finalizer().finalize(&mut session, &request).await.unwrap_err();

        match err {
            ServiceError::Domain(CoreError::InsufficientStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(row_counts(&s.db).await, (0, 0, 0));
        assert_eq!(stock_of(&s.db, &s.b).await, 5);
        assert_eq!(session.cart().line_count(), 2);
    }

    async fn file_shop(dir: &tempfile::TempDir, stock: i64) -> (Database, Customer, Item) {
        let config = DbConfig::new(dir.path().join("shop.db")).max_connections(8);
        let db = Database::new(config).await.unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer::new("Ali Traders", "0300-1234567", "Mall Road, Lahore"))
            .await
            .unwrap();
        let item = db
            .items()
            .create(&NewItem::new("C", stock, Money::from_cents(100), Money::from_cents(200)))
            .await
            .unwrap();
        (db, customer, item)
    }

    /// Fills one cart per buyer, then finalizes them all at once.
    async fn race(
        db: &Database,
        customer: &Customer,
        item: &Item,
        buyers: usize,
        quantity: i64,
    ) -> Vec<Result<stockbook_core::FinalizedOrder, ServiceError>> {
        let request = CheckoutRequest::new(customer.id, PaymentMode::Cash, Money::zero());

        let mut sessions = Vec::new();
        for _ in 0..buyers {
            let mut session = Session::new();
            db.cart_builder().add_line(&mut session, item.id, quantity).await.unwrap();
            sessions.push(session);
        }

        let mut handles = Vec::new();
        for mut session in sessions {
            let db = db.clone();
            let request = request.clone();
            handles.push(tokio::spawn(async move {
                db.finalizer().finalize(&mut session, &request).await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_finalizations_all_fit() {
        let dir = tempfile::tempdir().unwrap();
        let (db, customer, item) = file_shop(&dir, 100).await;

        let results = race(&db, &customer, &item, 8, 4).await;

        for result in &results {
            assert!(result.is_ok(), "finalize failed: {:?}", result);
        }
        assert_eq!(stock_of(&db, &item).await, 100 - 8 * 4);
        assert_eq!(row_counts(&db).await, (8, 8, 8));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_finalizations_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let (db, customer, item) = file_shop(&dir, 5).await;

        let results = race(&db, &customer, &item, 8, 4).await;

        let won = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(won, 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(err.is_insufficient_stock(), "unexpected error: {err}");
        }
        assert_eq!(stock_of(&db, &item).await, 1);
        assert_eq!(row_counts(&db).await, (1, 1, 1));
    }
}
