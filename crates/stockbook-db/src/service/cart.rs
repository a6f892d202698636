//! # Cart Builder
//!
//! Adds and removes session cart lines. Every add re-reads the item so the
//! stock check sees the quantity persisted right now, not the one shown
//! when the order form was loaded.
//!
//! ```text
//! add_line(session, item_id, qty)
//!      │
//!      ├── qty <= 0 ───────────────► ValidationError (no I/O)
//!      ├── SELECT item ── missing ─► ItemNotFound
//!      ├── in_cart + qty > stock ──► InsufficientStock
//!      └── merge or push line
//! ```

use tracing::{debug, warn};

use crate::error::ServiceResult;
use crate::repository::item::ItemRepository;
use stockbook_core::validation::validate_line_quantity;
use stockbook_core::{CoreError, Session};

#[derive(Debug, Clone)]
pub struct CartBuilder {
    items: ItemRepository,
}

impl CartBuilder {
    pub fn new(items: ItemRepository) -> Self {
        CartBuilder { items }
    }

    /// Adds `quantity` of `item_id` to the session cart.
    ///
    /// ## Errors
    /// - `Validation` when `quantity <= 0`
    /// - `ItemNotFound` when the item no longer exists
    /// - `InsufficientStock` when cart quantity + `quantity` exceeds stock
    /// - `CartTooLarge` when a new line would exceed the line limit
    ///
    /// The cart is unchanged on error.
    pub async fn add_line(
        &self,
        session: &mut Session,
        item_id: i64,
        quantity: i64,
    ) -> ServiceResult<()> {
        validate_line_quantity(quantity)?;

        let item = self
            .items
            .get_by_id(item_id)
            .await?
            .ok_or(CoreError::ItemNotFound(item_id))?;

        if let Err(err) = session.cart_mut().add_line(&item, quantity) {
            if let CoreError::InsufficientStock {
                requested,
                available,
                ..
            } = &err
            {
                warn!(item_id, requested, available, "Cart add exceeds stock");
            }
            return Err(err.into());
        }

        debug!(
            session_id = %session.id(),
            item_id,
            quantity,
            in_cart = session.cart().quantity_of(item_id),
            "Cart line added"
        );
        Ok(())
    }

    /// Drops the line for `item_id`. Returns whether one was removed.
    pub fn remove_line(&self, session: &mut Session, item_id: i64) -> bool {
        let removed = session.cart_mut().remove_line(item_id);
        debug!(session_id = %session.id(), item_id, removed, "Cart line removed");
        removed
    }

    pub fn remove_all(&self, session: &mut Session) {
        session.cart_mut().remove_all();
        debug!(session_id = %session.id(), "Cart cleared");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use stockbook_core::{CoreError, Item, Money, NewItem, Session};

    use crate::error::ServiceError;

    async fn setup(stock: i64) -> (Database, Item) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db
            .items()
            .create(&NewItem::new("Widget", stock, Money::from_cents(6000), Money::from_cents(10000)))
            .await
            .unwrap();
        (db, item)
    }

    #[tokio::test]
    async fn test_add_line_merges() {
        let (db, item) = setup(10).await;
        let builder = db.cart_builder();
        let mut session = Session::new();

        builder.add_line(&mut session, item.id, 2).await.unwrap();
        builder.add_line(&mut session, item.id, 3).await.unwrap();

        assert_eq!(session.cart().line_count(), 1);
        assert_eq!(session.cart().quantity_of(item.id), 5);
        assert_eq!(session.cart().total().cents(), 50000);
    }

    #[tokio::test]
    async fn test_add_line_reads_current_stock() {
        let (db, item) = setup(10).await;
        let builder = db.cart_builder();
        let mut session = Session::new();

        // Stock drops after the form was loaded.
        db.items()
            .update(
                item.id,
                &NewItem::new("Widget", 2, Money::from_cents(6000), Money::from_cents(10000)),
            )
            .await
            .unwrap();

        let err = builder.add_line(&mut session, item.id, 3).await.unwrap_err();
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
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_line_unknown_item() {
        let (db, item) = setup(10).await;
        let mut session = Session::new();

        let err = db
            .cart_builder()
            .add_line(&mut session, item.id + 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_line_rejects_zero_quantity() {
        let (db, item) = setup(10).await;
        let mut session = Session::new();

        let err = db
            .cart_builder()
            .add_line(&mut session, item.id, 0)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_remove_line_and_all() {
        let (db, item) = setup(10).await;
        let builder = db.cart_builder();
        let mut session = Session::new();

        builder.add_line(&mut session, item.id, 1).await.unwrap();
        assert!(builder.remove_line(&mut session, item.id));
        assert!(!builder.remove_line(&mut session, item.id));

        builder.add_line(&mut session, item.id, 1).await.unwrap();
        builder.remove_all(&mut session);
        assert!(session.cart().is_empty());
    }
}
