//! # Customer Repository
//!
//! CRUD for customers. Deleting a customer cascades to their orders (and
//! through them to order lines) and to their transactions.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbResult, ServiceResult};
use stockbook_core::{CoreError, Customer, NewCustomer};

const COLUMNS: &str = "id, name, phone, address, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Validates and inserts a customer. Fields are stored trimmed.
    pub async fn create(&self, input: &NewCustomer) -> ServiceResult<Customer> {
        input.validate()?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (name, phone, address, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        ))
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(input.address.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(customer_id = customer.id, "Customer created");
        Ok(customer)
    }

    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer =
            sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(customer)
    }

    /// All customers in creation order.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers =
            sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(customers)
    }

    /// All customers alphabetically (report filter dropdowns).
    pub async fn list_by_name(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {COLUMNS} FROM customers ORDER BY name COLLATE NOCASE, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Replaces name, phone and address.
    ///
    /// Past transactions keep the party name and address they were written
    /// with.
    pub async fn update(&self, id: i64, input: &NewCustomer) -> ServiceResult<Customer> {
        input.validate()?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET name = ?2, phone = ?3, address = ?4
             WHERE id = ?1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(input.address.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::CustomerNotFound(id))?;

        debug!(customer_id = id, "Customer updated");
        Ok(customer)
    }

    /// Deletes a customer together with their orders and transactions.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CustomerNotFound(id).into());
        }

        debug!(customer_id = id, "Customer deleted");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use stockbook_core::{CoreError, NewCustomer};

    use crate::error::ServiceError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo
            .create(&NewCustomer::new("  Ali Traders ", "0300-1234567", "Mall Road, Lahore"))
            .await
            .unwrap();

        assert_eq!(created.name, "Ali Traders");
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get_by_id(created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let db = test_db().await;

        let err = db
            .customers()
            .create(&NewCustomer::new("Ali", "", "Lahore"))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(db.customers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orders() {
        let db = test_db().await;
        let repo = db.customers();
        repo.create(&NewCustomer::new("Zain", "1", "A")).await.unwrap();
        repo.create(&NewCustomer::new("ahmed", "2", "B")).await.unwrap();

        let by_id: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(by_id, vec!["Zain", "ahmed"]);

        let by_name: Vec<String> = repo
            .list_by_name()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(by_name, vec!["ahmed", "Zain"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.customers();
        let customer = repo.create(&NewCustomer::new("Ali", "1", "Old")).await.unwrap();

        let updated = repo
            .update(customer.id, &NewCustomer::new("Ali", "1", "New"))
            .await
            .unwrap();
        assert_eq!(updated.address, "New");
        assert_eq!(updated.created_at, customer.created_at);

        repo.delete(customer.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);

        let err = repo.delete(customer.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::CustomerNotFound(_))
        ));
        let err = repo
            .update(customer.id, &NewCustomer::new("Ali", "1", "New"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
