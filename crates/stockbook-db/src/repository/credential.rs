//! # Credential Repository
//!
//! Storage for login accounts. Only argon2 PHC strings are written; hashing
//! and verification live in [`crate::service::auth`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockbook_core::Credential;

#[derive(Debug, Clone)]
pub struct CredentialRepository {
    pool: SqlitePool,
}

impl CredentialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CredentialRepository { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, username, password_hash, created_at
             FROM credentials WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    /// Inserts an account.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the username is taken.
    pub async fn insert(&self, username: &str, password_hash: &str) -> DbResult<Credential> {
        let credential = sqlx::query_as::<_, Credential>(
            "INSERT INTO credentials (username, password_hash, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(username = %credential.username, "Credential stored");
        Ok(credential)
    }

    pub async fn exists(&self, username: &str) -> DbResult<bool> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM credentials WHERE username = ?1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(found != 0)
    }
}
