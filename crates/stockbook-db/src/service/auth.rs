//! # Authenticator
//!
//! Signup, credential checks and the session login flag. Passwords are
//! stored as argon2 PHC strings only.
//!
//! ```text
//! create_credential(user, pw, confirm)
//!      ├── validate_signup ─────────► ValidationError
//!      ├── username taken ──────────► DuplicateCredential
//!      └── argon2 hash ─► INSERT
//!
//! login(session, user, pw)
//!      ├── unknown user / bad hash ─► InvalidCredentials
//!      └── session.sign_in(user)
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use tracing::{info, warn};

use crate::error::{DbError, DbResult, ServiceResult};
use crate::repository::credential::CredentialRepository;
use stockbook_core::validation::validate_signup;
use stockbook_core::{CoreError, Credential, Session};

#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: CredentialRepository,
}

impl Authenticator {
    pub fn new(credentials: CredentialRepository) -> Self {
        Authenticator { credentials }
    }

    /// Registers a new account.
    ///
    /// ## Errors
    /// - `Validation` for a blank username, a short password or a
    ///   confirmation that does not match
    /// - `DuplicateCredential` when the username is taken
    pub async fn create_credential(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> ServiceResult<Credential> {
        validate_signup(username, password, confirm)?;
        let username = username.trim();

        if self.credentials.exists(username).await? {
            return Err(CoreError::DuplicateCredential(username.to_string()).into());
        }

        let hash = hash_password(password)?;
        let credential = match self.credentials.insert(username, &hash).await {
            Ok(credential) => credential,
            // Lost a race with a concurrent signup.
            Err(DbError::UniqueViolation { .. }) => {
                return Err(CoreError::DuplicateCredential(username.to_string()).into())
            }
            Err(e) => return Err(e.into()),
        };

        info!(username = %credential.username, "Credential created");
        Ok(credential)
    }

    /// Whether `password` matches the stored hash for `username`.
    /// Unknown usernames verify as `false`.
    pub async fn verify_credential(&self, username: &str, password: &str) -> ServiceResult<bool> {
        let stored = self.credentials.find_by_username(username.trim()).await?;
        Ok(stored.is_some_and(|c| verify_password(password, &c.password_hash)))
    }

    /// Marks the session as signed in.
    ///
    /// The session is left untouched on failure.
    pub async fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ServiceResult<()> {
        if !self.verify_credential(username, password).await? {
            warn!(username = %username.trim(), "Login rejected");
            return Err(CoreError::InvalidCredentials.into());
        }

        session.sign_in(username.trim());
        info!(session_id = %session.id(), username = %username.trim(), "Signed in");
        Ok(())
    }

    /// Clears the session user and its cart.
    pub fn logout(&self, session: &mut Session) {
        if let Some(user) = session.user() {
            info!(session_id = %session.id(), username = %user, "Signed out");
        }
        session.sign_out();
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string. Malformed hashes never
/// verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
