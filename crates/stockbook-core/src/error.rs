//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | PersistenceFailure(DbError)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable by the caller: show the message, keep the
//! form (and the cart) as it was, let the user correct and resubmit.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Customer id does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    /// Item (product) id does not exist.
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// Requested quantity exceeds the persisted stock.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cart has 2 × Widget, stock is 4
    ///      │
    ///      ▼
    /// add_line(Widget, 3) → 2 + 3 > 4
    ///      │
    ///      ▼
    /// InsufficientStock { item_id, name: "Widget", requested: 5, available: 4 }
    /// ```
    /// Raised at cart-add time and again at finalize time, where stock is
    /// re-read because it may have moved since the line was added.
    #[error("Insufficient stock for {name} (item {item_id}): available {available}, requested {requested}")]
    InsufficientStock {
        item_id: i64,
        name: String,
        requested: i64,
        available: i64,
    },

    /// Finalize was called with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Payment mode is cheque but no cheque number was given.
    #[error("Cheque number is required for cheque payments")]
    MissingChequeNumber,

    /// Cart has exceeded the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Signup with a username that is already taken.
    #[error("Username '{0}' already exists")]
    DuplicateCredential(String),

    /// Login with an unknown username or a wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state change; the caller shows the message and the
/// store is untouched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparseable amount, unknown payment mode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not (password confirmation).
    #[error("{field} does not match")]
    Mismatch { field: String },

    /// Start of a range is after its end.
    #[error("{field}: start {start} is after end {end}")]
    InvalidRange {
        field: String,
        start: String,
        end: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
