//! # Validation Module
//!
//! Input rules applied before anything touches the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (pure)                                           │
//! │  ├── Required fields, length bounds                                    │
//! │  └── Quantity / price / received sign rules                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (stockbook-db)                                      │
//! │  ├── Stock availability (needs the persisted quantity)                 │
//! │  └── Duplicate username                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0), CHECK (balance = issue - received)         │
//! │  ├── UNIQUE (username), UNIQUE (bill_no)                               │
//! │  └── Foreign keys with ON DELETE CASCADE                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{validate_line_quantity, validate_password};
//!
//! assert!(validate_line_quantity(3).is_ok());
//! assert!(validate_password("12345").is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_LINES, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LENGTH: usize = 200;
const MAX_PHONE_LENGTH: usize = 30;
const MAX_ADDRESS_LENGTH: usize = 500;
const MAX_USERNAME_LENGTH: usize = 100;
const MAX_CHEQUE_NO_LENGTH: usize = 50;

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer or item name.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_name;
///
/// assert!(validate_name("name", "Widget").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    required(field, name, MAX_NAME_LENGTH)
}

/// Validates a phone number: required, digits plus `+ - ( )` and spaces.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    required("phone", phone, MAX_PHONE_LENGTH)?;

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ');
    if !phone.trim().chars().all(allowed) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces and + - ( )".to_string(),
        });
    }

    Ok(())
}

pub fn validate_address(address: &str) -> ValidationResult<()> {
    required("address", address, MAX_ADDRESS_LENGTH)
}

pub fn validate_username(username: &str) -> ValidationResult<()> {
    required("username", username, MAX_USERNAME_LENGTH)
}

/// Validates a new password.
///
/// ## Rules
/// - Must not be empty
/// - At least [`MIN_PASSWORD_LENGTH`] characters (not trimmed)
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates signup input: every field present, password long enough and
/// confirmed.
pub fn validate_signup(username: &str, password: &str, confirm: &str) -> ValidationResult<()> {
    validate_username(username)?;
    validate_password(password)?;

    if confirm.is_empty() {
        return Err(ValidationError::Required {
            field: "password confirmation".to_string(),
        });
    }
    if password != confirm {
        return Err(ValidationError::Mismatch {
            field: "password confirmation".to_string(),
        });
    }

    Ok(())
}

/// Normalizes a cheque number: trimmed, `None` when blank.
pub fn normalize_cheque_no(cheque_no: Option<&str>) -> ValidationResult<Option<String>> {
    match cheque_no.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) if value.chars().count() > MAX_CHEQUE_NO_LENGTH => {
            Err(ValidationError::TooLong {
                field: "cheque number".to_string(),
                max: MAX_CHEQUE_NO_LENGTH,
            })
        }
        Some(value) => Ok(Some(value.to_string())),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a cart or order line.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order form: Add to cart                                                │
/// │                                                                         │
/// │  User enters quantity: 3                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_line_quantity(3) ← THIS FUNCTION                             │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → stock check against the persisted item                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an item's stock level (zero allowed).
pub fn validate_stock_level(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in paisa. Zero is allowed.
///
/// ```rust
/// use stockbook_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("selling price", 10000).is_ok());
/// assert!(validate_price_cents("selling price", -1).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates the amount received at checkout. Zero is allowed (full credit),
/// overpayment is allowed (negative balance).
pub fn validate_received_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "received amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct line fits in the cart.
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Ali Traders").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0300-1234567").is_ok());
        assert!(validate_phone("+92 (300) 1234567").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("12345"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(validate_password("123456").is_ok());
        assert!(matches!(
            validate_password(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_signup() {
        assert!(validate_signup("admin", "secret1", "secret1").is_ok());
        assert!(matches!(
            validate_signup("admin", "secret1", "secret2"),
            Err(ValidationError::Mismatch { .. })
        ));
        assert!(matches!(
            validate_signup("", "secret1", "secret1"),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_signup("admin", "secret1", "").is_err());
    }

    #[test]
    fn test_quantity_rules() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(0).is_err());
        assert!(validate_line_quantity(-2).is_err());

        assert!(validate_stock_level(0).is_ok());
        assert!(validate_stock_level(-1).is_err());
    }

    #[test]
    fn test_money_rules() {
        assert!(validate_price_cents("cost price", 0).is_ok());
        assert!(validate_price_cents("cost price", -100).is_err());
        assert!(validate_received_cents(0).is_ok());
        assert!(validate_received_cents(-1).is_err());
    }

    #[test]
    fn test_normalize_cheque_no() {
        assert_eq!(normalize_cheque_no(None).unwrap(), None);
        assert_eq!(normalize_cheque_no(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_cheque_no(Some(" CHQ-001 ")).unwrap(),
            Some("CHQ-001".to_string())
        );
        assert!(normalize_cheque_no(Some(&"9".repeat(60))).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES).is_err());
    }
}
