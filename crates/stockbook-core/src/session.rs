//! # Session
//!
//! Explicit per-session context: who is logged in and what is in their cart.
//! Services take `&mut Session` instead of reaching for shared global state,
//! so two sessions never see each other's cart.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::Cart;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    user: Option<String>,
    cart: Cart,
}

impl Session {
    /// Starts an anonymous session with an empty cart.
    pub fn new() -> Self {
        Session {
            id: Uuid::new_v4(),
            user: None,
            cart: Cart::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Logged-in username, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Raw access to the cart.
    ///
    /// Adding lines here skips the live stock read that
    /// `stockbook_db::CartBuilder::add_line` does, so order forms go through
    /// the builder. Whatever ends up in the cart, `OrderFinalizer` checks
    /// every line against persisted stock again inside its transaction.
    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.user = Some(username.into());
    }

    /// Clears the user and the cart.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.cart.remove_all();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;
    use chrono::Utc;

    #[test]
    fn test_sessions_are_isolated() {
        let item = Item {
            id: 1,
            name: "Widget".to_string(),
            quantity: 10,
            cost_price_cents: 100,
            selling_price_cents: 200,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut a = Session::new();
        let b = Session::new();
        a.cart_mut().add_line(&item, 2).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.cart().quantity_of(1), 2);
        assert!(b.cart().is_empty());
    }

    #[test]
    fn test_sign_out_clears_user_and_cart() {
        let item = Item {
            id: 1,
            name: "Widget".to_string(),
            quantity: 10,
            cost_price_cents: 100,
            selling_price_cents: 200,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut session = Session::new();
        session.sign_in("admin");
        session.cart_mut().add_line(&item, 1).unwrap();
        assert_eq!(session.user(), Some("admin"));

        session.sign_out();
        assert!(!session.is_authenticated());
        assert!(session.cart().is_empty());
    }
}
