//! # Services
//!
//! Workflows that span the pure core and the store. Each takes the caller's
//! [`Session`](stockbook_core::Session) explicitly.
//!
//! - [`cart::CartBuilder`] - add/remove cart lines against live stock
//! - [`checkout::OrderFinalizer`] - atomic order + lines + transaction commit
//! - [`auth::Authenticator`] - signup, credential check, login/logout

pub mod auth;
pub mod cart;
pub mod checkout;
