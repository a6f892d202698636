//! # Repository Module
//!
//! The entity store: one repository per table, plus reporting reads.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  db.items().update(id, &input)                                 │
//! │       ▼                                                                 │
//! │  ItemRepository                                                        │
//! │  ├── validate input (stockbook-core::validation)                       │
//! │  └── SQL over the pool                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Reads return DbResult<Option<T>> / DbResult<Vec<T>>.                  │
//! │  Writes return ServiceResult<T>: invalid input and unknown ids are     │
//! │  domain errors, storage failures are PersistenceFailure.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD
//! - [`ItemRepository`](item::ItemRepository) - Item CRUD and stock totals
//! - [`OrderRepository`](order::OrderRepository) - Order reads and status
//! - [`TransactionRepository`](transaction::TransactionRepository) - Payment records
//! - [`CredentialRepository`](credential::CredentialRepository) - Login accounts
//! - [`ReportRepository`](report::ReportRepository) - Dashboard and reports

pub mod credential;
pub mod customer;
pub mod item;
pub mod order;
pub mod report;
pub mod transaction;
