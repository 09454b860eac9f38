//! Pulsa Store Database Layer
//!
//! This crate provides PostgreSQL database access for the storefront. It
//! includes:
//!
//! - Connection pool management with sqlx
//! - The ledger store: the single write path for account balances
//! - Repository implementations for catalog and settlement entities

pub mod ledger;
pub mod pool;
pub mod repositories;

pub use ledger::LedgerStore;
pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use pulsa_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
