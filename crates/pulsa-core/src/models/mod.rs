//! Domain models for Pulsa Store
//!
//! This module contains all the core domain models used throughout the
//! settlement engine.

pub mod account;
pub mod ledger;
pub mod package;
pub mod topup;
pub mod transaction;
pub mod withdrawal;

pub use account::{Account, AccountTier};
pub use ledger::{LedgerEntry, LedgerKind};
pub use package::{FulfillmentCategory, Package, PackageStatus};
pub use topup::{Topup, TopupOrigin, TopupStatus};
pub use transaction::{Transaction, TransactionStatus};
pub use withdrawal::{Withdrawal, WithdrawalStatus};
