//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in pulsa-core,
//! using sqlx for PostgreSQL access. Balance writes are not done here; they
//! go through the ledger store.

pub mod account_repo;
pub mod ledger_repo;
pub mod package_repo;
pub mod topup_repo;
pub mod transaction_repo;
pub mod withdrawal_repo;

pub use account_repo::PgAccountRepository;
pub use ledger_repo::{HistoryStats, PgLedgerRepository};
pub use package_repo::PgPackageRepository;
pub use topup_repo::PgTopupRepository;
pub use transaction_repo::PgTransactionRepository;
pub use withdrawal_repo::PgWithdrawalRepository;
