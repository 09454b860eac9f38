//! HTTP request handlers

pub mod account;
pub mod admin;
pub mod catalog;
pub mod purchase;
pub mod topup;
pub mod withdrawal;

pub use account::configure as configure_accounts;
pub use admin::configure as configure_admin;
pub use catalog::configure as configure_catalog;
pub use purchase::configure as configure_purchases;
pub use topup::configure as configure_topups;
pub use withdrawal::configure as configure_withdrawals;
