//! API layer for Pulsa Store
//!
//! HTTP handlers for the storefront: catalog browsing, purchases, balance
//! and history, topup and withdrawal requests, and the admin reconciliation
//! endpoints.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

pub use dto::{ApiResponse, PaginationParams};

pub use handlers::{
    configure_accounts, configure_admin, configure_catalog, configure_purchases,
    configure_topups, configure_withdrawals,
};
