//! Business logic services for Pulsa Store
//!
//! This crate contains the services that orchestrate settlement:
//!
//! - `SettlementService` - purchases, topup requests, withdrawal requests
//! - `ReconciliationService` - admin resolution of pending work and balance
//!   adjustments
//!
//! Services own a connection pool and the ledger store, talk to external
//! parties only through the traits in pulsa-core, and are wrapped in
//! `web::Data` for sharing across workers. All operations are instrumented
//! with tracing and report failures as `AppError`.

pub mod pricing;
pub mod reconciliation;
pub mod settlement;

pub use reconciliation::ReconciliationService;
pub use settlement::{PurchaseOutcome, SettlementService};
