//! Common traits for repositories and external collaborators
//!
//! Defines abstractions for database access and the two external services
//! the settlement path depends on (fulfillment gateway, operator
//! notification channel).

use crate::error::AppError;
use crate::models::{Account, LedgerEntry, Package};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

/// Generic repository trait for read/create operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;
}

/// Account repository trait with specialized methods
#[async_trait]
pub trait AccountRepository: Repository<Account, i32> {
    /// Find account by email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;
}

/// Package repository trait with specialized methods
#[async_trait]
pub trait PackageRepository: Repository<Package, i32> {
    /// List active packages available for a tier
    async fn list_available(
        &self,
        tier: crate::models::AccountTier,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Package>, i64), AppError>;
}

/// Ledger read access (writing goes through the ledger store only)
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Most recent entries for an account, newest first
    async fn history(&self, account_id: i32, limit: i64) -> Result<Vec<LedgerEntry>, AppError>;

    /// Sum of all entry amounts for an account
    async fn sum_for_account(&self, account_id: i32) -> Result<Decimal, AppError>;
}

/// Request sent to the fulfillment gateway for automatic delivery
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRequest {
    /// Provider-side package identifier
    pub package_reference: String,

    /// Destination msisdn in international format
    pub destination: String,
}

/// Outcome reported by the fulfillment gateway
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// True only when the gateway explicitly reported success
    pub success: bool,

    /// Raw gateway response for operator diagnostics
    pub raw: serde_json::Value,
}

/// Fulfillment gateway client
///
/// Treated as untrusted and possibly slow or unavailable; implementations
/// must enforce a bounded timeout. Callers map any `Err` to a failed
/// delivery, never to a retry.
#[async_trait]
pub trait FulfillmentGateway: Send + Sync {
    /// Attempt automatic delivery of a package
    async fn deliver(&self, request: &DeliveryRequest) -> Result<DeliveryOutcome, AppError>;
}

/// Details of a manual order awaiting operator processing
#[derive(Debug, Clone)]
pub struct ManualOrderAlert {
    pub transaction_id: i32,
    pub account_id: i32,
    pub customer_name: String,
    pub package_name: String,
    pub destination: String,
    pub price: Decimal,
}

/// Operator notification channel (fire-and-forget)
///
/// Failures are logged by callers and never propagated into settlement.
#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    /// Alert the operator about a new manual order
    async fn notify_manual_order(&self, alert: &ManualOrderAlert) -> Result<(), AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10);
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000);
        assert_eq!(p.per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }
}
