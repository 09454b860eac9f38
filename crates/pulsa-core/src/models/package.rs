//! Package model
//!
//! A prepaid credit or data package offered by the store. Packages carry
//! tier-specific prices and a fulfillment category that decides whether a
//! purchase settles through the gateway or waits for manual processing.

use crate::models::AccountTier;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a purchased package gets delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentCategory {
    /// Delivered by an operator; purchases stay pending until reconciled
    Manual,
    /// Delivered synchronously via the fulfillment gateway
    Automatic,
}

impl fmt::Display for FulfillmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentCategory::Manual => write!(f, "manual"),
            FulfillmentCategory::Automatic => write!(f, "automatic"),
        }
    }
}

impl FulfillmentCategory {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Some(FulfillmentCategory::Manual),
            "automatic" => Some(FulfillmentCategory::Automatic),
            _ => None,
        }
    }
}

/// Package status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageStatus::Active => write!(f, "active"),
            PackageStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl PackageStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(PackageStatus::Active),
            "inactive" => Some(PackageStatus::Inactive),
            _ => None,
        }
    }
}

/// Package entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Unique identifier
    pub id: i32,

    /// Display name
    pub name: String,

    /// Description shown to customers
    pub description: Option<String>,

    /// Base price
    pub price: Decimal,

    /// Explicit price for the user tier (falls back to base price)
    pub price_user: Option<Decimal>,

    /// Explicit price for the seller tier (falls back to 5% off base)
    pub price_seller: Option<Decimal>,

    /// Explicit price for the reseller tier (falls back to 10% off base)
    pub price_reseller: Option<Decimal>,

    /// Mobile network operator
    pub provider: String,

    /// Package kind (pulsa, data, ...)
    pub kind: String,

    /// Fulfillment category
    pub category: FulfillmentCategory,

    /// Availability status
    pub status: PackageStatus,

    /// Remaining stock; None means unlimited. Automatic packages ignore stock.
    pub stock: Option<i32>,

    /// Tiers allowed to purchase this package
    pub available_for: Vec<AccountTier>,

    /// Provider-side package identifier used by the fulfillment gateway
    pub gateway_ref: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Package {
    /// Whether the package can currently be purchased by the given tier.
    pub fn is_available_for(&self, tier: AccountTier) -> bool {
        self.status == PackageStatus::Active
            && self.available_for.contains(&tier)
            && self.in_stock()
    }

    /// Automatic packages are never stock-limited; manual packages are
    /// purchasable while stock is unlimited or positive.
    pub fn in_stock(&self) -> bool {
        match self.category {
            FulfillmentCategory::Automatic => true,
            FulfillmentCategory::Manual => self.stock.map_or(true, |s| s > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_package() -> Package {
        Package {
            id: 1,
            name: "Pulsa 10K".to_string(),
            description: None,
            price: dec!(10000),
            price_user: None,
            price_seller: None,
            price_reseller: None,
            provider: "Telkomsel".to_string(),
            kind: "pulsa".to_string(),
            category: FulfillmentCategory::Manual,
            status: PackageStatus::Active,
            stock: Some(5),
            available_for: vec![AccountTier::User, AccountTier::Seller],
            gateway_ref: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_availability_by_tier() {
        let pkg = base_package();
        assert!(pkg.is_available_for(AccountTier::User));
        assert!(!pkg.is_available_for(AccountTier::Reseller));
    }

    #[test]
    fn test_inactive_package_unavailable() {
        let mut pkg = base_package();
        pkg.status = PackageStatus::Inactive;
        assert!(!pkg.is_available_for(AccountTier::User));
    }

    #[test]
    fn test_stock_rules() {
        let mut pkg = base_package();
        pkg.stock = Some(0);
        assert!(!pkg.in_stock());

        pkg.stock = None;
        assert!(pkg.in_stock());

        // automatic packages ignore stock
        pkg.stock = Some(0);
        pkg.category = FulfillmentCategory::Automatic;
        assert!(pkg.in_stock());
    }
}
