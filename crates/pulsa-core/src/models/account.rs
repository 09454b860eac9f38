//! Account model
//!
//! Represents customer accounts in the store. Each account holds a single
//! cash balance that is only ever mutated through the ledger store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pricing tier for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountTier {
    /// Regular customer - pays base price
    #[default]
    User,
    /// Seller - 5% off base price when no explicit tier price is set
    Seller,
    /// Reseller - 10% off base price when no explicit tier price is set
    Reseller,
}

impl fmt::Display for AccountTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountTier::User => write!(f, "user"),
            AccountTier::Seller => write!(f, "seller"),
            AccountTier::Reseller => write!(f, "reseller"),
        }
    }
}

impl AccountTier {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(AccountTier::User),
            "seller" => Some(AccountTier::Seller),
            "reseller" => Some(AccountTier::Reseller),
            _ => None,
        }
    }
}

/// Account entity
///
/// The balance field is written only by the ledger store; every change is
/// mirrored by a `LedgerEntry` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: i32,

    /// Customer name
    pub name: String,

    /// Customer email
    pub email: String,

    /// Customer phone number
    pub phone: Option<String>,

    /// Pricing tier
    pub tier: AccountTier,

    /// Current spendable balance
    pub balance: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Normalize a phone number to Indonesian international format (62...)
    pub fn normalize_msisdn(phone: &str) -> String {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if let Some(rest) = digits.strip_prefix('0') {
            format!("62{}", rest)
        } else if digits.starts_with("62") {
            digits
        } else {
            format!("62{}", digits)
        }
    }
}

impl Default for Account {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            email: String::new(),
            phone: None,
            tier: AccountTier::User,
            balance: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_roundtrip() {
        assert_eq!(AccountTier::from_str("reseller"), Some(AccountTier::Reseller));
        assert_eq!(AccountTier::from_str("SELLER"), Some(AccountTier::Seller));
        assert_eq!(AccountTier::from_str("admin"), None);
        assert_eq!(AccountTier::Reseller.to_string(), "reseller");
    }

    #[test]
    fn test_normalize_msisdn() {
        assert_eq!(Account::normalize_msisdn("081234567890"), "6281234567890");
        assert_eq!(Account::normalize_msisdn("6281234567890"), "6281234567890");
        assert_eq!(Account::normalize_msisdn("81234567890"), "6281234567890");
        assert_eq!(Account::normalize_msisdn("0812-3456-7890"), "6281234567890");
    }
}
