//! Topup model
//!
//! A balance-increase request. Credits the ledger only when approved; a
//! rejected topup never touched the balance, so rejection has no ledger
//! effect.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the topup was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopupOrigin {
    /// Created by an administrator, immediately approved
    Manual,
    /// Customer payment awaiting administrative confirmation
    Payment,
}

impl fmt::Display for TopupOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopupOrigin::Manual => write!(f, "manual"),
            TopupOrigin::Payment => write!(f, "payment"),
        }
    }
}

impl TopupOrigin {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Some(TopupOrigin::Manual),
            "payment" => Some(TopupOrigin::Payment),
            _ => None,
        }
    }
}

/// Topup status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopupStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for TopupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopupStatus::Pending => write!(f, "pending"),
            TopupStatus::Approved => write!(f, "approved"),
            TopupStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl TopupStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(TopupStatus::Pending),
            "approved" => Some(TopupStatus::Approved),
            "rejected" => Some(TopupStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TopupStatus::Pending)
    }
}

/// Topup entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topup {
    /// Unique identifier
    pub id: i32,

    /// Receiving account
    pub account_id: i32,

    /// Amount to credit on approval
    pub amount: Decimal,

    /// Request origin
    pub origin: TopupOrigin,

    /// Free-form description (payment method, admin note)
    pub description: Option<String>,

    /// Approval status
    pub status: TopupStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(TopupStatus::from_str("approved"), Some(TopupStatus::Approved));
        assert_eq!(TopupStatus::from_str("nope"), None);
        assert_eq!(TopupStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_origin_roundtrip() {
        assert_eq!(TopupOrigin::from_str("manual"), Some(TopupOrigin::Manual));
        assert_eq!(TopupOrigin::Payment.to_string(), "payment");
    }
}
