//! Withdrawal model
//!
//! A balance-decrease request. Unlike purchases and topups the balance is
//! debited at creation time, so a customer cannot spend the same funds twice
//! while the withdrawal is awaited. Rejection must reverse the debit with a
//! refund entry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Withdrawal status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawalStatus::Pending => write!(f, "pending"),
            WithdrawalStatus::Approved => write!(f, "approved"),
            WithdrawalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl WithdrawalStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(WithdrawalStatus::Pending),
            "approved" => Some(WithdrawalStatus::Approved),
            "rejected" => Some(WithdrawalStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }
}

/// Withdrawal entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Unique identifier
    pub id: i32,

    /// Withdrawing account
    pub account_id: i32,

    /// Amount debited at creation
    pub amount: Decimal,

    /// Balance before the eager debit
    pub balance_before: Decimal,

    /// Balance after the eager debit
    pub balance_after: Decimal,

    /// Destination bank
    pub bank_name: String,

    /// Destination account number
    pub account_number: String,

    /// Destination account holder name
    pub account_name: String,

    /// Administrative notes set at resolution
    pub notes: Option<String>,

    /// Administrator who resolved the withdrawal
    pub approved_by: Option<i32>,

    /// Resolution timestamp
    pub approved_at: Option<DateTime<Utc>>,

    /// Approval status
    pub status: WithdrawalStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(
            WithdrawalStatus::from_str("PENDING"),
            Some(WithdrawalStatus::Pending)
        );
        assert_eq!(WithdrawalStatus::from_str(""), None);
        assert_eq!(WithdrawalStatus::Approved.to_string(), "approved");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!WithdrawalStatus::Pending.is_terminal());
        assert!(WithdrawalStatus::Approved.is_terminal());
        assert!(WithdrawalStatus::Rejected.is_terminal());
    }
}
