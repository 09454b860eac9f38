//! Ledger entry model
//!
//! The append-only audit trail (`balance_history`). The sequence of entries
//! for an account, ordered by creation, reconstructs every historical
//! balance: `balance_after == balance_before + amount` on every row, and each
//! row's `balance_before` equals the previous row's `balance_after`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a balance changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// Balance credit from an approved topup
    Topup,
    /// Debit for a completed package purchase
    Purchase,
    /// Eager debit for a withdrawal request
    Withdrawal,
    /// Reversal of a rejected withdrawal's eager debit
    Refund,
    /// Administrative correction
    Adjustment,
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerKind::Topup => write!(f, "topup"),
            LedgerKind::Purchase => write!(f, "purchase"),
            LedgerKind::Withdrawal => write!(f, "withdrawal"),
            LedgerKind::Refund => write!(f, "refund"),
            LedgerKind::Adjustment => write!(f, "adjustment"),
        }
    }
}

impl LedgerKind {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "topup" => Some(LedgerKind::Topup),
            "purchase" => Some(LedgerKind::Purchase),
            "withdrawal" => Some(LedgerKind::Withdrawal),
            "refund" => Some(LedgerKind::Refund),
            "adjustment" => Some(LedgerKind::Adjustment),
            _ => None,
        }
    }
}

/// Immutable balance-change record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier
    pub id: i64,

    /// Affected account
    pub account_id: i32,

    /// Signed balance delta (negative for debits)
    pub amount: Decimal,

    /// Change category
    pub kind: LedgerKind,

    /// Human-readable explanation
    pub description: String,

    /// Balance before the change
    pub balance_before: Decimal,

    /// Balance after the change
    pub balance_after: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            LedgerKind::Topup,
            LedgerKind::Purchase,
            LedgerKind::Withdrawal,
            LedgerKind::Refund,
            LedgerKind::Adjustment,
        ] {
            assert_eq!(LedgerKind::from_str(&kind.to_string()), Some(kind));
        }
        assert_eq!(LedgerKind::from_str("transfer"), None);
    }
}
