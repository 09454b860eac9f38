//! Response DTOs for balance and history endpoints

use pulsa_core::models::{Account, AccountTier, LedgerEntry};
use pulsa_db::HistoryStats;
use rust_decimal::Decimal;
use serde::Serialize;

/// Current balance of an account
#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    /// Account identifier
    pub account_id: i32,
    /// Account tier
    pub tier: AccountTier,
    /// Current balance
    pub balance: Decimal,
}

impl From<Account> for BalanceResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            tier: account.tier,
            balance: account.balance,
        }
    }
}

/// Ledger history with aggregate totals
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    /// Ledger entries, newest first
    pub entries: Vec<LedgerEntry>,
    /// Per-kind totals over the full history
    pub stats: HistoryStats,
}
