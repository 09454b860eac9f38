//! Request DTOs for the admin reconciliation endpoints

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Credit an account directly, bypassing the approval queue
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualTopupRequest {
    /// Account to credit
    pub account_id: i32,

    /// Amount to credit; must be positive
    pub amount: Decimal,

    /// Reason or payment reference
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

/// Deduct from an account's balance as a correction
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdjustBalanceRequest {
    /// Amount to deduct; must be positive
    pub amount: Decimal,

    /// Reason recorded on the ledger entry
    #[validate(length(min = 1, max = 255))]
    pub reason: String,
}

/// Metadata attached to a withdrawal decision
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawalDecisionRequest {
    /// Admin account making the decision
    pub approved_by: Option<i32>,
}
