//! Request DTOs for purchases, topups and withdrawals

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Purchase a package for a destination number
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PurchaseRequest {
    /// Buying account
    pub account_id: i32,

    /// Package to purchase
    pub package_id: i32,

    /// Destination phone number (normalized server-side)
    #[validate(length(min = 6, max = 20))]
    pub destination: String,
}

/// Request a balance topup awaiting admin approval
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TopupCreateRequest {
    /// Account to credit once approved
    pub account_id: i32,

    /// Amount to credit; must be positive
    pub amount: Decimal,

    /// Payment reference or note
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

/// Request a withdrawal of store balance
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WithdrawalCreateRequest {
    /// Account to debit
    pub account_id: i32,

    /// Amount to withdraw; must be positive
    pub amount: Decimal,

    /// Destination bank
    #[validate(length(min = 1, max = 100))]
    pub bank_name: String,

    /// Destination bank account number
    #[validate(length(min = 1, max = 50))]
    pub account_number: String,

    /// Destination account holder name
    #[validate(length(min = 1, max = 100))]
    pub account_name: String,

    /// Free-form note
    #[validate(length(max = 255))]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_purchase_request_validation() {
        let req = PurchaseRequest {
            account_id: 1,
            package_id: 2,
            destination: "08123456789".to_string(),
        };
        assert!(req.validate().is_ok());

        let bad = PurchaseRequest {
            destination: "123".to_string(),
            ..req
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_withdrawal_request_validation() {
        let req = WithdrawalCreateRequest {
            account_id: 1,
            amount: dec!(50000),
            bank_name: "BCA".to_string(),
            account_number: "1234567890".to_string(),
            account_name: "Budi Santoso".to_string(),
            notes: None,
        };
        assert!(req.validate().is_ok());

        let bad = WithdrawalCreateRequest {
            bank_name: String::new(),
            ..req
        };
        assert!(bad.validate().is_err());
    }
}
