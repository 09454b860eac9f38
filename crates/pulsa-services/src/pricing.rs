//! Tier pricing
//!
//! Each package carries an optional override price per tier. When the
//! override is absent, sellers and resellers fall back to a discount off the
//! base price; regular users pay the base price.

use pulsa_core::models::{AccountTier, Package};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fallback multiplier for sellers without an explicit seller price
pub const SELLER_DISCOUNT: Decimal = dec!(0.95);

/// Fallback multiplier for resellers without an explicit reseller price
pub const RESELLER_DISCOUNT: Decimal = dec!(0.90);

/// Resolve the price an account of the given tier pays for a package
///
/// Fallback discounts are quantized to whole cents so the resolved price
/// always fits the ledger's minor-unit precision.
pub fn price_for_tier(package: &Package, tier: AccountTier) -> Decimal {
    match tier {
        AccountTier::User => package.price_user.unwrap_or(package.price),
        AccountTier::Seller => package
            .price_seller
            .unwrap_or_else(|| (package.price * SELLER_DISCOUNT).round_dp(2)),
        AccountTier::Reseller => package
            .price_reseller
            .unwrap_or_else(|| (package.price * RESELLER_DISCOUNT).round_dp(2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pulsa_core::models::{FulfillmentCategory, PackageStatus};

    fn base_package() -> Package {
        Package {
            id: 1,
            name: "Data 10GB".to_string(),
            description: None,
            price: dec!(100000),
            price_user: None,
            price_seller: None,
            price_reseller: None,
            provider: "Telkomsel".to_string(),
            kind: "data".to_string(),
            category: FulfillmentCategory::Automatic,
            status: PackageStatus::Active,
            stock: None,
            available_for: vec![AccountTier::User, AccountTier::Seller, AccountTier::Reseller],
            gateway_ref: Some("PKG-10GB".to_string()),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_fallback_discounts() {
        let package = base_package();

        assert_eq!(price_for_tier(&package, AccountTier::User), dec!(100000));
        assert_eq!(price_for_tier(&package, AccountTier::Seller), dec!(95000.00));
        assert_eq!(
            price_for_tier(&package, AccountTier::Reseller),
            dec!(90000.00)
        );
    }

    #[test]
    fn test_fallback_discounts_quantize_to_cents() {
        let mut package = base_package();
        package.price = dec!(100.01);

        // 100.01 * 0.95 = 95.0095 and 100.01 * 0.90 = 90.009; neither may
        // leak sub-cent digits into a charge.
        assert_eq!(price_for_tier(&package, AccountTier::Seller), dec!(95.01));
        assert_eq!(price_for_tier(&package, AccountTier::Reseller), dec!(90.01));
    }

    #[test]
    fn test_explicit_overrides_win() {
        let mut package = base_package();
        package.price_user = Some(dec!(99000));
        package.price_seller = Some(dec!(92000));
        package.price_reseller = Some(dec!(85000));

        assert_eq!(price_for_tier(&package, AccountTier::User), dec!(99000));
        assert_eq!(price_for_tier(&package, AccountTier::Seller), dec!(92000));
        assert_eq!(price_for_tier(&package, AccountTier::Reseller), dec!(85000));
    }
}
