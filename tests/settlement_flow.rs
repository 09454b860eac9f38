//! Settlement flow integration tests
//!
//! These run against a real PostgreSQL database with the migrations applied
//! and exercise the full purchase/topup/withdrawal lifecycles, including the
//! ledger invariants.
//!
//! Run with: DATABASE_URL=... cargo test -- --ignored

use async_trait::async_trait;
use pulsa_core::models::{LedgerKind, TransactionStatus};
use pulsa_core::traits::{
    DeliveryOutcome, DeliveryRequest, FulfillmentGateway, LedgerReader, ManualOrderAlert,
    OperatorNotifier,
};
use pulsa_core::{AppError, AppResult};
use pulsa_db::{create_pool, PgLedgerRepository};
use pulsa_services::{ReconciliationService, SettlementService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use std::sync::Arc;

/// Gateway stub with a fixed outcome
struct StaticGateway {
    success: bool,
}

#[async_trait]
impl FulfillmentGateway for StaticGateway {
    async fn deliver(&self, _request: &DeliveryRequest) -> AppResult<DeliveryOutcome> {
        Ok(DeliveryOutcome {
            success: self.success,
            raw: serde_json::json!({ "status": self.success }),
        })
    }
}

/// Gateway stub that errors out instead of returning an outcome
struct BrokenGateway;

#[async_trait]
impl FulfillmentGateway for BrokenGateway {
    async fn deliver(&self, _request: &DeliveryRequest) -> AppResult<DeliveryOutcome> {
        Err(AppError::GatewayFailure("connection reset".to_string()))
    }
}

/// Notifier stub that swallows alerts
struct NullNotifier;

#[async_trait]
impl OperatorNotifier for NullNotifier {
    async fn notify_manual_order(&self, _alert: &ManualOrderAlert) -> AppResult<()> {
        Ok(())
    }
}

async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost/pulsa_store".to_string());
    create_pool(&database_url, Some(5)).await.unwrap()
}

fn settlement(pool: &PgPool, gateway_success: bool) -> SettlementService {
    SettlementService::new(
        pool.clone(),
        Arc::new(StaticGateway {
            success: gateway_success,
        }),
        Arc::new(NullNotifier),
    )
}

async fn seed_account(pool: &PgPool, tier: &str, balance: Decimal) -> i32 {
    let email = format!(
        "it-{}@test.local",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
    );
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO accounts (name, email, tier, balance) VALUES ('Test Buyer', $1, $2, $3) RETURNING id",
    )
    .bind(email)
    .bind(tier)
    .bind(balance)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

async fn seed_package(pool: &PgPool, category: &str, price: Decimal) -> i32 {
    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO packages (name, price, provider, kind, category, available_for, gateway_ref)
        VALUES ('Test Package', $1, 'Telkomsel', 'pulsa', $2, '{user,seller,reseller}', 'PKG-TEST')
        RETURNING id
        "#,
    )
    .bind(price)
    .bind(category)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

async fn balance_of(pool: &PgPool, account_id: i32) -> Decimal {
    let (balance,): (Decimal,) = sqlx::query_as("SELECT balance FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await
        .unwrap();
    balance
}

/// Every entry's delta must chain exactly, and the deltas must replay to the
/// current balance.
async fn assert_ledger_consistent(pool: &PgPool, account_id: i32, initial: Decimal) {
    let ledger = PgLedgerRepository::new(pool.clone());

    let mut entries = ledger.history(account_id, 500).await.unwrap();
    entries.reverse(); // oldest first

    let mut replayed = initial;
    for entry in &entries {
        assert_eq!(entry.balance_before, replayed, "entry {} breaks the chain", entry.id);
        assert_eq!(entry.balance_after, entry.balance_before + entry.amount);
        replayed = entry.balance_after;
    }

    assert_eq!(replayed, balance_of(pool, account_id).await);
    assert_eq!(
        initial + ledger.sum_for_account(account_id).await.unwrap(),
        replayed
    );
}

#[tokio::test]
#[ignore] // Requires database
async fn automatic_purchase_debits_once() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(100000)).await;
    let package_id = seed_package(&pool, "automatic", dec!(30000)).await;

    let service = settlement(&pool, true);
    let outcome = service
        .purchase(account_id, package_id, "08123456789")
        .await
        .unwrap();

    assert_eq!(outcome.status, TransactionStatus::Completed);
    assert_eq!(outcome.amount, dec!(30000));
    assert_eq!(balance_of(&pool, account_id).await, dec!(70000));

    assert_ledger_consistent(&pool, account_id, dec!(100000)).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn insufficient_balance_rejected_before_delivery() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(100000)).await;
    let package_id = seed_package(&pool, "automatic", dec!(150000)).await;

    let service = settlement(&pool, true);
    let result = service.purchase(account_id, package_id, "08123456789").await;

    assert!(matches!(result, Err(AppError::InsufficientFunds { .. })));
    assert_eq!(balance_of(&pool, account_id).await, dec!(100000));
}

#[tokio::test]
#[ignore] // Requires database
async fn failed_delivery_never_debits() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(100000)).await;
    let package_id = seed_package(&pool, "automatic", dec!(30000)).await;

    let service = settlement(&pool, false);
    let outcome = service
        .purchase(account_id, package_id, "08123456789")
        .await
        .unwrap();

    assert_eq!(outcome.status, TransactionStatus::Failed);
    assert_eq!(balance_of(&pool, account_id).await, dec!(100000));
}

#[tokio::test]
#[ignore] // Requires database
async fn erroring_gateway_fails_the_transaction() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(100000)).await;
    let package_id = seed_package(&pool, "automatic", dec!(30000)).await;

    let service = SettlementService::new(pool.clone(), Arc::new(BrokenGateway), Arc::new(NullNotifier));
    let result = service.purchase(account_id, package_id, "08123456789").await;

    assert!(matches!(result, Err(AppError::GatewayFailure(_))));
    assert_eq!(balance_of(&pool, account_id).await, dec!(100000));

    // the recorded transaction must not be left pending, where a later
    // approval would debit the customer for an undelivered package
    let (status,): (String,) = sqlx::query_as(
        "SELECT status FROM transactions WHERE account_id = $1 ORDER BY id DESC LIMIT 1",
    )
    .bind(account_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(status, "failed");
}

#[tokio::test]
#[ignore] // Requires database
async fn blank_destination_rejected() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(100000)).await;
    let package_id = seed_package(&pool, "automatic", dec!(30000)).await;

    let service = settlement(&pool, true);
    for destination in ["", "   "] {
        let result = service.purchase(account_id, package_id, destination).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
    assert_eq!(balance_of(&pool, account_id).await, dec!(100000));
}

#[tokio::test]
#[ignore] // Requires database
async fn manual_purchase_debits_only_on_approval() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(40000)).await;
    let package_id = seed_package(&pool, "manual", dec!(10000)).await;

    let service = settlement(&pool, true);
    let outcome = service
        .purchase(account_id, package_id, "08123456789")
        .await
        .unwrap();

    // pending orders hold no funds
    assert_eq!(outcome.status, TransactionStatus::Pending);
    assert_eq!(balance_of(&pool, account_id).await, dec!(40000));

    let reconciliation = ReconciliationService::new(pool.clone());
    reconciliation
        .approve_transaction(outcome.transaction_id)
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, account_id).await, dec!(30000));

    // a second approval must fail loudly, not double-debit
    let again = reconciliation.approve_transaction(outcome.transaction_id).await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed(_))));
    assert_eq!(balance_of(&pool, account_id).await, dec!(30000));

    assert_ledger_consistent(&pool, account_id, dec!(40000)).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn rejected_manual_purchase_has_no_ledger_effect() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(40000)).await;
    let package_id = seed_package(&pool, "manual", dec!(10000)).await;

    let service = settlement(&pool, true);
    let outcome = service
        .purchase(account_id, package_id, "08123456789")
        .await
        .unwrap();

    let reconciliation = ReconciliationService::new(pool.clone());
    reconciliation
        .reject_transaction(outcome.transaction_id)
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, account_id).await, dec!(40000));

    let ledger = PgLedgerRepository::new(pool.clone());
    assert!(ledger.history(account_id, 10).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore] // Requires database
async fn withdrawal_reject_restores_balance_exactly() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "seller", dec!(50000)).await;

    let service = settlement(&pool, true);
    let withdrawal = service
        .request_withdrawal(account_id, dec!(20000), "BCA", "1234567890", "Test Buyer", None)
        .await
        .unwrap();

    assert_eq!(withdrawal.balance_before, dec!(50000));
    assert_eq!(withdrawal.balance_after, dec!(30000));
    assert_eq!(balance_of(&pool, account_id).await, dec!(30000));

    let reconciliation = ReconciliationService::new(pool.clone());
    reconciliation
        .reject_withdrawal(withdrawal.id, Some(1))
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, account_id).await, dec!(50000));

    // one refund entry reversing the debit
    let ledger = PgLedgerRepository::new(pool.clone());
    let entries = ledger.history(account_id, 10).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, LedgerKind::Refund);
    assert_eq!(entries[0].amount, dec!(20000));

    assert_ledger_consistent(&pool, account_id, dec!(50000)).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn withdrawal_approval_leaves_balance_unchanged() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "seller", dec!(50000)).await;

    let service = settlement(&pool, true);
    let withdrawal = service
        .request_withdrawal(account_id, dec!(20000), "BCA", "1234567890", "Test Buyer", None)
        .await
        .unwrap();

    let reconciliation = ReconciliationService::new(pool.clone());
    reconciliation
        .approve_withdrawal(withdrawal.id, Some(1))
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, account_id).await, dec!(30000));

    // approving again must be rejected
    let again = reconciliation.approve_withdrawal(withdrawal.id, Some(1)).await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed(_))));
}

#[tokio::test]
#[ignore] // Requires database
async fn topup_lifecycle() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(0)).await;

    let service = settlement(&pool, true);
    let topup = service
        .request_topup(account_id, dec!(100000), Some("Transfer ref 123"))
        .await
        .unwrap();

    // no credit until approved
    assert_eq!(balance_of(&pool, account_id).await, dec!(0));

    let reconciliation = ReconciliationService::new(pool.clone());
    reconciliation.approve_topup(topup.id).await.unwrap();
    assert_eq!(balance_of(&pool, account_id).await, dec!(100000));

    let again = reconciliation.approve_topup(topup.id).await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed(_))));
    assert_eq!(balance_of(&pool, account_id).await, dec!(100000));

    assert_ledger_consistent(&pool, account_id, dec!(0)).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn manual_topup_credits_immediately() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(5000)).await;

    let service = settlement(&pool, true);
    service
        .add_manual_topup(account_id, dec!(25000), Some("Cash deposit"))
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, account_id).await, dec!(30000));
}

#[tokio::test]
#[ignore] // Requires database
async fn adjustment_requires_covering_balance() {
    let pool = test_pool().await;
    let account_id = seed_account(&pool, "user", dec!(10000)).await;

    let reconciliation = ReconciliationService::new(pool.clone());

    let too_big = reconciliation
        .adjust_balance(account_id, dec!(20000), "correction")
        .await;
    assert!(matches!(too_big, Err(AppError::InsufficientFunds { .. })));

    let balance = reconciliation
        .adjust_balance(account_id, dec!(4000), "correction")
        .await
        .unwrap();
    assert_eq!(balance, dec!(6000));

    let negative = reconciliation.adjust_balance(account_id, dec!(-1), "nope").await;
    assert!(matches!(negative, Err(AppError::InvalidAmount(_))));
}
