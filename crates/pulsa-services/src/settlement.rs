//! Settlement orchestration
//!
//! Drives the money-moving flows: package purchases, topup requests, and
//! withdrawal requests. Every balance change goes through the ledger store
//! inside a database transaction, so a transaction row and its ledger entry
//! always settle together. External delivery and operator notification stay
//! outside those transactions.

use crate::pricing;
use pulsa_core::{
    models::{
        Account, FulfillmentCategory, LedgerKind, Package, Topup, TopupOrigin, TopupStatus,
        Transaction, TransactionStatus, Withdrawal, WithdrawalStatus,
    },
    money,
    traits::{
        DeliveryRequest, FulfillmentGateway, ManualOrderAlert, OperatorNotifier, Repository,
    },
    AppError, AppResult,
};
use pulsa_db::{
    repositories::{PgAccountRepository, PgPackageRepository, PgTopupRepository},
    LedgerStore,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Result of a purchase attempt
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    /// Identifier of the recorded transaction
    pub transaction_id: i32,
    /// Final status after settlement
    pub status: TransactionStatus,
    /// Price charged (or to be charged, for pending manual orders)
    pub amount: Decimal,
    /// Raw provider response for automatic deliveries
    pub gateway_response: Option<Value>,
}

/// Orchestrates purchases, topups and withdrawals
pub struct SettlementService {
    pool: PgPool,
    accounts: PgAccountRepository,
    packages: PgPackageRepository,
    topups: PgTopupRepository,
    gateway: Arc<dyn FulfillmentGateway>,
    notifier: Arc<dyn OperatorNotifier>,
}

impl SettlementService {
    /// Create a new settlement service
    pub fn new(
        pool: PgPool,
        gateway: Arc<dyn FulfillmentGateway>,
        notifier: Arc<dyn OperatorNotifier>,
    ) -> Self {
        Self {
            accounts: PgAccountRepository::new(pool.clone()),
            packages: PgPackageRepository::new(pool.clone()),
            topups: PgTopupRepository::new(pool.clone()),
            pool,
            gateway,
            notifier,
        }
    }

    /// Purchase a package for an account
    ///
    /// Manual packages settle as pending transactions with no debit; the
    /// operator alert goes out after commit. Automatic packages are
    /// delivered through the gateway first and debited only on confirmed
    /// delivery, in the same database transaction that completes the
    /// transaction row.
    #[instrument(skip(self))]
    pub async fn purchase(
        &self,
        account_id: i32,
        package_id: i32,
        destination: &str,
    ) -> AppResult<PurchaseOutcome> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

        let package = self
            .packages
            .find_by_id(package_id)
            .await?
            .ok_or_else(|| AppError::PackageNotFound(package_id.to_string()))?;

        if !package.is_available_for(account.tier) {
            return Err(AppError::InvalidInput(format!(
                "Package {} is not available for this account",
                package.name
            )));
        }

        let price = pricing::price_for_tier(&package, account.tier);
        if destination.trim().is_empty() {
            return Err(AppError::Validation("Destination number is required".to_string()));
        }
        let destination = Account::normalize_msisdn(destination);

        // Fast-fail before touching the gateway; the authoritative check
        // happens again under the row lock when the debit applies.
        if !money::covers(account.balance, price)? {
            warn!(
                "Insufficient balance for account {}: required {}, available {}",
                account_id, price, account.balance
            );
            return Err(AppError::InsufficientFunds {
                required: price.to_string(),
                available: account.balance.to_string(),
            });
        }

        let transaction = self
            .insert_transaction(account_id, package_id, &destination, price)
            .await?;

        info!(
            "Recorded transaction {} for account {}: {} ({})",
            transaction.id, account_id, package.name, package.category
        );

        match package.category {
            FulfillmentCategory::Manual => {
                self.spawn_operator_alert(&account, &package, &transaction, price);
                Ok(PurchaseOutcome {
                    transaction_id: transaction.id,
                    status: TransactionStatus::Pending,
                    amount: price,
                    gateway_response: None,
                })
            }
            FulfillmentCategory::Automatic => {
                self.settle_automatic(&account, &package, &transaction, price)
                    .await
            }
        }
    }

    /// Submit a pending topup request for reconciliation
    ///
    /// No balance effect until an admin approves the request.
    #[instrument(skip(self))]
    pub async fn request_topup(
        &self,
        account_id: i32,
        amount: Decimal,
        description: Option<&str>,
    ) -> AppResult<Topup> {
        let amount = money::require_positive(amount)?;

        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

        self.topups
            .create(account_id, amount, TopupOrigin::Payment, description)
            .await
    }

    /// Credit an account directly, recording an already-approved topup
    ///
    /// Admin path: the credit and the topup row settle in one transaction.
    #[instrument(skip(self))]
    pub async fn add_manual_topup(
        &self,
        account_id: i32,
        amount: Decimal,
        description: Option<&str>,
    ) -> AppResult<Topup> {
        let amount = money::require_positive(amount)?;
        let description_text = description.unwrap_or("Manual topup");

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        LedgerStore::apply_delta_in(&mut tx, account_id, amount, LedgerKind::Topup, description_text)
            .await?;

        let topup = sqlx::query_as::<sqlx::Postgres, TopupInsertRow>(
            r#"
            INSERT INTO topups (account_id, amount, origin, description, status)
            VALUES ($1, $2, 'manual', $3, 'approved')
            RETURNING id, account_id, amount, origin, description, status, created_at
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(description_text)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to record manual topup: {}", e);
            AppError::Database(format!("Failed to record topup: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Manual topup of {} credited to account {}", amount, account_id);

        Ok(topup.into())
    }

    /// Request a withdrawal of store balance to a bank account
    ///
    /// The debit is eager: funds leave the balance at request time, recorded
    /// with the balance before and after. Rejection later refunds them.
    #[instrument(skip(self))]
    pub async fn request_withdrawal(
        &self,
        account_id: i32,
        amount: Decimal,
        bank_name: &str,
        account_number: &str,
        account_name: &str,
        notes: Option<&str>,
    ) -> AppResult<Withdrawal> {
        let amount = money::require_positive(amount)?;

        if bank_name.trim().is_empty() || account_number.trim().is_empty() {
            return Err(AppError::Validation(
                "Bank name and account number are required".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let entry = LedgerStore::apply_delta_in(
            &mut tx,
            account_id,
            -amount,
            LedgerKind::Withdrawal,
            &format!("Withdrawal to {} {}", bank_name, account_number),
        )
        .await?;

        let withdrawal = sqlx::query_as::<sqlx::Postgres, WithdrawalInsertRow>(
            r#"
            INSERT INTO withdrawals (
                account_id, amount, balance_before, balance_after,
                bank_name, account_number, account_name, notes, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING
                id, account_id, amount, balance_before, balance_after,
                bank_name, account_number, account_name, notes,
                approved_by, approved_at, status, created_at
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(entry.balance_before)
        .bind(entry.balance_after)
        .bind(bank_name)
        .bind(account_number)
        .bind(account_name)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to record withdrawal: {}", e);
            AppError::Database(format!("Failed to record withdrawal: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Withdrawal {} of {} recorded for account {}",
            withdrawal.id, amount, account_id
        );

        Ok(withdrawal.into())
    }

    /// Settle an automatic purchase through the fulfillment gateway
    async fn settle_automatic(
        &self,
        account: &Account,
        package: &Package,
        transaction: &Transaction,
        price: Decimal,
    ) -> AppResult<PurchaseOutcome> {
        let package_reference = package
            .gateway_ref
            .clone()
            .unwrap_or_else(|| package.id.to_string());

        // A gateway Err is a failed delivery too; the transaction must not
        // stay pending where an admin could later approve and debit it.
        let outcome = match self
            .gateway
            .deliver(&DeliveryRequest {
                package_reference,
                destination: transaction.destination.clone(),
            })
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    "Delivery errored for transaction {}: {}",
                    transaction.id, e
                );
                self.mark_transaction(transaction.id, TransactionStatus::Failed)
                    .await?;
                return Err(e);
            }
        };

        if !outcome.success {
            warn!(
                "Delivery failed for transaction {}: {}",
                transaction.id, outcome.raw
            );
            self.mark_transaction(transaction.id, TransactionStatus::Failed)
                .await?;
            return Ok(PurchaseOutcome {
                transaction_id: transaction.id,
                status: TransactionStatus::Failed,
                amount: price,
                gateway_response: Some(outcome.raw),
            });
        }

        // Debit and completion settle together; a concurrent spender can
        // still win the race, in which case the transaction fails instead.
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let debit = LedgerStore::apply_delta_in(
            &mut tx,
            account.id,
            -price,
            LedgerKind::Purchase,
            &format!("Purchase: {} for {}", package.name, transaction.destination),
        )
        .await;

        if let Err(e) = debit {
            drop(tx);
            warn!(
                "Debit failed after delivery for transaction {}: {}",
                transaction.id, e
            );
            self.mark_transaction(transaction.id, TransactionStatus::Failed)
                .await?;
            return Err(e);
        }

        sqlx::query("UPDATE transactions SET status = 'completed' WHERE id = $1 AND status = 'pending'")
            .bind(transaction.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to complete transaction {}: {}", transaction.id, e);
                AppError::Database(format!("Failed to complete transaction: {}", e))
            })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Transaction {} completed: {} debited from account {}",
            transaction.id, price, account.id
        );

        Ok(PurchaseOutcome {
            transaction_id: transaction.id,
            status: TransactionStatus::Completed,
            amount: price,
            gateway_response: Some(outcome.raw),
        })
    }

    /// Insert a pending transaction row
    async fn insert_transaction(
        &self,
        account_id: i32,
        package_id: i32,
        destination: &str,
        amount: Decimal,
    ) -> AppResult<Transaction> {
        let row = sqlx::query_as::<sqlx::Postgres, TransactionInsertRow>(
            r#"
            INSERT INTO transactions (account_id, package_id, destination, amount, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, account_id, package_id, destination, amount, status, created_at
            "#,
        )
        .bind(account_id)
        .bind(package_id)
        .bind(destination)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to insert transaction: {}", e);
            AppError::Database(format!("Failed to insert transaction: {}", e))
        })?;

        Ok(row.into())
    }

    /// Flip a transaction's status
    async fn mark_transaction(&self, id: i32, status: TransactionStatus) -> AppResult<()> {
        sqlx::query("UPDATE transactions SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to update transaction {}: {}", id, e);
                AppError::Database(format!("Failed to update transaction: {}", e))
            })?;

        Ok(())
    }

    /// Alert the operator about a manual order, off the request path
    fn spawn_operator_alert(
        &self,
        account: &Account,
        package: &Package,
        transaction: &Transaction,
        price: Decimal,
    ) {
        let notifier = Arc::clone(&self.notifier);
        let alert = ManualOrderAlert {
            transaction_id: transaction.id,
            account_id: account.id,
            customer_name: account.name.clone(),
            package_name: package.name.clone(),
            destination: transaction.destination.clone(),
            price,
        };

        tokio::spawn(async move {
            if let Err(e) = notifier.notify_manual_order(&alert).await {
                warn!(
                    "Operator alert for transaction {} failed: {}",
                    alert.transaction_id, e
                );
            }
        });
    }
}

/// Insert-returning row for transactions
#[derive(sqlx::FromRow)]
struct TransactionInsertRow {
    id: i32,
    account_id: i32,
    package_id: i32,
    destination: String,
    amount: Decimal,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TransactionInsertRow> for Transaction {
    fn from(row: TransactionInsertRow) -> Self {
        Transaction {
            id: row.id,
            account_id: row.account_id,
            package_id: row.package_id,
            destination: row.destination,
            amount: row.amount,
            status: TransactionStatus::from_str(&row.status).unwrap_or(TransactionStatus::Pending),
            created_at: row.created_at,
        }
    }
}

/// Insert-returning row for topups
#[derive(sqlx::FromRow)]
struct TopupInsertRow {
    id: i32,
    account_id: i32,
    amount: Decimal,
    origin: String,
    description: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TopupInsertRow> for Topup {
    fn from(row: TopupInsertRow) -> Self {
        Topup {
            id: row.id,
            account_id: row.account_id,
            amount: row.amount,
            origin: TopupOrigin::from_str(&row.origin).unwrap_or(TopupOrigin::Manual),
            description: row.description,
            status: TopupStatus::from_str(&row.status).unwrap_or(TopupStatus::Pending),
            created_at: row.created_at,
        }
    }
}

/// Insert-returning row for withdrawals
#[derive(sqlx::FromRow)]
struct WithdrawalInsertRow {
    id: i32,
    account_id: i32,
    amount: Decimal,
    balance_before: Decimal,
    balance_after: Decimal,
    bank_name: String,
    account_number: String,
    account_name: String,
    notes: Option<String>,
    approved_by: Option<i32>,
    approved_at: Option<chrono::DateTime<chrono::Utc>>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<WithdrawalInsertRow> for Withdrawal {
    fn from(row: WithdrawalInsertRow) -> Self {
        Withdrawal {
            id: row.id,
            account_id: row.account_id,
            amount: row.amount,
            balance_before: row.balance_before,
            balance_after: row.balance_after,
            bank_name: row.bank_name,
            account_number: row.account_number,
            account_name: row.account_name,
            notes: row.notes,
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            status: WithdrawalStatus::from_str(&row.status).unwrap_or(WithdrawalStatus::Pending),
            created_at: row.created_at,
        }
    }
}
