//! Ledger store: the single write path for account balances
//!
//! Every balance mutation goes through [`LedgerStore::apply_delta`] (or
//! [`LedgerStore::apply_delta_in`] when the caller composes the mutation into
//! a larger transaction). The account row is locked with `SELECT ... FOR
//! UPDATE`, the sufficiency check for debits is done on integer minor units,
//! and a `balance_history` entry recording the balance before and after is
//! written in the same transaction as the balance update itself.

use pulsa_core::models::{LedgerEntry, LedgerKind};
use pulsa_core::{money, AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, instrument};

/// PostgreSQL-backed ledger store
#[derive(Clone)]
pub struct LedgerStore {
    pool: PgPool,
}

impl LedgerStore {
    /// Create a new ledger store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply a signed balance delta in its own transaction
    ///
    /// Positive deltas credit the account, negative deltas debit it. Debits
    /// that the balance does not cover fail with
    /// [`AppError::InsufficientFunds`] and leave the account untouched.
    #[instrument(skip(self))]
    pub async fn apply_delta(
        &self,
        account_id: i32,
        amount: Decimal,
        kind: LedgerKind,
        description: &str,
    ) -> AppResult<LedgerEntry> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin ledger transaction: {}", e);
            AppError::Transaction(format!("Failed to begin transaction: {}", e))
        })?;

        let entry = Self::apply_delta_in(&mut tx, account_id, amount, kind, description).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit ledger transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(entry)
    }

    /// Apply a signed balance delta inside an existing transaction
    ///
    /// The account row stays locked until the caller commits or rolls back,
    /// so any other rows the caller writes settle atomically with the
    /// balance change.
    pub async fn apply_delta_in(
        tx: &mut Transaction<'_, Postgres>,
        account_id: i32,
        amount: Decimal,
        kind: LedgerKind,
        description: &str,
    ) -> AppResult<LedgerEntry> {
        debug!(
            "Applying ledger delta {} ({}) to account {}",
            amount, kind, account_id
        );

        // Lock the account row for the duration of the transaction
        let row: Option<(Decimal,)> =
            sqlx::query_as("SELECT balance FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(account_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| {
                    error!("Database error locking account {}: {}", account_id, e);
                    AppError::Database(format!("Failed to lock account: {}", e))
                })?;

        let balance_before = match row {
            Some((balance,)) => balance,
            None => return Err(AppError::AccountNotFound(account_id.to_string())),
        };

        if amount < Decimal::ZERO && !money::covers(balance_before, -amount)? {
            return Err(AppError::InsufficientFunds {
                required: (-amount).to_string(),
                available: balance_before.to_string(),
            });
        }

        let balance_after = balance_before + amount;

        sqlx::query("UPDATE accounts SET balance = $2, updated_at = NOW() WHERE id = $1")
            .bind(account_id)
            .bind(balance_after)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                error!("Database error updating balance for {}: {}", account_id, e);
                AppError::Database(format!("Failed to update balance: {}", e))
            })?;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO balance_history (
                account_id, amount, kind, description, balance_before, balance_after
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(kind.to_string())
        .bind(description)
        .bind(balance_before)
        .bind(balance_after)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            error!("Database error writing ledger entry: {}", e);
            AppError::Database(format!("Failed to write ledger entry: {}", e))
        })?;

        Ok(LedgerEntry {
            id,
            account_id,
            amount,
            kind,
            description: description.to_string(),
            balance_before,
            balance_after,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn test_pool() -> PgPool {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/pulsa_store".to_string());
        crate::create_pool(&database_url, Some(5)).await.unwrap()
    }

    async fn seed_account(pool: &PgPool, balance: Decimal) -> i32 {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO accounts (name, email, tier, balance) VALUES ($1, $2, 'user', $3) RETURNING id",
        )
        .bind("Ledger Test")
        .bind(format!("ledger-{}@test.local", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)))
        .bind(balance)
        .fetch_one(pool)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_credit_then_debit() {
        let pool = test_pool().await;
        let store = LedgerStore::new(pool.clone());
        let account_id = seed_account(&pool, dec!(0)).await;

        let credit = store
            .apply_delta(account_id, dec!(100000), LedgerKind::Topup, "Test topup")
            .await
            .unwrap();
        assert_eq!(credit.balance_before, dec!(0));
        assert_eq!(credit.balance_after, dec!(100000));

        let debit = store
            .apply_delta(account_id, dec!(-30000), LedgerKind::Purchase, "Test purchase")
            .await
            .unwrap();
        assert_eq!(debit.balance_before, dec!(100000));
        assert_eq!(debit.balance_after, dec!(70000));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_insufficient_funds_leaves_balance_untouched() {
        let pool = test_pool().await;
        let store = LedgerStore::new(pool.clone());
        let account_id = seed_account(&pool, dec!(100000)).await;

        let result = store
            .apply_delta(account_id, dec!(-150000), LedgerKind::Purchase, "Too big")
            .await;
        assert!(matches!(result, Err(AppError::InsufficientFunds { .. })));

        let (balance,): (Decimal,) = sqlx::query_as("SELECT balance FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(balance, dec!(100000));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_unknown_account() {
        let pool = test_pool().await;
        let store = LedgerStore::new(pool);

        let result = store
            .apply_delta(-1, dec!(1000), LedgerKind::Topup, "Nope")
            .await;
        assert!(matches!(result, Err(AppError::AccountNotFound(_))));
    }
}
