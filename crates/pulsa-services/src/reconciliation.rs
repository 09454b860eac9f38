//! Administrative reconciliation
//!
//! Resolves pending entries into terminal states and applies (or reverses)
//! their balance effect:
//!
//! | entity      | approve                       | reject                    |
//! |-------------|-------------------------------|---------------------------|
//! | transaction | debit `purchase`              | none (never debited)      |
//! | topup       | credit `topup`                | none (never credited)     |
//! | withdrawal  | none (debited at creation)    | credit `refund`           |
//!
//! Each resolution locks the entity row, re-checks that it is still pending,
//! and commits the status flip together with any ledger entry. Resolving an
//! already-terminal entity fails with `AlreadyProcessed` so duplicate admin
//! clicks surface instead of silently double-applying.

use pulsa_core::{
    models::{LedgerKind, TopupStatus, TransactionStatus, WithdrawalStatus},
    money, AppError, AppResult,
};
use pulsa_db::LedgerStore;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction as DbTransaction};
use tracing::{error, info, instrument};

/// Resolves pending settlement entries and applies balance corrections
pub struct ReconciliationService {
    pool: PgPool,
    ledger: LedgerStore,
}

impl ReconciliationService {
    /// Create a new reconciliation service
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger: LedgerStore::new(pool.clone()),
            pool,
        }
    }

    /// Approve a pending manual purchase, debiting the buyer
    #[instrument(skip(self))]
    pub async fn approve_transaction(&self, transaction_id: i32) -> AppResult<TransactionStatus> {
        let mut tx = self.begin().await?;

        let (account_id, amount) = Self::lock_pending_transaction(&mut tx, transaction_id).await?;

        LedgerStore::apply_delta_in(
            &mut tx,
            account_id,
            -amount,
            LedgerKind::Purchase,
            &format!("Manual order #{} approved", transaction_id),
        )
        .await?;

        sqlx::query("UPDATE transactions SET status = 'completed' WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update transaction: {}", e)))?;

        self.commit(tx).await?;

        info!(
            "Transaction {} approved: {} debited from account {}",
            transaction_id, amount, account_id
        );

        Ok(TransactionStatus::Completed)
    }

    /// Reject a pending manual purchase; no ledger effect, it was never debited
    #[instrument(skip(self))]
    pub async fn reject_transaction(&self, transaction_id: i32) -> AppResult<TransactionStatus> {
        let mut tx = self.begin().await?;

        Self::lock_pending_transaction(&mut tx, transaction_id).await?;

        sqlx::query("UPDATE transactions SET status = 'failed' WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update transaction: {}", e)))?;

        self.commit(tx).await?;

        info!("Transaction {} rejected", transaction_id);

        Ok(TransactionStatus::Failed)
    }

    /// Approve a pending topup, crediting the account
    #[instrument(skip(self))]
    pub async fn approve_topup(&self, topup_id: i32) -> AppResult<TopupStatus> {
        let mut tx = self.begin().await?;

        let (account_id, amount) = Self::lock_pending_topup(&mut tx, topup_id).await?;

        LedgerStore::apply_delta_in(
            &mut tx,
            account_id,
            amount,
            LedgerKind::Topup,
            &format!("Topup #{} approved", topup_id),
        )
        .await?;

        sqlx::query("UPDATE topups SET status = 'approved' WHERE id = $1")
            .bind(topup_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update topup: {}", e)))?;

        self.commit(tx).await?;

        info!(
            "Topup {} approved: {} credited to account {}",
            topup_id, amount, account_id
        );

        Ok(TopupStatus::Approved)
    }

    /// Reject a pending topup; no ledger effect, it was never credited
    #[instrument(skip(self))]
    pub async fn reject_topup(&self, topup_id: i32) -> AppResult<TopupStatus> {
        let mut tx = self.begin().await?;

        Self::lock_pending_topup(&mut tx, topup_id).await?;

        sqlx::query("UPDATE topups SET status = 'rejected' WHERE id = $1")
            .bind(topup_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update topup: {}", e)))?;

        self.commit(tx).await?;

        info!("Topup {} rejected", topup_id);

        Ok(TopupStatus::Rejected)
    }

    /// Approve a pending withdrawal; funds already left at request time
    #[instrument(skip(self))]
    pub async fn approve_withdrawal(
        &self,
        withdrawal_id: i32,
        approved_by: Option<i32>,
    ) -> AppResult<WithdrawalStatus> {
        let mut tx = self.begin().await?;

        Self::lock_pending_withdrawal(&mut tx, withdrawal_id).await?;

        sqlx::query(
            r#"
            UPDATE withdrawals
            SET status = 'approved', approved_by = $2, approved_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(withdrawal_id)
        .bind(approved_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update withdrawal: {}", e)))?;

        self.commit(tx).await?;

        info!("Withdrawal {} approved", withdrawal_id);

        Ok(WithdrawalStatus::Approved)
    }

    /// Reject a pending withdrawal, refunding the eager debit
    #[instrument(skip(self))]
    pub async fn reject_withdrawal(
        &self,
        withdrawal_id: i32,
        approved_by: Option<i32>,
    ) -> AppResult<WithdrawalStatus> {
        let mut tx = self.begin().await?;

        let (account_id, amount) = Self::lock_pending_withdrawal(&mut tx, withdrawal_id).await?;

        LedgerStore::apply_delta_in(
            &mut tx,
            account_id,
            amount,
            LedgerKind::Refund,
            &format!("Withdrawal #{} rejected, funds returned", withdrawal_id),
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE withdrawals
            SET status = 'rejected', approved_by = $2, approved_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(withdrawal_id)
        .bind(approved_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update withdrawal: {}", e)))?;

        self.commit(tx).await?;

        info!(
            "Withdrawal {} rejected: {} refunded to account {}",
            withdrawal_id, amount, account_id
        );

        Ok(WithdrawalStatus::Rejected)
    }

    /// Deduct from an account's balance outside the request lifecycle
    ///
    /// Used for corrections. The amount is given as a positive number and
    /// applied as a debit.
    #[instrument(skip(self))]
    pub async fn adjust_balance(
        &self,
        account_id: i32,
        amount: Decimal,
        reason: &str,
    ) -> AppResult<Decimal> {
        let amount = money::require_positive(amount)?;

        let entry = self
            .ledger
            .apply_delta(
                account_id,
                -amount,
                LedgerKind::Adjustment,
                &format!("Admin deduction: {}", reason),
            )
            .await?;

        info!(
            "Adjusted account {} by -{}: balance {} -> {}",
            account_id, amount, entry.balance_before, entry.balance_after
        );

        Ok(entry.balance_after)
    }

    async fn begin(&self) -> AppResult<DbTransaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })
    }

    async fn commit(&self, tx: DbTransaction<'static, Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })
    }

    /// Lock a transaction row and verify it is still pending
    async fn lock_pending_transaction(
        tx: &mut DbTransaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<(i32, Decimal)> {
        let row: Option<(i32, Decimal, String)> = sqlx::query_as(
            "SELECT account_id, amount, status FROM transactions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to lock transaction: {}", e)))?;

        match row {
            None => Err(AppError::NotFound(format!("Transaction {} not found", id))),
            Some((_, _, status)) if status != "pending" => Err(AppError::AlreadyProcessed(
                format!("Transaction {} is already {}", id, status),
            )),
            Some((account_id, amount, _)) => Ok((account_id, amount)),
        }
    }

    /// Lock a topup row and verify it is still pending
    async fn lock_pending_topup(
        tx: &mut DbTransaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<(i32, Decimal)> {
        let row: Option<(i32, Decimal, String)> = sqlx::query_as(
            "SELECT account_id, amount, status FROM topups WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to lock topup: {}", e)))?;

        match row {
            None => Err(AppError::NotFound(format!("Topup {} not found", id))),
            Some((_, _, status)) if status != "pending" => Err(AppError::AlreadyProcessed(
                format!("Topup {} is already {}", id, status),
            )),
            Some((account_id, amount, _)) => Ok((account_id, amount)),
        }
    }

    /// Lock a withdrawal row and verify it is still pending
    async fn lock_pending_withdrawal(
        tx: &mut DbTransaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<(i32, Decimal)> {
        let row: Option<(i32, Decimal, String)> = sqlx::query_as(
            "SELECT account_id, amount, status FROM withdrawals WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to lock withdrawal: {}", e)))?;

        match row {
            None => Err(AppError::NotFound(format!("Withdrawal {} not found", id))),
            Some((_, _, status)) if status != "pending" => Err(AppError::AlreadyProcessed(
                format!("Withdrawal {} is already {}", id, status),
            )),
            Some((account_id, amount, _)) => Ok((account_id, amount)),
        }
    }
}
