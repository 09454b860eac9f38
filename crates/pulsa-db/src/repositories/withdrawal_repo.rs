//! Withdrawal request repository implementation
//!
//! Reads only. Withdrawal rows are inserted by the settlement service in the
//! same database transaction as the eager debit, so the stored
//! balance_before/balance_after always match the ledger entry.

use pulsa_core::{
    models::{Withdrawal, WithdrawalStatus},
    traits::Repository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of the withdrawal read side
pub struct PgWithdrawalRepository {
    pool: PgPool,
}

impl PgWithdrawalRepository {
    /// Create a new withdrawal repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List withdrawals, optionally filtered by status, newest first
    #[instrument(skip(self))]
    pub async fn list_filtered(
        &self,
        status: Option<WithdrawalStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Withdrawal>, i64)> {
        debug!("Listing withdrawals with status={:?}", status);

        let status_str = status.map(|s| s.to_string());

        let rows = sqlx::query_as::<sqlx::Postgres, WithdrawalRow>(
            r#"
            SELECT
                id, account_id, amount, balance_before, balance_after,
                bank_name, account_number, account_name, notes,
                approved_by, approved_at, status, created_at
            FROM withdrawals
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&status_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing withdrawals: {}", e);
            AppError::Database(format!("Failed to fetch withdrawals: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM withdrawals WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(&status_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting withdrawals: {}", e);
            AppError::Database(format!("Failed to count withdrawals: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    /// List an account's own withdrawals, newest first
    #[instrument(skip(self))]
    pub async fn find_by_account(
        &self,
        account_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Withdrawal>> {
        let rows = sqlx::query_as::<sqlx::Postgres, WithdrawalRow>(
            r#"
            SELECT
                id, account_id, amount, balance_before, balance_after,
                bank_name, account_number, account_name, notes,
                approved_by, approved_at, status, created_at
            FROM withdrawals
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error fetching withdrawals for account {}: {}",
                account_id, e
            );
            AppError::Database(format!("Failed to fetch withdrawals: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl Repository<Withdrawal, i32> for PgWithdrawalRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Withdrawal>> {
        let result = sqlx::query_as::<sqlx::Postgres, WithdrawalRow>(
            r#"
            SELECT
                id, account_id, amount, balance_before, balance_after,
                bank_name, account_number, account_name, notes,
                approved_by, approved_at, status, created_at
            FROM withdrawals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding withdrawal {}: {}", id, e);
            AppError::Database(format!("Failed to find withdrawal: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Withdrawal>> {
        let (rows, _) = self.list_filtered(None, limit, offset).await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM withdrawals")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting withdrawals: {}", e);
                AppError::Database(format!("Failed to count withdrawals: {}", e))
            })?;

        Ok(result.0)
    }
}

/// Database row for withdrawals
#[derive(sqlx::FromRow)]
struct WithdrawalRow {
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
    approved_at: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<WithdrawalRow> for Withdrawal {
    fn from(row: WithdrawalRow) -> Self {
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
