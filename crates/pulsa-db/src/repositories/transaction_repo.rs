//! Purchase transaction repository implementation
//!
//! Reads only. Transactions are inserted by the settlement service inside
//! its own database transaction so the debit and the row settle together.

use pulsa_core::{
    models::{Transaction, TransactionStatus},
    traits::Repository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of the transaction read side
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    /// Create a new transaction repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List transactions, optionally filtered by status, newest first
    #[instrument(skip(self))]
    pub async fn list_filtered(
        &self,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Transaction>, i64)> {
        debug!("Listing transactions with status={:?}", status);

        let status_str = status.map(|s| s.to_string());

        let rows = sqlx::query_as::<sqlx::Postgres, TransactionRow>(
            r#"
            SELECT id, account_id, package_id, destination, amount, status, created_at
            FROM transactions
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
            error!("Database error listing transactions: {}", e);
            AppError::Database(format!("Failed to fetch transactions: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transactions WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(&status_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting transactions: {}", e);
            AppError::Database(format!("Failed to count transactions: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    /// List an account's own transactions, newest first
    #[instrument(skip(self))]
    pub async fn find_by_account(
        &self,
        account_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<sqlx::Postgres, TransactionRow>(
            r#"
            SELECT id, account_id, package_id, destination, amount, status, created_at
            FROM transactions
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
                "Database error fetching transactions for account {}: {}",
                account_id, e
            );
            AppError::Database(format!("Failed to fetch transactions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl Repository<Transaction, i32> for PgTransactionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Transaction>> {
        let result = sqlx::query_as::<sqlx::Postgres, TransactionRow>(
            r#"
            SELECT id, account_id, package_id, destination, amount, status, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding transaction {}: {}", id, e);
            AppError::Database(format!("Failed to find transaction: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Transaction>> {
        let (rows, _) = self.list_filtered(None, limit, offset).await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting transactions: {}", e);
                AppError::Database(format!("Failed to count transactions: {}", e))
            })?;

        Ok(result.0)
    }
}

/// Database row for transactions
#[derive(sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub id: i32,
    pub account_id: i32,
    pub package_id: i32,
    pub destination: String,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
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
