//! Ledger read access
//!
//! Queries over `balance_history`. All writes to that table happen in the
//! ledger store.

use pulsa_core::{
    models::{LedgerEntry, LedgerKind},
    traits::LedgerReader,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// Aggregate totals over an account's ledger history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    /// Sum of all credits from approved topups
    pub total_topup: Decimal,
    /// Sum of all purchase debits (positive number)
    pub total_purchase: Decimal,
    /// Sum of all withdrawal debits (positive number)
    pub total_withdrawal: Decimal,
}

/// PostgreSQL implementation of LedgerReader
pub struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    /// Create a new ledger repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Aggregate per-kind totals for an account
    #[instrument(skip(self))]
    pub async fn stats(&self, account_id: i32) -> AppResult<HistoryStats> {
        let row: (Decimal, Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind = 'topup'), 0),
                COALESCE(SUM(-amount) FILTER (WHERE kind = 'purchase'), 0),
                COALESCE(SUM(-amount) FILTER (WHERE kind = 'withdrawal'), 0)
            FROM balance_history
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error computing ledger stats: {}", e);
            AppError::Database(format!("Failed to compute ledger stats: {}", e))
        })?;

        Ok(HistoryStats {
            total_topup: row.0,
            total_purchase: row.1,
            total_withdrawal: row.2,
        })
    }
}

#[async_trait]
impl LedgerReader for PgLedgerRepository {
    #[instrument(skip(self))]
    async fn history(&self, account_id: i32, limit: i64) -> AppResult<Vec<LedgerEntry>> {
        debug!("Fetching ledger history for account {}", account_id);

        let rows = sqlx::query_as::<sqlx::Postgres, LedgerRow>(
            r#"
            SELECT id, account_id, amount, kind, description,
                   balance_before, balance_after, created_at
            FROM balance_history
            WHERE account_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching ledger history: {}", e);
            AppError::Database(format!("Failed to fetch ledger history: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn sum_for_account(&self, account_id: i32) -> AppResult<Decimal> {
        let result: (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM balance_history WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error summing ledger entries: {}", e);
            AppError::Database(format!("Failed to sum ledger entries: {}", e))
        })?;

        Ok(result.0)
    }
}

/// Database row for ledger entries
#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: i64,
    account_id: i32,
    amount: Decimal,
    kind: String,
    description: String,
    balance_before: Decimal,
    balance_after: Decimal,
    created_at: DateTime<Utc>,
}

impl From<LedgerRow> for LedgerEntry {
    fn from(row: LedgerRow) -> Self {
        LedgerEntry {
            id: row.id,
            account_id: row.account_id,
            amount: row.amount,
            kind: LedgerKind::from_str(&row.kind).unwrap_or(LedgerKind::Adjustment),
            description: row.description,
            balance_before: row.balance_before,
            balance_after: row.balance_after,
            created_at: row.created_at,
        }
    }
}
