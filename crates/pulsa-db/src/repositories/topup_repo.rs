//! Topup request repository implementation
//!
//! Topup requests are created here in pending state with no balance effect;
//! the credit happens only when reconciliation approves the request.

use pulsa_core::{
    models::{Topup, TopupOrigin, TopupStatus},
    traits::Repository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of the topup repository
pub struct PgTopupRepository {
    pool: PgPool,
}

impl PgTopupRepository {
    /// Create a new topup repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending topup request
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        account_id: i32,
        amount: Decimal,
        origin: TopupOrigin,
        description: Option<&str>,
    ) -> AppResult<Topup> {
        debug!("Creating pending topup of {} for account {}", amount, account_id);

        let row = sqlx::query_as::<sqlx::Postgres, TopupRow>(
            r#"
            INSERT INTO topups (account_id, amount, origin, description, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, account_id, amount, origin, description, status, created_at
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(origin.to_string())
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating topup: {}", e);
            AppError::Database(format!("Failed to create topup: {}", e))
        })?;

        Ok(row.into())
    }

    /// List topups, optionally filtered by status, newest first
    #[instrument(skip(self))]
    pub async fn list_filtered(
        &self,
        status: Option<TopupStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Topup>, i64)> {
        let status_str = status.map(|s| s.to_string());

        let rows = sqlx::query_as::<sqlx::Postgres, TopupRow>(
            r#"
            SELECT id, account_id, amount, origin, description, status, created_at
            FROM topups
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
            error!("Database error listing topups: {}", e);
            AppError::Database(format!("Failed to fetch topups: {}", e))
        })?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM topups WHERE ($1::text IS NULL OR status = $1)")
                .bind(&status_str)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting topups: {}", e);
                    AppError::Database(format!("Failed to count topups: {}", e))
                })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

#[async_trait]
impl Repository<Topup, i32> for PgTopupRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Topup>> {
        let result = sqlx::query_as::<sqlx::Postgres, TopupRow>(
            r#"
            SELECT id, account_id, amount, origin, description, status, created_at
            FROM topups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding topup {}: {}", id, e);
            AppError::Database(format!("Failed to find topup: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Topup>> {
        let (rows, _) = self.list_filtered(None, limit, offset).await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topups")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting topups: {}", e);
                AppError::Database(format!("Failed to count topups: {}", e))
            })?;

        Ok(result.0)
    }
}

/// Database row for topups
#[derive(sqlx::FromRow)]
struct TopupRow {
    id: i32,
    account_id: i32,
    amount: Decimal,
    origin: String,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<TopupRow> for Topup {
    fn from(row: TopupRow) -> Self {
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
