//! Package catalog repository implementation
//!
//! Availability filtering happens in SQL: a package is listed for a tier
//! when it is active, the tier appears in `available_for`, and (for manually
//! fulfilled packages) stock is either untracked or positive.

use pulsa_core::{
    models::{AccountTier, FulfillmentCategory, Package, PackageStatus},
    traits::{PackageRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of PackageRepository
pub struct PgPackageRepository {
    pool: PgPool,
}

impl PgPackageRepository {
    /// Create a new package repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Package, i32> for PgPackageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Package>> {
        debug!("Finding package by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, PackageRow>(
            r#"
            SELECT
                id, name, description, price, price_user, price_seller, price_reseller,
                provider, kind, category, status, stock, available_for, gateway_ref,
                created_at
            FROM packages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding package {}: {}", id, e);
            AppError::Database(format!("Failed to find package: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Package>> {
        let rows = sqlx::query_as::<sqlx::Postgres, PackageRow>(
            r#"
            SELECT
                id, name, description, price, price_user, price_seller, price_reseller,
                provider, kind, category, status, stock, available_for, gateway_ref,
                created_at
            FROM packages
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding packages: {}", e);
            AppError::Database(format!("Failed to fetch packages: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM packages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting packages: {}", e);
                AppError::Database(format!("Failed to count packages: {}", e))
            })?;

        Ok(result.0)
    }
}

#[async_trait]
impl PackageRepository for PgPackageRepository {
    #[instrument(skip(self))]
    async fn list_available(
        &self,
        tier: AccountTier,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Package>, i64)> {
        debug!("Listing packages available for tier {}", tier);

        let tier_str = tier.to_string();

        let rows = sqlx::query_as::<sqlx::Postgres, PackageRow>(
            r#"
            SELECT
                id, name, description, price, price_user, price_seller, price_reseller,
                provider, kind, category, status, stock, available_for, gateway_ref,
                created_at
            FROM packages
            WHERE status = 'active'
              AND $1 = ANY(available_for)
              AND (category = 'automatic' OR stock IS NULL OR stock > 0)
            ORDER BY provider, price
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&tier_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing available packages: {}", e);
            AppError::Database(format!("Failed to fetch packages: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM packages
            WHERE status = 'active'
              AND $1 = ANY(available_for)
              AND (category = 'automatic' OR stock IS NULL OR stock > 0)
            "#,
        )
        .bind(&tier_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting available packages: {}", e);
            AppError::Database(format!("Failed to count packages: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Database row for packages
#[derive(sqlx::FromRow)]
struct PackageRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    price_user: Option<Decimal>,
    price_seller: Option<Decimal>,
    price_reseller: Option<Decimal>,
    provider: String,
    kind: String,
    category: String,
    status: String,
    stock: Option<i32>,
    available_for: Vec<String>,
    gateway_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PackageRow> for Package {
    fn from(row: PackageRow) -> Self {
        Package {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            price_user: row.price_user,
            price_seller: row.price_seller,
            price_reseller: row.price_reseller,
            provider: row.provider,
            kind: row.kind,
            category: FulfillmentCategory::from_str(&row.category)
                .unwrap_or(FulfillmentCategory::Manual),
            status: PackageStatus::from_str(&row.status).unwrap_or(PackageStatus::Inactive),
            stock: row.stock,
            available_for: row
                .available_for
                .iter()
                .filter_map(|t| AccountTier::from_str(t))
                .collect(),
            gateway_ref: row.gateway_ref,
            created_at: row.created_at,
        }
    }
}
