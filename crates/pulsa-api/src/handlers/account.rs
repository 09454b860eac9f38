//! Account balance and history handlers

use crate::dto::{ApiResponse, BalanceResponse, HistoryResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use pulsa_core::traits::{LedgerReader, Repository};
use pulsa_core::AppError;
use pulsa_db::{
    PgAccountRepository, PgLedgerRepository, PgTransactionRepository, PgWithdrawalRepository,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// History query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of entries to return
    pub limit: Option<i64>,
}

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

/// Get an account's current balance
///
/// GET /api/v1/accounts/{id}/balance
#[instrument(skip(pool))]
pub async fn get_balance(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let account_id = path.into_inner();

    let accounts = PgAccountRepository::new(pool.get_ref().clone());
    let account = accounts
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BalanceResponse::from(account))))
}

/// Get an account's ledger history with aggregate totals
///
/// GET /api/v1/accounts/{id}/history
#[instrument(skip(pool))]
pub async fn get_history(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    params: web::Query<HistoryParams>,
) -> Result<HttpResponse, AppError> {
    let account_id = path.into_inner();
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    debug!(account_id, limit, "Fetching ledger history");

    let accounts = PgAccountRepository::new(pool.get_ref().clone());
    accounts
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

    let ledger = PgLedgerRepository::new(pool.get_ref().clone());
    let entries = ledger.history(account_id, limit).await?;
    let stats = ledger.stats(account_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(HistoryResponse { entries, stats })))
}

/// List an account's purchase transactions
///
/// GET /api/v1/accounts/{id}/transactions
#[instrument(skip(pool))]
pub async fn list_transactions(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let account_id = path.into_inner();

    let repo = PgTransactionRepository::new(pool.get_ref().clone());
    let transactions = repo
        .find_by_account(account_id, query.limit(), query.offset())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(transactions)))
}

/// List an account's withdrawal requests
///
/// GET /api/v1/accounts/{id}/withdrawals
#[instrument(skip(pool))]
pub async fn list_withdrawals(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let account_id = path.into_inner();

    let repo = PgWithdrawalRepository::new(pool.get_ref().clone());
    let withdrawals = repo
        .find_by_account(account_id, query.limit(), query.offset())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(withdrawals)))
}

/// Configure account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .route("/{id}/balance", web::get().to(get_balance))
            .route("/{id}/history", web::get().to(get_history))
            .route("/{id}/transactions", web::get().to(list_transactions))
            .route("/{id}/withdrawals", web::get().to(list_withdrawals)),
    );
}
