//! Admin reconciliation handlers
//!
//! Listing of pending work plus the approve/reject endpoints that resolve
//! it. Double resolutions come back as 409 rather than silently succeeding.

use crate::dto::{
    AdjustBalanceRequest, ApiResponse, ManualTopupRequest, PaginationParams, StatusFilterParams,
    WithdrawalDecisionRequest,
};
use actix_web::{web, HttpResponse};
use pulsa_core::models::{TopupStatus, TransactionStatus, WithdrawalStatus};
use pulsa_core::AppError;
use pulsa_db::{PgTopupRepository, PgTransactionRepository, PgWithdrawalRepository};
use pulsa_services::{ReconciliationService, SettlementService};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use validator::Validate;

/// List transactions, optionally filtered by status
///
/// GET /api/v1/admin/transactions
#[instrument(skip(pool))]
pub async fn list_transactions(
    pool: web::Data<PgPool>,
    filters: web::Query<StatusFilterParams>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let status = filters
        .status
        .as_deref()
        .map(|s| {
            TransactionStatus::from_str(s)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown status: {}", s)))
        })
        .transpose()?;

    let repo = PgTransactionRepository::new(pool.get_ref().clone());
    let (items, total) = repo.list_filtered(status, query.limit(), query.offset()).await?;

    Ok(HttpResponse::Ok().json(query.paginate(items, total)))
}

/// List topups, optionally filtered by status
///
/// GET /api/v1/admin/topups
#[instrument(skip(pool))]
pub async fn list_topups(
    pool: web::Data<PgPool>,
    filters: web::Query<StatusFilterParams>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let status = filters
        .status
        .as_deref()
        .map(|s| {
            TopupStatus::from_str(s)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown status: {}", s)))
        })
        .transpose()?;

    let repo = PgTopupRepository::new(pool.get_ref().clone());
    let (items, total) = repo.list_filtered(status, query.limit(), query.offset()).await?;

    Ok(HttpResponse::Ok().json(query.paginate(items, total)))
}

/// List withdrawals, optionally filtered by status
///
/// GET /api/v1/admin/withdrawals
#[instrument(skip(pool))]
pub async fn list_withdrawals(
    pool: web::Data<PgPool>,
    filters: web::Query<StatusFilterParams>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let status = filters
        .status
        .as_deref()
        .map(|s| {
            WithdrawalStatus::from_str(s)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown status: {}", s)))
        })
        .transpose()?;

    let repo = PgWithdrawalRepository::new(pool.get_ref().clone());
    let (items, total) = repo.list_filtered(status, query.limit(), query.offset()).await?;

    Ok(HttpResponse::Ok().json(query.paginate(items, total)))
}

/// Approve a pending manual purchase
///
/// POST /api/v1/admin/transactions/{id}/approve
#[instrument(skip(reconciliation))]
pub async fn approve_transaction(
    reconciliation: web::Data<ReconciliationService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = reconciliation.approve_transaction(id).await?;

    info!(transaction_id = id, "Transaction approved");

    Ok(HttpResponse::Ok().json(json!({ "id": id, "status": status })))
}

/// Reject a pending manual purchase
///
/// POST /api/v1/admin/transactions/{id}/reject
#[instrument(skip(reconciliation))]
pub async fn reject_transaction(
    reconciliation: web::Data<ReconciliationService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = reconciliation.reject_transaction(id).await?;

    info!(transaction_id = id, "Transaction rejected");

    Ok(HttpResponse::Ok().json(json!({ "id": id, "status": status })))
}

/// Credit an account directly
///
/// POST /api/v1/admin/topups
#[instrument(skip(settlement, req))]
pub async fn create_manual_topup(
    settlement: web::Data<SettlementService>,
    req: web::Json<ManualTopupRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Manual topup validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let topup = settlement
        .add_manual_topup(req.account_id, req.amount, req.description.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(topup)))
}

/// Approve a pending topup
///
/// POST /api/v1/admin/topups/{id}/approve
#[instrument(skip(reconciliation))]
pub async fn approve_topup(
    reconciliation: web::Data<ReconciliationService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = reconciliation.approve_topup(id).await?;

    info!(topup_id = id, "Topup approved");

    Ok(HttpResponse::Ok().json(json!({ "id": id, "status": status })))
}

/// Reject a pending topup
///
/// POST /api/v1/admin/topups/{id}/reject
#[instrument(skip(reconciliation))]
pub async fn reject_topup(
    reconciliation: web::Data<ReconciliationService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = reconciliation.reject_topup(id).await?;

    info!(topup_id = id, "Topup rejected");

    Ok(HttpResponse::Ok().json(json!({ "id": id, "status": status })))
}

/// Approve a pending withdrawal
///
/// POST /api/v1/admin/withdrawals/{id}/approve
#[instrument(skip(reconciliation, req))]
pub async fn approve_withdrawal(
    reconciliation: web::Data<ReconciliationService>,
    path: web::Path<i32>,
    req: Option<web::Json<WithdrawalDecisionRequest>>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let approved_by = req.map(|r| r.approved_by).unwrap_or(None);
    let status = reconciliation.approve_withdrawal(id, approved_by).await?;

    info!(withdrawal_id = id, "Withdrawal approved");

    Ok(HttpResponse::Ok().json(json!({ "id": id, "status": status })))
}

/// Reject a pending withdrawal, refunding the debit
///
/// POST /api/v1/admin/withdrawals/{id}/reject
#[instrument(skip(reconciliation, req))]
pub async fn reject_withdrawal(
    reconciliation: web::Data<ReconciliationService>,
    path: web::Path<i32>,
    req: Option<web::Json<WithdrawalDecisionRequest>>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let approved_by = req.map(|r| r.approved_by).unwrap_or(None);
    let status = reconciliation.reject_withdrawal(id, approved_by).await?;

    info!(withdrawal_id = id, "Withdrawal rejected");

    Ok(HttpResponse::Ok().json(json!({ "id": id, "status": status })))
}

/// Deduct from an account's balance
///
/// POST /api/v1/admin/accounts/{id}/adjust
#[instrument(skip(reconciliation, req))]
pub async fn adjust_balance(
    reconciliation: web::Data<ReconciliationService>,
    path: web::Path<i32>,
    req: web::Json<AdjustBalanceRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Adjustment validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let account_id = path.into_inner();
    let balance = reconciliation
        .adjust_balance(account_id, req.amount, &req.reason)
        .await?;

    info!(account_id, amount = %req.amount, "Balance adjusted");

    Ok(HttpResponse::Ok().json(json!({ "account_id": account_id, "balance": balance })))
}

/// Configure admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/transactions", web::get().to(list_transactions))
            .route("/transactions/{id}/approve", web::post().to(approve_transaction))
            .route("/transactions/{id}/reject", web::post().to(reject_transaction))
            .route("/topups", web::get().to(list_topups))
            .route("/topups", web::post().to(create_manual_topup))
            .route("/topups/{id}/approve", web::post().to(approve_topup))
            .route("/topups/{id}/reject", web::post().to(reject_topup))
            .route("/withdrawals", web::get().to(list_withdrawals))
            .route("/withdrawals/{id}/approve", web::post().to(approve_withdrawal))
            .route("/withdrawals/{id}/reject", web::post().to(reject_withdrawal))
            .route("/accounts/{id}/adjust", web::post().to(adjust_balance)),
    );
}
