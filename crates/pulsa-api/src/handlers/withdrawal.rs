//! Withdrawal request handlers

use crate::dto::{ApiResponse, WithdrawalCreateRequest};
use actix_web::{web, HttpResponse};
use pulsa_core::AppError;
use pulsa_services::SettlementService;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Request a withdrawal; the debit applies immediately
///
/// POST /api/v1/withdrawals
#[instrument(skip(settlement, req))]
pub async fn create_withdrawal(
    settlement: web::Data<SettlementService>,
    req: web::Json<WithdrawalCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Withdrawal validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(account_id = req.account_id, "Withdrawal requested");

    let withdrawal = settlement
        .request_withdrawal(
            req.account_id,
            req.amount,
            &req.bank_name,
            &req.account_number,
            &req.account_name,
            req.notes.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        withdrawal,
        "Withdrawal request submitted for approval",
    )))
}

/// Configure withdrawal routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/withdrawals").route("", web::post().to(create_withdrawal)));
}
