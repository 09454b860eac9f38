//! Topup request handlers

use crate::dto::{ApiResponse, TopupCreateRequest};
use actix_web::{web, HttpResponse};
use pulsa_core::AppError;
use pulsa_services::SettlementService;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Submit a topup request for admin approval
///
/// POST /api/v1/topups
#[instrument(skip(settlement, req))]
pub async fn create_topup(
    settlement: web::Data<SettlementService>,
    req: web::Json<TopupCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Topup validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(account_id = req.account_id, "Topup requested");

    let topup = settlement
        .request_topup(req.account_id, req.amount, req.description.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        topup,
        "Topup request submitted for approval",
    )))
}

/// Configure topup routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/topups").route("", web::post().to(create_topup)));
}
