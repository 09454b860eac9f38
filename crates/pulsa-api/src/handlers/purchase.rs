//! Purchase handlers

use crate::dto::{ApiResponse, PurchaseRequest};
use actix_web::{web, HttpResponse};
use pulsa_core::AppError;
use pulsa_services::SettlementService;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Purchase a package
///
/// POST /api/v1/purchase
#[instrument(skip(settlement, req))]
pub async fn purchase(
    settlement: web::Data<SettlementService>,
    req: web::Json<PurchaseRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Purchase validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(
        account_id = req.account_id,
        package_id = req.package_id,
        "Purchase requested"
    );

    let outcome = settlement
        .purchase(req.account_id, req.package_id, &req.destination)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

/// Configure purchase routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/purchase", web::post().to(purchase));
}
