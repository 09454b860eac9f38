//! Package catalog handlers

use crate::dto::PaginationParams;
use actix_web::{web, HttpResponse};
use pulsa_core::traits::{PackageRepository, Repository};
use pulsa_core::AppError;
use pulsa_db::{PgAccountRepository, PgPackageRepository};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Catalog query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogParams {
    /// Account whose tier decides visibility and pricing
    pub account_id: i32,
}

/// List packages available to an account's tier
///
/// GET /api/v1/packages?account_id=
#[instrument(skip(pool))]
pub async fn list_packages(
    pool: web::Data<PgPool>,
    params: web::Query<CatalogParams>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let accounts = PgAccountRepository::new(pool.get_ref().clone());
    let account = accounts
        .find_by_id(params.account_id)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(params.account_id.to_string()))?;

    debug!(
        account_id = account.id,
        tier = %account.tier,
        "Listing catalog"
    );

    let packages = PgPackageRepository::new(pool.get_ref().clone());
    let (items, total) = packages
        .list_available(account.tier, query.limit(), query.offset())
        .await?;

    Ok(HttpResponse::Ok().json(query.paginate(items, total)))
}

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/packages").route("", web::get().to(list_packages)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    #[actix_web::test]
    async fn missing_account_id_is_bad_request() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/pulsa_store")
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/packages").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
