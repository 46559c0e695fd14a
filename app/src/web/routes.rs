// storefront_app/src/web/routes.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{product_handlers, sku_handlers};

#[instrument(name = "handler::health_check", skip(app_state))]
async fn health_check_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  app_state.catalog.ping_store().await?;
  let store = if app_state.config.database_url.is_some() {
    "postgres"
  } else {
    "memory"
  };
  Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "store": store })))
}

// Extractor failures surface as 400s with the usual error body.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default()
    .error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into())
}

fn query_config() -> web::QueryConfig {
  web::QueryConfig::default()
    .error_handler(|err, _req| AppError::Validation(format!("Invalid query string: {}", err)).into())
}

fn path_config() -> web::PathConfig {
  web::PathConfig::default()
    .error_handler(|err, _req| AppError::Validation(format!("Invalid identifier in path: {}", err)).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .app_data(json_config())
      .app_data(query_config())
      .app_data(path_config())
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("", web::get().to(product_handlers::list_products_handler))
          // SKU routes go before `/{product_id}` so `sku` is never read as an id.
          .route("/sku/{product_id}", web::post().to(sku_handlers::append_skus_handler))
          .route("/sku/{product_id}", web::delete().to(sku_handlers::delete_skus_handler))
          .route(
            "/sku/{product_id}/{sku_id}",
            web::put().to(sku_handlers::update_sku_handler),
          )
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::patch().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler))
          .route(
            "/{product_id}/image",
            web::put().to(product_handlers::update_image_handler),
          ),
      ),
  );
}
