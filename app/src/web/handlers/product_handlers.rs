// storefront_app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::envelope;
use crate::errors::AppError;
use crate::state::AppState;
use storefront_catalog::{ListRequest, ProductDraft, ProductId};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetailsBody {
  pub image_details: Value,
}

#[instrument(name = "handler::create_product", skip(app_state, body))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  body: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.create(body.into_inner()).await?;
  Ok(HttpResponse::Created().json(envelope("Product created successfully.", product)))
}

/// Every query parameter is kept as a raw pair; the catalog decides which are
/// directives and which are filters.
#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
  let request = ListRequest::from_query_pairs(query_params.into_inner())?;
  let page = app_state.catalog.list(request).await?;
  info!(total = page.total, returned = page.result.len(), "Products listed.");
  Ok(HttpResponse::Ok().json(envelope("Products fetched successfully.", page)))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let (product, related) = app_state.catalog.get_with_related(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(envelope(
    "Product fetched successfully.",
    json!({ "product": product, "relatedProducts": related }),
  )))
}

#[instrument(name = "handler::update_product", skip(app_state, path, body), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
  body: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let ack = app_state.catalog.update(path.into_inner(), body.into_inner()).await?;
  Ok(HttpResponse::Ok().json(envelope("Product updated successfully.", ack)))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let ack = app_state.catalog.delete(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(envelope("Product deleted successfully.", ack)))
}

#[instrument(name = "handler::update_image", skip(app_state, path, body), fields(product_id = %path.as_ref()))]
pub async fn update_image_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
  body: web::Json<ImageDetailsBody>,
) -> Result<HttpResponse, AppError> {
  let ack = app_state
    .catalog
    .update_image_details(path.into_inner(), body.into_inner().image_details)
    .await?;
  Ok(HttpResponse::Ok().json(envelope("Product image updated successfully.", ack)))
}
