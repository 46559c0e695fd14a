// storefront_app/src/web/handlers/sku_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use super::envelope;
use crate::errors::AppError;
use crate::state::AppState;
use storefront_catalog::{ProductId, SkuDeletion, SkuDraft, SkuId, SkuPatch};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AppendSkusBody {
  pub sku_details: Vec<SkuDraft>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSkusQuery {
  #[serde(default)]
  pub delete_all: bool,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSkusBody {
  #[serde(default)]
  pub sku_ids: Vec<SkuId>,
}

#[instrument(name = "handler::append_skus", skip(app_state, path, body), fields(product_id = %path.as_ref()))]
pub async fn append_skus_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
  body: web::Json<AppendSkusBody>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .catalog
    .skus()
    .append(path.into_inner(), body.into_inner().sku_details)
    .await?;
  Ok(HttpResponse::Ok().json(envelope("SKU details added successfully.", product)))
}

#[instrument(name = "handler::update_sku", skip(app_state, path, body))]
pub async fn update_sku_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(ProductId, SkuId)>,
  body: web::Json<SkuPatch>,
) -> Result<HttpResponse, AppError> {
  let (product_id, sku_id) = path.into_inner();
  let ack = app_state
    .catalog
    .skus()
    .update(product_id, sku_id, body.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(envelope("SKU details updated successfully.", ack)))
}

/// The body is optional when `deleteAll=true`; otherwise it must list `skuIds`.
/// It is read as raw bytes so an empty body is allowed while a malformed one
/// is still reported as such.
#[instrument(name = "handler::delete_skus", skip(app_state, path, body), fields(product_id = %path.as_ref()))]
pub async fn delete_skus_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
  query: web::Query<DeleteSkusQuery>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let sku_ids = parse_delete_body(&body)?.sku_ids;
  let deletion = SkuDeletion::from_request(sku_ids, query.delete_all)?;
  let ack = app_state.catalog.skus().delete(path.into_inner(), deletion).await?;
  Ok(HttpResponse::Ok().json(envelope("SKU details deleted successfully.", ack)))
}

fn parse_delete_body(body: &[u8]) -> Result<DeleteSkusBody, AppError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(DeleteSkusBody::default());
  }
  serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))
}
