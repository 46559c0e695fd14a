// storefront_app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront_catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Record Store Unavailable: {0}")]
  StoreUnavailable(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

impl From<CatalogError> for AppError {
  fn from(err: CatalogError) -> Self {
    match err {
      CatalogError::NotFound(m) => AppError::NotFound(m),
      CatalogError::Validation(m) => AppError::Validation(m),
      CatalogError::StoreUnavailable { source } => AppError::StoreUnavailable(format!("{:#}", source)),
      CatalogError::Serialization(e) => AppError::Internal(format!("Document serialization failed: {}", e)),
      CatalogError::Internal(m) => AppError::Internal(m),
    }
  }
}

// Handlers mostly use `?` on CatalogResult, but setup code may return anyhow errors.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<CatalogError>() {
      Ok(catalog_err) => catalog_err.into(),
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(err) => AppError::Internal(format!("{:#}", err)),
      },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, status = status.as_u16(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }
    let body = match self {
      AppError::Validation(m) | AppError::NotFound(m) => json!({"error": m}),
      AppError::StoreUnavailable(_) => json!({"error": "Record store is unavailable"}),
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Sqlx(_) => json!({"error": "Database operation failed"}),
      AppError::Internal(_) => json!({"error": "An internal error occurred"}),
    };
    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn catalog_errors_map_to_http_statuses() {
    let cases = [
      (CatalogError::NotFound("gone".into()), StatusCode::NOT_FOUND),
      (CatalogError::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (
        CatalogError::store_unavailable(anyhow::anyhow!("connection refused")),
        StatusCode::SERVICE_UNAVAILABLE,
      ),
      (CatalogError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
      assert_eq!(AppError::from(err).status_code(), expected);
    }
  }

  #[test]
  fn wrapped_catalog_error_survives_anyhow() {
    let err = anyhow::Error::new(CatalogError::Validation("skip must be an integer".into()));
    assert!(matches!(AppError::from(err), AppError::Validation(_)));
  }
}
