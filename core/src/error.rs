// storefront_catalog/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Resource not found: {0}")]
  NotFound(String),

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Record store unavailable. Source: {source}")]
  StoreUnavailable {
    #[source]
    source: AnyhowError,
  },

  #[error("Document (de)serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Internal catalog error: {0}")]
  Internal(String),
}

impl CatalogError {
  pub fn product_not_found(id: impl std::fmt::Display) -> Self {
    CatalogError::NotFound(format!("Product with ID {} not found.", id))
  }

  pub fn sku_not_found(product_id: impl std::fmt::Display, sku_id: impl std::fmt::Display) -> Self {
    CatalogError::NotFound(format!("SKU {} not found on product {}.", sku_id, product_id))
  }

  /// Wraps any store-side failure (connection refused, pool timeout, I/O).
  pub fn store_unavailable<E>(err: E) -> Self
  where
    E: Into<AnyhowError>,
  {
    CatalogError::StoreUnavailable { source: err.into() }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, CatalogError::NotFound(_))
  }
}

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
