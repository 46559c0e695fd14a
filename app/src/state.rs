// storefront_app/src/state.rs
use crate::config::AppConfig;
use crate::db::PgProductStore;
use crate::errors::Result;
use std::sync::Arc;
use storefront_catalog::{InMemoryProductStore, ProductCatalog, ProductStore};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<ProductCatalog>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn new(catalog: ProductCatalog, config: Arc<AppConfig>) -> Self {
    Self {
      catalog: Arc::new(catalog),
      config,
    }
  }
}

/// Picks the record store from the configuration: PostgreSQL when a
/// `DATABASE_URL` is set, the in-memory store otherwise.
pub async fn build_catalog(config: &AppConfig) -> Result<ProductCatalog> {
  let store: Arc<dyn ProductStore> = match &config.database_url {
    Some(url) => Arc::new(PgProductStore::connect(url, config.database_max_connections).await?),
    None => {
      warn!("DATABASE_URL is not set; products are kept in memory and lost on restart.");
      Arc::new(InMemoryProductStore::new())
    }
  };
  info!(persistent = config.database_url.is_some(), "Product catalog ready.");
  Ok(ProductCatalog::new(store))
}
