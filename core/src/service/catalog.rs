// storefront_catalog/src/service/catalog.rs

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::listing::ProductListingService;
use super::skus::SkuMutationService;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{ListPage, ListedProduct, Product, ProductDraft, ProductId, WriteAck};
use crate::query::ListRequest;
use crate::store::ProductStore;

/// Entry point used by the API layer: product CRUD plus access to the
/// listing and SKU services, all sharing one store.
#[derive(Clone)]
pub struct ProductCatalog {
  store: Arc<dyn ProductStore>,
  listing: ProductListingService,
  skus: SkuMutationService,
}

impl ProductCatalog {
  pub fn new(store: Arc<dyn ProductStore>) -> Self {
    Self {
      listing: ProductListingService::new(store.clone()),
      skus: SkuMutationService::new(store.clone()),
      store,
    }
  }

  pub fn listing(&self) -> &ProductListingService {
    &self.listing
  }

  pub fn skus(&self) -> &SkuMutationService {
    &self.skus
  }

  #[instrument(name = "catalog::create", skip_all, fields(product_name = %draft.product_name), err(Display))]
  pub async fn create(&self, draft: ProductDraft) -> CatalogResult<Product> {
    draft.validate()?;
    let product = self.store.insert(Product::from_draft(draft, Utc::now())).await?;
    info!(product_id = %product.id, num_skus = product.sku_details.len(), "Product created.");
    Ok(product)
  }

  pub async fn list(&self, request: ListRequest) -> CatalogResult<ListPage> {
    self.listing.list(request).await
  }

  /// Full document, `licenceKeys` included.
  #[instrument(name = "catalog::get_by_id", skip(self), err(Display))]
  pub async fn get_by_id(&self, id: ProductId) -> CatalogResult<Product> {
    match self.store.find_by_id(id).await? {
      Some(product) => Ok(product),
      None => {
        warn!("Product not found.");
        Err(CatalogError::product_not_found(id))
      }
    }
  }

  /// The product plus up to four related products from its category.
  pub async fn get_with_related(&self, id: ProductId) -> CatalogResult<(Product, Vec<ListedProduct>)> {
    let product = self.get_by_id(id).await?;
    let related = self.listing.related(&product.category).await?;
    Ok((product, related))
  }

  /// Overwrites the draft's descriptive fields. SKUs are left as they are.
  #[instrument(name = "catalog::update", skip(self, draft), err(Display))]
  pub async fn update(&self, id: ProductId, draft: ProductDraft) -> CatalogResult<WriteAck> {
    draft.validate()?;
    let ack = self.store.set_fields(id, draft.into_update_fields()?).await?;
    self.require_match(id, ack)
  }

  #[instrument(name = "catalog::update_image_details", skip(self, image_details), err(Display))]
  pub async fn update_image_details(&self, id: ProductId, image_details: Value) -> CatalogResult<WriteAck> {
    if !image_details.is_object() {
      return Err(CatalogError::Validation("imageDetails must be an object.".to_string()));
    }
    let mut fields = Map::new();
    fields.insert("imageDetails".to_string(), image_details);
    let ack = self.store.set_fields(id, fields).await?;
    self.require_match(id, ack)
  }

  #[instrument(name = "catalog::delete", skip(self), err(Display))]
  pub async fn delete(&self, id: ProductId) -> CatalogResult<WriteAck> {
    match self.store.remove(id).await? {
      Some(_) => {
        info!("Product deleted.");
        Ok(WriteAck::new(1, 1))
      }
      None => Err(CatalogError::product_not_found(id)),
    }
  }

  pub async fn ping_store(&self) -> CatalogResult<()> {
    self.store.ping().await
  }

  fn require_match(&self, id: ProductId, ack: WriteAck) -> CatalogResult<WriteAck> {
    if ack.is_matched() {
      info!(modified = ack.modified, "Product updated.");
      Ok(ack)
    } else {
      warn!("Update matched no product.");
      Err(CatalogError::product_not_found(id))
    }
  }
}
