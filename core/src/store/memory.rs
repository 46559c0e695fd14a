// storefront_catalog/src/store/memory.rs

//! In-process `ProductStore`. Products live in insertion order behind a
//! `parking_lot::RwLock`; each mutation runs under a single write lock.
//!
//! Lock guards are never held across an `.await`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::ProductStore;
use crate::error::CatalogResult;
use crate::model::{ListedProduct, Product, ProductId, Sku, SkuId, WriteAck};
use crate::pipeline::Pipeline;
use crate::query::{Criteria, ListOptions};

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
  products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_products(products: Vec<Product>) -> Self {
    Self {
      products: RwLock::new(products),
    }
  }

  pub fn len(&self) -> usize {
    self.products.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.products.read().is_empty()
  }

  fn documents(&self) -> CatalogResult<Vec<Value>> {
    let guard = self.products.read();
    guard
      .iter()
      .map(|p| serde_json::to_value(p).map_err(Into::into))
      .collect()
  }
}

/// Applies `fields` as top-level overwrites of `target` by way of its JSON form.
/// `target` is only replaced if the merged document still deserializes.
fn merge_fields<T>(target: &mut T, fields: Map<String, Value>) -> CatalogResult<bool>
where
  T: Serialize + DeserializeOwned + PartialEq,
{
  let mut doc = serde_json::to_value(&*target)?;
  if let Value::Object(map) = &mut doc {
    map.extend(fields);
  }
  let merged: T = serde_json::from_value(doc)?;
  if merged == *target {
    return Ok(false);
  }
  *target = merged;
  Ok(true)
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
  #[instrument(name = "memory_store::insert", skip_all, fields(product_id = %product.id))]
  async fn insert(&self, product: Product) -> CatalogResult<Product> {
    self.products.write().push(product.clone());
    Ok(product)
  }

  async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>> {
    Ok(self.products.read().iter().find(|p| p.id == id).cloned())
  }

  #[instrument(name = "memory_store::find_page", skip_all, err(Display))]
  async fn find_page(&self, criteria: &Criteria, options: &ListOptions) -> CatalogResult<Vec<ListedProduct>> {
    let docs = self.documents()?;
    let rows = Pipeline::listing(criteria, options).run(docs);
    rows
      .into_iter()
      .map(|row| serde_json::from_value(row).map_err(Into::into))
      .collect()
  }

  async fn count(&self, criteria: &Criteria) -> CatalogResult<u64> {
    let docs = self.documents()?;
    Ok(docs.iter().filter(|doc| criteria.matches(doc)).count() as u64)
  }

  #[instrument(name = "memory_store::set_fields", skip(self, fields), fields(num_fields = fields.len()))]
  async fn set_fields(&self, id: ProductId, fields: Map<String, Value>) -> CatalogResult<WriteAck> {
    let mut guard = self.products.write();
    let Some(product) = guard.iter_mut().find(|p| p.id == id) else {
      return Ok(WriteAck::unmatched());
    };
    let changed = merge_fields(product, fields)?;
    if changed {
      product.updated_at = Utc::now();
    }
    Ok(WriteAck::new(1, changed as u64))
  }

  async fn remove(&self, id: ProductId) -> CatalogResult<Option<Product>> {
    let mut guard = self.products.write();
    let position = guard.iter().position(|p| p.id == id);
    Ok(position.map(|idx| guard.remove(idx)))
  }

  #[instrument(name = "memory_store::push_skus", skip(self, skus), fields(num_skus = skus.len()))]
  async fn push_skus(&self, id: ProductId, skus: Vec<Sku>) -> CatalogResult<Option<Product>> {
    let mut guard = self.products.write();
    let Some(product) = guard.iter_mut().find(|p| p.id == id) else {
      return Ok(None);
    };
    product.sku_details.extend(skus);
    product.updated_at = Utc::now();
    Ok(Some(product.clone()))
  }

  #[instrument(name = "memory_store::set_sku_fields", skip(self, fields))]
  async fn set_sku_fields(
    &self,
    id: ProductId,
    sku_id: SkuId,
    fields: Map<String, Value>,
  ) -> CatalogResult<WriteAck> {
    let mut guard = self.products.write();
    let Some(product) = guard.iter_mut().find(|p| p.id == id) else {
      return Ok(WriteAck::unmatched());
    };
    let Some(sku) = product.sku_details.iter_mut().find(|s| s.id == sku_id) else {
      debug!("Product found but SKU is not part of it.");
      return Ok(WriteAck::unmatched());
    };
    let changed = merge_fields(sku, fields)?;
    if changed {
      product.updated_at = Utc::now();
    }
    Ok(WriteAck::new(1, changed as u64))
  }

  #[instrument(name = "memory_store::pull_skus", skip(self, sku_ids), fields(num_ids = sku_ids.len()))]
  async fn pull_skus(&self, id: ProductId, sku_ids: &[SkuId]) -> CatalogResult<WriteAck> {
    let mut guard = self.products.write();
    let Some(product) = guard.iter_mut().find(|p| p.id == id) else {
      return Ok(WriteAck::unmatched());
    };
    let before = product.sku_details.len();
    product.sku_details.retain(|s| !sku_ids.contains(&s.id));
    let changed = product.sku_details.len() != before;
    if changed {
      product.updated_at = Utc::now();
    }
    Ok(WriteAck::new(1, changed as u64))
  }

  async fn clear_skus(&self, id: ProductId) -> CatalogResult<WriteAck> {
    let mut guard = self.products.write();
    let Some(product) = guard.iter_mut().find(|p| p.id == id) else {
      return Ok(WriteAck::unmatched());
    };
    let changed = !product.sku_details.is_empty();
    product.sku_details.clear();
    if changed {
      product.updated_at = Utc::now();
    }
    Ok(WriteAck::new(1, changed as u64))
  }
}
