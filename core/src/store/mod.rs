// storefront_catalog/src/store/mod.rs

//! Product Record Store: the durable home of product documents and their
//! embedded SKU sequences.

pub mod memory;

pub use memory::InMemoryProductStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::CatalogResult;
use crate::model::{ListedProduct, Product, ProductId, Sku, SkuId, WriteAck};
use crate::query::{Criteria, ListOptions};

/// Storage seam for the catalog.
///
/// Every mutation is a single atomic operation on one product document; callers
/// never read, modify and write back. A missing product is reported through the
/// return value (`None` or an unmatched [`WriteAck`]), not as an error.
#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn insert(&self, product: Product) -> CatalogResult<Product>;

  async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>>;

  /// One sorted, windowed, sanitized page for `criteria`.
  async fn find_page(&self, criteria: &Criteria, options: &ListOptions) -> CatalogResult<Vec<ListedProduct>>;

  /// Number of products matching `criteria`, ignoring any page window.
  async fn count(&self, criteria: &Criteria) -> CatalogResult<u64>;

  /// Overwrites the given top-level fields and bumps `updatedAt`.
  async fn set_fields(&self, id: ProductId, fields: Map<String, Value>) -> CatalogResult<WriteAck>;

  async fn remove(&self, id: ProductId) -> CatalogResult<Option<Product>>;

  /// Appends `skus` in order; returns the updated product.
  async fn push_skus(&self, id: ProductId, skus: Vec<Sku>) -> CatalogResult<Option<Product>>;

  /// Merges `fields` into the SKU `sku_id` of product `id`. Unmatched when
  /// either id does not resolve.
  async fn set_sku_fields(&self, id: ProductId, sku_id: SkuId, fields: Map<String, Value>)
    -> CatalogResult<WriteAck>;

  /// Removes every SKU whose id is listed, preserving the order of the rest.
  async fn pull_skus(&self, id: ProductId, sku_ids: &[SkuId]) -> CatalogResult<WriteAck>;

  /// Replaces the SKU sequence with an empty one.
  async fn clear_skus(&self, id: ProductId) -> CatalogResult<WriteAck>;

  /// Connectivity probe for health checks.
  async fn ping(&self) -> CatalogResult<()> {
    Ok(())
  }
}
