// storefront_catalog/src/service/skus.rs

//! SKU Mutation Service: append, update and delete SKU sub-documents.
//!
//! Each operation is a single store call, so concurrent mutators of one
//! product never overwrite each other's changes.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Product, ProductId, Sku, SkuDraft, SkuId, SkuPatch, WriteAck};
use crate::store::ProductStore;

/// Which SKUs a delete call removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuDeletion {
  All,
  Ids(Vec<SkuId>),
}

impl SkuDeletion {
  /// Builds the deletion from the API shape. The all-flag wins over any id list.
  pub fn from_request(sku_ids: Vec<SkuId>, delete_all: bool) -> CatalogResult<Self> {
    if delete_all {
      return Ok(SkuDeletion::All);
    }
    if sku_ids.is_empty() {
      return Err(CatalogError::Validation(
        "skuIds must list at least one SKU unless deleteAll is set.".to_string(),
      ));
    }
    Ok(SkuDeletion::Ids(sku_ids))
  }
}

#[derive(Clone)]
pub struct SkuMutationService {
  store: Arc<dyn ProductStore>,
}

impl SkuMutationService {
  pub fn new(store: Arc<dyn ProductStore>) -> Self {
    Self { store }
  }

  /// Appends `drafts` after the existing SKUs, in the given order.
  #[instrument(name = "sku_service::append", skip(self, drafts), fields(num_skus = drafts.len()), err(Display))]
  pub async fn append(&self, product_id: ProductId, drafts: Vec<SkuDraft>) -> CatalogResult<Product> {
    if drafts.is_empty() {
      return Err(CatalogError::Validation("At least one SKU is required.".to_string()));
    }
    for draft in &drafts {
      draft.validate()?;
    }
    let skus: Vec<Sku> = drafts.into_iter().map(Sku::from_draft).collect();

    match self.store.push_skus(product_id, skus).await? {
      Some(product) => {
        info!(total_skus = product.sku_details.len(), "SKUs appended.");
        Ok(product)
      }
      None => {
        warn!("Cannot append SKUs: product not found.");
        Err(CatalogError::product_not_found(product_id))
      }
    }
  }

  /// Merges `patch` into one SKU; attributes not listed keep their values.
  #[instrument(name = "sku_service::update", skip(self, patch), err(Display))]
  pub async fn update(&self, product_id: ProductId, sku_id: SkuId, patch: SkuPatch) -> CatalogResult<WriteAck> {
    patch.validate()?;
    let ack = self.store.set_sku_fields(product_id, sku_id, patch.into_fields()).await?;
    if !ack.is_matched() {
      warn!("SKU update matched nothing.");
      return Err(CatalogError::sku_not_found(product_id, sku_id));
    }
    info!(modified = ack.modified, "SKU updated.");
    Ok(ack)
  }

  #[instrument(name = "sku_service::delete", skip(self), err(Display))]
  pub async fn delete(&self, product_id: ProductId, deletion: SkuDeletion) -> CatalogResult<WriteAck> {
    let ack = match &deletion {
      SkuDeletion::All => self.store.clear_skus(product_id).await?,
      SkuDeletion::Ids(ids) => self.store.pull_skus(product_id, ids).await?,
    };
    if !ack.is_matched() {
      warn!("Cannot delete SKUs: product not found.");
      return Err(CatalogError::product_not_found(product_id));
    }
    info!(modified = ack.modified, "SKUs deleted.");
    Ok(ack)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_flag_wins_over_explicit_ids() {
    let deletion = SkuDeletion::from_request(vec![SkuId::new()], true).unwrap();
    assert_eq!(deletion, SkuDeletion::All);
  }

  #[test]
  fn empty_ids_without_flag_is_rejected() {
    assert!(matches!(
      SkuDeletion::from_request(Vec::new(), false),
      Err(CatalogError::Validation(_))
    ));
  }
}
