// storefront_catalog/src/model/sku.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::SkuId;
use crate::error::{CatalogError, CatalogResult};

/// A purchasable variant embedded in a product's `skuDetails` sequence.
///
/// `licenceKeys` is sensitive: it is returned on direct product fetch but
/// never on listings (see [`ListedSku`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
  pub id: SkuId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub licence_keys: Option<Value>,
  /// Price, validity, variant attributes. Open for mutation purposes.
  #[serde(flatten)]
  pub attributes: Map<String, Value>,
}

impl Sku {
  pub fn from_draft(draft: SkuDraft) -> Self {
    Self {
      id: SkuId::new(),
      licence_keys: draft.licence_keys,
      attributes: draft.attributes,
    }
  }
}

/// Input for appending a SKU. The id is always assigned server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuDraft {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub licence_keys: Option<Value>,
  #[serde(flatten)]
  pub attributes: Map<String, Value>,
}

impl SkuDraft {
  pub fn validate(&self) -> CatalogResult<()> {
    reject_id_keys(&self.attributes, "SKU")
  }
}

/// Partial attribute map for an individual SKU update. Only the listed keys
/// change; everything else on the SKU keeps its prior value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuPatch(pub Map<String, Value>);

impl SkuPatch {
  pub fn validate(&self) -> CatalogResult<()> {
    if self.0.is_empty() {
      return Err(CatalogError::Validation(
        "SKU update must contain at least one attribute.".to_string(),
      ));
    }
    reject_id_keys(&self.0, "SKU update")
  }

  pub fn into_fields(self) -> Map<String, Value> {
    self.0
  }
}

impl From<Map<String, Value>> for SkuPatch {
  fn from(fields: Map<String, Value>) -> Self {
    SkuPatch(fields)
  }
}

/// SKU as it appears in listing results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedSku {
  pub id: SkuId,
  #[serde(flatten)]
  pub attributes: Map<String, Value>,
}

fn reject_id_keys(fields: &Map<String, Value>, what: &str) -> CatalogResult<()> {
  for key in ["id", "_id"] {
    if fields.contains_key(key) {
      return Err(CatalogError::Validation(format!(
        "{} must not set the system field '{}'.",
        what, key
      )));
    }
  }
  Ok(())
}
