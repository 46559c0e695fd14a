// storefront_catalog/src/model/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::ProductId;
use super::sku::{ListedSku, Sku, SkuDraft};
use crate::error::{CatalogError, CatalogResult};

/// Keys owned by the system; drafts may not set them through the open
/// attribute map.
pub const SYSTEM_FIELDS: &[&str] = &["id", "_id", "createdAt", "updatedAt", "skuDetails"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDetails {
  /// Raw feedback payload. Stripped from listings.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub info: Option<Value>,
  /// Aggregates such as average rating or review count.
  #[serde(flatten)]
  pub summary: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: ProductId,
  pub product_name: String,
  pub category: String,
  #[serde(default)]
  pub is_sold_out: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_details: Option<Value>,
  #[serde(default)]
  pub feedback_details: FeedbackDetails,
  /// Insertion ordered; appends land at the end.
  #[serde(default)]
  pub sku_details: Vec<Sku>,
  /// Description, platform, highlights, download URLs and the like.
  #[serde(flatten)]
  pub attributes: Map<String, Value>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn from_draft(draft: ProductDraft, now: DateTime<Utc>) -> Self {
    Self {
      id: ProductId::new(),
      product_name: draft.product_name,
      category: draft.category,
      is_sold_out: draft.is_sold_out,
      image_details: draft.image_details,
      feedback_details: draft.feedback_details.unwrap_or_default(),
      sku_details: draft.sku_details.into_iter().map(Sku::from_draft).collect(),
      attributes: draft.attributes,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn sku(&self, sku_id: &super::SkuId) -> Option<&Sku> {
    self.sku_details.iter().find(|s| &s.id == sku_id)
  }
}

/// Create/update input for a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
  pub product_name: String,
  pub category: String,
  #[serde(default)]
  pub is_sold_out: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_details: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub feedback_details: Option<FeedbackDetails>,
  /// Only honoured on create. Later SKU changes go through the SKU endpoints.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub sku_details: Vec<SkuDraft>,
  #[serde(flatten)]
  pub attributes: Map<String, Value>,
}

impl ProductDraft {
  pub fn validate(&self) -> CatalogResult<()> {
    if self.product_name.trim().is_empty() {
      return Err(CatalogError::Validation("productName must not be empty.".to_string()));
    }
    if self.category.trim().is_empty() {
      return Err(CatalogError::Validation("category must not be empty.".to_string()));
    }
    if let Some(key) = SYSTEM_FIELDS.iter().find(|k| self.attributes.contains_key(**k)) {
      return Err(CatalogError::Validation(format!(
        "Product attributes must not set the system field '{}'.",
        key
      )));
    }
    for sku in &self.sku_details {
      sku.validate()?;
    }
    Ok(())
  }

  /// Top-level fields written by an update. `skuDetails` is never part of it,
  /// and absent optional blobs leave the stored values alone.
  pub fn into_update_fields(self) -> CatalogResult<Map<String, Value>> {
    let mut fields = self.attributes;
    fields.insert("productName".to_string(), Value::String(self.product_name));
    fields.insert("category".to_string(), Value::String(self.category));
    fields.insert("isSoldOut".to_string(), Value::Bool(self.is_sold_out));
    if let Some(image_details) = self.image_details {
      fields.insert("imageDetails".to_string(), image_details);
    }
    if let Some(feedback_details) = self.feedback_details {
      fields.insert("feedbackDetails".to_string(), serde_json::to_value(feedback_details)?);
    }
    Ok(fields)
  }
}

/// Feedback as it appears in listing results: summary only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListedFeedback {
  #[serde(flatten)]
  pub summary: Map<String, Value>,
}

/// Sanitized product shape returned by listings. There is deliberately no
/// field for `imageDetails`, `feedbackDetails.info` or `skuDetails[].licenceKeys`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedProduct {
  pub id: ProductId,
  pub product_name: String,
  pub category: String,
  #[serde(default)]
  pub is_sold_out: bool,
  #[serde(default)]
  pub feedback_details: ListedFeedback,
  #[serde(default)]
  pub sku_details: Vec<ListedSku>,
  #[serde(flatten)]
  pub attributes: Map<String, Value>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// One page of a listing plus the count of every matching product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
  pub total: u64,
  pub result: Vec<ListedProduct>,
}

/// Acknowledgement of a single-document write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
  pub matched: u64,
  pub modified: u64,
}

impl WriteAck {
  pub fn new(matched: u64, modified: u64) -> Self {
    Self { matched, modified }
  }

  pub fn unmatched() -> Self {
    Self::default()
  }

  pub fn is_matched(&self) -> bool {
    self.matched > 0
  }
}
