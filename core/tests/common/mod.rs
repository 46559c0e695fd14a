// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset of these helpers

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use storefront_catalog::{InMemoryProductStore, Product, ProductCatalog, ProductDraft, SkuDraft};
use tracing::Level;

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixture builders ---

pub fn sku(attributes: Value) -> SkuDraft {
  serde_json::from_value(attributes).expect("valid SKU fixture")
}

pub fn draft(product_name: &str, category: &str) -> ProductDraft {
  serde_json::from_value(json!({
    "productName": product_name,
    "category": category,
    "description": format!("About {}", product_name),
  }))
  .expect("valid product fixture")
}

pub fn draft_with_skus(product_name: &str, category: &str, skus: Vec<Value>) -> ProductDraft {
  let mut d = draft(product_name, category);
  d.sku_details = skus.into_iter().map(sku).collect();
  d
}

/// Draft carrying every field listings must strip.
pub fn sensitive_draft(product_name: &str, category: &str) -> ProductDraft {
  serde_json::from_value(json!({
    "productName": product_name,
    "category": category,
    "imageDetails": {"url": "https://cdn.example/img.png", "publicId": "img-1"},
    "feedbackDetails": {"info": [{"user": "u1", "comment": "great"}], "avgRating": 4.5},
    "skuDetails": [
      {"skuName": "Basic", "price": 10, "licenceKeys": ["KEY-1", "KEY-2"]},
      {"skuName": "Pro", "price": 20, "licenceKeys": ["KEY-3"]}
    ]
  }))
  .expect("valid sensitive fixture")
}

pub fn new_catalog() -> (Arc<InMemoryProductStore>, ProductCatalog) {
  let store = Arc::new(InMemoryProductStore::new());
  let catalog = ProductCatalog::new(store.clone());
  (store, catalog)
}

/// Creates products one by one, spaced so their ids sort in creation order.
pub async fn seed(catalog: &ProductCatalog, drafts: Vec<ProductDraft>) -> Vec<Product> {
  let mut created = Vec::with_capacity(drafts.len());
  for d in drafts {
    created.push(catalog.create(d).await.expect("fixture product is valid"));
    tokio::time::sleep(Duration::from_millis(2)).await;
  }
  created
}
