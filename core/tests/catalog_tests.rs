// tests/catalog_tests.rs
mod common;

use common::*;
use serde_json::json;
use storefront_catalog::{CatalogError, ProductId, ProductStore};

#[tokio::test]
async fn test_create_assigns_ids_and_timestamps() {
  setup_tracing();
  let (store, catalog) = new_catalog();
  let product = catalog
    .create(draft_with_skus("Course", "courses", vec![json!({"price": 10}), json!({"price": 20})]))
    .await
    .unwrap();

  assert_eq!(store.len(), 1);
  assert_eq!(product.created_at, product.updated_at);
  assert_ne!(product.sku_details[0].id, product.sku_details[1].id);
  assert_eq!(product.attributes["description"], json!("About Course"));
}

#[tokio::test]
async fn test_create_validates_the_draft() {
  setup_tracing();
  let (store, catalog) = new_catalog();
  let err = catalog.create(draft("", "books")).await.unwrap_err();
  assert!(matches!(err, CatalogError::Validation(_)));
  assert!(store.is_empty());
}

#[tokio::test]
async fn test_get_by_id_returns_full_document_or_not_found() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let created = catalog.create(sensitive_draft("Suite", "software")).await.unwrap();

  let fetched = catalog.get_by_id(created.id).await.unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.sku_details[0].licence_keys, Some(json!(["KEY-1", "KEY-2"])));

  let missing = catalog.get_by_id(ProductId::new()).await.unwrap_err();
  assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_get_with_related_uses_the_product_category() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let products = seed(
    &catalog,
    vec![draft("A", "books"), draft("B", "books"), draft("C", "games")],
  )
  .await;

  let (product, related) = catalog.get_with_related(products[0].id).await.unwrap();
  assert_eq!(product.id, products[0].id);
  assert_eq!(related.len(), 2);
  assert!(related.iter().all(|p| p.category == "books"));
}

#[tokio::test]
async fn test_update_overwrites_descriptive_fields_but_not_skus() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let created = catalog
    .create(draft_with_skus("Old Name", "books", vec![json!({"price": 1})]))
    .await
    .unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(2)).await;

  let mut replacement = draft("New Name", "ebooks");
  replacement.is_sold_out = true;
  let ack = catalog.update(created.id, replacement).await.unwrap();
  assert!(ack.is_matched());

  let stored = catalog.get_by_id(created.id).await.unwrap();
  assert_eq!(stored.product_name, "New Name");
  assert_eq!(stored.category, "ebooks");
  assert!(stored.is_sold_out);
  assert_eq!(stored.sku_details, created.sku_details);
  assert_eq!(stored.created_at, created.created_at);
  assert!(stored.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_update_of_missing_product_is_not_found() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let err = catalog.update(ProductId::new(), draft("X", "y")).await.unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn test_image_details_are_replaced() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let created = catalog.create(draft("Poster", "art")).await.unwrap();

  catalog
    .update_image_details(created.id, json!({"url": "https://cdn.example/p.png"}))
    .await
    .unwrap();
  let stored = catalog.get_by_id(created.id).await.unwrap();
  assert_eq!(stored.image_details, Some(json!({"url": "https://cdn.example/p.png"})));

  let not_object = catalog.update_image_details(created.id, json!("nope")).await.unwrap_err();
  assert!(matches!(not_object, CatalogError::Validation(_)));
}

#[tokio::test]
async fn test_delete_removes_the_product_once() {
  setup_tracing();
  let (store, catalog) = new_catalog();
  let created = catalog.create(draft("Temp", "misc")).await.unwrap();

  let ack = catalog.delete(created.id).await.unwrap();
  assert_eq!((ack.matched, ack.modified), (1, 1));
  assert!(store.find_by_id(created.id).await.unwrap().is_none());

  let again = catalog.delete(created.id).await.unwrap_err();
  assert!(again.is_not_found());
}

#[tokio::test]
async fn test_in_memory_store_always_answers_ping() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  assert!(catalog.ping_store().await.is_ok());
}
