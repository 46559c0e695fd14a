// tests/sku_mutation_tests.rs
mod common;

use common::*;
use serde_json::json;
use std::sync::Arc;
use storefront_catalog::{CatalogError, ProductId, SkuDeletion, SkuId, SkuPatch};

#[tokio::test]
async fn test_bulk_append_keeps_existing_and_appends_in_order() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let product = catalog
    .create(draft_with_skus("Suite", "software", vec![json!({"skuName": "a"}), json!({"skuName": "b"})]))
    .await
    .unwrap();
  let existing = product.sku_details.clone();

  let updated = catalog
    .skus()
    .append(
      product.id,
      vec![
        sku(json!({"skuName": "c"})),
        sku(json!({"skuName": "d"})),
        sku(json!({"skuName": "e", "licenceKeys": ["K"]})),
      ],
    )
    .await
    .unwrap();

  assert_eq!(updated.sku_details.len(), 5);
  assert_eq!(&updated.sku_details[..2], &existing[..]);
  let names: Vec<_> = updated.sku_details[2..]
    .iter()
    .map(|s| s.attributes["skuName"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["c", "d", "e"]);
  assert_eq!(updated.sku_details[4].licence_keys, Some(json!(["K"])));
}

#[tokio::test]
async fn test_append_to_missing_product_is_not_found() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let err = catalog
    .skus()
    .append(ProductId::new(), vec![sku(json!({"price": 1}))])
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn test_append_rejects_empty_batches_and_client_ids() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let product = catalog.create(draft("P", "c")).await.unwrap();

  let empty = catalog.skus().append(product.id, Vec::new()).await.unwrap_err();
  assert!(matches!(empty, CatalogError::Validation(_)));

  let with_id = catalog
    .skus()
    .append(product.id, vec![sku(json!({"id": "mine", "price": 1}))])
    .await
    .unwrap_err();
  assert!(matches!(with_id, CatalogError::Validation(_)));
}

#[tokio::test]
async fn test_individual_update_changes_only_listed_attributes() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let product = catalog
    .create(draft_with_skus(
      "Game",
      "games",
      vec![
        json!({"skuName": "Standard", "price": 40, "validity": 365, "licenceKeys": ["A"]}),
        json!({"skuName": "Deluxe", "price": 60}),
      ],
    ))
    .await
    .unwrap();
  let target = product.sku_details[0].id;

  let patch: SkuPatch = serde_json::from_value(json!({"price": 35, "onSale": true})).unwrap();
  let ack = catalog.skus().update(product.id, target, patch).await.unwrap();
  assert_eq!((ack.matched, ack.modified), (1, 1));

  let stored = catalog.get_by_id(product.id).await.unwrap();
  let updated = stored.sku(&target).unwrap();
  assert_eq!(updated.attributes["price"], json!(35));
  assert_eq!(updated.attributes["onSale"], json!(true));
  assert_eq!(updated.attributes["skuName"], json!("Standard"));
  assert_eq!(updated.attributes["validity"], json!(365));
  assert_eq!(updated.licence_keys, Some(json!(["A"])));
  assert_eq!(stored.sku_details[1], product.sku_details[1]);
}

#[tokio::test]
async fn test_individual_update_with_unknown_ids_is_not_found() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let product = catalog
    .create(draft_with_skus("Game", "games", vec![json!({"price": 1})]))
    .await
    .unwrap();
  let patch = || SkuPatch::from(json!({"price": 2}).as_object().cloned().unwrap());

  let unknown_sku = catalog.skus().update(product.id, SkuId::new(), patch()).await.unwrap_err();
  assert!(unknown_sku.is_not_found());

  let unknown_product = catalog
    .skus()
    .update(ProductId::new(), product.sku_details[0].id, patch())
    .await
    .unwrap_err();
  assert!(unknown_product.is_not_found());
}

#[tokio::test]
async fn test_sku_ids_do_not_resolve_across_products() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let first = catalog
    .create(draft_with_skus("First", "c", vec![json!({"price": 1})]))
    .await
    .unwrap();
  let second = catalog.create(draft("Second", "c")).await.unwrap();

  let patch = SkuPatch::from(json!({"price": 9}).as_object().cloned().unwrap());
  let err = catalog
    .skus()
    .update(second.id, first.sku_details[0].id, patch)
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_all_flag_ignores_explicit_ids() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let product = catalog
    .create(draft_with_skus("P", "c", vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]))
    .await
    .unwrap();

  let deletion = SkuDeletion::from_request(vec![product.sku_details[0].id], true).unwrap();
  catalog.skus().delete(product.id, deletion).await.unwrap();

  let stored = catalog.get_by_id(product.id).await.unwrap();
  assert!(stored.sku_details.is_empty());
  assert_eq!(stored.product_name, "P", "the product itself survives");
}

#[tokio::test]
async fn test_delete_by_ids_preserves_order_of_survivors() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let product = catalog
    .create(draft_with_skus(
      "P",
      "c",
      (1..=5).map(|n| json!({"n": n})).collect(),
    ))
    .await
    .unwrap();
  let ids: Vec<SkuId> = product.sku_details.iter().map(|s| s.id).collect();

  let ack = catalog
    .skus()
    .delete(product.id, SkuDeletion::Ids(vec![ids[3], ids[1], SkuId::new()]))
    .await
    .unwrap();
  assert_eq!((ack.matched, ack.modified), (1, 1));

  let stored = catalog.get_by_id(product.id).await.unwrap();
  let survivors: Vec<SkuId> = stored.sku_details.iter().map(|s| s.id).collect();
  assert_eq!(survivors, vec![ids[0], ids[2], ids[4]]);
}

#[tokio::test]
async fn test_delete_on_missing_product_is_not_found() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let err = catalog
    .skus()
    .delete(ProductId::new(), SkuDeletion::All)
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_lose_no_updates() {
  setup_tracing();
  let (_store, catalog) = new_catalog();
  let catalog = Arc::new(catalog);
  let product = catalog.create(draft("Hot Item", "c")).await.unwrap();

  let mut handles = Vec::new();
  for worker in 0..8 {
    let catalog = catalog.clone();
    handles.push(tokio::spawn(async move {
      for n in 0..10 {
        catalog
          .skus()
          .append(product.id, vec![sku(json!({"worker": worker, "n": n}))])
          .await
          .unwrap();
      }
    }));
  }
  for handle in handles {
    handle.await.unwrap();
  }

  let stored = catalog.get_by_id(product.id).await.unwrap();
  assert_eq!(stored.sku_details.len(), 80);
}
