// storefront_app/src/db/seed.rs

use serde_json::json;
use storefront_catalog::{CatalogResult, ListRequest, ProductCatalog, ProductDraft};
use tracing::{info, instrument};

/// Inserts a handful of demo products when the catalog is empty. Returns how
/// many were created.
#[instrument(name = "db::seed_catalog", skip_all, err(Display))]
pub async fn seed_catalog(catalog: &ProductCatalog) -> CatalogResult<usize> {
  let existing = catalog.list(ListRequest::new().limit(1)).await?;
  if existing.total > 0 {
    info!(existing = existing.total, "Catalog already has products; skipping seed.");
    return Ok(0);
  }

  let drafts: Vec<ProductDraft> = serde_json::from_value(json!([
    {
      "productName": "Windows 11 Pro",
      "category": "operating-systems",
      "description": "Retail licence for Windows 11 Pro.",
      "platformType": "windows",
      "imageDetails": {"url": "https://cdn.example.com/win11.png"},
      "feedbackDetails": {"avgRating": 4.6, "info": [{"rating": 5, "comment": "Smooth install"}]},
      "skuDetails": [
        {"skuName": "1 PC / 1 Year", "price": 99, "validity": 365, "lifetime": false, "licenceKeys": ["W11-AAAA"]},
        {"skuName": "1 PC / Lifetime", "price": 199, "lifetime": true, "licenceKeys": ["W11-BBBB"]}
      ]
    },
    {
      "productName": "Office Suite 2024",
      "category": "productivity",
      "description": "Word processing, spreadsheets and slides.",
      "platformType": "windows",
      "feedbackDetails": {"avgRating": 4.2},
      "skuDetails": [
        {"skuName": "Home", "price": 149, "validity": 365},
        {"skuName": "Business", "price": 249, "validity": 365}
      ]
    },
    {
      "productName": "Secure Antivirus",
      "category": "security",
      "description": "Real-time protection for three devices.",
      "platformType": "mac",
      "skuDetails": [{"skuName": "3 Devices", "price": 39, "validity": 365}]
    },
    {
      "productName": "Rust Programming Course",
      "category": "courses",
      "description": "Self-paced video course.",
      "highlights": ["Ownership", "Async", "Macros"]
    }
  ]))?;

  let mut created = 0;
  for draft in drafts {
    catalog.create(draft).await?;
    created += 1;
  }
  info!(created, "Seeded demo products.");
  Ok(created)
}
