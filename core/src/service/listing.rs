// storefront_catalog/src/service/listing.rs

//! Product Listing Service: translated criteria -> one page plus total count.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::CatalogResult;
use crate::model::{ListPage, ListedProduct};
use crate::query::{translate, Criteria, ListOptions, ListRequest, TranslatedQuery};
use crate::store::ProductStore;

/// Upper bound on products returned by [`ProductListingService::related`].
pub const RELATED_PRODUCTS_LIMIT: i64 = 4;

#[derive(Clone)]
pub struct ProductListingService {
  store: Arc<dyn ProductStore>,
}

impl ProductListingService {
  pub fn new(store: Arc<dyn ProductStore>) -> Self {
    Self { store }
  }

  /// Runs the page query and the count concurrently. `total` always reflects
  /// the full match set, whatever the window.
  #[instrument(name = "listing_service::list", skip_all, err(Display))]
  pub async fn list(&self, request: ListRequest) -> CatalogResult<ListPage> {
    let TranslatedQuery { criteria, options } = translate(request);
    self.page(&criteria, &options).await
  }

  /// Same-category products that are still on sale, sanitized like a listing.
  #[instrument(name = "listing_service::related", skip(self), err(Display))]
  pub async fn related(&self, category: &str) -> CatalogResult<Vec<ListedProduct>> {
    let criteria = Criteria::new()
      .with_equals("category", category)
      .with_equals("isSoldOut", false);
    let options = ListOptions {
      limit: RELATED_PRODUCTS_LIMIT,
      ..ListOptions::default()
    };
    self.store.find_page(&criteria, &options).await
  }

  async fn page(&self, criteria: &Criteria, options: &ListOptions) -> CatalogResult<ListPage> {
    let (result, total) = futures_util::try_join!(
      self.store.find_page(criteria, options),
      self.store.count(criteria)
    )?;
    info!(total, page_len = result.len(), skip = options.skip, limit = options.limit, "Products listed.");
    Ok(ListPage { total, result })
  }
}
