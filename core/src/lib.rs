// src/lib.rs

//! Storefront catalog: the product side of the storefront, independent of
//! HTTP and of any particular database.
//!
//! It provides:
//!  - The product document model with embedded SKU sub-documents.
//!  - A query translator turning listing requests (free-form filters, `search`,
//!    sort, skip, limit) into criteria and resolved options.
//!  - A document aggregation pipeline (match, sort, window, unwind, project,
//!    regroup) that produces sanitized listing pages.
//!  - A `ProductStore` trait with an in-memory implementation.
//!  - Listing, SKU mutation and catalog services on top of any store.

pub mod error;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod service;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{CatalogError, CatalogResult};
pub use crate::model::{
  FeedbackDetails, ListPage, ListedProduct, ListedSku, Product, ProductDraft, ProductId, Sku, SkuDraft, SkuId,
  SkuPatch, WriteAck,
};
pub use crate::query::{Criteria, ListOptions, ListRequest, SortOrder, SortSpec};
pub use crate::service::{ProductCatalog, ProductListingService, SkuDeletion, SkuMutationService};
pub use crate::store::{InMemoryProductStore, ProductStore};
