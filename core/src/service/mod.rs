// storefront_catalog/src/service/mod.rs

pub mod catalog;
pub mod listing;
pub mod skus;

pub use catalog::ProductCatalog;
pub use listing::{ProductListingService, RELATED_PRODUCTS_LIMIT};
pub use skus::{SkuDeletion, SkuMutationService};
