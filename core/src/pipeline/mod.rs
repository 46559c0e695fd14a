// storefront_catalog/src/pipeline/mod.rs

//! Document aggregation pipeline used to produce sanitized listing pages.

pub mod definition;
pub mod execution;

pub use definition::{Pipeline, Stage, ID_FIELD, LISTING_EXCLUSIONS, SKU_FIELD};
