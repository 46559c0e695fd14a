// storefront_catalog/src/model/mod.rs

//! Product documents and their embedded SKU sub-documents.

pub mod ids;
pub mod product;
pub mod sku;

pub use ids::{ProductId, SkuId};
pub use product::{
  FeedbackDetails, ListPage, ListedFeedback, ListedProduct, Product, ProductDraft, WriteAck, SYSTEM_FIELDS,
};
pub use sku::{ListedSku, Sku, SkuDraft, SkuPatch};
