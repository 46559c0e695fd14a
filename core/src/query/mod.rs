// storefront_catalog/src/query/mod.rs

//! Query Translator: listing requests -> criteria + options.

pub mod criteria;
pub mod document;
pub mod sort;
pub mod translator;

pub use criteria::{Condition, Criteria, SearchPattern};
pub use sort::{SortKey, SortOrder, SortSpec};
pub use translator::{translate, ListOptions, ListRequest, TranslatedQuery, DEFAULT_LIMIT, DEFAULT_SKIP};
