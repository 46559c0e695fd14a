// storefront_app/src/web/handlers/mod.rs

pub mod product_handlers;
pub mod sku_handlers;

use serde::Serialize;
use serde_json::{json, Value};

/// Response envelope shared by every catalog endpoint.
pub(crate) fn envelope<T: Serialize>(message: &str, result: T) -> Value {
  json!({ "message": message, "result": result })
}
