// storefront_catalog/src/query/sort.rs

use serde_json::Value;
use std::cmp::Ordering;

use super::document::{compare_values, resolve};
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  Ascending,
  Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
  pub field: String,
  pub order: SortOrder,
}

/// Ordered sort directives; earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
  pub fn by(field: impl Into<String>, order: SortOrder) -> Self {
    SortSpec(vec![SortKey {
      field: field.into(),
      order,
    }])
  }

  pub fn then(mut self, field: impl Into<String>, order: SortOrder) -> Self {
    self.0.push(SortKey {
      field: field.into(),
      order,
    });
    self
  }

  pub fn keys(&self) -> &[SortKey] {
    &self.0
  }

  /// Parses `-price,productName` style directives: a leading `-` sorts
  /// descending, a leading `+` or nothing ascending.
  pub fn parse(raw: &str) -> CatalogResult<Self> {
    let mut keys = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
      let (order, field) = match part.strip_prefix('-') {
        Some(rest) => (SortOrder::Descending, rest),
        None => (SortOrder::Ascending, part.strip_prefix('+').unwrap_or(part)),
      };
      let field = field.trim();
      if field.is_empty() {
        return Err(CatalogError::Validation(format!("Invalid sort directive '{}'.", part)));
      }
      keys.push(SortKey {
        field: field.to_string(),
        order,
      });
    }
    if keys.is_empty() {
      return Err(CatalogError::Validation("Sort directive is empty.".to_string()));
    }
    Ok(SortSpec(keys))
  }

  pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
    for key in &self.0 {
      let left = resolve(a, &key.field).first().copied();
      let right = resolve(b, &key.field).first().copied();
      let ordering = match key.order {
        SortOrder::Ascending => compare_values(left, right),
        SortOrder::Descending => compare_values(right, left),
      };
      if ordering != Ordering::Equal {
        return ordering;
      }
    }
    Ordering::Equal
  }
}

impl Default for SortSpec {
  /// Newest first.
  fn default() -> Self {
    SortSpec::by("id", SortOrder::Descending)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn parses_mixed_directions() {
    let spec = SortSpec::parse("-price, productName,+category").unwrap();
    assert_eq!(
      spec,
      SortSpec::by("price", SortOrder::Descending)
        .then("productName", SortOrder::Ascending)
        .then("category", SortOrder::Ascending)
    );
  }

  #[test]
  fn rejects_bare_dash_and_empty_input() {
    assert!(SortSpec::parse("-").is_err());
    assert!(SortSpec::parse(" , ").is_err());
  }

  #[test]
  fn later_keys_break_ties() {
    let spec = SortSpec::by("category", SortOrder::Ascending).then("price", SortOrder::Descending);
    let a = json!({"category": "books", "price": 10});
    let b = json!({"category": "books", "price": 20});
    let c = json!({"category": "apps", "price": 5});
    let mut docs = vec![a.clone(), b.clone(), c.clone()];
    docs.sort_by(|x, y| spec.compare(x, y));
    assert_eq!(docs, vec![c, b, a]);
  }

  #[test]
  fn default_is_id_descending() {
    assert_eq!(SortSpec::default().keys()[0].order, SortOrder::Descending);
    assert_eq!(SortSpec::default().keys()[0].field, "id");
  }
}
