// storefront_catalog/src/query/document.rs

//! Field-path lookups and value comparisons over JSON documents, with the
//! semantics a document store applies to filters and sorts.

use serde_json::Value;
use std::cmp::Ordering;

/// Resolves a dotted path (`skuDetails.price`) against a document.
///
/// When a segment lands on an array, the next segment is looked up in every
/// object element, so one path can yield several candidates.
pub fn resolve<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
  let mut candidates = vec![doc];
  for segment in path.split('.') {
    let mut next = Vec::with_capacity(candidates.len());
    for candidate in candidates {
      match candidate {
        Value::Object(map) => next.extend(map.get(segment)),
        Value::Array(items) => {
          for item in items {
            if let Value::Object(map) = item {
              next.extend(map.get(segment));
            }
          }
        }
        _ => {}
      }
    }
    if next.is_empty() {
      return next;
    }
    candidates = next;
  }
  candidates
}

/// Equality used by filters: numbers compare by value (`5 == 5.0`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
      (Some(x), Some(y)) => x == y,
      _ => x == y,
    },
    _ => a == b,
  }
}

/// True when `candidate` equals `expected`, or is an array holding it.
pub fn field_matches(candidate: &Value, expected: &Value) -> bool {
  if values_equal(candidate, expected) {
    return true;
  }
  match candidate {
    Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
    _ => false,
  }
}

fn type_rank(value: Option<&Value>) -> u8 {
  match value {
    None | Some(Value::Null) => 0,
    Some(Value::Number(_)) => 1,
    Some(Value::String(_)) => 2,
    Some(Value::Object(_)) => 3,
    Some(Value::Array(_)) => 4,
    Some(Value::Bool(_)) => 5,
  }
}

/// Total order for sorting: missing/null < numbers < strings < objects <
/// arrays < booleans; values of the same kind compare naturally.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
  let (rank_a, rank_b) = (type_rank(a), type_rank(b));
  if rank_a != rank_b {
    return rank_a.cmp(&rank_b);
  }
  match (a, b) {
    (Some(Value::Number(x)), Some(Value::Number(y))) => {
      let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
      x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    }
    (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
    (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
    (Some(Value::Array(x)), Some(Value::Array(y))) => x.len().cmp(&y.len()),
    _ => Ordering::Equal,
  }
}
