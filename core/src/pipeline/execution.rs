// storefront_catalog/src/pipeline/execution.rs

//! Contains `Pipeline::run()`, which pushes documents through each stage in order.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{event, instrument, span, Level};

use super::definition::{Pipeline, Stage};

impl Pipeline {
  /// Runs every stage over `docs` and returns the surviving rows.
  #[instrument(name = "Pipeline::run", skip_all, fields(num_stages = self.stages.len(), input_rows = docs.len()))]
  pub fn run(&self, docs: Vec<Value>) -> Vec<Value> {
    let mut rows = docs;
    for (stage_idx, stage) in self.stages.iter().enumerate() {
      let stage_span = span!(Level::DEBUG, "pipeline_stage", stage = stage.name(), stage_index = stage_idx);
      let _stage_span_guard = stage_span.enter();
      rows = stage.apply(rows);
      event!(Level::TRACE, rows = rows.len(), "Stage applied.");
    }
    event!(Level::DEBUG, output_rows = rows.len(), "Pipeline finished.");
    rows
  }
}

impl Stage {
  fn apply(&self, rows: Vec<Value>) -> Vec<Value> {
    match self {
      Stage::Match(criteria) => rows.into_iter().filter(|doc| criteria.matches(doc)).collect(),
      Stage::Sort(spec) => {
        let mut rows = rows;
        rows.sort_by(|a, b| spec.compare(a, b));
        rows
      }
      Stage::Skip(n) => rows.into_iter().skip(*n).collect(),
      Stage::Limit(n) => rows.into_iter().take(*n).collect(),
      Stage::Unwind { path, preserve_empty } => unwind(rows, path, *preserve_empty),
      Stage::Project { exclude } => rows
        .into_iter()
        .map(|mut doc| {
          for path in exclude {
            let segments: Vec<&str> = path.split('.').collect();
            remove_path(&mut doc, &segments);
          }
          doc
        })
        .collect(),
      Stage::Regroup { key, collect } => regroup(rows, key, collect),
    }
  }
}

fn unwind(rows: Vec<Value>, path: &str, preserve_empty: bool) -> Vec<Value> {
  let mut out = Vec::with_capacity(rows.len());
  for mut doc in rows {
    let Value::Object(map) = &mut doc else {
      continue;
    };
    match map.remove(path) {
      Some(Value::Array(items)) if !items.is_empty() => {
        for item in items {
          let mut row = map.clone();
          row.insert(path.to_string(), item);
          out.push(Value::Object(row));
        }
      }
      Some(Value::Array(_)) | Some(Value::Null) | None => {
        if preserve_empty {
          out.push(doc);
        }
      }
      // A scalar or object is treated as a one-element array.
      Some(single) => {
        map.insert(path.to_string(), single);
        out.push(doc);
      }
    }
  }
  out
}

fn remove_path(value: &mut Value, segments: &[&str]) {
  let Some((head, rest)) = segments.split_first() else {
    return;
  };
  match value {
    Value::Object(map) => {
      if rest.is_empty() {
        map.remove(*head);
      } else if let Some(child) = map.get_mut(*head) {
        remove_path(child, rest);
      }
    }
    Value::Array(items) => {
      for item in items {
        remove_path(item, segments);
      }
    }
    _ => {}
  }
}

fn regroup(rows: Vec<Value>, key: &str, collect: &str) -> Vec<Value> {
  let mut groups: Vec<(Map<String, Value>, Vec<Value>)> = Vec::new();
  let mut positions: HashMap<String, usize> = HashMap::new();

  for row in rows {
    let Value::Object(mut map) = row else {
      continue;
    };
    let group_key = map.get(key).map(Value::to_string).unwrap_or_default();
    let collected = map.remove(collect);

    let idx = match positions.get(&group_key) {
      Some(idx) => *idx,
      None => {
        positions.insert(group_key, groups.len());
        groups.push((map, Vec::new()));
        groups.len() - 1
      }
    };
    match collected {
      Some(Value::Null) | None => {}
      Some(value) => groups[idx].1.push(value),
    }
  }

  groups
    .into_iter()
    .map(|(mut first, collected)| {
      first.insert(collect.to_string(), Value::Array(collected));
      Value::Object(first)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pipeline::definition::LISTING_EXCLUSIONS;
  use serde_json::json;

  #[test]
  fn unwind_preserves_products_without_skus() {
    let rows = vec![
      json!({"id": "a", "skuDetails": [{"id": 1}, {"id": 2}]}),
      json!({"id": "b", "skuDetails": []}),
      json!({"id": "c"}),
    ];
    let out = unwind(rows, "skuDetails", true);
    assert_eq!(out.len(), 4);
    assert_eq!(out[0]["skuDetails"], json!({"id": 1}));
    assert_eq!(out[2], json!({"id": "b"}));
  }

  #[test]
  fn unwind_without_preserve_drops_empty_sequences() {
    let rows = vec![json!({"id": "b", "skuDetails": []})];
    assert!(unwind(rows, "skuDetails", false).is_empty());
  }

  #[test]
  fn project_strips_nested_and_array_paths() {
    let mut doc = json!({
      "imageDetails": {"url": "x"},
      "feedbackDetails": {"info": [1, 2], "rating": 4},
      "skuDetails": [{"id": 1, "licenceKeys": ["k"]}, {"id": 2}]
    });
    for path in LISTING_EXCLUSIONS {
      let segments: Vec<&str> = path.split('.').collect();
      remove_path(&mut doc, &segments);
    }
    assert_eq!(
      doc,
      json!({"feedbackDetails": {"rating": 4}, "skuDetails": [{"id": 1}, {"id": 2}]})
    );
  }

  #[test]
  fn regroup_keeps_first_appearance_order_and_collects_skus() {
    let rows = vec![
      json!({"id": "z", "name": "first", "skuDetails": {"id": 1}}),
      json!({"id": "a", "name": "second"}),
      json!({"id": "z", "name": "ignored", "skuDetails": {"id": 2}}),
    ];
    let out = regroup(rows, "id", "skuDetails");
    assert_eq!(
      out,
      vec![
        json!({"id": "z", "name": "first", "skuDetails": [{"id": 1}, {"id": 2}]}),
        json!({"id": "a", "name": "second", "skuDetails": []}),
      ]
    );
  }
}
