// storefront_catalog/src/pipeline/definition.rs

//! Contains the `Pipeline` struct and the `Stage` vocabulary it is built from.

use crate::query::{Criteria, ListOptions, SortSpec};

/// Field holding the embedded SKU sequence.
pub const SKU_FIELD: &str = "skuDetails";
/// Identity field used to collapse unwound rows back into products.
pub const ID_FIELD: &str = "id";

/// Fields that listing results must never carry.
pub const LISTING_EXCLUSIONS: [&str; 3] = ["skuDetails.licenceKeys", "feedbackDetails.info", "imageDetails"];

/// One aggregation step over a stream of JSON documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
  /// Keeps documents satisfying every condition.
  Match(Criteria),
  /// Stable sort.
  Sort(SortSpec),
  Skip(usize),
  Limit(usize),
  /// Emits one row per element of the array at `path`, with `path` holding
  /// that element. With `preserve_empty`, documents whose array is empty or
  /// missing pass through once with the field removed.
  Unwind { path: String, preserve_empty: bool },
  /// Removes each dotted path; paths crossing arrays apply to every element.
  Project { exclude: Vec<String> },
  /// Collapses rows sharing `key` into the first row seen (first-appearance
  /// order), gathering each row's `collect` value back into an array.
  Regroup { key: String, collect: String },
}

impl Stage {
  pub fn name(&self) -> &'static str {
    match self {
      Stage::Match(_) => "match",
      Stage::Sort(_) => "sort",
      Stage::Skip(_) => "skip",
      Stage::Limit(_) => "limit",
      Stage::Unwind { .. } => "unwind",
      Stage::Project { .. } => "project",
      Stage::Regroup { .. } => "regroup",
    }
  }
}

/// Ordered list of stages, run front to back by [`Pipeline::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
  pub(crate) stages: Vec<Stage>,
}

impl Pipeline {
  pub fn new(stages: Vec<Stage>) -> Self {
    Self { stages }
  }

  /// The product listing: match, sort, page window, then per-SKU redaction
  /// through unwind / project / regroup.
  ///
  /// The page window is taken before unwinding, so it counts products, not SKUs.
  pub fn listing(criteria: &Criteria, options: &ListOptions) -> Self {
    let (skip, limit) = options.window();
    Self::new(vec![
      Stage::Match(criteria.clone()),
      Stage::Sort(options.sort.clone()),
      Stage::Skip(skip),
      Stage::Limit(limit),
      Stage::Unwind {
        path: SKU_FIELD.to_string(),
        preserve_empty: true,
      },
      Stage::Project {
        exclude: LISTING_EXCLUSIONS.iter().map(|p| p.to_string()).collect(),
      },
      Stage::Regroup {
        key: ID_FIELD.to_string(),
        collect: SKU_FIELD.to_string(),
      },
    ])
  }

  pub fn stages(&self) -> &[Stage] {
    &self.stages
  }

  pub fn push(&mut self, stage: Stage) {
    self.stages.push(stage);
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }
}
