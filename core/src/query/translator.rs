// storefront_catalog/src/query/translator.rs

//! Turns a listing request (free-form filters, `search`, sort and page
//! directives) into store criteria plus resolved options.

use serde_json::{Map, Number, Value};
use tracing::debug;

use super::criteria::{Condition, Criteria, SearchPattern};
use super::sort::SortSpec;
use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 12;

/// Filter key carrying the free-text search token.
pub const SEARCH_KEY: &str = "search";
/// Field the search token is matched against.
pub const SEARCH_FIELD: &str = "productName";

const SORT_PARAM: &str = "sort";
const SKIP_PARAM: &str = "skip";
const LIMIT_PARAM: &str = "limit";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
  /// Equality filters, possibly including `search`.
  pub filters: Map<String, Value>,
  pub sort: Option<SortSpec>,
  pub skip: Option<i64>,
  pub limit: Option<i64>,
}

impl ListRequest {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filters.insert(field.into(), value.into());
    self
  }

  pub fn search(self, token: impl Into<String>) -> Self {
    self.filter(SEARCH_KEY, Value::String(token.into()))
  }

  pub fn sort(mut self, sort: SortSpec) -> Self {
    self.sort = Some(sort);
    self
  }

  pub fn skip(mut self, skip: i64) -> Self {
    self.skip = Some(skip);
    self
  }

  pub fn limit(mut self, limit: i64) -> Self {
    self.limit = Some(limit);
    self
  }

  /// Builds a request from decoded query-string pairs.
  ///
  /// `sort`, `skip` and `limit` are directives; every other key is a filter.
  /// Filter values `true`/`false` become booleans and numeric literals become
  /// numbers; `search` always stays text. A repeated key keeps its last value.
  pub fn from_query_pairs<I, K, V>(pairs: I) -> CatalogResult<Self>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut request = ListRequest::new();
    for (key, value) in pairs {
      let (key, value) = (key.as_ref(), value.as_ref());
      match key {
        SORT_PARAM => {
          request.sort = if value.trim().is_empty() {
            None
          } else {
            Some(SortSpec::parse(value)?)
          };
        }
        SKIP_PARAM => request.skip = parse_integer(SKIP_PARAM, value)?,
        LIMIT_PARAM => request.limit = parse_integer(LIMIT_PARAM, value)?,
        SEARCH_KEY => {
          request.filters.insert(key.to_string(), Value::String(value.to_string()));
        }
        _ => {
          request.filters.insert(key.to_string(), coerce_query_value(value));
        }
      }
    }
    Ok(request)
  }
}

/// Resolved sort and page window.
///
/// Values are kept exactly as supplied; stores read the window through
/// [`ListOptions::window`], which clamps negatives to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
  pub sort: SortSpec,
  pub skip: i64,
  pub limit: i64,
}

impl ListOptions {
  /// `(skip, limit)` as counts. A non-positive limit gives an empty window.
  pub fn window(&self) -> (usize, usize) {
    let clamp = |n: i64| usize::try_from(n.max(0)).unwrap_or(usize::MAX);
    (clamp(self.skip), clamp(self.limit))
  }
}

impl Default for ListOptions {
  fn default() -> Self {
    Self {
      sort: SortSpec::default(),
      skip: DEFAULT_SKIP,
      limit: DEFAULT_LIMIT,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
  pub criteria: Criteria,
  pub options: ListOptions,
}

/// Produces store criteria and resolved options for a listing request.
///
/// `search` is removed from the filters and becomes a case-insensitive match on
/// `productName`, overwriting any literal `productName` filter. All other keys
/// pass through as equality conditions, unknown ones included.
pub fn translate(request: ListRequest) -> TranslatedQuery {
  let ListRequest {
    mut filters,
    sort,
    skip,
    limit,
  } = request;

  let search = filters.remove(SEARCH_KEY);

  let mut criteria = Criteria::new();
  for (field, value) in filters {
    criteria.insert(field, Condition::Equals(value));
  }

  if let Some(token) = search.and_then(search_token) {
    let replaced = criteria.insert(SEARCH_FIELD, Condition::Matches(SearchPattern::new(&token)));
    if replaced.is_some() {
      debug!(field = SEARCH_FIELD, "Search token overrides literal filter.");
    }
  }

  let options = ListOptions {
    sort: sort.unwrap_or_default(),
    skip: skip.unwrap_or(DEFAULT_SKIP),
    limit: limit.unwrap_or(DEFAULT_LIMIT),
  };

  debug!(conditions = criteria.len(), ?options, "Listing request translated.");
  TranslatedQuery { criteria, options }
}

fn search_token(value: Value) -> Option<String> {
  let token = match value {
    Value::Null => return None,
    Value::String(s) => s,
    other => other.to_string(),
  };
  if token.is_empty() {
    None
  } else {
    Some(token)
  }
}

fn parse_integer(param: &str, raw: &str) -> CatalogResult<Option<i64>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  raw
    .parse::<i64>()
    .map(Some)
    .map_err(|_| CatalogError::Validation(format!("'{}' must be an integer, got '{}'.", param, raw)))
}

fn coerce_query_value(raw: &str) -> Value {
  match raw {
    "true" => return Value::Bool(true),
    "false" => return Value::Bool(false),
    _ => {}
  }
  if let Ok(n) = raw.parse::<i64>() {
    return Value::Number(n.into());
  }
  let looks_decimal = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-');
  if looks_decimal {
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
      return Value::Number(n);
    }
  }
  Value::String(raw.to_string())
}
