// storefront_catalog/src/query/criteria.rs

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::BTreeMap;

use super::document::{field_matches, resolve};

/// Case-insensitive substring match built from a caller's `search` token.
///
/// The token is used as a regular expression. A token that does not compile
/// is matched literally instead.
#[derive(Debug, Clone)]
pub struct SearchPattern {
  source: String,
  regex: Option<Regex>,
  literal: bool,
}

impl SearchPattern {
  pub fn new(token: &str) -> Self {
    match RegexBuilder::new(token).case_insensitive(true).build() {
      Ok(regex) => Self {
        source: token.to_string(),
        regex: Some(regex),
        literal: false,
      },
      Err(err) => {
        tracing::debug!(error = %err, token, "Search token is not a valid pattern; matching it literally.");
        Self::escaped(token)
      }
    }
  }

  fn escaped(token: &str) -> Self {
    let escaped = regex::escape(token);
    // Only fails past the compiled-size limit; such a token matches nothing.
    let regex = RegexBuilder::new(&escaped).case_insensitive(true).build().ok();
    Self {
      source: escaped,
      regex,
      literal: true,
    }
  }

  /// The same token matched as plain text. Used when a store's regex dialect
  /// rejects a pattern this crate accepted.
  pub fn literal(&self) -> Self {
    if self.literal {
      return self.clone();
    }
    Self::escaped(&self.source)
  }

  pub fn is_literal(&self) -> bool {
    self.literal
  }

  /// Pattern text as handed to the store (always a valid expression).
  pub fn as_str(&self) -> &str {
    &self.source
  }

  pub fn is_match(&self, text: &str) -> bool {
    self.regex.as_ref().is_some_and(|r| r.is_match(text))
  }

  fn matches_value(&self, candidate: &Value) -> bool {
    match candidate {
      Value::String(s) => self.is_match(s),
      Value::Array(items) => items.iter().any(|item| matches!(item, Value::String(s) if self.is_match(s))),
      _ => false,
    }
  }
}

impl PartialEq for SearchPattern {
  fn eq(&self, other: &Self) -> bool {
    self.source == other.source
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  /// Exact match; arrays match when any element does.
  Equals(Value),
  Matches(SearchPattern),
}

impl Condition {
  fn is_satisfied_by(&self, candidates: &[&Value]) -> bool {
    match self {
      Condition::Equals(expected) => {
        if candidates.is_empty() {
          // A missing field only equals an explicit null.
          return expected.is_null();
        }
        candidates.iter().any(|c| field_matches(c, expected))
      }
      Condition::Matches(pattern) => candidates.iter().any(|c| pattern.matches_value(c)),
    }
  }
}

/// Filter applied to select products: field path -> condition, all of which
/// must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
  conditions: BTreeMap<String, Condition>,
}

impl Criteria {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.insert(field, Condition::Equals(value.into()));
    self
  }

  /// Sets the condition for `field`, replacing any earlier one.
  pub fn insert(&mut self, field: impl Into<String>, condition: Condition) -> Option<Condition> {
    self.conditions.insert(field.into(), condition)
  }

  pub fn remove(&mut self, field: &str) -> Option<Condition> {
    self.conditions.remove(field)
  }

  pub fn get(&self, field: &str) -> Option<&Condition> {
    self.conditions.get(field)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
    self.conditions.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.conditions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.conditions.is_empty()
  }

  pub fn has_patterns(&self) -> bool {
    self.conditions.values().any(|c| matches!(c, Condition::Matches(_)))
  }

  /// Copy with every search pattern turned into a literal match.
  pub fn with_literal_patterns(&self) -> Self {
    let conditions = self
      .conditions
      .iter()
      .map(|(field, condition)| {
        let condition = match condition {
          Condition::Matches(pattern) => Condition::Matches(pattern.literal()),
          other => other.clone(),
        };
        (field.clone(), condition)
      })
      .collect();
    Self { conditions }
  }

  pub fn matches(&self, doc: &Value) -> bool {
    self
      .conditions
      .iter()
      .all(|(field, condition)| condition.is_satisfied_by(&resolve(doc, field)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn doc() -> Value {
    json!({
      "productName": "Windows 11 Pro",
      "category": "operating-systems",
      "isSoldOut": false,
      "tags": ["desktop", "licence"],
      "skuDetails": [{"skuName": "1 PC", "price": 120}, {"skuName": "3 PC", "price": 300}]
    })
  }

  #[test]
  fn empty_criteria_matches_everything() {
    assert!(Criteria::new().matches(&doc()));
  }

  #[test]
  fn equality_is_exact_and_conjunctive() {
    let c = Criteria::new()
      .with_equals("category", "operating-systems")
      .with_equals("isSoldOut", false);
    assert!(c.matches(&doc()));

    let c = c.with_equals("category", "Operating-Systems");
    assert!(!c.matches(&doc()));
  }

  #[test]
  fn unknown_keys_simply_do_not_match() {
    let c = Criteria::new().with_equals("colour", "red");
    assert!(!c.matches(&doc()));
  }

  #[test]
  fn nested_paths_match_any_sku() {
    assert!(Criteria::new().with_equals("skuDetails.price", 300).matches(&doc()));
    assert!(!Criteria::new().with_equals("skuDetails.price", 301).matches(&doc()));
    assert!(Criteria::new().with_equals("tags", "licence").matches(&doc()));
  }

  #[test]
  fn search_pattern_is_case_insensitive_substring() {
    let mut c = Criteria::new();
    c.insert("productName", Condition::Matches(SearchPattern::new("windows")));
    assert!(c.matches(&doc()));
    c.insert("productName", Condition::Matches(SearchPattern::new("^pro")));
    assert!(!c.matches(&doc()));
  }

  #[test]
  fn invalid_search_pattern_falls_back_to_literal() {
    let pattern = SearchPattern::new("c++ (");
    assert!(pattern.is_match("Learning C++ (2nd ed)"));
    assert!(!pattern.is_match("C"));
    assert_eq!(pattern.as_str(), regex::escape("c++ ("));
  }

  #[test]
  fn literal_copy_escapes_patterns_once() {
    let pattern = SearchPattern::new(r"(?<n>win)");
    assert!(!pattern.is_literal());
    let literal = pattern.literal();
    assert!(literal.is_literal());
    assert_eq!(literal.as_str(), regex::escape("(?<n>win)"));
    assert!(literal.is_match("x(?<N>WIN)y"));
    assert!(!literal.is_match("windows"));
    // An already literal pattern is not escaped a second time.
    assert_eq!(literal.literal().as_str(), literal.as_str());
  }

  #[test]
  fn literal_criteria_keep_equality_conditions() {
    let mut c = Criteria::new().with_equals("category", "books");
    assert!(!c.has_patterns());
    c.insert("productName", Condition::Matches(SearchPattern::new(r"\p{L}indows")));
    assert!(c.has_patterns());

    let literal = c.with_literal_patterns();
    assert_eq!(literal.get("category"), Some(&Condition::Equals(json!("books"))));
    match literal.get("productName") {
      Some(Condition::Matches(p)) => assert!(p.is_literal()),
      other => panic!("Expected a literal pattern, got {:?}", other),
    }
  }
}
