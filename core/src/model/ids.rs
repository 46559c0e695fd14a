// storefront_catalog/src/model/ids.rs

//! Typed identifiers for products and their embedded SKUs.
//!
//! Both are UUIDv7, so lexical order of the hyphenated form follows creation
//! time. The default listing sort (`id` descending) relies on that.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

/// Unique within its parent product only.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuId(Uuid);

macro_rules! impl_id_newtype {
  ($t:ty) => {
    impl $t {
      pub fn new() -> Self {
        Self(Uuid::now_v7())
      }

      pub fn as_uuid(&self) -> &Uuid {
        &self.0
      }
    }

    impl Default for $t {
      fn default() -> Self {
        Self::new()
      }
    }

    impl std::fmt::Display for $t {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
      }
    }

    impl From<Uuid> for $t {
      fn from(value: Uuid) -> Self {
        Self(value)
      }
    }

    impl From<$t> for Uuid {
      fn from(value: $t) -> Self {
        value.0
      }
    }

    impl FromStr for $t {
      type Err = uuid::Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
      }
    }
  };
}

impl_id_newtype!(ProductId);
impl_id_newtype!(SkuId);
