use std::collections::HashMap;
use std::str::FromStr;

use crate::error::Error;

/// Source of concrete values for wildcards.
///
/// Lookups must be side-effect free and return the same candidates in the
/// same order for a fixed dataset. Unknown names give no candidates.
pub trait KnowledgeBase {
  fn by_name(&self, name: &str) -> Vec<String>;
}

impl KnowledgeBase for HashMap<String, Vec<String>> {
  fn by_name(&self, name: &str) -> Vec<String> {
    self.get(name).cloned().unwrap_or_default()
  }
}

/// An in-memory knowledge base that keeps values in insertion order.
///
/// Parses from lines of `name: value | value`:
///
/// ```
/// use gpsrgen::knowledge::{Catalog, KnowledgeBase};
///
/// let kb: Catalog = "
///   person: alice | bob
///   room: living room | kitchen
/// ".parse().unwrap();
///
/// assert_eq!(kb.by_name("room"), vec!["living room", "kitchen"]);
/// assert!(kb.by_name("drink").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
  entries: HashMap<String, Vec<String>>,
}

impl Catalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.entries.entry(name.into()).or_default().push(value.into());
  }

  pub fn len(&self) -> usize {
    self.entries.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl KnowledgeBase for Catalog {
  fn by_name(&self, name: &str) -> Vec<String> {
    self.entries.by_name(name)
  }
}

impl FromStr for Catalog {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut catalog = Self::new();
    for line in s.lines().map(str::trim) {
      if line.is_empty() || line.starts_with('#') {
        continue;
      }
      let Some((name, values)) = line.split_once(':') else {
        return Err(Error::parse(line, "expected `name: value | value`"));
      };
      let name = name.trim();
      if name.is_empty() {
        return Err(Error::parse(line, "missing category name"));
      }
      for value in values.split('|').map(str::trim).filter(|v| !v.is_empty()) {
        catalog.insert(name, value);
      }
    }
    Ok(catalog)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_repeated_names_accumulate() {
    let kb: Catalog = "# people\nperson: alice\nperson: bob | carol\n".parse().unwrap();
    assert_eq!(kb.by_name("person"), vec!["alice", "bob", "carol"]);
    assert_eq!(kb.len(), 3);
  }

  #[test]
  fn test_malformed_catalog() {
    assert!("person alice".parse::<Catalog>().is_err());
    assert!(": alice".parse::<Catalog>().is_err());
  }

  #[test]
  fn test_hashmap_knowledge_base() {
    let mut map = HashMap::new();
    map.insert("drink".to_string(), vec!["tea".to_string(), "juice".to_string()]);
    assert_eq!(map.by_name("drink"), vec!["tea", "juice"]);
    assert!(map.by_name("snack").is_empty());
  }
}
