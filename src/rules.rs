use std::collections::HashMap;
use std::fmt;

use crate::tree::Tree;

/// A nonterminal, written `$name` in grammar files
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
  pub name: String,
}

impl Symbol {
  pub fn new(name: String) -> Self {
    Self { name }
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "${}", self.name)
  }
}

/// The loaded grammar and its semantic annotations.
///
/// Built up by [`RuleStore::load_rules`] and [`RuleStore::load_semantics`],
/// then only read while generating.
#[derive(Debug, Default)]
pub struct RuleStore {
  /// nonterminal name -> alternatives, in load order. Repeated loads of the
  /// same nonterminal are concatenated without removing duplicates.
  pub rules: HashMap<String, Vec<Tree>>,
  /// production -> semantic form. Later registrations overwrite earlier ones.
  pub semantics: HashMap<Tree, Tree>,
}

impl RuleStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alternatives(&self, symbol: &str) -> &[Tree] {
    self.rules.get(symbol).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn semantics_for(&self, production: &Tree) -> Option<&Tree> {
    self.semantics.get(production)
  }

  pub(crate) fn add_alternatives(&mut self, symbol: Symbol, alternatives: Vec<Tree>) {
    self
      .rules
      .entry(symbol.name)
      .or_insert_with(Vec::new)
      .extend(alternatives);
  }
}

impl fmt::Display for RuleStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut symbols = self.rules.keys().collect::<Vec<_>>();
    symbols.sort();
    for symbol in symbols {
      for alternative in &self.rules[symbol] {
        writeln!(f, "${} -> {}", symbol, alternative)?;
      }
    }

    let mut pairs = self
      .semantics
      .iter()
      .map(|(prod, sem)| (prod.to_string(), sem.to_string()))
      .collect::<Vec<_>>();
    pairs.sort();
    for (prod, sem) in pairs {
      writeln!(f, "{}\n{}\n----------------", prod, sem)?;
    }

    Ok(())
  }
}
