//! Grounding wildcards against a knowledge base.
//!
//! [`GroundingEngine::search`] enumerates every assignment of candidate
//! values to the wildcards of a tree such that wildcards sharing a name but
//! carrying different ids get different values. The search is depth-first
//! over an explicit stack, so callers can stop pulling at any point.
//!
//! Nothing is memoized: a tree with many unconstrained wildcards has a search
//! space the size of the full product of their candidate lists.

use std::collections::HashMap;
use std::fmt;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::knowledge::KnowledgeBase;
use crate::tree::{Tree, Wildcard};

/// The order wildcards are resolved in. Constraints only point from later
/// wildcards back to earlier ones, which is enough because the search fills
/// wildcards in this same order.
fn traversal(tree: &Tree) -> impl Iterator<Item = &Wildcard> {
  tree.wildcards()
}

#[derive(Debug, Clone, PartialEq)]
enum Constraint {
  /// Unresolved; must differ from whatever these wildcards were given
  DistinctFrom(Vec<Wildcard>),
  Fixed(String),
}

/// Per-wildcard distinctness bookkeeping for one search branch.
///
/// Wildcards without an id never get an entry and never constrain others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints(HashMap<Wildcard, Constraint>);

impl Constraints {
  pub fn build(tree: &Tree) -> Self {
    let mut entries = HashMap::new();
    let mut processed: Vec<&Wildcard> = Vec::new();

    for wildcard in traversal(tree).filter(|w| !w.is_free()) {
      let earlier = processed
        .iter()
        .filter(|v| v.name == wildcard.name && v.id != wildcard.id)
        .map(|v| (*v).clone())
        .collect();
      entries.insert(wildcard.clone(), Constraint::DistinctFrom(earlier));
      if !processed.contains(&wildcard) {
        processed.push(wildcard);
      }
    }

    Self(entries)
  }

  /// The earlier wildcards `wildcard` must differ from, while unresolved
  pub fn distinct_from(&self, wildcard: &Wildcard) -> &[Wildcard] {
    match self.0.get(wildcard) {
      Some(Constraint::DistinctFrom(others)) => others.as_slice(),
      _ => &[],
    }
  }

  pub fn value_of(&self, wildcard: &Wildcard) -> Option<&str> {
    match self.0.get(wildcard) {
      Some(Constraint::Fixed(value)) => Some(value.as_str()),
      _ => None,
    }
  }

  fn admits(&self, wildcard: &Wildcard, candidate: &str) -> bool {
    // resolved wildcards are substituted out of the tree, so only open ones
    // are ever checked here
    match self.0.get(wildcard) {
      Some(Constraint::DistinctFrom(others)) => {
        others.iter().all(|other| self.value_of(other) != Some(candidate))
      }
      _ => true,
    }
  }

  fn fix(&mut self, wildcard: &Wildcard, value: &str) {
    self
      .0
      .insert(wildcard.clone(), Constraint::Fixed(value.to_string()));
  }
}

/// Grounds trees against a borrowed knowledge base
pub struct GroundingEngine<'kb, K: KnowledgeBase + ?Sized> {
  kb: &'kb K,
}

impl<'kb, K: KnowledgeBase + ?Sized> GroundingEngine<'kb, K> {
  pub fn new(kb: &'kb K) -> Self {
    Self { kb }
  }

  /// Lazily enumerates every grounding of `tree`. Each call starts a fresh
  /// search; `tree` itself is never modified.
  pub fn search(&self, tree: &Tree) -> Groundings<'kb, K> {
    Groundings {
      kb: self.kb,
      start: Some((tree.clone(), Constraints::build(tree))),
      stack: Vec::new(),
    }
  }

  /// The first grounding `search` would produce
  pub fn ground(&self, tree: &Tree) -> Result<Tree> {
    self
      .search(tree)
      .next()
      .ok_or_else(|| Error::NoGroundingFound {
        tree: tree.to_string(),
      })
  }
}

/// One open choice point: a partially grounded tree and the candidates
/// left to try for its next wildcard
struct Frame {
  tree: Tree,
  constraints: Constraints,
  wildcard: Wildcard,
  candidates: std::vec::IntoIter<String>,
}

impl Frame {
  fn next_admissible(&mut self) -> Option<String> {
    let Self {
      constraints,
      wildcard,
      candidates,
      ..
    } = self;
    candidates.find(|c| constraints.admits(wildcard, c))
  }
}

impl fmt::Debug for Frame {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Frame({} at {})", self.wildcard, self.tree)
  }
}

/// Iterator returned by [`GroundingEngine::search`]
pub struct Groundings<'kb, K: KnowledgeBase + ?Sized> {
  kb: &'kb K,
  start: Option<(Tree, Constraints)>,
  stack: Vec<Frame>,
}

impl<K: KnowledgeBase + ?Sized> Groundings<'_, K> {
  /// Returns the tree if it is fully grounded, otherwise opens a frame for
  /// its first remaining wildcard
  fn descend(&mut self, tree: Tree, constraints: Constraints) -> Option<Tree> {
    let Some(wildcard) = traversal(&tree).next().cloned() else {
      return Some(tree);
    };

    let candidates = self.kb.by_name(&wildcard.name);
    if candidates.is_empty() {
      warn!(%wildcard, "no candidates in knowledge base");
    }
    trace!(
      depth = self.stack.len(),
      %wildcard,
      candidates = candidates.len(),
      "opening frame"
    );

    self.stack.push(Frame {
      tree,
      constraints,
      wildcard,
      candidates: candidates.into_iter(),
    });
    None
  }
}

impl<K: KnowledgeBase + ?Sized> Iterator for Groundings<'_, K> {
  type Item = Tree;

  fn next(&mut self) -> Option<Tree> {
    if let Some((tree, constraints)) = self.start.take() {
      if let Some(grounded) = self.descend(tree, constraints) {
        return Some(grounded);
      }
    }

    while let Some(frame) = self.stack.last_mut() {
      let Some(candidate) = frame.next_admissible() else {
        // exhausted, backtrack
        self.stack.pop();
        continue;
      };

      let mut constraints = frame.constraints.clone();
      constraints.fix(&frame.wildcard, &candidate);
      let tree = frame.tree.substitute(&frame.wildcard, &candidate);

      if let Some(grounded) = self.descend(tree, constraints) {
        return Some(grounded);
      }
    }

    None
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;
  use std::collections::HashSet;

  use super::*;
  use crate::knowledge::Catalog;
  use crate::parse_grammar::{GrammarParser, Notation};

  fn tree(s: &str) -> Tree {
    Notation.parse_sequence(s).unwrap()
  }

  fn people(names: &[&str]) -> Catalog {
    let mut kb = Catalog::new();
    for name in names {
      kb.insert("person", *name);
    }
    kb
  }

  fn all(kb: &Catalog, s: &str) -> Vec<String> {
    GroundingEngine::new(kb)
      .search(&tree(s))
      .map(|t| t.to_string())
      .collect()
  }

  #[test]
  fn test_coindexed_wildcards_differ() {
    let kb = people(&["alice", "bob"]);
    assert_eq!(
      all(&kb, "{person 1} greets {person 2}"),
      vec!["alice greets bob", "bob greets alice"]
    );
  }

  #[test]
  fn test_unsatisfiable() {
    let kb = people(&["alice"]);
    let t = tree("{person 1} greets {person 2}");
    let engine = GroundingEngine::new(&kb);

    assert_eq!(engine.search(&t).count(), 0);
    assert!(matches!(
      engine.ground(&t),
      Err(Error::NoGroundingFound { .. })
    ));
  }

  #[test]
  fn test_unknown_name_gives_nothing() {
    let kb = people(&["alice"]);
    assert!(all(&kb, "bring the {drink}").is_empty());
  }

  #[test]
  fn test_free_wildcards_may_repeat() {
    let kb = people(&["alice", "bob"]);
    assert_eq!(
      all(&kb, "{person} greets {person 1}"),
      vec![
        "alice greets alice",
        "alice greets bob",
        "bob greets alice",
        "bob greets bob",
      ]
    );
  }

  #[test]
  fn test_repeated_wildcard_gets_one_value() {
    let kb = people(&["alice", "bob"]);
    assert_eq!(
      all(&kb, "{person 1} said {person 1} left"),
      vec!["alice said alice left", "bob said bob left"]
    );
  }

  #[test]
  fn test_completeness() {
    let mut kb = people(&["alice", "bob", "carol"]);
    kb.insert("room", "kitchen");
    kb.insert("room", "bedroom");

    let groundings = all(&kb, "{person 1} {person 2} {person 3} in the {room}");
    // 3! orderings of people times 2 rooms
    assert_eq!(groundings.len(), 12);
    let unique = groundings.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), groundings.len());

    for g in groundings.iter() {
      let words = g.split(' ').collect::<Vec<_>>();
      assert_ne!(words[0], words[1]);
      assert_ne!(words[1], words[2]);
      assert_ne!(words[0], words[2]);
    }
  }

  #[test]
  fn test_grounding_leaves_input_alone() {
    let kb = people(&["alice", "bob"]);
    let t = tree("{person 1} greets {person 2}");
    let grounded = GroundingEngine::new(&kb).ground(&t).unwrap();

    assert_eq!(grounded.to_string(), "alice greets bob");
    assert!(!grounded.has_placeholders());
    assert_eq!(t.wildcards().count(), 2);
  }

  #[test]
  fn test_search_restarts_from_the_top() {
    let kb = people(&["alice", "bob", "carol"]);
    let t = tree("{person 1} and {person 2}");
    let engine = GroundingEngine::new(&kb);
    let first = engine.search(&t).collect::<Vec<_>>();
    let second = engine.search(&t).collect::<Vec<_>>();
    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
  }

  #[test]
  fn test_constraints_point_backwards() {
    let t = tree("{person 1} {room 1} {person 2} {person} {person 3}");
    let constraints = Constraints::build(&t);
    let p = |id: &str| Wildcard::with_id("person", id);

    assert!(constraints.distinct_from(&p("1")).is_empty());
    assert_eq!(constraints.distinct_from(&p("2")), &[p("1")]);
    assert_eq!(constraints.distinct_from(&p("3")), &[p("1"), p("2")]);
    assert!(constraints.distinct_from(&Wildcard::with_id("room", "1")).is_empty());
    assert_eq!(constraints.0.get(&Wildcard::new("person")), None);
  }

  struct CountingKb {
    lookups: Cell<usize>,
  }

  impl KnowledgeBase for CountingKb {
    fn by_name(&self, _name: &str) -> Vec<String> {
      self.lookups.set(self.lookups.get() + 1);
      (0..10).map(|i| i.to_string()).collect()
    }
  }

  #[test]
  fn test_search_is_lazy() {
    let kb = CountingKb {
      lookups: Cell::new(0),
    };
    // 10^8 groundings if fully enumerated
    let t = Tree::sequence(
      (0..8)
        .map(|i| Tree::wildcard(Wildcard::new(format!("n{}", i))))
        .collect(),
    );

    let first = GroundingEngine::new(&kb)
      .search(&t)
      .take(3)
      .map(|t| t.to_string())
      .collect::<Vec<_>>();

    assert_eq!(
      first,
      vec![
        "0 0 0 0 0 0 0 0",
        "0 0 0 0 0 0 0 1",
        "0 0 0 0 0 0 0 2"
      ]
    );
    // one lookup per level on the way down, nothing more
    assert_eq!(kb.lookups.get(), 8);
  }

  #[test]
  fn test_dyn_knowledge_base() {
    let kb = people(&["alice", "bob"]);
    let dynamic: &dyn KnowledgeBase = &kb;
    let engine = GroundingEngine::new(dynamic);
    assert_eq!(engine.search(&tree("{person 1} {person 2}")).count(), 2);
  }
}
