//! Compiles shorthand grammar notation into explicit productions paired with
//! semantic forms, and grounds the wildcards in generated trees against a
//! knowledge base to produce labeled command data.

#[macro_use]
extern crate lazy_static;

pub mod error;
pub mod grounding;
pub mod knowledge;
pub mod loader;
pub mod parse_grammar;
pub mod rules;
pub mod shorthand;
pub mod tree;
pub mod utils;

pub use crate::error::{Error, Result};
pub use crate::grounding::{Constraints, GroundingEngine, Groundings};
pub use crate::knowledge::{Catalog, KnowledgeBase};
pub use crate::parse_grammar::{GrammarParser, Notation};
pub use crate::rules::{RuleStore, Symbol};
pub use crate::shorthand::expand;
pub use crate::tree::{Label, Leaf, Tree, Wildcard};

#[test]
fn test_rules_semantics_and_grounding() {
  let mut store = RuleStore::new();
  store
    .load_rules(
      &Notation,
      r#"
        # fetching
        $fetch -> (bring | give) me the {object 1} and the {object 2}
        $fetch -> find a $cat1
      "#
      .lines(),
    )
    .unwrap();
  store
    .load_semantics(
      &Notation,
      [
        "(bring | give) me the {object 1} and the {object 2} = deliver(me, {object 1}, {object 2})",
        "find a $cat1 = findObj($cat1)",
      ],
    )
    .unwrap();

  assert_eq!(store.alternatives("fetch").len(), 3);
  assert_eq!(store.semantics.len(), 3);

  let kb: Catalog = "object: apple | sponge".parse().unwrap();
  let engine = GroundingEngine::new(&kb);

  for production in store.alternatives("fetch") {
    let Some(semantics) = store.semantics_for(production) else {
      panic!("no semantics for {}", production);
    };
    // ground both sides together so they agree on values
    let pair = Tree::sequence(vec![production.clone(), semantics.clone()]);
    let wildcards = pair.wildcards().count();
    let groundings = engine.search(&pair).collect::<Vec<_>>();
    if wildcards == 0 {
      assert_eq!(groundings, vec![pair]);
    } else {
      assert_eq!(groundings.len(), 2);
      assert!(groundings.iter().all(|g| g.wildcards().next().is_none()));
    }
  }

  let bring = Notation
    .parse_sequence("bring me the {object 1} and the {object 2}")
    .unwrap();
  let sem = store.semantics_for(&bring).unwrap().clone();
  let grounded = engine
    .ground(&Tree::sequence(vec![bring, sem]))
    .unwrap()
    .to_string();
  assert_eq!(
    grounded,
    "bring me the apple and the sponge deliver(me, apple, sponge)"
  );
}
