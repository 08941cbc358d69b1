//! Expansion of compact grammar shorthand into explicit alternatives.
//!
//! A rule like `$greet -> (hello | hi) there [friend]` stands for four
//! productions. [`expand`] enumerates all of them, keeping everything that
//! isn't a choice point identical across the outputs.

use crate::tree::{Label, Tree};
use crate::utils::combinations;

/// Expands every choice group and optional group in `tree`, returning one
/// explicit tree per combination of choices.
///
/// Output order is deterministic: choice points further left vary slowest,
/// alternatives keep their written order, and an optional group yields its
/// "present" form before its "absent" one. A tree with no shorthand comes
/// back as a single-element list holding an equal tree.
pub fn expand(tree: &Tree) -> Vec<Tree> {
  match tree {
    Tree::Leaf(_) => vec![tree.clone()],
    Tree::Branch(Label::Choice, alternatives) => alternatives.iter().flat_map(expand).collect(),
    Tree::Branch(Label::Optional, children) => {
      let mut expansions = expand(&Tree::sequence(children.clone()));
      expansions.push(Tree::sequence(Vec::new()));
      expansions
    }
    Tree::Branch(label, children) => {
      let child_runs = children.iter().map(child_runs).collect::<Vec<_>>();
      combinations(&child_runs)
        .into_iter()
        .map(|picked| Tree::Branch(label.clone(), picked.into_iter().flatten().collect()))
        .collect()
    }
  }
}

/// Every run of trees a child can contribute to its parent's child list.
/// Sequences produced by a shorthand child are spliced into the parent so
/// no grouping survives expansion.
fn child_runs(child: &Tree) -> Vec<Vec<Tree>> {
  let splice = child
    .get_branch()
    .map(|(label, _)| label.is_shorthand())
    .unwrap_or(false);

  expand(child)
    .into_iter()
    .map(|expansion| match expansion {
      Tree::Branch(Label::Sequence, items) if splice => items,
      other => vec![other],
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_grammar::{GrammarParser, Notation};

  fn expand_str(s: &str) -> Vec<String> {
    let tree = Notation.parse_sequence(s).unwrap();
    expand(&tree).iter().map(|t| t.to_string()).collect()
  }

  #[test]
  fn test_greeting_alternatives() {
    assert_eq!(expand_str("(hello|hi) there"), vec!["hello there", "hi there"]);
  }

  #[test]
  fn test_cardinality_is_product() {
    let expansions = expand_str("(a | b | c) x (d | e) [f] y");
    assert_eq!(expansions.len(), 3 * 2 * 2);
    assert_eq!(expansions[0], "a x d f y");
    assert_eq!(expansions[1], "a x d y");
    assert_eq!(expansions[11], "c x e y");

    for tree in expand(&Notation.parse_sequence("(a | b | c) x (d | e) [f] y").unwrap()) {
      assert!(!tree.has_shorthand(), "leftover shorthand in {}", tree);
    }
  }

  #[test]
  fn test_nested_choice() {
    assert_eq!(
      expand_str("take the (red | big (blue | green)) {object}"),
      vec![
        "take the red {object}",
        "take the big blue {object}",
        "take the big green {object}",
      ]
    );
  }

  #[test]
  fn test_top_level_alternation() {
    assert_eq!(expand_str("go to the {room} | stop"), vec!["go to the {room}", "stop"]);
  }

  #[test]
  fn test_no_shorthand_is_identity() {
    let tree = Notation.parse_sequence("find a {object 1} in the $loc").unwrap();
    assert_eq!(expand(&tree), vec![tree.clone()]);

    let sem = Notation.parse_semantic_form("findObj($cat1, {object 1})").unwrap();
    assert_eq!(expand(&sem), vec![sem.clone()]);
  }

  #[test]
  fn test_expansion_is_stable() {
    let tree = Notation.parse_sequence("[please] (bring | give) me (it | {object})").unwrap();
    assert_eq!(expand(&tree), expand(&tree));
  }

  #[test]
  fn test_semantic_choice_and_optional_argument() {
    let sem = Notation
      .parse_semantic_form("(bring | give)(me, [{object}])")
      .map(|t| expand(&t).iter().map(|t| t.to_string()).collect::<Vec<_>>());
    // a choice can't name an application, only stand in for a term
    assert!(sem.is_err());

    let sem = Notation
      .parse_semantic_form("deliver((me | $person), [{object}])")
      .unwrap();
    assert_eq!(
      expand(&sem).iter().map(|t| t.to_string()).collect::<Vec<_>>(),
      vec![
        "deliver(me, {object})",
        "deliver(me)",
        "deliver($person, {object})",
        "deliver($person)",
      ]
    );
  }
}
