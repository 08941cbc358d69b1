use std::collections::HashSet;
use std::fmt;

use crate::rules::Symbol;

/// A typed hole, resolved against the knowledge base during grounding.
/// Wildcards sharing a name but carrying different ids must be filled by
/// different values. A wildcard without an id is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Wildcard {
  pub name: String,
  pub id: Option<String>,
}

impl Wildcard {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      id: None,
    }
  }

  pub fn with_id(name: impl Into<String>, id: impl Into<String>) -> Self {
    let id = id.into();
    Self {
      name: name.into(),
      id: if id.is_empty() { None } else { Some(id) },
    }
  }

  pub fn is_free(&self) -> bool {
    self.id.is_none()
  }
}

impl fmt::Display for Wildcard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.id {
      Some(id) => write!(f, "{{{} {}}}", self.name, id),
      None => write!(f, "{{{}}}", self.name),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
  /// A run of items, rendered space separated
  Sequence,
  /// Shorthand: exactly one of the children
  Choice,
  /// Shorthand: the children, or nothing
  Optional,
  /// A semantic form applied to its children, `name(a, b)`
  Apply(String),
}

impl Label {
  pub fn is_shorthand(&self) -> bool {
    matches!(self, Self::Choice | Self::Optional)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Leaf {
  Word(String),
  Nonterminal(Symbol),
  Wildcard(Wildcard),
}

impl Leaf {
  /// Nonterminals and wildcards both still need filling in
  pub fn is_placeholder(&self) -> bool {
    !matches!(self, Self::Word(_))
  }
}

impl fmt::Display for Leaf {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Word(w) => write!(f, "{}", w),
      Self::Nonterminal(s) => write!(f, "{}", s),
      Self::Wildcard(w) => write!(f, "{}", w),
    }
  }
}

/// The structure shared by grammar productions, semantic annotations, and
/// their grounded instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tree {
  Branch(Label, Vec<Tree>),
  Leaf(Leaf),
}

impl Tree {
  pub fn word(w: impl Into<String>) -> Self {
    Self::Leaf(Leaf::Word(w.into()))
  }

  pub fn nonterminal(name: impl Into<String>) -> Self {
    Self::Leaf(Leaf::Nonterminal(Symbol::new(name.into())))
  }

  pub fn wildcard(w: Wildcard) -> Self {
    Self::Leaf(Leaf::Wildcard(w))
  }

  pub fn sequence(children: Vec<Tree>) -> Self {
    Self::Branch(Label::Sequence, children)
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn get_branch(&self) -> Option<(&Label, &Vec<Tree>)> {
    match self {
      Self::Branch(l, cs) => Some((l, cs)),
      _ => None,
    }
  }

  /// A branch with nothing under it, which is what blank and comment lines
  /// parse to
  pub fn is_empty(&self) -> bool {
    match self {
      Self::Branch(_, children) => children.is_empty(),
      Self::Leaf(_) => false,
    }
  }

  /// Leaves in pre-order, left to right
  pub fn leaves(&self) -> Leaves<'_> {
    Leaves { stack: vec![self] }
  }

  /// Wildcards in traversal order. Repeated occurrences are yielded each time.
  pub fn wildcards(&self) -> impl Iterator<Item = &Wildcard> {
    self.leaves().filter_map(|l| match l {
      Leaf::Wildcard(w) => Some(w),
      _ => None,
    })
  }

  pub fn placeholders(&self) -> HashSet<&Leaf> {
    self.leaves().filter(|l| l.is_placeholder()).collect()
  }

  pub fn has_placeholders(&self) -> bool {
    self.leaves().any(|l| l.is_placeholder())
  }

  pub fn has_shorthand(&self) -> bool {
    match self {
      Self::Leaf(_) => false,
      Self::Branch(label, children) => {
        label.is_shorthand() || children.iter().any(|c| c.has_shorthand())
      }
    }
  }

  /// Returns a copy with every occurrence of `target` replaced by `value`
  pub fn substitute(&self, target: &Wildcard, value: &str) -> Self {
    match self {
      Self::Leaf(Leaf::Wildcard(w)) if w == target => Self::word(value),
      Self::Leaf(_) => self.clone(),
      Self::Branch(label, children) => Self::Branch(
        label.clone(),
        children.iter().map(|c| c.substitute(target, value)).collect(),
      ),
    }
  }
}

pub struct Leaves<'a> {
  stack: Vec<&'a Tree>,
}

impl<'a> Iterator for Leaves<'a> {
  type Item = &'a Leaf;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(tree) = self.stack.pop() {
      match tree {
        Tree::Leaf(leaf) => return Some(leaf),
        Tree::Branch(_, children) => self.stack.extend(children.iter().rev()),
      }
    }
    None
  }
}

fn write_joined(f: &mut fmt::Formatter<'_>, ts: &[Tree], sep: &str) -> fmt::Result {
  for (idx, t) in ts.iter().enumerate() {
    if idx > 0 {
      write!(f, "{}", sep)?;
    }
    write!(f, "{}", t)?;
  }
  Ok(())
}

impl fmt::Display for Tree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(l) => write!(f, "{}", l),
      Self::Branch(Label::Sequence, ts) => write_joined(f, ts, " "),
      Self::Branch(Label::Choice, ts) => {
        write!(f, "(")?;
        write_joined(f, ts, " | ")?;
        write!(f, ")")
      }
      Self::Branch(Label::Optional, ts) => {
        write!(f, "[")?;
        write_joined(f, ts, " ")?;
        write!(f, "]")
      }
      Self::Branch(Label::Apply(name), ts) => {
        write!(f, "{}(", name)?;
        write_joined(f, ts, ", ")?;
        write!(f, ")")
      }
    }
  }
}
