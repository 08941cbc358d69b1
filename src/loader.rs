//! Loading rule files and semantics files into a [`RuleStore`].
//!
//! Both loaders are all-or-nothing per call: the first bad line aborts the
//! batch and the store is left as it was before the call.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::parse_grammar::GrammarParser;
use crate::rules::{RuleStore, Symbol};
use crate::shorthand::expand;
use crate::tree::{Leaf, Tree};

/// Some grammar files carry byte order marks and other junk
fn scrub(line: &str) -> String {
  line
    .trim()
    .chars()
    .filter(|c| c.is_ascii_graphic() || c.is_ascii_whitespace())
    .collect()
}

impl RuleStore {
  /// Loads `$symbol -> expression` lines, expanding shorthand. Returns the
  /// number of rule lines read, not the number of alternatives they expand to.
  pub fn load_rules<P, I, S>(&mut self, parser: &P, lines: I) -> Result<usize>
  where
    P: GrammarParser + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.load_rules_with(parser, lines, true)
  }

  /// Like [`RuleStore::load_rules`], but the shorthand can be kept as written.
  pub fn load_rules_with<P, I, S>(
    &mut self,
    parser: &P,
    lines: I,
    expand_shorthand: bool,
  ) -> Result<usize>
  where
    P: GrammarParser + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut staged: Vec<(Symbol, Vec<Tree>)> = Vec::new();
    for line in lines {
      let line = scrub(line.as_ref());
      let Some((symbol, rhs)) = parser.parse_production(&line)? else {
        continue;
      };

      let alternatives = if expand_shorthand {
        expand(&rhs)
      } else {
        vec![rhs]
      };
      trace!(%symbol, alternatives = alternatives.len(), "parsed rule");
      staged.push((symbol, alternatives));
    }

    let count = staged.len();
    for (symbol, alternatives) in staged {
      self.add_alternatives(symbol, alternatives);
    }
    debug!(count, nonterminals = self.rules.len(), "loaded rules");
    Ok(count)
  }

  /// Loads `production = semantics` lines. Lines without `=` are comments.
  /// Returns the number of (production, semantics) pairs registered.
  ///
  /// Fails with [`Error::UnboundWildcard`] if a semantic form mentions a
  /// placeholder its production doesn't contain.
  pub fn load_semantics<P, I, S>(&mut self, parser: &P, lines: I) -> Result<usize>
  where
    P: GrammarParser + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut staged = Vec::new();
    for line in lines {
      staged.extend(parse_annotation(parser, line.as_ref().trim())?);
    }

    let count = staged.len();
    for (production, semantics) in staged {
      self.semantics.insert(production, semantics);
    }
    debug!(count, entries = self.semantics.len(), "loaded semantics");
    Ok(count)
  }
}

/// Parses and checks one semantics line, returning the pairs it registers
fn parse_annotation<P>(parser: &P, line: &str) -> Result<Vec<(Tree, Tree)>>
where
  P: GrammarParser + ?Sized,
{
  let Some((production, semantics)) = line.split_once('=') else {
    return Ok(Vec::new());
  };

  let production = parser
    .parse_sequence(production.trim())
    .map_err(|e| whole_line(line, e))?;
  if production.is_empty() {
    return Ok(Vec::new());
  }
  let semantics = parser
    .parse_semantic_form(semantics.trim())
    .map_err(|e| whole_line(line, e))?;

  let pairs = pair_expansions(expand(&production), expand(&semantics));
  for (production, semantics) in pairs.iter() {
    let missing = unbound_placeholders(production, semantics);
    if !missing.is_empty() {
      return Err(Error::UnboundWildcard {
        line: line.to_string(),
        missing: missing.join(", "),
      });
    }
  }
  trace!(line, pairs = pairs.len(), "parsed semantics");
  Ok(pairs)
}

/// Parse errors on either side of `=` report the whole line
fn whole_line(line: &str, error: Error) -> Error {
  match error {
    Error::Parse { reason, .. } => Error::Parse {
      text: line.to_string(),
      reason,
    },
    other => other,
  }
}

/// Zips expanded productions with expanded semantics. When the lists differ
/// in length the shorter one is padded with the first semantics expansion,
/// whichever list ran short.
fn pair_expansions(productions: Vec<Tree>, semantics: Vec<Tree>) -> Vec<(Tree, Tree)> {
  let Some(filler) = semantics.first().cloned() else {
    return Vec::new();
  };
  let len = productions.len().max(semantics.len());

  let mut productions = productions.into_iter();
  let mut semantics = semantics.into_iter();
  (0..len)
    .map(|_| {
      (
        productions.next().unwrap_or_else(|| filler.clone()),
        semantics.next().unwrap_or_else(|| filler.clone()),
      )
    })
    .collect()
}

/// Placeholders in `semantics` that `production` never mentions, sorted.
/// A semantic form that is a bare leaf has no placeholders to check.
fn unbound_placeholders(production: &Tree, semantics: &Tree) -> Vec<String> {
  if semantics.is_leaf() {
    return Vec::new();
  }
  let bound: HashSet<&Leaf> = production.placeholders();
  let mut missing = semantics
    .placeholders()
    .into_iter()
    .filter(|p| !bound.contains(p))
    .map(|p| p.to_string())
    .collect::<Vec<_>>();
  missing.sort();
  missing
}
