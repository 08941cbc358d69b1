/// Simple recursive-descent parsing of rule lines, production text, and
/// semantic forms
use regex::Regex;

use crate::error::{Error, Result};
use crate::rules::Symbol;
use crate::tree::{Label, Leaf, Tree, Wildcard};

/// What the rule and semantics loaders need from a grammar notation.
pub trait GrammarParser {
  /// Parses `$name -> expression`. Blank lines and comments give `None`.
  fn parse_production(&self, line: &str) -> Result<Option<(Symbol, Tree)>>;

  /// Parses a bare expression. Blank lines and comments give an empty tree.
  fn parse_sequence(&self, text: &str) -> Result<Tree>;

  /// Parses a semantic form like `findObj($cat1, {object 1})`. Blank lines
  /// and comments give an empty tree.
  fn parse_semantic_form(&self, text: &str) -> Result<Tree>;
}

/// The line-oriented shorthand notation:
///
/// ```text
/// # comment
/// $fetch -> (bring | give) me the {object 1} [please]
/// $stop = stop | halt
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Notation;

impl GrammarParser for Notation {
  fn parse_production(&self, line: &str) -> Result<Option<(Symbol, Tree)>> {
    if is_comment(line) {
      return Ok(None);
    }
    let (rule, rest) = parse_rule(line.trim()).map_err(|e| Error::parse(line, e))?;
    expect_end(rest).map_err(|e| Error::parse(line, e))?;
    Ok(Some(rule))
  }

  fn parse_sequence(&self, text: &str) -> Result<Tree> {
    if is_comment(text) {
      return Ok(Tree::sequence(Vec::new()));
    }
    let (tree, rest) = parse_expression(text.trim()).map_err(|e| Error::parse(text, e))?;
    expect_end(rest).map_err(|e| Error::parse(text, e))?;
    Ok(tree)
  }

  fn parse_semantic_form(&self, text: &str) -> Result<Tree> {
    if is_comment(text) {
      return Ok(Tree::sequence(Vec::new()));
    }
    let (tree, rest) = parse_term(text.trim()).map_err(|e| Error::parse(text, e))?;
    expect_end(rest).map_err(|e| Error::parse(text, e))?;
    Ok(tree)
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = std::result::Result<(T, &'a str), String>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

fn is_comment(line: &str) -> bool {
  let line = line.trim();
  line.is_empty() || line.starts_with('#') || line.starts_with("//") || line.starts_with(';')
}

/// Try to consume a regex, returning None if it doesn't match at the start
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  match re.find(s) {
    Some(m) if m.start() == 0 => {
      let (matched, rest) = s.split_at(m.end());
      (Some(matched), rest)
    }
    _ => (None, s),
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static Regex, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(format!("couldn't match {} at `{}`", re, s))
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Try to consume a char, failing if it doesn't match
fn needed_char(c: char, s: &str) -> ParseResult<'_, char> {
  if let (Some(c), rest) = optional_char(c, s) {
    Ok((c, rest))
  } else {
    Err(format!("expected `{}` at `{}`", c, s))
  }
}

fn skip_whitespace(s: &str) -> &str {
  s.trim_start()
}

fn expect_end(s: &str) -> std::result::Result<(), String> {
  let s = skip_whitespace(s);
  if s.is_empty() {
    Ok(())
  } else {
    Err(format!("unexpected trailing input `{}`", s))
  }
}

/// Tries to parse a name made of letters, numbers, and _, with single - between
/// them, so `$greet->` stops before the arrow
fn parse_name(s: &str) -> ParseResult<'_, &str> {
  regex_static!(NAME, r"^[a-zA-Z0-9_]+(-[a-zA-Z0-9_]+)*");
  needed_re(&*NAME, s).map_err(|err| format!("name: {}", err))
}

/// `$name`
fn parse_nonterminal(s: &str) -> ParseResult<'_, Symbol> {
  let (_, s) = needed_char('$', s)?;
  let (name, s) = parse_name(s).map_err(|e| format!("nonterminal: {}", e))?;
  Ok((Symbol::new(name.to_string()), s))
}

/// `{name}` or `{name id}`
fn parse_wildcard(s: &str) -> ParseResult<'_, Wildcard> {
  let (_, s) = needed_char('{', s)?;
  let s = skip_whitespace(s);
  let (name, s) = parse_name(s).map_err(|e| format!("wildcard: {}", e))?;
  let s = skip_whitespace(s);
  regex_static!(ID, r"^[a-zA-Z0-9\-_]+");
  let (id, s) = optional_re(&*ID, s);
  let s = skip_whitespace(s);
  let (_, s) = needed_char('}', s).map_err(|e| format!("wildcard: {}", e))?;
  Ok((Wildcard::with_id(name, id.unwrap_or_default()), s))
}

/// Symbol, arrow, expression
fn parse_rule(s: &str) -> ParseResult<'_, (Symbol, Tree)> {
  regex_static!(ARROW, r"^(->|=)");

  let (symbol, s) = parse_nonterminal(s).map_err(|e| format!("rule symbol: {}", e))?;
  let s = skip_whitespace(s);
  let (_, s) = needed_re(&*ARROW, s).map_err(|e| format!("rule arrow: {}", e))?;
  let (rhs, s) = parse_expression(s)?;
  Ok(((symbol, rhs), s))
}

/// Alternatives separated by `|`, always rooted at a sequence. A top-level
/// alternation becomes one choice group spanning the whole expression.
fn parse_expression(s: &str) -> ParseResult<'_, Tree> {
  let (mut alternatives, s) = parse_alternatives(s)?;
  if alternatives.len() == 1 {
    Ok((alternatives.remove(0), s))
  } else {
    Ok((
      Tree::sequence(vec![Tree::Branch(Label::Choice, alternatives)]),
      s,
    ))
  }
}

fn parse_alternatives(s: &str) -> ParseResult<'_, Vec<Tree>> {
  let mut alternatives = Vec::new();
  let mut rem = s;
  loop {
    let (items, s) = parse_items(rem)?;
    alternatives.push(Tree::sequence(items));
    let s = skip_whitespace(s);
    match optional_char('|', s) {
      (Some(_), s) => rem = s,
      (None, s) => return Ok((alternatives, s)),
    }
  }
}

/// A run of items, stopping at `|`, a closing bracket, or end of input
fn parse_items(s: &str) -> ParseResult<'_, Vec<Tree>> {
  regex_static!(WORD, r"^[^\s()\[\]{}|$]+");

  let mut items = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    let (item, s) = match rem.chars().next() {
      None | Some('|') | Some(')') | Some(']') => return Ok((items, rem)),
      Some('(') => {
        let (alternatives, s) = parse_alternatives(&rem[1..])?;
        let (_, s) = needed_char(')', skip_whitespace(s)).map_err(|e| format!("group: {}", e))?;
        (Tree::Branch(Label::Choice, alternatives), s)
      }
      Some('[') => {
        let (mut alternatives, s) = parse_alternatives(&rem[1..])?;
        let (_, s) =
          needed_char(']', skip_whitespace(s)).map_err(|e| format!("optional: {}", e))?;
        let children = if alternatives.len() == 1 {
          match alternatives.remove(0) {
            Tree::Branch(_, items) => items,
            leaf => vec![leaf],
          }
        } else {
          vec![Tree::Branch(Label::Choice, alternatives)]
        };
        (Tree::Branch(Label::Optional, children), s)
      }
      Some('$') => {
        let (symbol, s) = parse_nonterminal(rem)?;
        (Tree::Leaf(Leaf::Nonterminal(symbol)), s)
      }
      Some('{') => {
        let (wildcard, s) = parse_wildcard(rem)?;
        (Tree::wildcard(wildcard), s)
      }
      Some(_) => {
        let (word, s) = needed_re(&*WORD, rem).map_err(|e| format!("word: {}", e))?;
        (Tree::word(word), s)
      }
    };
    items.push(item);
    rem = s;
  }
}

/// One semantic term: an atom, an application, a placeholder, or shorthand
fn parse_term(s: &str) -> ParseResult<'_, Tree> {
  regex_static!(ATOM, r"^[^\s()\[\]{}|$,]+");

  let s = skip_whitespace(s);
  match s.chars().next() {
    Some('(') => {
      let mut terms = Vec::new();
      let mut rem = &s[1..];
      loop {
        let (term, r) = parse_term(rem)?;
        terms.push(term);
        let r = skip_whitespace(r);
        match optional_char('|', r) {
          (Some(_), r) => rem = r,
          (None, r) => {
            let (_, r) = needed_char(')', r).map_err(|e| format!("group: {}", e))?;
            let tree = if terms.len() == 1 {
              terms.remove(0)
            } else {
              Tree::Branch(Label::Choice, terms)
            };
            return Ok((tree, r));
          }
        }
      }
    }
    Some('[') => {
      let (term, s) = parse_term(&s[1..])?;
      let (_, s) =
        needed_char(']', skip_whitespace(s)).map_err(|e| format!("optional: {}", e))?;
      Ok((Tree::Branch(Label::Optional, vec![term]), s))
    }
    Some('$') => {
      let (symbol, s) = parse_nonterminal(s)?;
      Ok((Tree::Leaf(Leaf::Nonterminal(symbol)), s))
    }
    Some('{') => {
      let (wildcard, s) = parse_wildcard(s)?;
      Ok((Tree::wildcard(wildcard), s))
    }
    _ => {
      let (atom, s) = needed_re(&*ATOM, s).map_err(|e| format!("term: {}", e))?;
      match optional_char('(', s) {
        (Some(_), s) => {
          let (args, s) = parse_arguments(s)?;
          Ok((Tree::Branch(Label::Apply(atom.to_string()), args), s))
        }
        (None, s) => Ok((Tree::word(atom), s)),
      }
    }
  }
}

/// Comma separated terms up to and including the closing paren
fn parse_arguments(s: &str) -> ParseResult<'_, Vec<Tree>> {
  let mut args = Vec::new();
  if let (Some(_), s) = optional_char(')', skip_whitespace(s)) {
    return Ok((args, s));
  }

  let mut rem = s;
  loop {
    let (arg, s) = parse_term(rem)?;
    args.push(arg);
    let s = skip_whitespace(s);
    if let (Some(_), s) = optional_char(',', s) {
      rem = s;
      continue;
    }
    let (_, s) = needed_char(')', s).map_err(|e| format!("arguments: {}", e))?;
    return Ok((args, s));
  }
}
