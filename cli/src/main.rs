use std::env;
use std::fs;
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gpsrgen::{Catalog, Error, GroundingEngine, Label, Notation, RuleStore, Tree};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} GRAMMAR [options]

Options:
  -h, --help              Print this message
  -s, --semantics FILE    Load semantic annotations from FILE
  -k, --kb FILE           Ground wildcards against the catalog in FILE
  -n, --groundings N      Print at most N groundings per production (defaults to 1)
      --no-expand         Keep rule shorthand unexpanded",
    prog_name
  )
}

struct Args {
  grammar: String,
  semantics: Option<String>,
  kb: Option<String>,
  groundings: usize,
  expand: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    let mut iter = v.into_iter();
    let Some(prog_name) = iter.next() else {
      return Err(Self::make_error_message("bad argument vector", "gpsrgen"));
    };

    let mut grammar: Option<String> = None;
    let mut semantics: Option<String> = None;
    let mut kb: Option<String> = None;
    let mut groundings = 1;
    let mut expand = true;

    while let Some(o) = iter.next() {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-s" || o == "--semantics" {
        semantics = iter.next();
        if semantics.is_none() {
          return Err(Self::make_error_message("missing semantics file", prog_name));
        }
      } else if o == "-k" || o == "--kb" {
        kb = iter.next();
        if kb.is_none() {
          return Err(Self::make_error_message("missing catalog file", prog_name));
        }
      } else if o == "-n" || o == "--groundings" {
        groundings = match iter.next().map(|n| n.parse::<usize>()) {
          Some(Ok(n)) => n,
          _ => return Err(Self::make_error_message("bad grounding count", prog_name)),
        };
      } else if o == "--no-expand" {
        expand = false;
      } else if grammar.is_none() {
        grammar = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    if let Some(grammar) = grammar {
      Ok(Self {
        grammar,
        semantics,
        kb,
        groundings,
        expand,
      })
    } else {
      Err(Self::make_error_message("missing grammar file", prog_name))
    }
  }
}

/// Grounds a production together with its semantics so both sides agree on
/// every wildcard, then splits the pair back apart
fn print_groundings(
  engine: &GroundingEngine<'_, Catalog>,
  production: &Tree,
  semantics: &Tree,
  limit: usize,
) {
  let pair = Tree::Branch(
    Label::Apply("pair".to_string()),
    vec![production.clone(), semantics.clone()],
  );

  let mut found = 0;
  for grounded in engine.search(&pair).take(limit) {
    if let Tree::Branch(_, sides) = grounded {
      println!("{}\n  => {}", sides[0], sides[1]);
    }
    found += 1;
  }
  if found == 0 {
    println!("{}\n  => (no grounding)", production);
  }
}

fn main() -> Result<(), Error> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let mut store = RuleStore::new();
  let grammar = fs::read_to_string(&opts.grammar)?;
  let rules = store.load_rules_with(&Notation, grammar.lines(), opts.expand)?;
  info!(rules, file = %opts.grammar, "loaded grammar");

  let Some(semantics) = &opts.semantics else {
    print!("{}", store);
    return Ok(());
  };
  let annotations = store.load_semantics(&Notation, fs::read_to_string(semantics)?.lines())?;
  info!(annotations, file = %semantics, "loaded semantics");

  let kb: Catalog = match &opts.kb {
    Some(path) => fs::read_to_string(path)?.parse()?,
    None => Catalog::new(),
  };
  let engine = GroundingEngine::new(&kb);

  let mut pairs = store.semantics.iter().collect::<Vec<_>>();
  pairs.sort_by_key(|(production, _)| production.to_string());
  for (production, semantics) in pairs {
    print_groundings(&engine, production, semantics, opts.groundings);
  }

  Ok(())
}
