use thiserror::Error;

/// Everything that can go wrong while loading grammars or grounding trees.
#[derive(Debug, Error)]
pub enum Error {
  #[error("couldn't parse `{text}`: {reason}")]
  Parse { text: String, reason: String },

  /// A semantic annotation mentions placeholders its production never binds.
  #[error("semantics use {missing} which don't occur in the production: {line}")]
  UnboundWildcard { line: String, missing: String },

  #[error("no grounding satisfies the constraints of {tree}")]
  NoGroundingFound { tree: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn parse(text: &str, reason: impl Into<String>) -> Self {
    Self::Parse {
      text: text.to_string(),
      reason: reason.into(),
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
