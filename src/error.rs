//! Error taxonomy shared by the cache, fetchers and resolvers.
//!
//! Every error maps to an [`ErrorKind`] so the CLI can pick an exit code
//! without inspecting transport details.

use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by a remote GraphQL source.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("authentication failed: {0}")]
  Auth(String),

  #[error("rate limited{}", retry_hint(.retry_after))]
  RateLimited { retry_after: Option<u64> },

  #[error("malformed response: {0}")]
  Malformed(String),

  #[error("{0}")]
  Failed(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
  match retry_after {
    Some(secs) => format!(" (retry after {}s)", secs),
    None => String::new(),
  }
}

/// One entry offered back to the user when an identifier is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
  pub id: String,
  pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0}")]
  Usage(String),

  #[error("{}", ambiguous_message(.entity, .identifier, .candidates))]
  Ambiguous {
    entity: &'static str,
    identifier: String,
    candidates: Vec<Candidate>,
  },

  #[error("{entity} not found: {}", .identifiers.join(", "))]
  NotFound {
    entity: &'static str,
    identifiers: Vec<String>,
  },

  #[error("no {0} sprint")]
  NoSprint(&'static str),

  #[error("{context}: {source}")]
  Upstream {
    context: String,
    #[source]
    source: ApiError,
  },

  #[error("failed to write cache file {}: {source}", .path.display())]
  CacheWrite {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to clear cache at {}: {source}", .path.display())]
  CacheClear {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("could not determine cache directory; set XDG_CACHE_HOME")]
  NoCacheDir,

  #[error("{0}")]
  Config(String),
}

fn ambiguous_message(entity: &str, identifier: &str, candidates: &[Candidate]) -> String {
  let mut msg = format!(
    "{} {:?} is ambiguous; {} candidates match:",
    entity,
    identifier,
    candidates.len()
  );
  for c in candidates {
    let _ = write!(msg, "\n  {} ({})", c.name, c.id);
  }
  msg
}

/// Coarse classification a caller uses to pick an exit behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Usage,
  NotFound,
  Upstream,
  LocalIo,
  Config,
}

impl ErrorKind {
  pub fn exit_code(self) -> u8 {
    match self {
      ErrorKind::Usage => 2,
      ErrorKind::NotFound => 3,
      ErrorKind::Upstream => 4,
      ErrorKind::LocalIo => 5,
      ErrorKind::Config => 6,
    }
  }
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Usage(_) | Error::Ambiguous { .. } => ErrorKind::Usage,
      Error::NotFound { .. } | Error::NoSprint(_) => ErrorKind::NotFound,
      Error::Upstream { .. } => ErrorKind::Upstream,
      Error::CacheWrite { .. } | Error::CacheClear { .. } | Error::NoCacheDir => ErrorKind::LocalIo,
      Error::Config(_) => ErrorKind::Config,
    }
  }

  pub fn upstream(context: impl Into<String>, source: ApiError) -> Self {
    Error::Upstream {
      context: context.into(),
      source,
    }
  }

  pub fn not_found(entity: &'static str, identifier: impl Into<String>) -> Self {
    Error::NotFound {
      entity,
      identifiers: vec![identifier.into()],
    }
  }
}
