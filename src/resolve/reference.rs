//! Parsing of issue identifiers.

use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{Error, Result};

use super::matcher::EntryRef;

const MIN_NODE_ID_LEN: usize = 16;

fn reference_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"^(?:([A-Za-z0-9_.-]+)/)?([A-Za-z0-9_.-]+)#([0-9]+)$")
      .expect("valid issue reference regex")
  })
}

/// `owner/repo#number` or `repo#number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
  pub owner: Option<String>,
  pub repo: String,
  pub number: u64,
}

impl IssueRef {
  pub fn parse(s: &str) -> Option<Self> {
    let caps = reference_pattern().captures(s)?;
    let number: u64 = caps.get(3)?.as_str().parse().ok()?;
    if number == 0 {
      return None;
    }
    Some(Self {
      owner: caps.get(1).map(|m| m.as_str().to_string()),
      repo: caps.get(2)?.as_str().to_string(),
      number,
    })
  }

  /// Repository name compares case-insensitively; owner only if given.
  pub fn matches(&self, entry: EntryRef<'_>) -> bool {
    self.number == entry.number
      && self.repo.eq_ignore_ascii_case(entry.repo)
      && self
        .owner
        .as_deref()
        .map_or(true, |owner| owner.eq_ignore_ascii_case(entry.owner))
  }

  /// Repository part in the form the repository resolver accepts.
  pub fn repo_identifier(&self) -> String {
    match &self.owner {
      Some(owner) => format!("{}/{}", owner, self.repo),
      None => self.repo.clone(),
    }
  }
}

impl fmt::Display for IssueRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.repo_identifier(), self.number)
  }
}

/// The four accepted shapes of an issue identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueIdentifier {
  Reference(IssueRef),
  Number(u64),
  NodeId(String),
  Branch(String),
}

impl IssueIdentifier {
  /// Classify `raw`, in order: reference, bare number, node ID, branch.
  ///
  /// `has_repo` says whether a repository context exists (explicit or
  /// configured default); `has_github` whether branch lookup is possible.
  pub fn classify(raw: &str, has_repo: bool, has_github: bool) -> Result<Self> {
    if let Some(reference) = IssueRef::parse(raw) {
      return Ok(IssueIdentifier::Reference(reference));
    }

    let digits = raw.strip_prefix('#').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
      let number: u64 = digits
        .parse()
        .map_err(|_| Error::Usage(format!("issue number out of range: {raw}")))?;
      if number == 0 {
        return Err(Error::Usage("issue numbers start at 1".to_string()));
      }
      if !has_repo {
        return Err(Error::Usage(format!(
          "issue number {number} needs a repository; pass --repo or set default_repo"
        )));
      }
      return Ok(IssueIdentifier::Number(number));
    }

    if looks_like_node_id(raw) {
      return Ok(IssueIdentifier::NodeId(raw.to_string()));
    }

    if has_repo && has_github {
      return Ok(IssueIdentifier::Branch(raw.to_string()));
    }

    Err(Error::Usage(format!(
      "unrecognized issue identifier {raw:?}; expected owner/repo#number, repo#number, a number or an issue ID"
    )))
  }
}

/// Lexical check for an opaque node ID such as `Z2lkOi8vcmFwdG9yL0lzc3VlLzQy`.
pub fn looks_like_node_id(s: &str) -> bool {
  s.len() >= MIN_NODE_ID_LEN
    && s
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
    && s.bytes().any(|b| b.is_ascii_uppercase())
    && !s.starts_with('/')
    && !s.ends_with('/')
}
