//! Identifier resolution: turn what a user typed into a workspace entity.
//!
//! Each entity kind gets a method on [`Resolver`]. All of them follow the
//! same flow: trim the identifier, apply aliases where the kind has them,
//! then match against the cached listing through
//! [`CacheLayer::resolve_with_refresh`], which refreshes at most once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::cache::{CacheKey, CacheLayer, CacheStorage, Cacheable};
use crate::config::AliasConfig;
use crate::error::{Error, Result};
use crate::zenhub::GraphQl;

mod epic;
mod issue;
mod label;
pub mod matcher;
mod pipeline;
mod priority;
pub mod reference;
mod repo;
mod sprint;
mod user;

pub use matcher::{lookup_each, lookup_one, match_entries, MatchOutcome, Matchable, Strategy};
pub use reference::{IssueIdentifier, IssueRef};
pub use repo::match_repo;
pub use sprint::{pick_relative, RelativeSprint};

/// Shorthand → canonical identifier, keyed exactly as written in config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AliasTable(HashMap<String, String>);

impl AliasTable {
  /// The alias target for `identifier`, or `identifier` itself.
  pub fn substitute<'a>(&'a self, identifier: &'a str) -> &'a str {
    self.0.get(identifier).map(String::as_str).unwrap_or(identifier)
  }
}

impl FromIterator<(String, String)> for AliasTable {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Resolution context for one workspace.
pub struct Resolver<S: CacheStorage> {
  zenhub: Arc<dyn GraphQl>,
  github: Option<Arc<dyn GraphQl>>,
  cache: CacheLayer<S>,
  workspace_id: String,
  aliases: AliasConfig,
  default_repo: Option<String>,
}

impl<S: CacheStorage> Resolver<S> {
  pub fn new(zenhub: Arc<dyn GraphQl>, cache: CacheLayer<S>, workspace_id: impl Into<String>) -> Self {
    Self {
      zenhub,
      github: None,
      cache,
      workspace_id: workspace_id.into(),
      aliases: AliasConfig::default(),
      default_repo: None,
    }
  }

  /// Enable branch-name issue lookup.
  pub fn with_github(mut self, github: Arc<dyn GraphQl>) -> Self {
    self.github = Some(github);
    self
  }

  pub fn with_aliases(mut self, aliases: AliasConfig) -> Self {
    self.aliases = aliases;
    self
  }

  /// Repository used for bare issue numbers when none is given.
  pub fn with_default_repo(mut self, repo: Option<String>) -> Self {
    self.default_repo = repo;
    self
  }

  pub fn workspace_id(&self) -> &str {
    &self.workspace_id
  }

  pub fn cache(&self) -> &CacheLayer<S> {
    &self.cache
  }

  fn remote(&self) -> &dyn GraphQl {
    self.zenhub.as_ref()
  }

  fn key_for<T: Cacheable>(&self) -> CacheKey {
    CacheKey::for_entity::<T>(&self.workspace_id)
  }

  /// Match one identifier against the cached listing of `T`.
  async fn resolve_listed<T, R, F, Fut>(
    &self,
    entity: &'static str,
    identifier: &str,
    strategies: &[Strategy],
    refresh: F,
  ) -> Result<R>
  where
    T: Cacheable + Matchable,
    R: for<'e> From<&'e T>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
  {
    let key = self.key_for::<T>();
    let result = self
      .cache
      .resolve_with_refresh(&key, refresh, |entries: &Vec<T>| {
        lookup_one(entries, identifier, strategies)
      })
      .await?;
    debug!(entity, identifier, source = ?result.source, "lookup finished");
    result.data.into_result(entity)
  }

  /// Match several identifiers against one listing of `T`, refreshing at
  /// most once for the whole batch.
  async fn resolve_listed_many<T, R, F, Fut>(
    &self,
    entity: &'static str,
    identifiers: &[&str],
    strategies: &[Strategy],
    refresh: F,
  ) -> Result<Vec<R>>
  where
    T: Cacheable + Matchable,
    R: for<'e> From<&'e T>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
  {
    if identifiers.is_empty() {
      return Ok(Vec::new());
    }
    let key = self.key_for::<T>();
    let result = self
      .cache
      .resolve_with_refresh(&key, refresh, |entries: &Vec<T>| {
        lookup_each(entries, identifiers, strategies)
      })
      .await?;
    debug!(entity, count = identifiers.len(), source = ?result.source, "batch lookup finished");
    result.data.into_result(entity)
  }
}

/// Trim `raw`, rejecting identifiers that are empty afterwards.
fn require_identifier<'a>(entity: &str, raw: &'a str) -> Result<&'a str> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::Usage(format!("empty {entity} identifier")));
  }
  Ok(trimmed)
}

fn require_identifiers<'a>(entity: &str, raw: &[&'a str]) -> Result<Vec<&'a str>> {
  raw.iter().map(|r| require_identifier(entity, r)).collect()
}
