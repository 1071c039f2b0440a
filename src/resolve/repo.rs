use crate::cache::{CacheKey, CacheStorage, Lookup};
use crate::error::Result;
use crate::zenhub::fetch;
use crate::zenhub::types::{CachedRepo, ResolvedRepo};

use super::matcher::{MatchOutcome, Matchable};
use super::{require_identifier, Resolver};

impl Matchable for CachedRepo {
  fn match_id(&self) -> &str {
    &self.id
  }

  fn match_names(&self) -> Vec<&str> {
    vec![&self.name]
  }

  fn display_name(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }
}

/// `owner/name` must match both parts; a bare `name` must be unique across
/// owners. Both compare case-insensitively.
pub fn match_repo<'a>(entries: &'a [CachedRepo], identifier: &str) -> MatchOutcome<'a, CachedRepo> {
  if let Some((owner, name)) = identifier.split_once('/') {
    return entries
      .iter()
      .find(|r| r.owner.eq_ignore_ascii_case(owner) && r.name.eq_ignore_ascii_case(name))
      .map_or(MatchOutcome::NoMatch, MatchOutcome::Matched);
  }

  let hits: Vec<&CachedRepo> = entries
    .iter()
    .filter(|r| r.name.eq_ignore_ascii_case(identifier))
    .collect();
  match hits.len() {
    0 => MatchOutcome::NoMatch,
    1 => MatchOutcome::Matched(hits[0]),
    _ => MatchOutcome::Ambiguous(hits),
  }
}

impl<S: CacheStorage> Resolver<S> {
  /// Resolve a repository given as `owner/name` or a unique `name`.
  pub async fn repository(&self, identifier: &str) -> Result<ResolvedRepo> {
    let identifier = require_identifier("repository", identifier)?;
    let key = CacheKey::for_entity::<CachedRepo>(&self.workspace_id);
    let result = self
      .cache
      .resolve_with_refresh(
        &key,
        || fetch::repositories(self.remote(), &self.workspace_id),
        |entries: &Vec<CachedRepo>| -> Lookup<ResolvedRepo> {
          match_repo(entries, identifier).into_lookup(identifier)
        },
      )
      .await?;
    result.data.into_result("repository")
  }
}
