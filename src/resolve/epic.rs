use crate::cache::CacheStorage;
use crate::error::Result;
use crate::zenhub::fetch;
use crate::zenhub::types::{CachedEpic, EpicKind, ResolvedEpic};

use super::matcher::{EntryRef, Matchable, Strategy};
use super::{require_identifier, Resolver};

const STRATEGIES: &[Strategy] = &[
  Strategy::ExactId,
  Strategy::Reference,
  Strategy::ExactName,
  Strategy::Substring,
];

impl Matchable for CachedEpic {
  fn match_id(&self) -> &str {
    &self.id
  }

  fn match_names(&self) -> Vec<&str> {
    vec![&self.title]
  }

  fn display_name(&self) -> String {
    self.title.clone()
  }

  /// Only legacy epics are backed by an issue.
  fn reference(&self) -> Option<EntryRef<'_>> {
    if self.kind != EpicKind::Legacy {
      return None;
    }
    Some(EntryRef {
      owner: self.repo_owner.as_deref()?,
      repo: self.repo_name.as_deref()?,
      number: self.issue_number?,
    })
  }
}

impl<S: CacheStorage> Resolver<S> {
  /// Resolve an epic by ID, alias, `owner/repo#n` reference, title or
  /// unique title substring.
  pub async fn epic(&self, identifier: &str) -> Result<ResolvedEpic> {
    let identifier = require_identifier("epic", identifier)?;
    let identifier = self.aliases.epics.substitute(identifier);
    self
      .resolve_listed::<CachedEpic, _, _, _>("epic", identifier, STRATEGIES, || {
        fetch::epics(self.remote(), &self.workspace_id)
      })
      .await
  }
}
