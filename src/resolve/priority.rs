use crate::cache::CacheStorage;
use crate::error::Result;
use crate::zenhub::fetch;
use crate::zenhub::types::{CachedPriority, ResolvedPriority};

use super::matcher::{Matchable, Strategy};
use super::{require_identifier, Resolver};

const STRATEGIES: &[Strategy] = &[Strategy::ExactId, Strategy::ExactName, Strategy::Substring];

impl Matchable for CachedPriority {
  fn match_id(&self) -> &str {
    &self.id
  }

  fn match_names(&self) -> Vec<&str> {
    vec![&self.name]
  }

  fn display_name(&self) -> String {
    self.name.clone()
  }
}

impl<S: CacheStorage> Resolver<S> {
  pub async fn priority(&self, identifier: &str) -> Result<ResolvedPriority> {
    let identifier = require_identifier("priority", identifier)?;
    self
      .resolve_listed::<CachedPriority, _, _, _>("priority", identifier, STRATEGIES, || {
        fetch::priorities(self.remote(), &self.workspace_id)
      })
      .await
  }
}
