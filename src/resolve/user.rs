use crate::cache::CacheStorage;
use crate::error::Result;
use crate::zenhub::fetch;
use crate::zenhub::types::{CachedUser, ResolvedUser};

use super::matcher::{Matchable, Strategy};
use super::{require_identifier, Resolver};

const STRATEGIES: &[Strategy] = &[Strategy::ExactId, Strategy::ExactName, Strategy::Login];

impl Matchable for CachedUser {
  fn match_id(&self) -> &str {
    &self.id
  }

  fn match_names(&self) -> Vec<&str> {
    vec![&self.name]
  }

  fn display_name(&self) -> String {
    match &self.login {
      Some(login) => format!("{} (@{})", self.name, login),
      None => self.name.clone(),
    }
  }

  fn login(&self) -> Option<&str> {
    self.login.as_deref()
  }
}

/// Trim, then drop a single leading `@`.
fn user_identifier(raw: &str) -> Result<&str> {
  let trimmed = raw.trim();
  require_identifier("user", trimmed.strip_prefix('@').unwrap_or(trimmed))
}

impl<S: CacheStorage> Resolver<S> {
  /// Resolve a user by ID, display name or GitHub login (`@` optional).
  pub async fn user(&self, identifier: &str) -> Result<ResolvedUser> {
    let identifier = user_identifier(identifier)?;
    self
      .resolve_listed::<CachedUser, _, _, _>("user", identifier, STRATEGIES, || {
        fetch::users(self.remote(), &self.workspace_id)
      })
      .await
  }

  pub async fn users(&self, identifiers: &[&str]) -> Result<Vec<ResolvedUser>> {
    let identifiers = identifiers
      .iter()
      .map(|raw| user_identifier(raw))
      .collect::<Result<Vec<_>>>()?;
    self
      .resolve_listed_many::<CachedUser, _, _, _>("user", &identifiers, STRATEGIES, || {
        fetch::users(self.remote(), &self.workspace_id)
      })
      .await
  }
}
