//! Sprint resolution, including the relative keywords `current`, `next`
//! and `previous`.
//!
//! Relative keywords are answered from the accessor record the API returns
//! alongside the sprint list. The record and the list live under separate
//! cache keys and are always refreshed together.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::{CacheKey, CacheStorage};
use crate::error::{Error, Result};
use crate::zenhub::cache::SPRINT_ACCESSORS;
use crate::zenhub::fetch;
use crate::zenhub::types::{CachedSprint, ResolvedSprint, SprintAccessors};

use super::matcher::{Matchable, Strategy};
use super::{require_identifier, Resolver};

const STRATEGIES: &[Strategy] = &[Strategy::ExactId, Strategy::ExactName, Strategy::Substring];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeSprint {
  Current,
  Next,
  Previous,
}

impl RelativeSprint {
  /// Recognize a relative keyword, case-insensitively.
  pub fn parse(identifier: &str) -> Option<Self> {
    match identifier.to_ascii_lowercase().as_str() {
      "current" => Some(RelativeSprint::Current),
      "next" => Some(RelativeSprint::Next),
      "previous" => Some(RelativeSprint::Previous),
      _ => None,
    }
  }

  /// How the API names the sprint this keyword refers to.
  pub fn label(self) -> &'static str {
    match self {
      RelativeSprint::Current => "active",
      RelativeSprint::Next => "upcoming",
      RelativeSprint::Previous => "previous",
    }
  }

  fn accessor(self, accessors: &SprintAccessors) -> &str {
    match self {
      RelativeSprint::Current => &accessors.active_id,
      RelativeSprint::Next => &accessors.upcoming_id,
      RelativeSprint::Previous => &accessors.previous_id,
    }
  }
}

impl Matchable for CachedSprint {
  fn match_id(&self) -> &str {
    &self.id
  }

  fn match_names(&self) -> Vec<&str> {
    match self.name.as_deref() {
      Some(name) if !name.is_empty() => vec![name, &self.generated_name],
      _ => vec![&self.generated_name],
    }
  }

  fn display_name(&self) -> String {
    CachedSprint::display_name(self).to_string()
  }
}

/// Pick the sprint a relative keyword refers to.
///
/// - `Ok(Some(_))`: found.
/// - `Ok(None)`: the accessor names a sprint absent from `sprints`, so the
///   list is stale.
/// - `Err(NoSprint)`: the accessors report no such sprint. For `current`
///   that holds only once no open sprint contains `now` either. On cached
///   data the caller still refreshes once.
pub fn pick_relative<'a>(
  sprints: &'a [CachedSprint],
  accessors: &SprintAccessors,
  which: RelativeSprint,
  now: DateTime<Utc>,
) -> Result<Option<&'a CachedSprint>> {
  let id = which.accessor(accessors);
  if !id.is_empty() {
    return Ok(sprints.iter().find(|s| s.id == id));
  }

  if which == RelativeSprint::Current {
    if let Some(open) = sprints.iter().find(|s| s.is_open() && s.contains(now)) {
      debug!(sprint = %open.id, "no active sprint reported; using open sprint covering now");
      return Ok(Some(open));
    }
  }

  Err(Error::NoSprint(which.label()))
}

impl<S: CacheStorage> Resolver<S> {
  /// Resolve a sprint by ID, name, generated name, unique substring, or one
  /// of `current`, `next` and `previous`.
  pub async fn sprint(&self, identifier: &str) -> Result<ResolvedSprint> {
    let identifier = require_identifier("sprint", identifier)?;
    if let Some(which) = RelativeSprint::parse(identifier) {
      return self.relative_sprint(which, Utc::now()).await;
    }
    self
      .resolve_listed::<CachedSprint, _, _, _>("sprint", identifier, STRATEGIES, || {
        self.refresh_sprints()
      })
      .await
  }

  /// Fetch the sprint list, persisting the accessor record that came with
  /// it. The caller stores the list.
  async fn refresh_sprints(&self) -> Result<Vec<CachedSprint>> {
    let (sprints, accessors) = fetch::sprints(self.remote(), &self.workspace_id).await?;
    self.cache.store(&self.accessors_key(), &accessors)?;
    Ok(sprints)
  }

  async fn relative_sprint(&self, which: RelativeSprint, now: DateTime<Utc>) -> Result<ResolvedSprint> {
    let sprints_key = self.key_for::<CachedSprint>();
    let accessors_key = self.accessors_key();

    let sprints: Option<Vec<CachedSprint>> = self.cache.get(&sprints_key);
    let accessors: Option<SprintAccessors> = self.cache.get(&accessors_key);
    if let (Some(sprints), Some(accessors)) = (sprints, accessors) {
      match pick_relative(&sprints, &accessors, which, now) {
        Ok(Some(found)) => return Ok(found.into()),
        Ok(None) => info!(
          which = which.label(),
          "accessor names a sprint missing from cache; refreshing"
        ),
        Err(e) => info!(
          which = which.label(),
          error = %e,
          "cached sprints have no match; refreshing"
        ),
      }
    } else {
      info!(key = %accessors_key, "sprint accessors not cached; fetching");
    }

    let (sprints, accessors) = fetch::sprints(self.remote(), &self.workspace_id).await?;
    self.cache.store(&sprints_key, &sprints)?;
    self.cache.store(&accessors_key, &accessors)?;

    pick_relative(&sprints, &accessors, which, now)?
      .map(ResolvedSprint::from)
      .ok_or(Error::NoSprint(which.label()))
  }

  fn accessors_key(&self) -> CacheKey {
    CacheKey::new(SPRINT_ACCESSORS, self.workspace_id.as_str())
  }
}
