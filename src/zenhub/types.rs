use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Cached entries - the on-disk shape of each listing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPipeline {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// ZenHub-native epics have no issue behind them; legacy epics do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpicKind {
  Zenhub,
  Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEpic {
  pub id: String,
  pub title: String,
  pub kind: EpicKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  /// Legacy epics only
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issue_number: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repo_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repo_owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRepo {
  pub id: String,
  pub gh_id: u64,
  pub name: String,
  pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLabel {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedZenhubLabel {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPriority {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSprint {
  pub id: String,
  /// Custom name, if the team gave one
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// Name ZenHub derives from the date range
  pub generated_name: String,
  /// OPEN or CLOSED
  pub state: String,
  pub start_at: DateTime<Utc>,
  pub end_at: DateTime<Utc>,
}

impl CachedSprint {
  pub fn display_name(&self) -> &str {
    match self.name.as_deref() {
      Some(name) if !name.is_empty() => name,
      _ => &self.generated_name,
    }
  }

  pub fn is_open(&self) -> bool {
    self.state.eq_ignore_ascii_case("OPEN")
  }

  /// Start inclusive, end exclusive.
  pub fn contains(&self, instant: DateTime<Utc>) -> bool {
    self.start_at <= instant && instant < self.end_at
  }
}

/// Which sprints the API called active/upcoming/previous at fetch time.
/// An empty ID means the API reported none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintAccessors {
  #[serde(default)]
  pub active_id: String,
  #[serde(default)]
  pub upcoming_id: String,
  #[serde(default)]
  pub previous_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
  pub id: String,
  pub name: String,
  /// GitHub login, when the user has linked an account
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub login: Option<String>,
}

// ============================================================================
// Resolved results - what resolvers hand back to callers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPipeline {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEpic {
  pub id: String,
  pub title: String,
  pub kind: EpicKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepo {
  pub id: String,
  pub gh_id: u64,
  pub owner: String,
  pub name: String,
}

impl ResolvedRepo {
  pub fn full_name(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIssue {
  pub id: String,
  pub number: u64,
  pub title: String,
  pub repo_owner: String,
  pub repo_name: String,
  pub pull_request: bool,
}

impl ResolvedIssue {
  pub fn reference(&self) -> String {
    format!("{}/{}#{}", self.repo_owner, self.repo_name, self.number)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabel {
  pub id: String,
  pub name: String,
  pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPriority {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSprint {
  pub id: String,
  pub name: String,
  pub state: String,
  pub start_at: DateTime<Utc>,
  pub end_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
  pub id: String,
  pub name: String,
  pub login: Option<String>,
}

// ============================================================================
// Projections
// ============================================================================

impl From<&CachedPipeline> for ResolvedPipeline {
  fn from(p: &CachedPipeline) -> Self {
    Self {
      id: p.id.clone(),
      name: p.name.clone(),
    }
  }
}

impl From<&CachedEpic> for ResolvedEpic {
  fn from(e: &CachedEpic) -> Self {
    Self {
      id: e.id.clone(),
      title: e.title.clone(),
      kind: e.kind,
    }
  }
}

impl From<&CachedRepo> for ResolvedRepo {
  fn from(r: &CachedRepo) -> Self {
    Self {
      id: r.id.clone(),
      gh_id: r.gh_id,
      owner: r.owner.clone(),
      name: r.name.clone(),
    }
  }
}

impl From<&CachedLabel> for ResolvedLabel {
  fn from(l: &CachedLabel) -> Self {
    Self {
      id: l.id.clone(),
      name: l.name.clone(),
      color: l.color.clone(),
    }
  }
}

impl From<&CachedZenhubLabel> for ResolvedLabel {
  fn from(l: &CachedZenhubLabel) -> Self {
    Self {
      id: l.id.clone(),
      name: l.name.clone(),
      color: l.color.clone(),
    }
  }
}

impl From<&CachedPriority> for ResolvedPriority {
  fn from(p: &CachedPriority) -> Self {
    Self {
      id: p.id.clone(),
      name: p.name.clone(),
    }
  }
}

impl From<&CachedSprint> for ResolvedSprint {
  fn from(s: &CachedSprint) -> Self {
    Self {
      id: s.id.clone(),
      name: s.display_name().to_string(),
      state: s.state.clone(),
      start_at: s.start_at,
      end_at: s.end_at,
    }
  }
}

impl From<&CachedUser> for ResolvedUser {
  fn from(u: &CachedUser) -> Self {
    Self {
      id: u.id.clone(),
      name: u.name.clone(),
      login: u.login.clone(),
    }
  }
}
