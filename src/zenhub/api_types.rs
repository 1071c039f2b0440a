//! Serde-deserializable types matching ZenHub and GitHub API responses.
//!
//! These types are separate from the cached types so the on-disk format
//! does not follow every change in the wire format.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{
  CachedEpic, CachedLabel, CachedPipeline, CachedPriority, CachedRepo, CachedSprint, CachedUser,
  CachedZenhubLabel, EpicKind, ResolvedIssue, SprintAccessors,
};

// ============================================================================
// Envelopes and pagination
// ============================================================================

/// Top-level `data` of every workspace-scoped query.
#[derive(Debug, Deserialize)]
pub struct WorkspaceData<W> {
  pub workspace: Option<W>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
  #[serde(default)]
  pub has_next_page: bool,
  pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
  #[serde(default)]
  pub page_info: PageInfo,
  #[serde(default = "Vec::new")]
  pub nodes: Vec<N>,
}

impl<N> Default for Connection<N> {
  fn default() -> Self {
    Self {
      page_info: PageInfo::default(),
      nodes: Vec::new(),
    }
  }
}

/// A non-paginated node list.
#[derive(Debug, Deserialize)]
pub struct NodeList<N> {
  #[serde(default = "Vec::new")]
  pub nodes: Vec<N>,
}

#[derive(Debug, Deserialize)]
pub struct ApiIdRef {
  pub id: String,
}

// ============================================================================
// Workspace shapes, one per query
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPipelinesWorkspace {
  pub pipelines_connection: Connection<ApiPipeline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiZenhubEpicsWorkspace {
  pub zenhub_epics: Connection<ApiZenhubEpic>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRoadmapWorkspace {
  pub roadmap: Option<ApiRoadmap>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRoadmap {
  pub items: Connection<ApiRoadmapItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRepositoriesWorkspace {
  pub repositories_connection: Connection<ApiRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRepositoryLabelsWorkspace {
  pub repositories_connection: Connection<ApiRepositoryLabels>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiZenhubLabelsWorkspace {
  pub zenhub_organization: Option<ApiZenhubOrganization>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiZenhubOrganization {
  pub zenhub_labels: Connection<ApiLabel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrioritiesWorkspace {
  pub priorities_connection: Connection<ApiPriority>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSprintsWorkspace {
  pub sprints: Connection<ApiSprint>,
  pub active_sprint: Option<ApiIdRef>,
  pub upcoming_sprint: Option<ApiIdRef>,
  pub previous_sprint: Option<ApiIdRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUsersWorkspace {
  pub zenhub_users: Connection<ApiUser>,
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPipeline {
  pub id: String,
  pub name: String,
  pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiZenhubEpic {
  pub id: String,
  pub title: String,
  pub state: Option<String>,
}

/// Roadmap items come in several shapes; only epics are kept.
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum ApiRoadmapItem {
  ZenhubEpic(ApiZenhubEpic),
  Epic(ApiLegacyEpic),
  #[serde(other)]
  Other,
}

#[derive(Debug, Deserialize)]
pub struct ApiLegacyEpic {
  pub id: String,
  pub issue: ApiEpicIssue,
}

#[derive(Debug, Deserialize)]
pub struct ApiEpicIssue {
  pub title: String,
  pub number: u64,
  pub state: Option<String>,
  pub repository: ApiRepositoryRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRepositoryRef {
  pub name: String,
  pub owner_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRepository {
  pub id: String,
  pub gh_id: u64,
  pub name: String,
  pub owner_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiRepositoryLabels {
  pub id: String,
  pub labels: Option<Connection<ApiLabel>>,
}

/// Follow-up label page for one repository.
#[derive(Debug, Deserialize)]
pub struct ApiRepositoryLabelsNode {
  pub node: Option<ApiRepositoryLabelsPage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRepositoryLabelsPage {
  pub labels: Option<Connection<ApiLabel>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiLabel {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiPriority {
  pub id: String,
  pub name: String,
  pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSprint {
  pub id: String,
  pub name: Option<String>,
  pub generated_name: String,
  pub state: String,
  pub start_at: DateTime<Utc>,
  pub end_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
  pub id: String,
  pub name: Option<String>,
  pub github_user: Option<ApiGithubUser>,
}

#[derive(Debug, Deserialize)]
pub struct ApiGithubUser {
  pub login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIssue {
  pub id: String,
  pub number: u64,
  pub title: String,
  #[serde(default)]
  pub pull_request: bool,
  pub repository: ApiRepositoryRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIssueByInfoData {
  pub issue_by_info: Option<ApiIssue>,
}

#[derive(Debug, Deserialize)]
pub struct ApiNodeData {
  pub node: Option<ApiNode>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum ApiNode {
  Issue(ApiIssue),
  #[serde(other)]
  Other,
}

// ============================================================================
// GitHub
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GhRepositoryData {
  pub repository: Option<GhRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhRepository {
  pub pull_requests: NodeList<GhPullRequest>,
}

#[derive(Debug, Deserialize)]
pub struct GhPullRequest {
  pub number: u64,
  pub title: String,
}

// ============================================================================
// Conversions to cached types
// ============================================================================

impl From<ApiPipeline> for CachedPipeline {
  fn from(p: ApiPipeline) -> Self {
    CachedPipeline {
      id: p.id,
      name: p.name,
      description: p.description.filter(|d| !d.is_empty()),
    }
  }
}

impl From<ApiZenhubEpic> for CachedEpic {
  fn from(e: ApiZenhubEpic) -> Self {
    CachedEpic {
      id: e.id,
      title: e.title,
      kind: EpicKind::Zenhub,
      state: e.state,
      issue_number: None,
      repo_name: None,
      repo_owner: None,
    }
  }
}

impl From<ApiLegacyEpic> for CachedEpic {
  fn from(e: ApiLegacyEpic) -> Self {
    CachedEpic {
      id: e.id,
      title: e.issue.title,
      kind: EpicKind::Legacy,
      state: e.issue.state,
      issue_number: Some(e.issue.number),
      repo_name: Some(e.issue.repository.name),
      repo_owner: Some(e.issue.repository.owner_name),
    }
  }
}

impl From<ApiRepository> for CachedRepo {
  fn from(r: ApiRepository) -> Self {
    CachedRepo {
      id: r.id,
      gh_id: r.gh_id,
      name: r.name,
      owner: r.owner_name,
    }
  }
}

impl From<ApiLabel> for CachedLabel {
  fn from(l: ApiLabel) -> Self {
    CachedLabel {
      id: l.id,
      name: l.name,
      color: l.color,
    }
  }
}

impl From<ApiLabel> for CachedZenhubLabel {
  fn from(l: ApiLabel) -> Self {
    CachedZenhubLabel {
      id: l.id,
      name: l.name,
      color: l.color,
    }
  }
}

impl From<ApiPriority> for CachedPriority {
  fn from(p: ApiPriority) -> Self {
    CachedPriority {
      id: p.id,
      name: p.name,
      color: p.color,
    }
  }
}

impl From<ApiSprint> for CachedSprint {
  fn from(s: ApiSprint) -> Self {
    CachedSprint {
      id: s.id,
      name: s.name.filter(|n| !n.is_empty()),
      generated_name: s.generated_name,
      state: s.state,
      start_at: s.start_at,
      end_at: s.end_at,
    }
  }
}

impl From<ApiUser> for CachedUser {
  fn from(u: ApiUser) -> Self {
    let login = u.github_user.map(|g| g.login);
    // Users without a display name are known by their login
    let name = u
      .name
      .filter(|n| !n.is_empty())
      .or_else(|| login.clone())
      .unwrap_or_default();
    CachedUser {
      id: u.id,
      name,
      login,
    }
  }
}

impl From<ApiIssue> for ResolvedIssue {
  fn from(i: ApiIssue) -> Self {
    ResolvedIssue {
      id: i.id,
      number: i.number,
      title: i.title,
      repo_owner: i.repository.owner_name,
      repo_name: i.repository.name,
      pull_request: i.pull_request,
    }
  }
}

impl ApiSprintsWorkspace {
  /// Accessor IDs reported alongside the sprint page.
  pub fn accessors(&self) -> SprintAccessors {
    let id = |r: &Option<ApiIdRef>| r.as_ref().map(|r| r.id.clone()).unwrap_or_default();
    SprintAccessors {
      active_id: id(&self.active_sprint),
      upcoming_id: id(&self.upcoming_sprint),
      previous_id: id(&self.previous_sprint),
    }
  }
}
