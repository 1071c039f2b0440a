//! Entity fetchers: page through the remote API and normalize results into
//! the cached shapes.
//!
//! Pages are requested one after another; each cursor comes from the
//! previous response.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::api_types::{
  ApiIssueByInfoData, ApiLabel, ApiNode, ApiNodeData, ApiPipelinesWorkspace,
  ApiPrioritiesWorkspace, ApiRepositoriesWorkspace, ApiRepositoryLabelsNode,
  ApiRepositoryLabelsWorkspace, ApiRoadmapItem, ApiRoadmapWorkspace,
  ApiSprintsWorkspace, ApiUsersWorkspace, ApiZenhubEpicsWorkspace, ApiZenhubLabelsWorkspace,
  Connection, GhRepositoryData, WorkspaceData,
};
use super::client::GraphQl;
use super::queries;
use super::types::{
  CachedEpic, CachedLabel, CachedPipeline, CachedPriority, CachedRepo, CachedSprint, CachedUser,
  CachedZenhubLabel, ResolvedIssue, SprintAccessors,
};
use crate::error::{ApiError, Error, Result};

const PAGE_SIZE: u32 = 100;

/// Decode a response `data` value, attributing failures to `what`.
fn decode<R: DeserializeOwned>(data: Value, what: &str) -> Result<R> {
  serde_json::from_value(data).map_err(|e| {
    Error::upstream(
      format!("parsing {} response", what),
      ApiError::Malformed(e.to_string()),
    )
  })
}

fn require_workspace<W>(data: WorkspaceData<W>, workspace_id: &str) -> Result<W> {
  data
    .workspace
    .ok_or_else(|| Error::not_found("workspace", workspace_id))
}

/// Fetch every page of a workspace connection.
///
/// `connection` extracts the page from the decoded workspace; it may also
/// pick up side data that arrives with each page.
async fn paginate<W, N, F>(
  client: &dyn GraphQl,
  query: &str,
  workspace_id: &str,
  what: &str,
  mut connection: F,
) -> Result<Vec<N>>
where
  W: DeserializeOwned,
  F: FnMut(W) -> Connection<N>,
{
  let mut nodes = Vec::new();
  let mut after: Option<String> = None;
  let mut page = 0u32;

  loop {
    let mut variables = Map::new();
    variables.insert("workspaceId".into(), json!(workspace_id));
    variables.insert("first".into(), json!(PAGE_SIZE));
    variables.insert("after".into(), after.take().map_or(Value::Null, Value::String));

    let data = client
      .execute(query, Value::Object(variables))
      .await
      .map_err(|e| Error::upstream(format!("fetching {}", what), e))?;

    let workspace = require_workspace(decode::<WorkspaceData<W>>(data, what)?, workspace_id)?;
    let conn = connection(workspace);
    page += 1;
    debug!(what, page, count = conn.nodes.len(), "fetched page");
    nodes.extend(conn.nodes);

    match conn.page_info.end_cursor {
      Some(cursor) if conn.page_info.has_next_page => after = Some(cursor),
      _ => break,
    }
  }

  Ok(nodes)
}

pub async fn pipelines(client: &dyn GraphQl, workspace_id: &str) -> Result<Vec<CachedPipeline>> {
  let nodes = paginate(
    client,
    queries::PIPELINES,
    workspace_id,
    "pipelines",
    |ws: ApiPipelinesWorkspace| ws.pipelines_connection,
  )
  .await?;
  Ok(nodes.into_iter().map(CachedPipeline::from).collect())
}

/// Epics from both sources, merged by ID.
///
/// The dedicated listing covers ZenHub-native epics. Legacy issue-backed
/// epics only appear among roadmap items, which also repeat native epics.
pub async fn epics(client: &dyn GraphQl, workspace_id: &str) -> Result<Vec<CachedEpic>> {
  let native = paginate(
    client,
    queries::ZENHUB_EPICS,
    workspace_id,
    "epics",
    |ws: ApiZenhubEpicsWorkspace| ws.zenhub_epics,
  )
  .await?;

  let roadmap = paginate(
    client,
    queries::ROADMAP_ITEMS,
    workspace_id,
    "roadmap items",
    |ws: ApiRoadmapWorkspace| ws.roadmap.map(|r| r.items).unwrap_or_default(),
  )
  .await?;

  Ok(merge_epics(
    native.into_iter().map(CachedEpic::from).collect(),
    roadmap,
  ))
}

/// Keep every native epic in order, then append roadmap epics not seen yet.
pub fn merge_epics(native: Vec<CachedEpic>, roadmap: Vec<ApiRoadmapItem>) -> Vec<CachedEpic> {
  let mut seen: HashSet<String> = HashSet::new();
  let mut merged = Vec::with_capacity(native.len() + roadmap.len());

  for epic in native {
    if seen.insert(epic.id.clone()) {
      merged.push(epic);
    }
  }

  for item in roadmap {
    let epic = match item {
      ApiRoadmapItem::ZenhubEpic(e) => CachedEpic::from(e),
      ApiRoadmapItem::Epic(e) => CachedEpic::from(e),
      ApiRoadmapItem::Other => continue,
    };
    if seen.insert(epic.id.clone()) {
      merged.push(epic);
    }
  }

  merged
}

pub async fn repositories(client: &dyn GraphQl, workspace_id: &str) -> Result<Vec<CachedRepo>> {
  let nodes = paginate(
    client,
    queries::REPOSITORIES,
    workspace_id,
    "repositories",
    |ws: ApiRepositoriesWorkspace| ws.repositories_connection,
  )
  .await?;
  Ok(nodes.into_iter().map(CachedRepo::from).collect())
}

/// GitHub labels across the workspace's repositories.
///
/// Repositories commonly share label names; the first label seen for a
/// name (case-insensitive) stands for all of them.
pub async fn labels(client: &dyn GraphQl, workspace_id: &str) -> Result<Vec<CachedLabel>> {
  let repos = paginate(
    client,
    queries::REPOSITORY_LABELS,
    workspace_id,
    "labels",
    |ws: ApiRepositoryLabelsWorkspace| ws.repositories_connection,
  )
  .await?;

  let mut all = Vec::new();
  for repo in repos {
    let Some(first) = repo.labels else {
      continue;
    };
    all.extend(first.nodes);
    match first.page_info.end_cursor {
      Some(cursor) if first.page_info.has_next_page => {
        all.extend(remaining_labels(client, &repo.id, cursor).await?)
      }
      _ => {}
    }
  }

  let mut seen: HashSet<String> = HashSet::new();
  let labels = all
    .into_iter()
    .filter(|label| seen.insert(label.name.to_lowercase()))
    .map(CachedLabel::from)
    .collect();
  Ok(labels)
}

/// Label pages of one repository after the first.
async fn remaining_labels(
  client: &dyn GraphQl,
  repository_id: &str,
  cursor: String,
) -> Result<Vec<ApiLabel>> {
  let mut labels = Vec::new();
  let mut after = cursor;

  loop {
    let data = client
      .execute(
        queries::REPOSITORY_LABELS_PAGE,
        json!({ "repositoryId": repository_id, "first": PAGE_SIZE, "after": after }),
      )
      .await
      .map_err(|e| Error::upstream("fetching labels", e))?;

    let response: ApiRepositoryLabelsNode = decode(data, "labels")?;
    let conn = response.node.and_then(|r| r.labels).unwrap_or_default();
    debug!(repository = repository_id, count = conn.nodes.len(), "fetched label page");
    labels.extend(conn.nodes);

    match conn.page_info.end_cursor {
      Some(cursor) if conn.page_info.has_next_page => after = cursor,
      _ => break,
    }
  }

  Ok(labels)
}

/// Organization-scoped ZenHub labels.
pub async fn zenhub_labels(
  client: &dyn GraphQl,
  workspace_id: &str,
) -> Result<Vec<CachedZenhubLabel>> {
  let nodes = paginate(
    client,
    queries::ZENHUB_LABELS,
    workspace_id,
    "zenhub labels",
    |ws: ApiZenhubLabelsWorkspace| {
      ws.zenhub_organization
        .map(|org| org.zenhub_labels)
        .unwrap_or_default()
    },
  )
  .await?;
  Ok(nodes.into_iter().map(CachedZenhubLabel::from).collect())
}

pub async fn priorities(client: &dyn GraphQl, workspace_id: &str) -> Result<Vec<CachedPriority>> {
  let nodes = paginate(
    client,
    queries::PRIORITIES,
    workspace_id,
    "priorities",
    |ws: ApiPrioritiesWorkspace| ws.priorities_connection,
  )
  .await?;
  Ok(nodes.into_iter().map(CachedPriority::from).collect())
}

/// Sprint list plus the accessor record reported with it.
pub async fn sprints(
  client: &dyn GraphQl,
  workspace_id: &str,
) -> Result<(Vec<CachedSprint>, SprintAccessors)> {
  let mut accessors: Option<SprintAccessors> = None;
  let nodes = paginate(
    client,
    queries::SPRINTS,
    workspace_id,
    "sprints",
    |ws: ApiSprintsWorkspace| {
      // Accessors repeat on every page; the first page's view wins
      if accessors.is_none() {
        accessors = Some(ws.accessors());
      }
      ws.sprints
    },
  )
  .await?;

  Ok((
    nodes.into_iter().map(CachedSprint::from).collect(),
    accessors.unwrap_or_default(),
  ))
}

pub async fn users(client: &dyn GraphQl, workspace_id: &str) -> Result<Vec<CachedUser>> {
  let nodes = paginate(
    client,
    queries::USERS,
    workspace_id,
    "users",
    |ws: ApiUsersWorkspace| ws.zenhub_users,
  )
  .await?;
  Ok(nodes.into_iter().map(CachedUser::from).collect())
}

/// Look an issue up by repository GitHub ID and number.
pub async fn issue_by_number(
  client: &dyn GraphQl,
  repo_gh_id: u64,
  number: u64,
) -> Result<Option<ResolvedIssue>> {
  let data = client
    .execute(
      queries::ISSUE_BY_INFO,
      json!({ "repositoryGhId": repo_gh_id, "issueNumber": number }),
    )
    .await;

  let data = match data {
    Ok(data) => data,
    Err(ApiError::NotFound(_)) => return Ok(None),
    Err(e) => return Err(Error::upstream("fetching issue", e)),
  };

  let response: ApiIssueByInfoData = decode(data, "issue")?;
  Ok(response.issue_by_info.map(ResolvedIssue::from))
}

/// Look an issue up by its opaque node ID.
pub async fn issue_by_node(client: &dyn GraphQl, id: &str) -> Result<Option<ResolvedIssue>> {
  let data = client
    .execute(queries::ISSUE_BY_NODE, json!({ "id": id }))
    .await;

  let data = match data {
    Ok(data) => data,
    Err(ApiError::NotFound(_)) => return Ok(None),
    Err(e) => return Err(Error::upstream("fetching issue", e)),
  };

  let response: ApiNodeData = decode(data, "issue")?;
  Ok(match response.node {
    Some(ApiNode::Issue(issue)) => Some(issue.into()),
    _ => None,
  })
}

/// Number of the most recently created pull request whose head is `branch`.
pub async fn pull_request_for_branch(
  github: &dyn GraphQl,
  owner: &str,
  name: &str,
  branch: &str,
) -> Result<Option<u64>> {
  let data = github
    .execute(
      queries::PULL_REQUEST_FOR_BRANCH,
      json!({ "owner": owner, "name": name, "branch": branch }),
    )
    .await
    .map_err(|e| Error::upstream("fetching pull requests", e))?;

  let response: GhRepositoryData = decode(data, "pull request")?;
  Ok(
    response
      .repository
      .and_then(|r| r.pull_requests.nodes.into_iter().next())
      .map(|pr| pr.number),
  )
}
