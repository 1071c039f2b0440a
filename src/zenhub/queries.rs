//! GraphQL documents sent by the fetchers.

pub const PIPELINES: &str = r#"
query ListPipelines($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    pipelinesConnection(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { id name description }
    }
  }
}
"#;

pub const ZENHUB_EPICS: &str = r#"
query ListZenhubEpics($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    zenhubEpics(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { id title state }
    }
  }
}
"#;

pub const ROADMAP_ITEMS: &str = r#"
query ListRoadmapItems($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    roadmap {
      items(first: $first, after: $after) {
        pageInfo { hasNextPage endCursor }
        nodes {
          __typename
          ... on ZenhubEpic { id title state }
          ... on Epic {
            id
            issue {
              title
              number
              state
              repository { name ownerName }
            }
          }
        }
      }
    }
  }
}
"#;

pub const REPOSITORIES: &str = r#"
query ListRepositories($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    repositoriesConnection(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { id ghId name ownerName }
    }
  }
}
"#;

pub const REPOSITORY_LABELS: &str = r#"
query ListRepositoryLabels($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    repositoriesConnection(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes {
        id
        labels(first: $first) {
          pageInfo { hasNextPage endCursor }
          nodes { id name color }
        }
      }
    }
  }
}
"#;

pub const REPOSITORY_LABELS_PAGE: &str = r#"
query RepositoryLabelsPage($repositoryId: ID!, $first: Int!, $after: String) {
  node(id: $repositoryId) {
    ... on Repository {
      labels(first: $first, after: $after) {
        pageInfo { hasNextPage endCursor }
        nodes { id name color }
      }
    }
  }
}
"#;

pub const ZENHUB_LABELS: &str = r#"
query ListZenhubLabels($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    zenhubOrganization {
      zenhubLabels(first: $first, after: $after) {
        pageInfo { hasNextPage endCursor }
        nodes { id name color }
      }
    }
  }
}
"#;

pub const PRIORITIES: &str = r#"
query ListPriorities($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    prioritiesConnection(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { id name color }
    }
  }
}
"#;

pub const SPRINTS: &str = r#"
query ListSprints($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    sprints(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { id name generatedName state startAt endAt }
    }
    activeSprint { id }
    upcomingSprint { id }
    previousSprint { id }
  }
}
"#;

pub const USERS: &str = r#"
query ListUsers($workspaceId: ID!, $first: Int!, $after: String) {
  workspace(id: $workspaceId) {
    zenhubUsers(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes {
        id
        name
        githubUser { login }
      }
    }
  }
}
"#;

pub const ISSUE_BY_INFO: &str = r#"
query IssueByInfo($repositoryGhId: Int!, $issueNumber: Int!) {
  issueByInfo(repositoryGhId: $repositoryGhId, issueNumber: $issueNumber) {
    id
    number
    title
    pullRequest
    repository { name ownerName }
  }
}
"#;

pub const ISSUE_BY_NODE: &str = r#"
query IssueByNode($id: ID!) {
  node(id: $id) {
    __typename
    ... on Issue {
      id
      number
      title
      pullRequest
      repository { name ownerName }
    }
  }
}
"#;

/// GitHub: newest pull request for a head branch, in any state.
pub const PULL_REQUEST_FOR_BRANCH: &str = r#"
query PullRequestForBranch($owner: String!, $name: String!, $branch: String!) {
  repository(owner: $owner, name: $name) {
    pullRequests(
      headRefName: $branch
      first: 1
      states: [OPEN, CLOSED, MERGED]
      orderBy: { field: CREATED_AT, direction: DESC }
    ) {
      nodes { number title }
    }
  }
}
"#;
