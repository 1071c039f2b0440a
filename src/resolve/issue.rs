use tracing::debug;

use crate::cache::CacheStorage;
use crate::error::{Error, Result};
use crate::zenhub::fetch;
use crate::zenhub::types::{ResolvedIssue, ResolvedRepo};

use super::reference::IssueIdentifier;
use super::{require_identifier, Resolver};

impl<S: CacheStorage> Resolver<S> {
  /// Resolve an issue or pull request.
  ///
  /// Accepts `owner/repo#n`, `repo#n`, a bare number, an opaque node ID,
  /// or a branch name. Bare numbers and branches are looked up in `repo`,
  /// falling back to the configured default repository. Branches need a
  /// GitHub client.
  pub async fn issue(&self, identifier: &str, repo: Option<&str>) -> Result<ResolvedIssue> {
    let identifier = require_identifier("issue", identifier)?;
    let repo_context = repo
      .map(str::trim)
      .filter(|r| !r.is_empty())
      .or(self.default_repo.as_deref());

    let parsed = IssueIdentifier::classify(identifier, repo_context.is_some(), self.github.is_some())?;
    debug!(identifier, ?parsed, "classified issue identifier");

    match parsed {
      IssueIdentifier::Reference(reference) => {
        let repo = self.repository(&reference.repo_identifier()).await?;
        self.issue_in(&repo, reference.number).await
      }
      IssueIdentifier::Number(number) => {
        let repo = self.context_repository(repo_context).await?;
        self.issue_in(&repo, number).await
      }
      IssueIdentifier::NodeId(id) => fetch::issue_by_node(self.remote(), &id)
        .await?
        .ok_or_else(|| Error::not_found("issue", id)),
      IssueIdentifier::Branch(branch) => {
        let repo = self.context_repository(repo_context).await?;
        let github = self
          .github
          .as_deref()
          .ok_or_else(|| Error::Usage("branch lookup needs a GitHub token".to_string()))?;
        let number = fetch::pull_request_for_branch(github, &repo.owner, &repo.name, &branch)
          .await?
          .ok_or_else(|| {
            Error::not_found("pull request", format!("branch {} in {}", branch, repo.full_name()))
          })?;
        self.issue_in(&repo, number).await
      }
    }
  }

  async fn context_repository(&self, repo_context: Option<&str>) -> Result<ResolvedRepo> {
    let identifier = repo_context
      .ok_or_else(|| Error::Usage("no repository given; pass --repo or set default_repo".to_string()))?;
    self.repository(identifier).await
  }

  async fn issue_in(&self, repo: &ResolvedRepo, number: u64) -> Result<ResolvedIssue> {
    fetch::issue_by_number(self.remote(), repo.gh_id, number)
      .await?
      .ok_or_else(|| Error::not_found("issue", format!("{}#{}", repo.full_name(), number)))
  }
}
