use crate::cache::CacheStorage;
use crate::error::Result;
use crate::zenhub::fetch;
use crate::zenhub::types::{CachedPipeline, ResolvedPipeline};

use super::matcher::{Matchable, Strategy};
use super::{require_identifier, Resolver};

const STRATEGIES: &[Strategy] = &[Strategy::ExactId, Strategy::ExactName, Strategy::Substring];

impl Matchable for CachedPipeline {
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
  /// Resolve a pipeline by ID, alias, exact name or unique substring.
  pub async fn pipeline(&self, identifier: &str) -> Result<ResolvedPipeline> {
    let identifier = require_identifier("pipeline", identifier)?;
    let identifier = self.aliases.pipelines.substitute(identifier);
    self
      .resolve_listed::<CachedPipeline, _, _, _>("pipeline", identifier, STRATEGIES, || {
        fetch::pipelines(self.remote(), &self.workspace_id)
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use crate::config::AliasConfig;
  use crate::error::{ApiError, Error, ErrorKind};
  use crate::testing::{page, Fixture, MockRemote};
  use crate::zenhub::types::CachedPipeline;

  fn pipeline(id: &str, name: &str) -> CachedPipeline {
    CachedPipeline {
      id: id.to_string(),
      name: name.to_string(),
      description: None,
    }
  }

  fn board() -> Vec<CachedPipeline> {
    vec![
      pipeline("p1", "New Issues"),
      pipeline("p2", "In Development"),
      pipeline("p3", "Code Review"),
    ]
  }

  fn pipelines_response(nodes: serde_json::Value) -> serde_json::Value {
    json!({ "workspace": { "pipelinesConnection": page(nodes, None) } })
  }

  #[tokio::test]
  async fn test_board_resolution_from_cache() {
    let fx = Fixture::new(MockRemote::new());
    fx.seed("pipelines", &board());

    assert_eq!(fx.resolver.pipeline("Review").await.unwrap().id, "p3");
    assert_eq!(fx.resolver.pipeline("p2").await.unwrap().id, "p2");
    assert_eq!(fx.resolver.pipeline("Dev").await.unwrap().id, "p2");
    assert_eq!(fx.resolver.pipeline("code review").await.unwrap().name, "Code Review");

    match fx.resolver.pipeline("e").await.unwrap_err() {
      Error::Ambiguous { candidates, .. } => {
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
      }
      other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(fx.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_ambiguity_is_reported_without_refresh() {
    let fx = Fixture::new(MockRemote::new());
    fx.seed(
      "pipelines",
      &vec![pipeline("a", "Backlog"), pipeline("b", "Icebox Backlog")],
    );

    let err = fx.resolver.pipeline("log").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    let msg = err.to_string();
    assert!(msg.contains("Backlog (a)"));
    assert!(msg.contains("Icebox Backlog (b)"));
    assert_eq!(fx.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_rename_recovers_with_one_refresh() {
    let remote = MockRemote::new().respond(pipelines_response(json!([
      { "id": "e1", "name": "New" }
    ])));
    let fx = Fixture::new(remote);
    fx.seed("pipelines", &vec![pipeline("e1", "Old")]);

    let resolved = fx.resolver.pipeline("New").await.unwrap();
    assert_eq!(resolved.id, "e1");
    assert_eq!(fx.remote.calls(), 1);

    let cached: Vec<CachedPipeline> = fx.cached("pipelines").unwrap();
    assert_eq!(cached, vec![pipeline("e1", "New")]);

    // Now served from cache
    fx.resolver.pipeline("New").await.unwrap();
    assert_eq!(fx.remote.calls(), 1);
  }

  #[tokio::test]
  async fn test_cold_cache_fetches_with_workspace_scope() {
    let fx = Fixture::new(MockRemote::new().respond(pipelines_response(json!([
      { "id": "p1", "name": "Todo", "description": "incoming" }
    ]))));

    assert_eq!(fx.resolver.pipeline("todo").await.unwrap().id, "p1");
    assert_eq!(fx.remote.variables()[0]["workspaceId"], "ws1");
    assert!(fx.dir.path().join("pipelines-ws1.json").exists());
  }

  #[tokio::test]
  async fn test_not_found_after_refresh() {
    let fx = Fixture::new(MockRemote::new().respond(pipelines_response(json!([]))));
    fx.seed("pipelines", &board());

    let err = fx.resolver.pipeline("Shipped").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "pipeline not found: Shipped");
    assert_eq!(fx.remote.calls(), 1);
  }

  #[tokio::test]
  async fn test_refresh_failure_propagates_without_stale_fallback() {
    let fx = Fixture::new(MockRemote::new().fail(ApiError::Auth("bad token".to_string())));
    fx.seed("pipelines", &board());

    let err = fx.resolver.pipeline("Shipped").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().starts_with("fetching pipelines"));

    // Cache untouched
    let cached: Vec<CachedPipeline> = fx.cached("pipelines").unwrap();
    assert_eq!(cached, board());
  }

  #[tokio::test]
  async fn test_alias_applies_before_matching() {
    let aliases: AliasConfig = serde_yaml::from_str("pipelines:\n  wip: In Development\n").unwrap();
    let mut fx = Fixture::new(MockRemote::new());
    fx.resolver = fx.resolver.with_aliases(aliases);
    fx.seed("pipelines", &board());

    assert_eq!(fx.resolver.pipeline("wip").await.unwrap().id, "p2");
  }

  #[tokio::test]
  async fn test_empty_identifier_is_usage_error() {
    let fx = Fixture::new(MockRemote::new());
    let err = fx.resolver.pipeline("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(fx.remote.calls(), 0);
  }
}
