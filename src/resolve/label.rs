use crate::cache::CacheStorage;
use crate::error::Result;
use crate::zenhub::fetch;
use crate::zenhub::types::{CachedLabel, CachedZenhubLabel, ResolvedLabel};

use super::matcher::{Matchable, Strategy};
use super::{require_identifier, require_identifiers, Resolver};

// Exact matches only
const STRATEGIES: &[Strategy] = &[Strategy::ExactId, Strategy::ExactName];

impl Matchable for CachedLabel {
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

impl Matchable for CachedZenhubLabel {
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
  /// Resolve a GitHub label by ID or exact name.
  pub async fn label(&self, identifier: &str) -> Result<ResolvedLabel> {
    let identifier = require_identifier("label", identifier)?;
    self
      .resolve_listed::<CachedLabel, _, _, _>("label", identifier, STRATEGIES, || {
        fetch::labels(self.remote(), &self.workspace_id)
      })
      .await
  }

  /// Resolve every identifier, or fail naming all that matched nothing.
  pub async fn labels(&self, identifiers: &[&str]) -> Result<Vec<ResolvedLabel>> {
    let identifiers = require_identifiers("label", identifiers)?;
    self
      .resolve_listed_many::<CachedLabel, _, _, _>("label", &identifiers, STRATEGIES, || {
        fetch::labels(self.remote(), &self.workspace_id)
      })
      .await
  }

  /// Resolve a ZenHub (organization) label by ID or exact name.
  pub async fn zenhub_label(&self, identifier: &str) -> Result<ResolvedLabel> {
    let identifier = require_identifier("zenhub label", identifier)?;
    self
      .resolve_listed::<CachedZenhubLabel, _, _, _>("zenhub label", identifier, STRATEGIES, || {
        fetch::zenhub_labels(self.remote(), &self.workspace_id)
      })
      .await
  }

  pub async fn zenhub_labels(&self, identifiers: &[&str]) -> Result<Vec<ResolvedLabel>> {
    let identifiers = require_identifiers("zenhub label", identifiers)?;
    self
      .resolve_listed_many::<CachedZenhubLabel, _, _, _>(
        "zenhub label",
        &identifiers,
        STRATEGIES,
        || fetch::zenhub_labels(self.remote(), &self.workspace_id),
      )
      .await
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use crate::error::{Error, ErrorKind};
  use crate::testing::{page, Fixture, MockRemote};
  use crate::zenhub::types::{CachedLabel, CachedZenhubLabel};

  fn label(id: &str, name: &str) -> CachedLabel {
    CachedLabel {
      id: id.to_string(),
      name: name.to_string(),
      color: "d73a4a".to_string(),
    }
  }

  fn labels_response(names: &[(&str, &str)]) -> serde_json::Value {
    let nodes: Vec<_> = names
      .iter()
      .map(|(id, name)| json!({ "id": id, "name": name, "color": "ededed" }))
      .collect();
    json!({ "workspace": { "repositoriesConnection": page(json!([
      { "id": "r1", "labels": { "nodes": nodes } }
    ]), None) } })
  }

  #[tokio::test]
  async fn test_exact_name_only() {
    let fx = Fixture::new(MockRemote::new().respond(labels_response(&[("l1", "bug")])));
    fx.seed("labels", &vec![label("l1", "bug"), label("l2", "bug: ui")]);

    assert_eq!(fx.resolver.label("BUG").await.unwrap().id, "l1");

    // No substring step: "ui" is a miss, refreshed once, then not found
    let err = fx.resolver.label("ui").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(fx.remote.calls(), 1);
  }

  #[tokio::test]
  async fn test_batch_served_from_cache() {
    let fx = Fixture::new(MockRemote::new());
    fx.seed(
      "labels",
      &vec![label("l1", "bug"), label("l2", "urgent"), label("l3", "docs")],
    );

    let resolved = fx.resolver.labels(&["urgent", "l1"]).await.unwrap();
    let ids: Vec<&str> = resolved.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["l2", "l1"]);
    assert_eq!(fx.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_batch_refreshes_once_and_aggregates_misses() {
    let fx = Fixture::new(MockRemote::new().respond(labels_response(&[
      ("l1", "bug"),
      ("l4", "security"),
    ])));
    fx.seed("labels", &vec![label("l1", "bug")]);

    let err = fx
      .resolver
      .labels(&["bug", "security", "wontfix", "dupe"])
      .await
      .unwrap_err();
    match &err {
      Error::NotFound { entity, identifiers } => {
        assert_eq!(*entity, "label");
        assert_eq!(identifiers, &vec!["wontfix".to_string(), "dupe".to_string()]);
      }
      other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(err.to_string(), "label not found: wontfix, dupe");
    assert_eq!(fx.remote.calls(), 1);
  }

  #[tokio::test]
  async fn test_batch_ambiguity_settles_from_cache() {
    let fx = Fixture::new(MockRemote::new());
    fx.seed(
      "labels",
      &vec![label("l1", "bug"), label("l2", "X"), label("l3", "x")],
    );

    let err = fx.resolver.labels(&["bug", "x"]).await.unwrap_err();
    match &err {
      Error::Ambiguous {
        entity,
        identifier,
        candidates,
      } => {
        assert_eq!(*entity, "label");
        assert_eq!(identifier, "x");
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["l2", "l3"]);
      }
      other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(fx.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_batch_rejects_blank_identifier() {
    let fx = Fixture::new(MockRemote::new());
    let err = fx.resolver.labels(&["bug", " "]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(fx.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_zenhub_labels_use_their_own_listing() {
    let fx = Fixture::new(MockRemote::new());
    fx.seed("labels", &vec![label("l1", "bug")]);
    fx.seed(
      "zenhub_labels",
      &vec![CachedZenhubLabel {
        id: "z1".to_string(),
        name: "Bug".to_string(),
        color: "ff0000".to_string(),
      }],
    );

    assert_eq!(fx.resolver.zenhub_label("bug").await.unwrap().id, "z1");
    assert_eq!(fx.resolver.label("bug").await.unwrap().id, "l1");
    let both = fx.resolver.zenhub_labels(&["z1", "BUG"]).await.unwrap();
    assert_eq!(both.len(), 2);
  }
}
