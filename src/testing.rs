//! Test doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::cache::{CacheKey, CacheLayer, CacheStorage, FileStorage};
use crate::error::ApiError;
use crate::resolve::Resolver;
use crate::zenhub::GraphQl;

pub const WORKSPACE: &str = "ws1";

/// Remote that replays queued responses in order and records every call.
///
/// A call with nothing queued fails, so a `MockRemote::new()` with no
/// responses doubles as "the network must not be touched".
#[derive(Default)]
pub struct MockRemote {
  responses: Mutex<VecDeque<Result<Value, ApiError>>>,
  calls: Mutex<Vec<(String, Value)>>,
}

impl MockRemote {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn respond(self, data: Value) -> Self {
    self.responses.lock().unwrap().push_back(Ok(data));
    self
  }

  pub fn fail(self, error: ApiError) -> Self {
    self.responses.lock().unwrap().push_back(Err(error));
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.lock().unwrap().len()
  }

  pub fn variables(&self) -> Vec<Value> {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .map(|(_, vars)| vars.clone())
      .collect()
  }

  pub fn queries(&self) -> Vec<String> {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .map(|(q, _)| q.clone())
      .collect()
  }
}

impl GraphQl for MockRemote {
  fn execute<'a>(
    &'a self,
    query: &'a str,
    variables: Value,
  ) -> BoxFuture<'a, Result<Value, ApiError>> {
    self
      .calls
      .lock()
      .unwrap()
      .push((query.to_string(), variables));
    let response = self
      .responses
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(ApiError::Failed("unexpected remote call".to_string())));
    Box::pin(future::ready(response))
  }
}

/// One page of a connection.
pub fn page(nodes: Value, next_cursor: Option<&str>) -> Value {
  json!({
    "pageInfo": { "hasNextPage": next_cursor.is_some(), "endCursor": next_cursor },
    "nodes": nodes,
  })
}

/// Resolver over a throwaway cache directory and a scripted remote.
pub struct Fixture {
  pub dir: TempDir,
  pub remote: Arc<MockRemote>,
  pub github: Option<Arc<MockRemote>>,
  pub resolver: Resolver<FileStorage>,
}

impl Fixture {
  pub fn new(remote: MockRemote) -> Self {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(remote);
    let cache = CacheLayer::new(FileStorage::at(dir.path()));
    let resolver = Resolver::new(remote.clone(), cache, WORKSPACE);
    Self {
      dir,
      remote,
      github: None,
      resolver,
    }
  }

  pub fn with_github(mut self, github: MockRemote) -> Self {
    let github = Arc::new(github);
    self.resolver = self.resolver.with_github(github.clone());
    self.github = Some(github);
    self
  }

  pub fn with_default_repo(mut self, repo: &str) -> Self {
    self.resolver = self.resolver.with_default_repo(Some(repo.to_string()));
    self
  }

  /// Write `value` under `resource` for the fixture workspace.
  pub fn seed<T: Serialize + ?Sized>(&self, resource: &str, value: &T) {
    self
      .resolver
      .cache()
      .storage()
      .set(&CacheKey::new(resource, WORKSPACE), value)
      .unwrap();
  }

  pub fn cached<T: DeserializeOwned>(&self, resource: &str) -> Option<T> {
    self
      .resolver
      .cache()
      .storage()
      .get(&CacheKey::new(resource, WORKSPACE))
  }
}
