//! Cache layer that orchestrates caching logic with network fetching.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::storage::CacheStorage;
use super::traits::{CacheKey, CacheResult, Lookup};
use crate::error::Result;

/// Cache layer that manages invalidate-on-miss lookups.
///
/// Cached data is trusted until a lookup against it fails. Then the source
/// is fetched once, the cache entry replaced, and the lookup retried against
/// the fresh data.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// Fail the whole call when a refreshed listing cannot be persisted
  strict_writes: bool,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      strict_writes: false,
    }
  }

  /// Treat a failed cache write after a refresh as a hard error.
  pub fn with_strict_writes(mut self, strict_writes: bool) -> Self {
    self.strict_writes = strict_writes;
    self
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Read a cached value without touching the network.
  pub fn get<V: DeserializeOwned>(&self, key: &CacheKey) -> Option<V> {
    self.storage.get(key)
  }

  /// Persist freshly fetched data under the configured write policy.
  ///
  /// In lenient mode a write failure is logged and swallowed: the caller
  /// still holds the fresh value and resolution can proceed.
  pub fn store<V: Serialize + ?Sized>(&self, key: &CacheKey, value: &V) -> Result<()> {
    match self.storage.set(key, value) {
      Ok(()) => Ok(()),
      Err(e) if !self.strict_writes => {
        warn!(key = %key, error = %e, "failed to update cache; continuing with fetched data");
        Ok(())
      }
      Err(e) => Err(e),
    }
  }

  /// Look identifiers up against cached data, refreshing once on a miss.
  ///
  /// 1. If the cache holds a value and `lookup` settles on it (found or
  ///    ambiguous), return without any network call.
  /// 2. Otherwise fetch via `refresh`; its errors propagate unchanged.
  /// 3. Persist the fresh value.
  /// 4. Run `lookup` on the fresh value and return whatever it reports.
  pub async fn resolve_with_refresh<V, R, F, Fut, L>(
    &self,
    key: &CacheKey,
    refresh: F,
    lookup: L,
  ) -> Result<CacheResult<Lookup<R>>>
  where
    V: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V>>,
    L: Fn(&V) -> Lookup<R>,
  {
    if let Some(cached) = self.storage.get::<V>(key) {
      let found = lookup(&cached);
      if found.is_settled() {
        debug!(key = %key, "resolved from cache");
        return Ok(CacheResult::from_cache(found));
      }
      info!(key = %key, "no match in cache; refreshing");
    } else {
      info!(key = %key, "cache miss; fetching");
    }

    let fresh = refresh().await?;
    self.store(key, &fresh)?;
    Ok(CacheResult::from_network(lookup(&fresh)))
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      strict_writes: self.strict_writes,
    }
  }
}
