//! Core traits and types for the caching system.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Candidate, Error, Result};

/// Separator between resource name and workspace scope in cache filenames.
/// Resource names never contain it.
pub const SCOPE_SEPARATOR: char = '-';

/// Structured cache key: a resource name plus an optional workspace scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  resource: String,
  workspace_id: String,
}

impl CacheKey {
  /// An empty `workspace_id` denotes a resource shared across workspaces.
  pub fn new(resource: impl Into<String>, workspace_id: impl Into<String>) -> Self {
    let resource = resource.into();
    debug_assert!(
      !resource.contains(SCOPE_SEPARATOR) && !resource.is_empty(),
      "invalid cache resource name {:?}",
      resource
    );
    Self {
      resource,
      workspace_id: workspace_id.into(),
    }
  }

  pub fn unscoped(resource: impl Into<String>) -> Self {
    Self::new(resource, "")
  }

  /// Key for the cached list of `T` in a workspace.
  pub fn for_entity<T: Cacheable>(workspace_id: &str) -> Self {
    Self::new(T::resource(), workspace_id)
  }

  pub fn resource(&self) -> &str {
    &self.resource
  }

  pub fn workspace_id(&self) -> Option<&str> {
    if self.workspace_id.is_empty() {
      None
    } else {
      Some(&self.workspace_id)
    }
  }

  /// `<resource>.json` or `<resource>-<workspace_id>.json`.
  pub fn file_name(&self) -> String {
    match self.workspace_id() {
      Some(ws) => format!("{}{}{}.json", self.resource, SCOPE_SEPARATOR, ws),
      None => format!("{}.json", self.resource),
    }
  }

  /// Inverse of [`CacheKey::file_name`]. Returns `None` for anything that
  /// is not a cache file.
  pub fn from_file_name(name: &str) -> Option<Self> {
    let stem = name.strip_suffix(".json")?;
    if stem.is_empty() || stem.starts_with('.') {
      return None;
    }
    let (resource, workspace_id) = match stem.split_once(SCOPE_SEPARATOR) {
      Some((resource, ws)) => (resource, ws),
      None => (stem, ""),
    };
    if resource.is_empty() {
      return None;
    }
    Some(Self {
      resource: resource.to_string(),
      workspace_id: workspace_id.to_string(),
    })
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.workspace_id() {
      Some(ws) => write!(f, "{}[{}]", self.resource, ws),
      None => f.write_str(&self.resource),
    }
  }
}

/// Trait for entities that are cached as workspace-scoped lists.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Resource name used in the cache key (e.g., "pipelines").
  fn resource() -> &'static str;
}

/// Result from a cache operation, including data and where it came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
    }
  }

  pub fn is_refreshed(&self) -> bool {
    self.source == CacheSource::Network
  }
}

/// Indicates where data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Read from the local cache without a network call
  Cache,
  /// Fetched from the remote source during this call
  Network,
}

/// Outcome of looking identifiers up in one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<R> {
  /// Every identifier matched
  Found(R),
  /// An identifier matched more than one entry
  Ambiguous {
    identifier: String,
    candidates: Vec<Candidate>,
  },
  /// These identifiers matched nothing
  Missing(Vec<String>),
}

impl<R> Lookup<R> {
  /// A found or ambiguous lookup is final; a refresh cannot change it.
  pub fn is_settled(&self) -> bool {
    !matches!(self, Lookup::Missing(_))
  }

  /// Convert into the caller-facing error taxonomy.
  pub fn into_result(self, entity: &'static str) -> Result<R> {
    match self {
      Lookup::Found(r) => Ok(r),
      Lookup::Ambiguous {
        identifier,
        candidates,
      } => Err(Error::Ambiguous {
        entity,
        identifier,
        candidates,
      }),
      Lookup::Missing(identifiers) => Err(Error::NotFound {
        entity,
        identifiers,
      }),
    }
  }
}
