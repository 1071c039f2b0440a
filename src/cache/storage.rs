//! Cache storage trait and file-per-key JSON implementation.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::traits::CacheKey;
use crate::error::{Error, Result};

/// Directory name under the per-user cache root.
pub const APP_DIR: &str = "zh";

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Read the value stored under `key`. Missing and unreadable entries are
  /// both reported as `None`.
  fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T>;

  /// Replace the value stored under `key`.
  fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> Result<()>;

  /// Remove one entry. Removing an absent entry succeeds.
  fn clear(&self, key: &CacheKey) -> Result<()>;

  /// Remove every entry.
  fn clear_all(&self) -> Result<()>;

  /// Remove every entry scoped to `workspace_id`.
  fn clear_scope(&self, workspace_id: &str) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get<T: DeserializeOwned>(&self, _key: &CacheKey) -> Option<T> {
    None // Always miss
  }

  fn set<T: Serialize + ?Sized>(&self, _key: &CacheKey, _value: &T) -> Result<()> {
    Ok(()) // Discard
  }

  fn clear(&self, _key: &CacheKey) -> Result<()> {
    Ok(())
  }

  fn clear_all(&self) -> Result<()> {
    Ok(())
  }

  fn clear_scope(&self, _workspace_id: &str) -> Result<()> {
    Ok(())
  }
}

/// One pretty-printed JSON file per key under a single cache directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
  root: PathBuf,
}

impl FileStorage {
  /// Storage at the default per-user location.
  pub fn open() -> Result<Self> {
    Self::locate(std::env::var_os("XDG_CACHE_HOME"), dirs::home_dir())
  }

  fn locate(xdg_cache_home: Option<OsString>, home: Option<PathBuf>) -> Result<Self> {
    cache_root(xdg_cache_home, home)
      .map(Self::at)
      .ok_or(Error::NoCacheDir)
  }

  /// Storage rooted at an explicit directory. The directory is created on
  /// first write.
  pub fn at(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn path_for(&self, key: &CacheKey) -> PathBuf {
    self.root.join(key.file_name())
  }

  fn ensure_root(&self) -> io::Result<()> {
    if self.root.is_dir() {
      return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::DirBuilderExt;
      builder.mode(0o700);
    }
    builder.create(&self.root)
  }

  fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
    self.ensure_root()?;

    let file_name = path
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or("entry.json");
    let tmp = self.root.join(format!(".{}.tmp", file_name));

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::OpenOptionsExt;
      options.mode(0o600);
    }

    let result = options
      .open(&tmp)
      .and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
      })
      .and_then(|()| fs::rename(&tmp, path));

    if result.is_err() {
      let _ = fs::remove_file(&tmp);
    }
    result
  }

  /// Cache file names in the root, or an empty list if the root is absent.
  fn entries(&self) -> Result<Vec<(CacheKey, PathBuf)>> {
    let dir = match fs::read_dir(&self.root) {
      Ok(dir) => dir,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(source) => {
        return Err(Error::CacheClear {
          path: self.root.clone(),
          source,
        })
      }
    };

    let mut entries = Vec::new();
    for entry in dir.flatten() {
      let name = entry.file_name();
      if let Some(key) = name.to_str().and_then(CacheKey::from_file_name) {
        entries.push((key, entry.path()));
      }
    }
    Ok(entries)
  }
}

impl CacheStorage for FileStorage {
  fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
    let path = self.path_for(key);
    let bytes = match fs::read(&path) {
      Ok(bytes) => bytes,
      Err(e) => {
        if e.kind() != io::ErrorKind::NotFound {
          debug!(path = %path.display(), error = %e, "cache read failed; treating as miss");
        }
        return None;
      }
    };

    match serde_json::from_slice(&bytes) {
      Ok(value) => Some(value),
      Err(e) => {
        debug!(path = %path.display(), error = %e, "cache entry unreadable; treating as miss");
        None
      }
    }
  }

  fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> Result<()> {
    let path = self.path_for(key);
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| Error::CacheWrite {
      path: path.clone(),
      source: io::Error::other(e),
    })?;

    self
      .write_atomic(&path, &bytes)
      .map_err(|source| Error::CacheWrite {
        path: path.clone(),
        source,
      })?;

    debug!(key = %key, bytes = bytes.len(), "cache entry written");
    Ok(())
  }

  fn clear(&self, key: &CacheKey) -> Result<()> {
    remove_if_present(&self.path_for(key))
  }

  fn clear_all(&self) -> Result<()> {
    for (_, path) in self.entries()? {
      remove_if_present(&path)?;
    }
    Ok(())
  }

  fn clear_scope(&self, workspace_id: &str) -> Result<()> {
    for (key, path) in self.entries()? {
      if key.workspace_id() == Some(workspace_id) {
        remove_if_present(&path)?;
      }
    }
    Ok(())
  }
}

fn remove_if_present(path: &Path) -> Result<()> {
  match fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(source) => Err(Error::CacheClear {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// `$XDG_CACHE_HOME/zh` when set and non-empty, else `~/.cache/zh`.
pub fn cache_root(xdg_cache_home: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
  match xdg_cache_home {
    Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir).join(APP_DIR)),
    _ => home.map(|h| h.join(".cache").join(APP_DIR)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use tempfile::TempDir;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Entry {
    id: String,
    name: String,
  }

  fn entries() -> Vec<Entry> {
    vec![
      Entry {
        id: "p1".to_string(),
        name: "New Issues".to_string(),
      },
      Entry {
        id: "p2".to_string(),
        name: "In Development".to_string(),
      },
    ]
  }

  fn storage() -> (TempDir, FileStorage) {
    let tmp = TempDir::new().unwrap();
    let storage = FileStorage::at(tmp.path().join("zh"));
    (tmp, storage)
  }

  #[test]
  fn test_set_then_get_round_trips() {
    let (_tmp, storage) = storage();
    let key = CacheKey::new("pipelines", "ws1");

    storage.set(&key, &entries()).unwrap();
    let loaded: Option<Vec<Entry>> = storage.get(&key);
    assert_eq!(loaded, Some(entries()));
  }

  #[test]
  fn test_get_unset_key_is_miss() {
    let (_tmp, storage) = storage();
    let loaded: Option<Vec<Entry>> = storage.get(&CacheKey::new("pipelines", "ws1"));
    assert_eq!(loaded, None);
  }

  #[test]
  fn test_get_invalid_json_is_miss() {
    let (_tmp, storage) = storage();
    let key = CacheKey::new("pipelines", "ws1");
    fs::create_dir_all(storage.root()).unwrap();
    fs::write(storage.path_for(&key), b"{not json").unwrap();

    let loaded: Option<Vec<Entry>> = storage.get(&key);
    assert_eq!(loaded, None);
  }

  #[test]
  fn test_get_incompatible_shape_is_miss() {
    let (_tmp, storage) = storage();
    let key = CacheKey::new("pipelines", "ws1");
    storage.set(&key, &vec![1, 2, 3]).unwrap();

    let loaded: Option<Vec<Entry>> = storage.get(&key);
    assert_eq!(loaded, None);
  }

  #[test]
  fn test_set_overwrites_previous_contents() {
    let (_tmp, storage) = storage();
    let key = CacheKey::new("pipelines", "ws1");
    storage.set(&key, &entries()).unwrap();

    let replacement = vec![Entry {
      id: "p9".to_string(),
      name: "Done".to_string(),
    }];
    storage.set(&key, &replacement).unwrap();

    let loaded: Option<Vec<Entry>> = storage.get(&key);
    assert_eq!(loaded, Some(replacement));
  }

  #[test]
  fn test_set_writes_pretty_json_without_leftover_tmp() {
    let (_tmp, storage) = storage();
    let key = CacheKey::new("pipelines", "ws1");
    storage.set(&key, &entries()).unwrap();

    let text = fs::read_to_string(storage.path_for(&key)).unwrap();
    assert!(text.contains("\n  {"));

    let names: Vec<String> = fs::read_dir(storage.root())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["pipelines-ws1.json".to_string()]);
  }

  #[cfg(unix)]
  #[test]
  fn test_permissions_restricted_to_owner() {
    use std::os::unix::fs::PermissionsExt;

    let (_tmp, storage) = storage();
    let key = CacheKey::new("labels", "ws1");
    storage.set(&key, &entries()).unwrap();

    let dir_mode = fs::metadata(storage.root()).unwrap().permissions().mode();
    let file_mode = fs::metadata(storage.path_for(&key))
      .unwrap()
      .permissions()
      .mode();
    assert_eq!(dir_mode & 0o777, 0o700);
    assert_eq!(file_mode & 0o777, 0o600);
  }

  #[test]
  fn test_clear_is_idempotent() {
    let (_tmp, storage) = storage();
    let key = CacheKey::new("pipelines", "ws1");
    storage.set(&key, &entries()).unwrap();

    storage.clear(&key).unwrap();
    storage.clear(&key).unwrap();
    assert_eq!(storage.get::<Vec<Entry>>(&key), None);
  }

  #[test]
  fn test_clear_all_on_missing_root_succeeds() {
    let (_tmp, storage) = storage();
    storage.clear_all().unwrap();
    storage.clear_scope("ws1").unwrap();
  }

  #[test]
  fn test_clear_scope_isolates_workspaces() {
    let (_tmp, storage) = storage();
    let a = CacheKey::new("pipelines", "A");
    let a_labels = CacheKey::new("labels", "A");
    let b = CacheKey::new("pipelines", "B");
    let shared = CacheKey::unscoped("orgs");
    let dashed = CacheKey::new("pipelines", "x-A");
    for key in [&a, &a_labels, &b, &shared, &dashed] {
      storage.set(key, &entries()).unwrap();
    }

    storage.clear_scope("A").unwrap();

    assert_eq!(storage.get::<Vec<Entry>>(&a), None);
    assert_eq!(storage.get::<Vec<Entry>>(&a_labels), None);
    assert!(storage.get::<Vec<Entry>>(&b).is_some());
    assert!(storage.get::<Vec<Entry>>(&shared).is_some());
    assert!(storage.get::<Vec<Entry>>(&dashed).is_some());
  }

  #[test]
  fn test_clear_all_removes_only_cache_files() {
    let (_tmp, storage) = storage();
    storage
      .set(&CacheKey::new("pipelines", "A"), &entries())
      .unwrap();
    storage.set(&CacheKey::unscoped("orgs"), &entries()).unwrap();
    fs::write(storage.root().join("README"), "keep").unwrap();

    storage.clear_all().unwrap();

    let names: Vec<String> = fs::read_dir(storage.root())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["README".to_string()]);
  }

  #[test]
  fn test_cache_root_prefers_xdg() {
    assert_eq!(
      cache_root(Some("/xdg".into()), Some("/home/u".into())),
      Some(PathBuf::from("/xdg/zh"))
    );
  }

  #[test]
  fn test_cache_root_ignores_empty_xdg() {
    assert_eq!(
      cache_root(Some("".into()), Some("/home/u".into())),
      Some(PathBuf::from("/home/u/.cache/zh"))
    );
    assert_eq!(
      cache_root(None, Some("/home/u".into())),
      Some(PathBuf::from("/home/u/.cache/zh"))
    );
    assert_eq!(cache_root(None, None), None);
  }

  #[test]
  fn test_unknown_cache_root_is_local_io() {
    let err = FileStorage::locate(None, None).unwrap_err();
    assert!(matches!(err, Error::NoCacheDir));
    assert_eq!(err.kind(), crate::error::ErrorKind::LocalIo);

    let storage = FileStorage::locate(None, Some("/home/u".into())).unwrap();
    assert_eq!(storage.root(), Path::new("/home/u/.cache/zh"));
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let key = CacheKey::new("pipelines", "ws1");
    NoopStorage.set(&key, &entries()).unwrap();
    assert_eq!(NoopStorage.get::<Vec<Entry>>(&key), None);
  }
}
