use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::resolve::AliasTable;

pub const DEFAULT_ZENHUB_URL: &str = "https://api.zenhub.com/public/graphql";
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com/graphql";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub zenhub: ZenhubConfig,
  #[serde(default)]
  pub github: GithubConfig,
  /// Repository (`owner/name` or `name`) used for bare issue numbers and branches
  pub default_repo: Option<String>,
  /// Request timeout for remote calls
  pub timeout_secs: Option<u64>,
  #[serde(default)]
  pub aliases: AliasConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZenhubConfig {
  #[serde(default = "default_zenhub_url")]
  pub url: String,
  /// Workspace ID all listings are scoped to
  pub workspace: Option<String>,
}

impl Default for ZenhubConfig {
  fn default() -> Self {
    Self {
      url: default_zenhub_url(),
      workspace: None,
    }
  }
}

fn default_zenhub_url() -> String {
  DEFAULT_ZENHUB_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
  #[serde(default = "default_github_url")]
  pub url: String,
}

impl Default for GithubConfig {
  fn default() -> Self {
    Self {
      url: default_github_url(),
    }
  }
}

fn default_github_url() -> String {
  DEFAULT_GITHUB_URL.to_string()
}

/// User-defined shorthands, substituted before cache lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasConfig {
  #[serde(default)]
  pub pipelines: AliasTable,
  #[serde(default)]
  pub epics: AliasTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Fail resolution when a refreshed listing cannot be written to disk
  #[serde(default)]
  pub strict_writes: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      strict_writes: false,
    }
  }
}

fn default_true() -> bool {
  true
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./zh.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/zh/config.yaml
  /// 4. ~/.config/zh/config.yaml
  ///
  /// With no explicit path and no file found, defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(Error::Config(format!(
          "Config file not found: {}",
          p.display()
        )));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    config_candidates(dirs::config_dir(), dirs::home_dir())
      .into_iter()
      .find(|p| p.exists())
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
      Error::Config(format!(
        "Failed to read config file {}: {}",
        path.display(),
        e
      ))
    })?;

    Self::from_yaml(&contents).map_err(|e| {
      Error::Config(format!(
        "Failed to parse config file {}: {}",
        path.display(),
        e
      ))
    })
  }

  pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes as unit, not as an empty mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Workspace from the command line, `ZH_WORKSPACE`, or the config file.
  pub fn workspace_id(&self, cli_override: Option<&str>) -> Result<String> {
    cli_override
      .map(String::from)
      .or_else(|| std::env::var("ZH_WORKSPACE").ok().filter(|w| !w.is_empty()))
      .or_else(|| self.zenhub.workspace.clone())
      .ok_or_else(|| {
        Error::Config(
          "No workspace configured. Set zenhub.workspace in config.yaml, ZH_WORKSPACE, or pass --workspace."
            .to_string(),
        )
      })
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs.unwrap_or(30))
  }

  /// Get the ZenHub API key from environment variables.
  ///
  /// Checks ZH_API_KEY first, then ZENHUB_API_KEY as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("ZH_API_KEY")
      .or_else(|_| std::env::var("ZENHUB_API_KEY"))
      .map_err(|_| {
        Error::Config(
          "ZenHub API key not found. Set ZH_API_KEY or ZENHUB_API_KEY environment variable."
            .to_string(),
        )
      })
  }

  /// Get the GitHub token from environment variables.
  ///
  /// Checks GITHUB_TOKEN, then GH_TOKEN. Branch lookups are unavailable
  /// without one.
  pub fn get_github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
      .or_else(|_| std::env::var("GH_TOKEN"))
      .ok()
      .filter(|t| !t.is_empty())
  }
}

/// Config file locations in search order, without duplicates.
///
/// `~/.config` is listed separately because the platform config directory
/// is elsewhere on macOS.
fn config_candidates(config_dir: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
  let mut candidates = vec![PathBuf::from("zh.yaml")];
  let dirs = config_dir.into_iter().chain(home.map(|h| h.join(".config")));
  for dir in dirs {
    let path = dir.join("zh").join("config.yaml");
    if !candidates.contains(&path) {
      candidates.push(path);
    }
  }
  candidates
}
