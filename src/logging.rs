//! Tracing setup for the `zh` binary.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "ZH_LOG";

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "zh=debug";

/// Pick the filter: `ZH_LOG` wins, then `-v`, then warnings only.
pub fn filter(verbose: bool) -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
    EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
  })
}

/// Install the global subscriber, writing to stderr or to `log_file`.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the life of the process.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let builder = tracing_subscriber::fmt().with_env_filter(filter(verbose));

  let Some(path) = log_file else {
    builder.with_writer(std::io::stderr).init();
    return Ok(None);
  };

  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  let file_name = path
    .file_name()
    .ok_or_else(|| Error::Config(format!("log file path has no file name: {}", path.display())))?;
  fs::create_dir_all(dir)
    .map_err(|e| Error::Config(format!("cannot create log directory {}: {e}", dir.display())))?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
  builder.with_writer(writer).with_ansi(false).init();
  Ok(Some(guard))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_verbose_filter_targets_crate() {
    // Skip when the environment overrides the filter
    if std::env::var_os(LOG_ENV).is_some() {
      return;
    }
    assert_eq!(filter(true).to_string(), VERBOSE_FILTER);
    assert_eq!(filter(false).to_string(), DEFAULT_FILTER);
  }
}
