//! Resolve the names people type (pipelines, epics, issues, labels,
//! sprints, users) into ZenHub entity IDs, backed by a per-workspace file
//! cache that refreshes itself only when a lookup misses.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolve;
pub mod zenhub;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use resolve::Resolver;
