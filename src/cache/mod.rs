//! Generic caching layer for entity listings.
//!
//! This module provides a ZenHub-agnostic caching mechanism that:
//! - Stores one JSON document per (resource, workspace) key
//! - Treats unreadable entries exactly like absent ones
//! - Refreshes a listing only when a lookup against it misses
//! - Never merges: a refresh replaces the whole entry

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{cache_root, CacheStorage, FileStorage, NoopStorage, APP_DIR};
pub use traits::{CacheKey, CacheResult, CacheSource, Cacheable, Lookup, SCOPE_SEPARATOR};
