//! Caching implementations for ZenHub types.

use crate::cache::Cacheable;

use super::types::{
  CachedEpic, CachedLabel, CachedPipeline, CachedPriority, CachedRepo, CachedSprint, CachedUser,
  CachedZenhubLabel,
};

/// Resource name of the sprint accessor record, stored beside the sprint list.
pub const SPRINT_ACCESSORS: &str = "sprint_accessors";

/// Every resource name written to the cache.
pub const RESOURCES: &[&str] = &[
  "pipelines",
  "epics",
  "repos",
  "labels",
  "zenhub_labels",
  "priorities",
  "sprints",
  SPRINT_ACCESSORS,
  "users",
];

macro_rules! cacheable {
  ($ty:ty, $resource:literal) => {
    impl Cacheable for $ty {
      fn resource() -> &'static str {
        $resource
      }
    }
  };
}

cacheable!(CachedPipeline, "pipelines");
cacheable!(CachedEpic, "epics");
cacheable!(CachedRepo, "repos");
cacheable!(CachedLabel, "labels");
cacheable!(CachedZenhubLabel, "zenhub_labels");
cacheable!(CachedPriority, "priorities");
cacheable!(CachedSprint, "sprints");
cacheable!(CachedUser, "users");
