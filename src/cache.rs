//! In-process read-through cache for the overview read path.
//! Entries expire after a TTL and are dropped by key pattern on recompute.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::models::overview::ProjectOverview;

pub type SharedOverviewCache = Arc<Mutex<OverviewCache>>;

#[derive(Debug, Clone)]
struct CachedOverview {
    stored_at: Instant,
    overview: ProjectOverview,
}

#[derive(Debug)]
pub struct OverviewCache {
    ttl: Duration,
    entries: HashMap<String, CachedOverview>,
}

impl Default for OverviewCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl OverviewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn shared(ttl: Duration) -> SharedOverviewCache {
        Arc::new(Mutex::new(Self::new(ttl)))
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    pub fn key(project_id: &str, trend_limit: usize) -> String {
        format!("overview:{project_id}:{trend_limit}")
    }

    /// Glob matching every overview key for a project.
    pub fn project_pattern(project_id: &str) -> String {
        format!("overview:{}:*", glob::Pattern::escape(project_id))
    }

    pub fn get(&mut self, key: &str) -> Option<ProjectOverview> {
        let fresh = self
            .entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if !fresh {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.overview.clone())
    }

    pub fn put(&mut self, key: String, overview: ProjectOverview) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key,
            CachedOverview {
                stored_at: Instant::now(),
                overview,
            },
        );
    }

    /// Remove every entry whose key matches `pattern`; returns how many went.
    pub fn invalidate_matching(&mut self, pattern: &str) -> Result<usize, glob::PatternError> {
        let pattern = glob::Pattern::new(pattern)?;
        let before = self.entries.len();
        self.entries.retain(|key, _| !pattern.matches(key));
        Ok(before - self.entries.len())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drop a project's overview entries. Failures are logged and swallowed.
pub fn invalidate_project(cache: &SharedOverviewCache, project_id: &str) {
    let pattern = OverviewCache::project_pattern(project_id);
    match cache.lock() {
        Ok(mut lock) => match lock.invalidate_matching(&pattern) {
            Ok(removed) => log::debug!("invalidated {removed} overview entries for {project_id}"),
            Err(e) => log::warn!("overview cache invalidation skipped for {project_id}: {e}"),
        },
        Err(_) => log::warn!("overview cache lock poisoned; invalidation skipped for {project_id}"),
    }
}
