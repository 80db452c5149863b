//! Process-local, versioned, TTL-based projection cache.
//!
//! Keys embed `CACHE_VERSION`, so bumping the constant after a generation
//! logic change silently invalidates every previously cached result without a
//! distributed flush. The cache is an in-process instance created at startup
//! and injected where needed; concurrent requests for the same key may both
//! miss and both recompute, with last-write-wins on `set` (accepted tradeoff).

use crate::month::MonthKey;
use crate::ProjectionResult;
use log::debug;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Bump whenever generation logic changes in a way that stales cached output.
pub const CACHE_VERSION: u32 = 1;

/// Default entry lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    result: ProjectionResult,
    expires_at: Instant,
}

pub struct ProjectionCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for ProjectionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn key(user_id: &str, start_month: MonthKey, end_month: MonthKey) -> String {
        format!("v{CACHE_VERSION}:{user_id}:{start_month}:{end_month}")
    }

    fn user_prefix(user_id: &str) -> String {
        format!("v{CACHE_VERSION}:{user_id}:")
    }

    /// Returns the cached result, or `None` on miss or expiry. Expired
    /// entries are evicted on read.
    pub fn get(
        &self,
        user_id: &str,
        start_month: MonthKey,
        end_month: MonthKey,
    ) -> Option<ProjectionResult> {
        let key = Self::key(user_id, start_month, end_month);
        let mut entries = self.entries.lock().ok()?;
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.result.clone()),
            Some(_) => {
                debug!("evicting expired cache entry {key}");
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Stores a result, with an optional per-call TTL override.
    pub fn set(
        &self,
        user_id: &str,
        start_month: MonthKey,
        end_month: MonthKey,
        result: ProjectionResult,
        ttl_override: Option<Duration>,
    ) {
        let key = Self::key(user_id, start_month, end_month);
        let ttl = ttl_override.unwrap_or(self.ttl);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                CacheEntry {
                    result,
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }

    /// Drops every entry belonging to the user. Returns the number removed.
    pub fn invalidate_user(&self, user_id: &str) -> usize {
        let prefix = Self::user_prefix(user_id);
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result() -> ProjectionResult {
        ProjectionResult {
            projections: Vec::new(),
            monthly_totals: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    fn months() -> (MonthKey, MonthKey) {
        (MonthKey::new(2026, 1), MonthKey::new(2026, 12))
    }

    #[test]
    fn test_set_then_get_hits() {
        let cache = ProjectionCache::new();
        let (start, end) = months();
        assert!(cache.get("u1", start, end).is_none());

        cache.set("u1", start, end, result(), None);
        assert!(cache.get("u1", start, end).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_windows_are_distinct_keys() {
        let cache = ProjectionCache::new();
        let (start, end) = months();
        cache.set("u1", start, end, result(), None);
        assert!(cache.get("u1", start, MonthKey::new(2026, 6)).is_none());
        assert!(cache.get("u2", start, end).is_none());
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = ProjectionCache::new();
        let (start, end) = months();
        cache.set("u1", start, end, result(), Some(Duration::ZERO));
        assert!(cache.get("u1", start, end).is_none());
        // Expired entry was evicted on read.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_invalidate_user_removes_only_that_user() {
        let cache = ProjectionCache::new();
        let (start, end) = months();
        cache.set("u1", start, end, result(), None);
        cache.set("u1", start, MonthKey::new(2026, 6), result(), None);
        cache.set("u2", start, end, result(), None);

        assert_eq!(cache.invalidate_user("u1"), 2);
        assert!(cache.get("u1", start, end).is_none());
        assert!(cache.get("u2", start, end).is_some());
    }

    #[test]
    fn test_clear_empties_everything() {
        let cache = ProjectionCache::new();
        let (start, end) = months();
        cache.set("u1", start, end, result(), None);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_embeds_version() {
        let (start, end) = months();
        assert_eq!(
            ProjectionCache::key("u1", start, end),
            format!("v{CACHE_VERSION}:u1:2026-01:2026-12")
        );
    }
}
