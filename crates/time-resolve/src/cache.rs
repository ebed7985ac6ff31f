//! Resolution result caching.
//!
//! Time resolution costs up to three upstream probes; the answer only
//! changes when the upstream publishes a new daily raster. Results are
//! cached with a short TTL, keyed by layer, selector, and UTC day so a
//! cached "latest" can never leak across a midnight boundary.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ocean_common::ResolvedTime;
use tokio::sync::RwLock;
use tracing::debug;

struct CachedResolution {
    resolved: ResolvedTime,
    inserted_at: Instant,
}

/// TTL cache for resolved times.
pub struct ResolutionCache {
    entries: RwLock<HashMap<String, CachedResolution>>,
    ttl: Duration,
}

impl ResolutionCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    pub async fn get(&self, key: &str) -> Option<ResolvedTime> {
        let guard = self.entries.read().await;
        if let Some(cached) = guard.get(key) {
            if cached.inserted_at.elapsed() < self.ttl {
                debug!(key = key, "time resolution cache hit");
                return Some(cached.resolved.clone());
            }
            debug!(key = key, "time resolution cache expired");
        }
        None
    }

    pub async fn set(&self, key: String, resolved: ResolvedTime) {
        let mut guard = self.entries.write().await;
        guard.insert(
            key,
            CachedResolution {
                resolved,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop everything. Expired entries are otherwise only evicted lazily.
    pub async fn invalidate(&self) {
        let mut guard = self.entries.write().await;
        guard.clear();
        debug!("time resolution cache invalidated");
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocean_common::time::utc_today;

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let cache = ResolutionCache::new(60);
        let resolved = ResolvedTime::new(utc_today(), 0);
        cache.set("sst:latest:2026-08-30".to_string(), resolved.clone()).await;

        let hit = cache.get("sst:latest:2026-08-30").await;
        assert_eq!(hit, Some(resolved));
    }

    #[tokio::test]
    async fn test_cache_miss_when_empty() {
        let cache = ResolutionCache::new(60);
        assert!(cache.get("sst:latest:2026-08-30").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let cache = ResolutionCache::new(0);
        cache
            .set("k".to_string(), ResolvedTime::new(utc_today(), 0))
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_clears_entries() {
        let cache = ResolutionCache::new(60);
        cache
            .set("a".to_string(), ResolvedTime::new(utc_today(), 0))
            .await;
        cache
            .set("b".to_string(), ResolvedTime::new(utc_today(), 1))
            .await;

        cache.invalidate().await;

        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_none());
    }
}
