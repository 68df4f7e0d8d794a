use crate::models::Roster;
use crate::services::roster::RosterError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default lifetime of a cached roster
pub const DEFAULT_ROSTER_TTL_SECS: u64 = 600;

/// Time-bounded roster cache keyed by source identity
///
/// Concurrent misses for the same key share one load. Failed loads are
/// never cached. While suspended, every call loads afresh and nothing is
/// stored.
pub struct RosterCache {
    entries: moka::future::Cache<String, Arc<Roster>>,
    suspended: AtomicBool,
    hits: AtomicU64,
    loads: AtomicU64,
}

impl RosterCache {
    /// Create a new roster cache
    pub fn new(ttl_secs: u64, max_sources: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(max_sources)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            entries,
            suspended: AtomicBool::new(false),
            hits: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }

    /// Return the cached roster for `key`, running `loader` on a miss
    pub async fn get_or_load<F>(&self, key: &str, loader: F) -> Result<Arc<Roster>, Arc<RosterError>>
    where
        F: Future<Output = Result<Roster, RosterError>>,
    {
        if self.is_suspended() {
            tracing::debug!("Roster cache suspended, loading {} directly", key);
            self.loads.fetch_add(1, Ordering::Relaxed);
            return loader.await.map(Arc::new).map_err(Arc::new);
        }

        if let Some(roster) = self.entries.get(key).await {
            tracing::trace!("Roster cache hit: {}", key);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(roster);
        }

        tracing::trace!("Roster cache miss: {}", key);
        self.entries
            .try_get_with(key.to_string(), async {
                self.loads.fetch_add(1, Ordering::Relaxed);
                loader.await.map(Arc::new)
            })
            .await
    }

    /// Drop the cached roster for `key`
    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
        tracing::debug!("Invalidated roster cache entry: {}", key);
    }

    /// Bypass the cache until `resume` is called
    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.suspended.store(false, Ordering::Relaxed);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
        }
    }
}

impl Default for RosterCache {
    fn default() -> Self {
        Self::new(DEFAULT_ROSTER_TTL_SECS, 16)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub loads: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(source: &str) -> Roster {
        Roster::empty(source)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = RosterCache::default();

        let first = cache
            .get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) })
            .await
            .unwrap();
        let second = cache
            .get_or_load("file:a.csv", async { Err(RosterError::ApiError(599)) })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = RosterCache::default();

        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        let other = cache
            .get_or_load("file:b.csv", async { Ok(roster("file:b.csv")) })
            .await
            .unwrap();

        assert_eq!(other.source, "file:b.csv");
        assert_eq!(cache.stats().loads, 2);
    }

    #[tokio::test]
    async fn test_failures_not_cached() {
        let cache = RosterCache::default();

        let failed = cache
            .get_or_load("file:a.csv", async {
                Err(RosterError::ApiError(500))
            })
            .await;
        assert!(failed.is_err());

        let loaded = cache
            .get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) })
            .await;
        assert!(loaded.is_ok());
        assert_eq!(cache.stats().loads, 2);
    }

    #[tokio::test]
    async fn test_suspended_always_loads() {
        let cache = RosterCache::default();
        cache.suspend();

        for _ in 0..2 {
            cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        }
        assert_eq!(cache.stats().loads, 2);
        assert_eq!(cache.stats().hits, 0);

        cache.resume();
        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        assert_eq!(cache.stats().loads, 3);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = RosterCache::new(1, 4);

        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        assert_eq!(cache.stats().loads, 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        assert_eq!(cache.stats().loads, 2);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = RosterCache::default();

        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();
        cache.invalidate("file:a.csv").await;
        cache.get_or_load("file:a.csv", async { Ok(roster("file:a.csv")) }).await.unwrap();

        assert_eq!(cache.stats().loads, 2);
    }
}
