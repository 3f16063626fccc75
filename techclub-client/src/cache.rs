/// In-memory response cache with a fixed time-to-live
///
/// Entries are keyed by request URL. A lookup only returns an entry younger
/// than the TTL. Expired entries are dropped when they are looked up and
/// swept on every insert.
///
/// # Example
///
/// ```
/// use techclub_client::cache::ResponseCache;
/// use std::time::Duration;
///
/// # async fn example() {
/// let cache = ResponseCache::new(Duration::from_secs(300));
/// cache.insert("http://localhost/api/applications", vec![1, 2, 3]).await;
///
/// assert_eq!(cache.get("http://localhost/api/applications").await, Some(vec![1, 2, 3]));
/// # }
/// ```

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default time-to-live (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// TTL cache shared across tasks
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        ResponseCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh entry, removing it if it has expired
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            tracing::trace!(key, "Cache entry expired");
        }

        None
    }

    /// Stores `value`, replacing any previous entry and resetting its age
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock().await;

        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let swept = before - entries.len();
        if swept > 0 {
            tracing::trace!(swept, "Swept expired cache entries");
        }

        entries.insert(
            key.into(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    /// Removes every entry whose key starts with `prefix`, returning how many were removed
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        ResponseCache::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        cache.insert("a", 1).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("a").await, Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("a").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_resets_age() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert("a", 1).await;

        tokio::time::advance(Duration::from_secs(8)).await;
        cache.insert("a", 2).await;

        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("a").await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_expired_keys() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("/api/applications?faculty=Engineering", 1).await;
        cache.insert("/api/applications?faculty=Medicine", 2).await;

        tokio::time::advance(Duration::from_secs(45)).await;
        cache.insert("/api/applications?year=2", 3).await;
        assert_eq!(cache.len().await, 3);

        tokio::time::advance(Duration::from_secs(15)).await;
        cache.insert("/api/applications?year=3", 4).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("/api/applications?year=2").await, Some(3));
    }

    #[tokio::test]
    async fn test_invalidation() {
        let cache = ResponseCache::default();
        assert_eq!(cache.ttl(), DEFAULT_TTL);

        cache.insert("/api/applications?status=approved", 1).await;
        cache.insert("/api/applications", 2).await;
        cache.insert("/api/departments", 3).await;

        assert!(cache.invalidate("/api/departments").await);
        assert!(!cache.invalidate("/api/departments").await);

        assert_eq!(cache.invalidate_prefix("/api/applications").await, 2);
        assert!(cache.is_empty().await);

        cache.insert("x", 4).await;
        cache.clear().await;
        assert_eq!(cache.get("x").await, None);
    }
}
