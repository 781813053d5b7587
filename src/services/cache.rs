//! In-process TTL caches.
//!
//! Entries older than the TTL are invisible to [`CacheStore::get`] but stay
//! readable through [`CacheStore::get_stale`] until they are overwritten or
//! evicted. Timestamps use `tokio::time::Instant` so tests can drive the
//! clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::ServiceId;
use crate::models::service::Service;

/// Key-value cache with time-based staleness.
#[async_trait::async_trait]
pub trait CacheStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// The value for `key` if it was stored less than one TTL ago.
    async fn get(&self, key: &str) -> Option<V>;

    /// The value for `key` regardless of its age.
    async fn get_stale(&self, key: &str) -> Option<V>;

    /// Stores `value` stamped with the current time.
    async fn set(&self, key: String, value: V);
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// A bounded map cache. When full, inserting a new key evicts the entry
/// with the oldest insertion time.
pub struct MemoryCache<V> {
    name: &'static str,
    ttl: Duration,
    max_entries: usize,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

impl<V> MemoryCache<V> {
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration, max_entries: usize) -> Self {
        Self {
            name,
            ttl,
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn is_fresh(&self, entry: &Entry<V>) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }
}

#[async_trait::async_trait]
impl<V> CacheStore<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        let hit = entries
            .get(key)
            .filter(|e| self.is_fresh(e))
            .map(|e| e.value.clone());

        if hit.is_some() {
            debug!(cache = self.name, key, "Cache hit");
            metrics::counter!("cache_hits_total", "cache" => self.name).increment(1);
        } else {
            debug!(cache = self.name, key, "Cache miss");
            metrics::counter!("cache_misses_total", "cache" => self.name).increment(1);
        }
        hit
    }

    async fn get_stale(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).map(|e| e.value.clone())
    }

    async fn set(&self, key: String, value: V) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(cache = self.name, key = %oldest, "Evicted oldest cache entry");
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}

/// The full service list, used to answer by-id and related lookups without
/// a dedicated query.
pub struct ServiceSnapshot {
    ttl: Duration,
    inner: RwLock<Option<Entry<Arc<Vec<Service>>>>>,
}

impl ServiceSnapshot {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::const_new(None),
        }
    }

    /// The snapshot, if one was stored less than one TTL ago.
    pub async fn get(&self) -> Option<Arc<Vec<Service>>> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.value))
    }

    pub async fn set(&self, services: Arc<Vec<Service>>) {
        *self.inner.write().await = Some(Entry {
            value: services,
            stored_at: Instant::now(),
        });
    }

    /// Looks up one service in a fresh snapshot.
    ///
    /// `None` means either no fresh snapshot or no such service; callers that
    /// need to tell the two apart use [`Self::get`].
    pub async fn find(&self, id: &ServiceId) -> Option<Service> {
        self.get()
            .await
            .and_then(|all| all.iter().find(|s| &s.id == id).cloned())
    }
}
