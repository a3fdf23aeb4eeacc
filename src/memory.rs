//! In-Memory Cache Backend
//!
//! Process-local [`CacheBackend`] used as the composite's local tier and
//! as the default test backend. Storage is a lock-free concurrent map;
//! expiry is checked lazily on read, so an entry past its deadline is
//! removed and reported as a miss without a background sweeper.
//!
//! Eviction beyond TTL expiry is delegated to the backend store; this
//! one simply grows with its contents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::base::CacheBackend;
use crate::error::Result;
use crate::stats::CacheStatistics;

struct StoredEntry {
    value: Bytes,
    /// `None` means the entry never expires (zero TTL on store)
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }
}

/// In-memory cache backend with lazy TTL expiry
pub struct MemoryBackend {
    label: String,
    entries: DashMap<String, StoredEntry>,
    hits: AtomicU64,
    gets: AtomicU64,
    puts: AtomicU64,
}

impl MemoryBackend {
    /// Create a backend; `label` names its statistics node
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            gets: AtomicU64::new(0),
            puts: AtomicU64::new(0),
        }
    }

    /// Live (non-expired) entry count
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    /// Whether the backend holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Option<Bytes> {
        self.gets.fetch_add(1, Ordering::Relaxed);

        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            None => return None,
        };

        // Drop the map guard before removing, then report the miss
        if expired {
            self.entries.remove(key);
        }
        None
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.lookup(key))
    }

    // Native multi-get: one pass, no per-key dispatch overhead
    async fn fetch_many(&self, keys: &[String]) -> Result<HashMap<String, Option<Bytes>>> {
        Ok(keys
            .iter()
            .map(|key| (key.clone(), self.lookup(key)))
            .collect())
    }

    async fn store(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        self.puts.fetch_add(1, Ordering::Relaxed);

        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), StoredEntry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    async fn backend_statistics(&self) -> Result<CacheStatistics> {
        let stats = CacheStatistics {
            hits: self.hits.load(Ordering::Relaxed),
            gets: self.gets.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            items: self.len() as u64,
            ..CacheStatistics::empty()
        };
        let node = stats.as_node(self.label.clone());
        Ok(CacheStatistics {
            nodes: vec![node],
            ..stats
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_fetch() {
        let backend = MemoryBackend::new("mem");

        backend
            .store("key", Bytes::from_static(b"data"), Duration::from_secs(60))
            .await
            .unwrap();

        let result = backend.fetch("key").await.unwrap();
        assert_eq!(result, Some(Bytes::from_static(b"data")));
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_read() {
        let backend = MemoryBackend::new("mem");

        backend
            .store("key", Bytes::from_static(b"data"), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(backend.fetch("key").await.unwrap(), None);
        assert!(backend.entries.is_empty());
    }

    #[tokio::test]
    async fn test_zero_ttl_never_expires() {
        let backend = MemoryBackend::new("mem");

        backend
            .store("key", Bytes::from_static(b"data"), Duration::ZERO)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            backend.fetch("key").await.unwrap(),
            Some(Bytes::from_static(b"data"))
        );
    }

    #[tokio::test]
    async fn test_delete_and_flush() {
        let backend = MemoryBackend::new("mem");

        backend
            .store("a", Bytes::from_static(b"1"), Duration::from_secs(60))
            .await
            .unwrap();
        backend
            .store("b", Bytes::from_static(b"2"), Duration::from_secs(60))
            .await
            .unwrap();

        backend.delete("a").await.unwrap();
        assert_eq!(backend.fetch("a").await.unwrap(), None);
        assert_eq!(backend.len(), 1);

        backend.flush().await.unwrap();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_many_single_pass() {
        let backend = MemoryBackend::new("mem");

        backend
            .store("a", Bytes::from_static(b"1"), Duration::from_secs(60))
            .await
            .unwrap();

        let keys = vec!["a".to_string(), "b".to_string()];
        let result = backend.fetch_many(&keys).await.unwrap();

        assert_eq!(result["a"], Some(Bytes::from_static(b"1")));
        assert_eq!(result["b"], None);
    }

    #[tokio::test]
    async fn test_statistics_counters() {
        let backend = MemoryBackend::new("mem");

        backend
            .store("a", Bytes::from_static(b"1"), Duration::from_secs(60))
            .await
            .unwrap();
        backend.fetch("a").await.unwrap();
        backend.fetch("missing").await.unwrap();

        let stats = backend.backend_statistics().await.unwrap();
        assert!(stats.success);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.gets, 2);
        assert_eq!(stats.puts, 1);
        assert_eq!(stats.items, 1);
        assert_eq!(stats.nodes.len(), 1);
        assert_eq!(stats.nodes[0].name, "mem");
    }
}
