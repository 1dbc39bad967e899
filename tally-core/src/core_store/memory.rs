//! In-memory store backend
//!
//! HashMap-backed `Store` used by tests and store-less local runs.
//! Entries written through `cache_set` expire after their TTL; seeded
//! entries never do. The offline switch makes every operation behave as
//! if the remote store were unreachable, and per-operation counters make
//! call patterns observable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::errors::StoreResult;
use super::Store;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
    ttl: Option<Duration>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    offline: AtomicBool,
    cache_gets: AtomicUsize,
    cache_sets: AtomicUsize,
    gets: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without a TTL, as the remote store would hold it
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let entry = Entry {
            value: value.into(),
            expires_at: None,
            ttl: None,
        };
        self.lock_entries().insert(key.into(), entry);
    }

    /// Make every operation behave as if the store were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// TTL recorded for `key` when it was written through `cache_set`
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.lock_entries().get(key).and_then(|entry| entry.ttl)
    }

    pub fn cache_get_calls(&self) -> usize {
        self.cache_gets.load(Ordering::SeqCst)
    }

    pub fn cache_set_calls(&self) -> usize {
        self.cache_sets.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let mut entries = self.lock_entries();
        let now = Instant::now();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    fn unavailable() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "store is offline")
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn cache_get(&self, key: &str) -> Option<String> {
        self.cache_gets.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return None;
        }
        self.lookup(key)
    }

    async fn cache_set(&self, key: &str, value: &str, ttl: Duration) {
        self.cache_sets.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return;
        }
        let entry = Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + ttl),
            ttl: Some(ttl),
        };
        self.lock_entries().insert(key.to_string(), entry);
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Self::unavailable().into());
        }
        Ok(self.lookup(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_and_get() {
        let store = MemoryStore::new();
        store.set("i:42", r#"["cars","music"]"#);

        assert_eq!(
            store.get("i:42").await.unwrap(),
            Some(r#"["cars","music"]"#.to_string())
        );
        assert_eq!(store.get("i:404").await.unwrap(), None);
        assert_eq!(store.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_round_trip_with_ttl() {
        let store = MemoryStore::new();
        store.cache_set("uid:x", "3.0", Duration::from_secs(3600)).await;

        assert_eq!(store.cache_get("uid:x").await, Some("3.0".to_string()));
        assert_eq!(store.ttl_of("uid:x"), Some(Duration::from_secs(3600)));
        assert_eq!(store.cache_set_calls(), 1);
        assert_eq!(store.cache_get_calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_vanish() {
        let store = MemoryStore::new();
        store.cache_set("k", "v", Duration::ZERO).await;

        assert_eq!(store.cache_get("k").await, None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_offline_behaviour() {
        let store = MemoryStore::new();
        store.set("i:1", "[]");
        store.set_offline(true);

        assert_eq!(store.cache_get("i:1").await, None);
        assert!(store.get("i:1").await.is_err());
        store.cache_set("k", "v", Duration::from_secs(1)).await;

        store.set_offline(false);
        assert_eq!(store.cache_get("k").await, None);
        assert_eq!(store.get("i:1").await.unwrap(), Some("[]".to_string()));
    }
}
