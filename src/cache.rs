//! Process-wide TTL cache for catalog snapshots and policy documents.
//!
//! Entries are stored as `{data, stored_at, ttl}` envelopes. The TTL is
//! picked at `set` time from one of two classes:
//!
//! | Class | Default | Used for |
//! |-------|---------|----------|
//! | [`TtlClass::Catalog`] | 5 min | product lists |
//! | [`TtlClass::Policy`] | 30 min | shipping / returns / privacy documents |
//!
//! Expired entries are dropped lazily on `get`, and in bulk by an optional
//! sweeper task started with [`CatalogCache::start_sweeper`]. The sweeper
//! stops on [`CatalogCache::stop_sweeper`] or when the cache is dropped.
//!
//! The map sits behind a `std::sync::RwLock` that is never held across an
//! await. Concurrent writers to one key are last-writer-wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::config::CacheConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Short-lived catalog snapshots.
    Catalog,
    /// Long-lived policy documents.
    Policy,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) >= self.ttl
    }
}

type Entries<V> = RwLock<HashMap<String, CacheEntry<V>>>;

pub struct CatalogCache<V> {
    entries: Arc<Entries<V>>,
    catalog_ttl: Duration,
    policy_ttl: Duration,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V: Clone + Send + Sync + 'static> CatalogCache<V> {
    pub fn new(catalog_ttl: Duration, policy_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            catalog_ttl,
            policy_ttl,
            sweeper: Mutex::new(None),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Duration::from_secs(config.catalog_ttl_secs),
            Duration::from_secs(config.policy_ttl_secs),
        )
    }

    pub fn ttl(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Catalog => self.catalog_ttl,
            TtlClass::Policy => self.policy_ttl,
        }
    }

    /// Live value for `key`. An expired entry is removed and reported as a
    /// miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.data.clone()),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
            debug!(key, "expired cache entry dropped");
        }
        None
    }

    pub fn set(&self, key: impl Into<String>, data: V, class: TtlClass) {
        self.set_with_ttl(key, data, self.ttl(class));
    }

    pub fn set_with_ttl(&self, key: impl Into<String>, data: V, ttl: Duration) {
        let entry = CacheEntry {
            data,
            stored_at: Instant::now(),
            ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .map(|e| e.data)
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries)
    }

    /// Spawn the periodic sweep on the current tokio runtime. A second call
    /// while a sweeper is running does nothing.
    pub fn start_sweeper(&self, interval: Duration) {
        let mut slot = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let weak: Weak<Entries<V>> = Arc::downgrade(&self.entries);
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(entries) = weak.upgrade() else {
                    break;
                };
                let removed = purge(&entries);
                if removed > 0 {
                    debug!(removed, "cache sweep");
                }
            }
        }));
    }

    pub fn stop_sweeper(&self) {
        if let Some(handle) = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl<V> Drop for CatalogCache<V> {
    fn drop(&mut self) {
        let slot = self.sweeper.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

fn purge<V>(entries: &Entries<V>) -> usize {
    let now = Instant::now();
    let mut entries = entries.write().unwrap_or_else(PoisonError::into_inner);
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
}
