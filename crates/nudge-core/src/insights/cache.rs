//! Time-bounded insight cache
//!
//! Entries are only served while younger than the TTL. Expired entries are
//! swept whenever a new entry is inserted, and the oldest entries are
//! evicted once the cache grows past its capacity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{OwnedMutexGuard, RwLock};
use tracing::debug;

use crate::models::Insight;

/// Default time-to-live for cached insights (10 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default maximum number of cached fingerprints
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// A cached analysis result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub insights: Vec<Insight>,
    pub inserted_at: DateTime<Utc>,
}

/// Process-wide cache of fingerprint -> insights
#[derive(Debug)]
pub struct InsightCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: chrono::Duration,
    max_entries: usize,
}

impl Default for InsightCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl InsightCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl)
                .unwrap_or_else(|_| chrono::Duration::days(365 * 100)),
            max_entries: max_entries.max(1),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.inserted_at < self.ttl
    }

    /// Look up a fresh entry
    pub async fn get(&self, key: &str) -> Option<Vec<Insight>> {
        self.get_at(key, Utc::now()).await
    }

    /// Look up an entry that is fresh as of `now`
    pub async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Insight>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| self.is_fresh(e, now))
            .map(|e| e.insights.clone())
    }

    /// Store (or overwrite) an entry stamped with the current time
    pub async fn put(&self, key: &str, insights: Vec<Insight>) {
        self.put_at(key, insights, Utc::now()).await
    }

    /// Store (or overwrite) an entry stamped with `now`
    pub async fn put_at(&self, key: &str, insights: Vec<Insight>, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;

        // Sweep expired entries while we hold the write lock
        let before = entries.len();
        entries.retain(|_, e| self.is_fresh(e, now));
        let swept = before - entries.len();
        if swept > 0 {
            debug!(swept, "Swept expired insight cache entries");
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                insights,
                inserted_at: now,
            },
        );

        while entries.len() > self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }

    /// Number of stored entries (fresh or not yet swept)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Per-key async locks
///
/// Serializes work on the same fingerprint so concurrent identical requests
/// reach the model once. A key leaves the table once nobody holds or awaits
/// it, including waiters whose future was dropped before acquiring.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, LockSlot>>,
}

#[derive(Debug)]
struct LockSlot {
    lock: Arc<tokio::sync::Mutex<()>>,
    /// Holders plus waiters
    users: usize,
}

/// Guard returned by [`KeyLocks::lock`]
pub struct KeyGuard<'a> {
    // Field order matters: the mutex is released before the slot
    _guard: OwnedMutexGuard<()>,
    _slot: SlotRef<'a>,
}

/// Counts one user of a slot; dropping it releases that use
struct SlotRef<'a> {
    owner: &'a KeyLocks,
    key: String,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let (slot, lock) = {
            let mut locks = self.table();
            let entry = locks.entry(key.to_string()).or_insert_with(|| LockSlot {
                lock: Arc::new(tokio::sync::Mutex::new(())),
                users: 0,
            });
            entry.users += 1;
            (
                SlotRef {
                    owner: self,
                    key: key.to_string(),
                },
                entry.lock.clone(),
            )
        };

        // If this future is dropped while waiting, `slot` still releases its use
        let guard = lock.lock_owned().await;
        KeyGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    /// Number of keys currently locked or awaited
    pub fn active(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, LockSlot>> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for SlotRef<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.table();
        if let Some(slot) = locks.get_mut(&self.key) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                locks.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn insights(text: &str) -> Vec<Insight> {
        vec![Insight::new(text, "tip")]
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = InsightCache::default();
        cache.put("k", insights("a")).await;
        assert_eq!(cache.get("k").await, Some(insights("a")));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_entry_fresh_within_ttl() {
        let cache = InsightCache::new(Duration::from_secs(600), 10);
        cache.put_at("k", insights("a"), t0()).await;

        let later = t0() + chrono::Duration::seconds(599);
        assert_eq!(cache.get_at("k", later).await, Some(insights("a")));
    }

    #[tokio::test]
    async fn test_entry_expires_at_ttl() {
        let cache = InsightCache::new(Duration::from_secs(600), 10);
        cache.put_at("k", insights("a"), t0()).await;

        let at_ttl = t0() + chrono::Duration::seconds(600);
        assert_eq!(cache.get_at("k", at_ttl).await, None);
        // Still stored until swept
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_and_restamps() {
        let cache = InsightCache::new(Duration::from_secs(600), 10);
        cache.put_at("k", insights("old"), t0()).await;

        let later = t0() + chrono::Duration::seconds(500);
        cache.put_at("k", insights("new"), later).await;

        let check = t0() + chrono::Duration::seconds(900);
        assert_eq!(cache.get_at("k", check).await, Some(insights("new")));
    }

    #[tokio::test]
    async fn test_insert_sweeps_expired() {
        let cache = InsightCache::new(Duration::from_secs(60), 10);
        cache.put_at("a", insights("a"), t0()).await;
        cache.put_at("b", insights("b"), t0()).await;
        assert_eq!(cache.len().await, 2);

        let later = t0() + chrono::Duration::seconds(120);
        cache.put_at("c", insights("c"), later).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get_at("c", later).await, Some(insights("c")));
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = InsightCache::new(Duration::from_secs(600), 2);
        cache.put_at("a", insights("a"), t0()).await;
        cache
            .put_at("b", insights("b"), t0() + chrono::Duration::seconds(1))
            .await;
        cache
            .put_at("c", insights("c"), t0() + chrono::Duration::seconds(2))
            .await;

        let now = t0() + chrono::Duration::seconds(3);
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get_at("a", now).await, None);
        assert!(cache.get_at("b", now).await.is_some());
        assert!(cache.get_at("c", now).await.is_some());
    }

    #[tokio::test]
    async fn test_zero_ttl_never_serves() {
        let cache = InsightCache::new(Duration::ZERO, 10);
        cache.put("k", insights("a")).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = InsightCache::default();
        cache.put("k", insights("a")).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_key_locks_released() {
        let locks = KeyLocks::new();
        {
            let _guard = locks.lock("k").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_key_locks_serialize_same_key() {
        let locks = Arc::new(KeyLocks::new());
        let counter = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let guard = locks.lock("k").await;

        let task = {
            let locks = locks.clone();
            let counter = counter.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("k").await;
                counter.lock().await.push("second");
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        counter.lock().await.push("first");
        drop(guard);

        task.await.unwrap();
        assert_eq!(*counter.lock().await, vec!["first", "second"]);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_key_locks_cancelled_waiter_is_pruned() {
        let locks = KeyLocks::new();
        let holder = locks.lock("k").await;

        // Waiter starts waiting, then the holder releases before it is polled again
        let mut waiter = Box::pin(locks.lock("k"));
        assert!(tokio::time::timeout(Duration::from_millis(10), &mut waiter)
            .await
            .is_err());
        drop(holder);
        assert_eq!(locks.active(), 1);

        // Dropping the waiter without acquiring must not leave the key behind
        drop(waiter);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_key_locks_cancelled_waiter_keeps_holder_entry() {
        let locks = KeyLocks::new();
        let holder = locks.lock("k").await;

        let waiter = tokio::time::timeout(Duration::from_millis(10), locks.lock("k")).await;
        assert!(waiter.is_err());
        assert_eq!(locks.active(), 1);

        drop(holder);
        assert_eq!(locks.active(), 0);
    }
}
