//! Bounded, time-limited in-memory cache for read models.
//!
//! Entries expire a fixed time after they were written. When the cache is full, expired
//! entries are purged first and then the oldest entry is evicted.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Returns a copy of the cached value, dropping it if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (entry.inserted_at.elapsed() < self.ttl).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.purge_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.inserted_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            log::debug!("Cache full, evicting oldest entry");
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_insert_get_invalidate() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert(1_i64, "one".to_string());

        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert_eq!(cache.get(&2), None);

        cache.invalidate(&1);
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entries_expire() {
        let cache = TtlCache::new(Duration::from_millis(20), 10);
        cache.insert("task", 1);
        thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.get(&"task"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_full_cache_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert(1, "a");
        thread::sleep(Duration::from_millis(5));
        cache.insert(2, "b");
        thread::sleep(Duration::from_millis(5));
        cache.insert(3, "c");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("b"));
        assert_eq!(cache.get(&3), Some("c"));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(2, "b2");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&2), Some("b2"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
