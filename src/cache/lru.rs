//! Recency Index Module
//!
//! Owns every live entry and orders them by last touch for LRU eviction.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::arena::{Arena, Handle};
use crate::cache::order::HandleList;
use crate::cache::CacheEntry;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    entry: CacheEntry<V>,
}

// == Recency Index ==
/// Key to entry mapping ordered by recency of last read or write.
///
/// Order runs from least recently used (front) to most recently used (back).
/// Every lookup, touch and removal is O(1).
#[derive(Debug)]
pub struct RecencyIndex<K, V> {
    /// Key to handle lookup
    keys: HashMap<K, Handle>,
    /// Entry storage, addressed by handle
    slots: Arena<Slot<K, V>>,
    /// Handles by recency of last touch
    order: HandleList,
}

impl<K, V> RecencyIndex<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new empty recency index.
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            slots: Arena::new(),
            order: HandleList::new(),
        }
    }

    // == Insert ==
    /// Stores an entry at the newest position and returns its handle.
    ///
    /// The key must not already be present; callers remove the old entry first.
    pub fn insert(&mut self, key: K, entry: CacheEntry<V>) -> Handle {
        debug_assert!(!self.keys.contains_key(&key), "key inserted twice");
        let handle = self.slots.insert(Slot {
            key: key.clone(),
            entry,
        });
        self.keys.insert(key, handle);
        self.order.push_back(handle);
        handle
    }

    // == Find ==
    /// Returns the handle stored under `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keys.get(key).copied()
    }

    pub fn entry(&self, handle: Handle) -> Option<&CacheEntry<V>> {
        self.slots.get(handle).map(|slot| &slot.entry)
    }

    pub fn entry_mut(&mut self, handle: Handle) -> Option<&mut CacheEntry<V>> {
        self.slots.get_mut(handle).map(|slot| &mut slot.entry)
    }

    #[cfg(test)]
    pub fn key(&self, handle: Handle) -> Option<&K> {
        self.slots.get(handle).map(|slot| &slot.key)
    }

    // == Touch ==
    /// Marks a key as most recently used. Returns false if absent.
    #[cfg(test)]
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find(key) {
            Some(handle) => self.touch_handle(handle),
            None => false,
        }
    }

    /// Marks an entry as most recently used. Returns false if absent.
    pub fn touch_handle(&mut self, handle: Handle) -> bool {
        self.order.move_to_back(handle)
    }

    // == Remove ==
    /// Removes an entry by handle, returning its key and entry.
    pub fn remove(&mut self, handle: Handle) -> Option<(K, CacheEntry<V>)> {
        let slot = self.slots.remove(handle)?;
        self.order.unlink(handle);
        self.keys.remove(&slot.key);
        Some((slot.key, slot.entry))
    }

    // == Oldest ==
    /// Returns the least recently used handle without removing it.
    pub fn oldest(&self) -> Option<Handle> {
        self.order.front()
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the index is empty.
    pub fn evict_oldest(&mut self) -> Option<(Handle, K, CacheEntry<V>)> {
        let handle = self.oldest()?;
        let (key, entry) = self.remove(handle)?;
        Some((handle, key, entry))
    }

    // == Iter ==
    /// Iterates from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &K, &CacheEntry<V>)> + '_ {
        self.order.iter().filter_map(move |handle| {
            self.slots
                .get(handle)
                .map(|slot| (handle, &slot.key, &slot.entry))
        })
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    // == Drain ==
    /// Removes every entry in one pass, oldest first.
    pub fn drain(&mut self) -> Vec<(K, CacheEntry<V>)> {
        let handles: Vec<Handle> = self.order.iter().collect();
        let drained = handles
            .into_iter()
            .filter_map(|handle| self.slots.remove(handle))
            .map(|slot| (slot.key, slot.entry))
            .collect();
        self.clear();
        drained
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.keys.clear();
        self.slots.clear();
        self.order.clear();
    }
}

impl<K, V> Default for RecencyIndex<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn entry(value: &'static str) -> CacheEntry<&'static str> {
        CacheEntry::new(value, Instant::now(), Duration::from_secs(60), 0)
    }

    fn filled(keys: &[&str]) -> RecencyIndex<String, &'static str> {
        let mut index = RecencyIndex::new();
        for key in keys {
            index.insert(key.to_string(), entry("v"));
        }
        index
    }

    fn keys_in_order(index: &RecencyIndex<String, &'static str>) -> Vec<String> {
        index.iter().map(|(_, key, _)| key.clone()).collect()
    }

    #[test]
    fn test_recency_new() {
        let index: RecencyIndex<String, ()> = RecencyIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.oldest(), None);
    }

    #[test]
    fn test_insert_and_find() {
        let mut index = RecencyIndex::new();
        let handle = index.insert("key1".to_string(), entry("value1"));

        assert_eq!(index.find("key1"), Some(handle));
        assert_eq!(index.entry(handle).map(|e| e.value), Some("value1"));
        assert_eq!(index.key(handle).map(String::as_str), Some("key1"));
        assert_eq!(index.find("missing"), None);
    }

    #[test]
    fn test_touch_existing_key() {
        let mut index = filled(&["key1", "key2", "key3"]);

        // Touch key1 again - should move to newest
        assert!(index.touch("key1"));

        assert_eq!(index.len(), 3);
        assert_eq!(keys_in_order(&index), vec!["key2", "key3", "key1"]);
    }

    #[test]
    fn test_touch_missing_key() {
        let mut index = filled(&["key1"]);
        assert!(!index.touch("nope"));
        assert_eq!(keys_in_order(&index), vec!["key1"]);
    }

    #[test]
    fn test_evict_oldest() {
        let mut index = filled(&["key1", "key2", "key3"]);

        let (_, key, _) = index.evict_oldest().unwrap();
        assert_eq!(key, "key1");
        assert_eq!(index.len(), 2);
        assert_eq!(index.find("key1"), None);

        let (_, key, _) = index.evict_oldest().unwrap();
        assert_eq!(key, "key2");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_evict_empty() {
        let mut index: RecencyIndex<String, ()> = RecencyIndex::new();
        assert!(index.evict_oldest().is_none());
    }

    #[test]
    fn test_remove() {
        let mut index = filled(&["key1", "key2", "key3"]);
        let handle = index.find("key2").unwrap();

        let (key, _) = index.remove(handle).unwrap();
        assert_eq!(key, "key2");
        assert_eq!(index.len(), 2);
        assert_eq!(keys_in_order(&index), vec!["key1", "key3"]);

        // Second removal of the same handle is a no-op
        assert!(index.remove(handle).is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut index = filled(&["a", "b", "c"]);

        index.touch("a");
        index.touch("c");
        index.touch("b");

        // Oldest to newest: a, c, b
        let evicted: Vec<String> = std::iter::from_fn(|| index.evict_oldest())
            .map(|(_, key, _)| key)
            .collect();
        assert_eq!(evicted, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_drain_returns_oldest_first() {
        let mut index = filled(&["a", "b", "c"]);
        index.touch("a");

        let drained: Vec<String> = index.drain().into_iter().map(|(key, _)| key).collect();
        assert_eq!(drained, vec!["b", "c", "a"]);
        assert!(index.is_empty());
        assert_eq!(index.find("a"), None);
    }
}
