//! Expiry Index Module
//!
//! Maps entry handles back to their keys in creation order. With one TTL per
//! cache, creation order is also expiry order, so the front of this index is
//! always the next entry to expire.

use std::collections::HashMap;

use crate::cache::arena::Handle;
use crate::cache::order::HandleList;

// == Expiry Index ==
/// Handle to key mapping ordered by entry creation.
#[derive(Debug)]
pub struct ExpiryIndex<K> {
    /// Key each live handle was stored under
    keys: HashMap<Handle, K>,
    /// Handles by creation time, oldest first
    order: HandleList,
}

impl<K> ExpiryIndex<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            order: HandleList::new(),
        }
    }

    // == Register ==
    /// Records a freshly created entry at the newest position.
    pub fn register(&mut self, handle: Handle, key: K) {
        self.order.push_back(handle);
        self.keys.insert(handle, key);
    }

    // == Unregister ==
    /// Forgets an entry. Absent handles are ignored.
    pub fn unregister(&mut self, handle: Handle) -> Option<K> {
        self.order.unlink(handle);
        self.keys.remove(&handle)
    }

    // == Peek Oldest ==
    /// Returns the earliest created entry without removing it.
    pub fn peek_oldest(&self) -> Option<(Handle, &K)> {
        let handle = self.order.front()?;
        self.keys.get(&handle).map(|key| (handle, key))
    }

    /// Returns the key registered for `handle`.
    #[cfg(test)]
    pub fn key_of(&self, handle: Handle) -> Option<&K> {
        self.keys.get(&handle)
    }

    /// Iterates from oldest to newest creation.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &K)> + '_ {
        self.order
            .iter()
            .filter_map(move |handle| self.keys.get(&handle).map(|key| (handle, key)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.order.clear();
    }
}

impl<K> Default for ExpiryIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::arena::Arena;

    fn handles(n: usize) -> Vec<Handle> {
        let mut arena = Arena::new();
        (0..n).map(|i| arena.insert(i)).collect()
    }

    #[test]
    fn test_expiry_new() {
        let index: ExpiryIndex<String> = ExpiryIndex::new();
        assert!(index.is_empty());
        assert!(index.peek_oldest().is_none());
    }

    #[test]
    fn test_register_and_peek_oldest() {
        let h = handles(3);
        let mut index = ExpiryIndex::new();
        index.register(h[0], "a");
        index.register(h[1], "b");
        index.register(h[2], "c");

        assert_eq!(index.len(), 3);
        assert_eq!(index.peek_oldest(), Some((h[0], &"a")));
        // Peeking does not remove
        assert_eq!(index.peek_oldest(), Some((h[0], &"a")));
    }

    #[test]
    fn test_unregister_by_identity() {
        let h = handles(3);
        let mut index = ExpiryIndex::new();
        index.register(h[0], "a");
        index.register(h[1], "b");
        index.register(h[2], "c");

        assert_eq!(index.unregister(h[0]), Some("a"));
        assert_eq!(index.peek_oldest(), Some((h[1], &"b")));
        assert_eq!(index.key_of(h[0]), None);

        let remaining: Vec<&str> = index.iter().map(|(_, key)| *key).collect();
        assert_eq!(remaining, vec!["b", "c"]);
    }

    #[test]
    fn test_unregister_absent_is_silent() {
        let h = handles(2);
        let mut index = ExpiryIndex::new();
        index.register(h[0], "a");

        assert_eq!(index.unregister(h[1]), None);
        assert_eq!(index.len(), 1);
        assert_eq!(index.unregister(h[0]), Some("a"));
        assert_eq!(index.unregister(h[0]), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_clear() {
        let h = handles(2);
        let mut index = ExpiryIndex::new();
        index.register(h[0], "a");
        index.register(h[1], "b");
        index.clear();

        assert!(index.is_empty());
        assert!(index.peek_oldest().is_none());
    }
}
