//! Cache Store Module
//!
//! Main cache engine combining the recency index and the expiry index with
//! lazy, amortized TTL expiration and LRU eviction under count and memory
//! pressure.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::cache::arena::Handle;
use crate::cache::clock::{Clock, SystemClock};
use crate::cache::expiry::ExpiryIndex;
use crate::cache::lru::RecencyIndex;
use crate::cache::size::{estimate_charge, EstimateSize, Weigher};
use crate::cache::{CacheEntry, CacheStats};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Removal Cause ==
/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Its TTL elapsed
    Expired,
    /// Count or memory pressure pushed it out
    Evicted,
    /// A `set` on the same key stored a new entry
    Replaced,
    /// Removed by `delete`
    Deleted,
    /// Removed by `clear`
    Cleared,
}

/// Callback notified of every removal.
pub type RemovalListener<K, V> = Box<dyn FnMut(&K, &V, RemovalCause)>;

// == Cache Store ==
/// Single-threaded cache with LRU eviction and TTL expiration.
///
/// Every operation is O(1) amortized. Expired entries are dropped lazily when
/// they are read, and in a bounded sweep every `expire_interval` calls to
/// [`set`](CacheStore::set). No background thread is involved, and the store
/// performs no locking: wrap it in a mutex to share it across threads.
pub struct CacheStore<K, V, C = SystemClock> {
    /// Key to entry mapping, ordered by last touch
    recency: RecencyIndex<K, V>,
    /// Entry to key mapping, ordered by creation (and so by expiry)
    expiry: ExpiryIndex<K>,
    config: CacheConfig,
    /// 75% of `max_mem_bytes`, when memory is tracked
    mem_threshold: Option<usize>,
    /// Sets since the last amortized sweep
    op_count: usize,
    /// Sum of live entry charges
    mem_used: usize,
    weigher: Weigher<K, V>,
    clock: C,
    stats: CacheStats,
    listener: Option<RemovalListener<K, V>>,
}

impl<K, V> CacheStore<K, V, SystemClock>
where
    K: Hash + Eq + Clone + EstimateSize + 'static,
    V: EstimateSize + 'static,
{
    // == Constructor ==
    /// Creates a new CacheStore sized with the default estimators.
    ///
    /// # Errors
    /// Fails if the configuration does not pass [`CacheConfig::validate`].
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, estimate_charge::<K, V>, SystemClock)
    }
}

impl<K, V> CacheStore<K, V, SystemClock>
where
    K: Hash + Eq + Clone,
{
    /// Creates a new CacheStore that sizes entries with `weigher`.
    pub fn with_weigher<W>(config: CacheConfig, weigher: W) -> Result<Self>
    where
        W: Fn(&K, &V) -> usize + 'static,
    {
        Self::with_clock(config, weigher, SystemClock)
    }
}

impl<K, V, C> CacheStore<K, V, C>
where
    K: Hash + Eq + Clone,
    C: Clock,
{
    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock<W>(config: CacheConfig, weigher: W, clock: C) -> Result<Self>
    where
        W: Fn(&K, &V) -> usize + 'static,
    {
        config.validate()?;
        debug!(
            max_count = config.max_count,
            ttl = ?config.ttl,
            expire_interval = config.expire_interval,
            max_mem_bytes = ?config.max_mem_bytes,
            "cache store created"
        );

        Ok(Self {
            recency: RecencyIndex::new(),
            expiry: ExpiryIndex::new(),
            mem_threshold: config.mem_threshold(),
            config,
            op_count: 0,
            mem_used: 0,
            weigher: Box::new(weigher),
            clock,
            stats: CacheStats::new(),
            listener: None,
        })
    }

    /// Registers a callback invoked on every removal path.
    pub fn with_removal_listener<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&K, &V, RemovalCause) + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let Some(handle) = self.live_handle(key, now) else {
            self.stats.record_miss();
            return None;
        };

        self.stats.record_hit();
        self.recency.touch_handle(handle);
        self.recency.entry(handle).map(|entry| &entry.value)
    }

    // == Peek ==
    /// Reads a value without touching recency or removing anything.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let handle = self.recency.find(key)?;
        self.recency
            .entry(handle)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| &entry.value)
    }

    // == Contains Key ==
    /// Checks presence without touching recency. Drops the entry if expired.
    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.live_handle(key, now).is_some()
    }

    // == Expires In ==
    /// Remaining lifetime of a live entry.
    pub fn expires_in<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let handle = self.recency.find(key)?;
        self.recency
            .entry(handle)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    // == Fetch ==
    /// Returns the cached value, or computes, stores and returns it.
    ///
    /// `compute` runs exactly once on a miss and never on a hit.
    pub fn fetch<F>(&mut self, key: K, compute: F) -> V
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value.clone();
        }

        let value = compute();
        self.set(key, value.clone());
        value
    }

    /// Like [`fetch`](CacheStore::fetch) with a fallible computation.
    ///
    /// An error is returned as is and nothing is stored.
    pub fn try_fetch<F, E>(&mut self, key: K, compute: F) -> std::result::Result<V, E>
    where
        V: Clone,
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value.clone());
        }

        let value = compute()?;
        self.set(key, value.clone());
        Ok(value)
    }

    // == Set ==
    /// Stores a key-value pair as the newest entry.
    ///
    /// Runs the amortized expiration sweep first, replaces any existing entry
    /// for the key, then evicts least recently used entries until the count
    /// and memory bounds hold again.
    ///
    /// Returns the value this call displaced, not the one just stored: the
    /// previous live value for the key, or `None` when the key was absent or
    /// its entry had expired. The caller already owns the stored value, so
    /// echoing it back would force a `V: Clone` bound.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let now = self.clock.now();
        self.tick(now);

        let previous = match self.recency.find(&key) {
            Some(handle) => {
                let expired = self.is_expired(handle, now);
                let cause = if expired {
                    RemovalCause::Expired
                } else {
                    RemovalCause::Replaced
                };
                self.remove_handle(handle, cause)
                    .filter(|_| !expired)
                    .map(|(_, entry)| entry.value)
            }
            None => None,
        };

        // A charge above the ceiling is evicted right away, so clamping it
        // there keeps the sum from overflowing without changing the outcome.
        let charge = match self.config.max_mem_bytes {
            Some(max) => (self.weigher)(&key, &value).min(max),
            None => 0,
        };
        let entry = CacheEntry::new(value, now, self.config.ttl, charge);
        let handle = self.recency.insert(key.clone(), entry);
        self.expiry.register(handle, key);
        self.mem_used = self.mem_used.saturating_add(charge);

        self.evict_overflow();
        previous
    }

    // == Delete ==
    /// Removes an entry by key, returning its value.
    ///
    /// An expired entry is removed too but reported as absent. Does not run
    /// expiration or eviction.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.recency.find(key)?;
        let expired = self.is_expired(handle, self.clock.now());
        let cause = if expired {
            RemovalCause::Expired
        } else {
            RemovalCause::Deleted
        };

        let (_, entry) = self.remove_handle(handle, cause)?;
        (!expired).then_some(entry.value)
    }

    // == Clear ==
    /// Removes every entry and resets accounting.
    pub fn clear(&mut self) {
        let cleared = self.recency.len();
        match self.listener.as_mut() {
            Some(listener) => {
                for (key, entry) in self.recency.drain() {
                    listener(&key, &entry.value, RemovalCause::Cleared);
                }
            }
            None => self.recency.clear(),
        }
        self.expiry.clear();
        self.mem_used = 0;
        self.op_count = 0;

        debug!(cleared, "cache cleared");
    }

    // == Expire ==
    /// Removes every expired entry now. Returns how many were removed.
    pub fn expire(&mut self) -> usize {
        let now = self.clock.now();
        self.sweep(now)
    }

    // == Iter ==
    /// Expires stale entries, then snapshots the rest from least to most
    /// recently used.
    ///
    /// This copies every live pair; use [`get`](CacheStore::get) for lookups.
    pub fn iter(&mut self) -> Snapshot<K, V>
    where
        V: Clone,
    {
        self.expire();
        let pairs: Vec<(K, V)> = self
            .recency
            .iter()
            .map(|(_, key, entry)| (key.clone(), entry.value.clone()))
            .collect();

        Snapshot {
            inner: pairs.into_iter(),
        }
    }

    // == Resize ==
    /// Changes the maximum entry count, evicting down to it if needed.
    pub fn resize(&mut self, max_count: usize) -> Result<()> {
        if max_count == 0 {
            return Err(CacheError::ZeroCapacity);
        }

        debug!(from = self.config.max_count, to = max_count, "cache resized");
        self.config.max_count = max_count;
        self.evict_overflow();
        Ok(())
    }

    // == Set TTL ==
    /// Changes the TTL of the cache, including entries already stored.
    ///
    /// Live entries keep their age: each expiry is recomputed from the
    /// instant the entry was stored, so expiry order stays creation order.
    /// Entries now past their expiry are removed immediately.
    pub fn set_ttl(&mut self, ttl: Duration) {
        let now = self.clock.now();
        let old = self.config.ttl;
        let handles: Vec<Handle> = self.expiry.iter().map(|(handle, _)| handle).collect();
        for handle in handles {
            if let Some(entry) = self.recency.entry_mut(handle) {
                entry.retime(ttl);
            }
        }

        debug!(from = ?old, to = ?ttl, "cache ttl changed");
        self.config.ttl = ttl;
        self.sweep(now);
    }

    // == Length ==
    /// Returns the current number of entries, without expiring anything.
    pub fn len(&self) -> usize {
        self.recency.len()
    }

    /// Alias of [`len`](CacheStore::len).
    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recency.is_empty()
    }

    /// Accounted memory of live entries, 0 when memory is not tracked.
    pub fn mem_used(&self) -> usize {
        self.mem_used
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.len();
        stats.mem_used = self.mem_used;
        stats
    }

    // == Internals ==

    fn is_expired(&self, handle: Handle, now: Instant) -> bool {
        self.recency
            .entry(handle)
            .map_or(true, |entry| entry.is_expired(now))
    }

    /// Handle of a live entry; an expired one is removed on the way.
    fn live_handle<Q>(&mut self, key: &Q, now: Instant) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.recency.find(key)?;
        if self.is_expired(handle, now) {
            self.remove_handle(handle, RemovalCause::Expired);
            return None;
        }
        Some(handle)
    }

    /// Counts a write and sweeps once every `expire_interval` writes.
    fn tick(&mut self, now: Instant) {
        self.op_count += 1;
        if self.op_count >= self.config.expire_interval {
            self.op_count = 0;
            self.sweep(now);
        }
    }

    /// Removes expired entries from the front of the expiry index, stopping
    /// at the first live one.
    fn sweep(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(handle) = self.expiry.peek_oldest().map(|(handle, _)| handle) {
            if !self.is_expired(handle, now) {
                break;
            }
            self.remove_handle(handle, RemovalCause::Expired);
            removed += 1;
        }

        if removed > 0 {
            trace!(removed, remaining = self.len(), "expired entries swept");
        }
        removed
    }

    /// Evicts least recently used entries until both bounds hold.
    fn evict_overflow(&mut self) {
        let mut evicted = 0;
        while self.over_capacity() {
            let Some((handle, key, entry)) = self.recency.evict_oldest() else {
                break;
            };
            self.release(handle, key, entry, RemovalCause::Evicted);
            evicted += 1;
        }

        if evicted > 0 {
            debug!(
                evicted,
                len = self.len(),
                mem_used = self.mem_used,
                "evicted least recently used entries"
            );
        }
    }

    fn over_capacity(&self) -> bool {
        self.len() > self.config.max_count
            || self
                .mem_threshold
                .map_or(false, |threshold| self.mem_used > threshold)
    }

    fn remove_handle(&mut self, handle: Handle, cause: RemovalCause) -> Option<(K, CacheEntry<V>)> {
        let (key, entry) = self.recency.remove(handle)?;
        Some(self.release(handle, key, entry, cause))
    }

    /// Finishes a removal already taken out of the recency index.
    fn release(
        &mut self,
        handle: Handle,
        key: K,
        entry: CacheEntry<V>,
        cause: RemovalCause,
    ) -> (K, CacheEntry<V>) {
        self.expiry.unregister(handle);
        self.mem_used = self.mem_used.saturating_sub(entry.charge);

        match cause {
            RemovalCause::Expired => self.stats.record_expiration(),
            RemovalCause::Evicted => self.stats.record_eviction(),
            RemovalCause::Replaced | RemovalCause::Deleted | RemovalCause::Cleared => {}
        }
        if let Some(listener) = self.listener.as_mut() {
            listener(&key, &entry.value, cause);
        }

        (key, entry)
    }

    /// Panics if the two indices or the accounting disagree.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.recency.len(), self.expiry.len(), "index sizes differ");

        for (handle, key, _) in self.recency.iter() {
            assert!(
                self.expiry.key_of(handle) == Some(key),
                "expiry index misses a live entry"
            );
            assert_eq!(self.recency.find(key), Some(handle), "key lookup is stale");
        }
        for (handle, key) in self.expiry.iter() {
            assert!(
                self.recency.key(handle) == Some(key),
                "expiry index holds a dead entry"
            );
        }

        let by_creation: Vec<&CacheEntry<V>> = self
            .expiry
            .iter()
            .filter_map(|(handle, _)| self.recency.entry(handle))
            .collect();
        assert!(
            by_creation.windows(2).all(|pair| pair[0].expires_before(pair[1])),
            "expiry order is not monotonic"
        );

        let charged: usize = self.recency.iter().map(|(_, _, entry)| entry.charge).sum();
        assert_eq!(self.mem_used, charged, "memory accounting drifted");

        assert!(self.len() <= self.config.max_count, "count bound violated");
        if let Some(threshold) = self.mem_threshold {
            assert!(self.mem_used <= threshold, "memory bound violated");
        }
        assert!(self.op_count < self.config.expire_interval);
    }
}

impl<K, V, C> fmt::Debug for CacheStore<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("config", &self.config)
            .field("len", &self.expiry.len())
            .field("mem_used", &self.mem_used)
            .field("stats", &self.stats)
            .finish()
    }
}

// == Snapshot ==
/// Owned, one-shot copy of the live pairs returned by [`CacheStore::iter`].
#[derive(Debug)]
pub struct Snapshot<K, V> {
    inner: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for Snapshot<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Snapshot<K, V> {}
