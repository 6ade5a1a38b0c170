//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Instant the entry was stored at
    pub stored_at: Instant,
    /// Instant at which the entry stops being visible, `None` when the TTL
    /// reaches past what the clock can represent
    pub expires_at: Option<Instant>,
    /// Accounted size of key plus value, 0 when memory is not tracked
    pub charge: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stored at `now` with the given TTL.
    pub fn new(value: V, now: Instant, ttl: Duration, charge: usize) -> Self {
        Self {
            value,
            stored_at: now,
            expires_at: now.checked_add(ttl),
            charge,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: the entry is expired once `now >= expires_at`, so a
    /// zero TTL expires immediately. An entry without an expiry never does.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or zero once expired.
    ///
    /// An entry that never expires reports `Duration::MAX`.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.expires_at
            .map_or(Duration::MAX, |at| at.saturating_duration_since(now))
    }

    // == Retime ==
    /// Recomputes the expiry from the store instant under a new TTL.
    pub fn retime(&mut self, ttl: Duration) {
        self.expires_at = self.stored_at.checked_add(ttl);
    }

    /// Whether this entry expires no later than `other`, treating a missing
    /// expiry as the far end of time.
    #[cfg(test)]
    pub fn expires_before(&self, other: &Self) -> bool {
        match (self.expires_at, other.expires_at) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a <= b,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new("test_value", now, Duration::from_secs(60), 12);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.stored_at, now);
        assert_eq!(entry.expires_at, Some(now + Duration::from_secs(60)));
        assert_eq!(entry.charge, 12);
        assert!(!entry.is_expired(now));
    }

    #[test]
    fn test_entry_expiration() {
        let now = Instant::now();
        let entry = CacheEntry::new("test_value", now, Duration::from_secs(1), 0);

        assert!(!entry.is_expired(now + Duration::from_millis(999)));
        assert!(entry.is_expired(now + Duration::from_millis(1100)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new("test", now, Duration::ZERO, 0);

        // Entry should be expired when current time >= expires_at
        assert!(entry.is_expired(now), "Entry should be expired at boundary");
    }

    #[test]
    fn test_ttl_remaining() {
        let now = Instant::now();
        let entry = CacheEntry::new("test_value", now, Duration::from_secs(10), 0);

        assert_eq!(entry.ttl_remaining(now), Duration::from_secs(10));
        assert_eq!(
            entry.ttl_remaining(now + Duration::from_secs(4)),
            Duration::from_secs(6)
        );
        // TTL remaining should be 0 when expired
        assert_eq!(
            entry.ttl_remaining(now + Duration::from_secs(11)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_retime() {
        let now = Instant::now();
        let mut entry = CacheEntry::new((), now, Duration::from_secs(10), 0);

        entry.retime(Duration::from_secs(30));
        assert_eq!(entry.expires_at, Some(now + Duration::from_secs(30)));

        entry.retime(Duration::from_secs(5));
        assert_eq!(entry.expires_at, Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("forever", now, Duration::MAX, 0);

        assert_eq!(entry.expires_at, None);
        assert!(!entry.is_expired(now + Duration::from_secs(86_400 * 365)));
        assert_eq!(entry.ttl_remaining(now), Duration::MAX);

        entry.retime(Duration::from_secs(1));
        assert!(entry.is_expired(now + Duration::from_secs(1)));

        entry.retime(Duration::MAX);
        assert_eq!(entry.expires_at, None);
    }

    #[test]
    fn test_expires_before() {
        let now = Instant::now();
        let short = CacheEntry::new((), now, Duration::from_secs(1), 0);
        let long = CacheEntry::new((), now, Duration::from_secs(2), 0);
        let forever = CacheEntry::new((), now, Duration::MAX, 0);

        assert!(short.expires_before(&long));
        assert!(!long.expires_before(&short));
        assert!(long.expires_before(&forever));
        assert!(!forever.expires_before(&long));
        assert!(forever.expires_before(&forever));
    }
}
