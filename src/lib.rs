//! TTL LRU Cache - a single-threaded in-process cache
//!
//! Bounds the number of entries (and optionally their estimated memory) with
//! least-recently-used eviction, and drops entries once a fixed time-to-live
//! has elapsed. Expiration is lazy on reads and amortized across writes; no
//! background thread is spawned.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use ttl_lru_cache::{CacheConfig, CacheStore};
//!
//! let mut cache = CacheStore::new(CacheConfig::new(2, Duration::from_secs(60))).unwrap();
//! cache.set("a".to_string(), 1u32);
//! cache.set("b".to_string(), 2);
//! cache.get("a");
//! cache.set("c".to_string(), 3);
//!
//! // b was the least recently used entry
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.get("a"), Some(&1));
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    CacheStats, CacheStore, Clock, EstimateSize, ManualClock, RemovalCause, Serialized, Snapshot,
    SystemClock,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
