//! Cache Module
//!
//! In-memory caching with TTL expiration and LRU eviction, built from two
//! indices over one set of entries.

mod arena;
mod clock;
mod entry;
mod expiry;
mod lru;
mod order;
mod size;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use size::{
    estimate_charge, serialized_size, EstimateSize, Serialized, Weigher, PRIMITIVE_SIZE,
};
pub use stats::CacheStats;
pub use store::{CacheStore, RemovalCause, RemovalListener, Snapshot};
