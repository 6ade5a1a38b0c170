//! Configuration Module
//!
//! Named cache parameters with defaults, environment loading and validation.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Number of `set` calls between amortized expiration sweeps, by default.
pub const DEFAULT_EXPIRE_INTERVAL: usize = 100;

/// Default maximum number of live entries.
pub const DEFAULT_MAX_COUNT: usize = 1000;

/// Default time-to-live in seconds.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_count: usize,
    /// Lifespan of every entry, measured from the moment it was stored
    pub ttl: Duration,
    /// Number of `set` calls between amortized expiration sweeps
    pub expire_interval: usize,
    /// Optional memory ceiling; eviction keeps usage at or below 75% of it
    pub max_mem_bytes: Option<usize>,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a configuration with the given capacity and TTL, using the
    /// default expire interval and no memory limit.
    pub fn new(max_count: usize, ttl: Duration) -> Self {
        Self {
            max_count,
            ttl,
            expire_interval: DEFAULT_EXPIRE_INTERVAL,
            max_mem_bytes: None,
        }
    }

    /// Sets the number of `set` calls between amortized sweeps.
    pub fn with_expire_interval(mut self, expire_interval: usize) -> Self {
        self.expire_interval = expire_interval;
        self
    }

    /// Enables memory-based eviction alongside count-based eviction.
    pub fn with_max_mem_bytes(mut self, max_mem_bytes: usize) -> Self {
        self.max_mem_bytes = Some(max_mem_bytes);
        self
    }

    // == From Env ==
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_COUNT` - Maximum live entries (default: 1000)
    /// - `CACHE_TTL_SECS` - TTL in seconds, fractions allowed (default: 300)
    /// - `CACHE_EXPIRE_INTERVAL` - Sets between sweeps (default: 100)
    /// - `CACHE_MAX_MEM_BYTES` - Memory ceiling in bytes (default: unset)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Missing or unparsable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            max_count: lookup("CACHE_MAX_COUNT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_count),
            ttl: lookup("CACHE_TTL_SECS")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .unwrap_or(defaults.ttl),
            expire_interval: lookup("CACHE_EXPIRE_INTERVAL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.expire_interval),
            max_mem_bytes: lookup("CACHE_MAX_MEM_BYTES").and_then(|v| v.trim().parse().ok()),
        }
    }

    // == Validate ==
    /// Rejects values the cache cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.max_count == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        if self.expire_interval == 0 {
            return Err(CacheError::ZeroExpireInterval);
        }
        if self.max_mem_bytes == Some(0) {
            return Err(CacheError::ZeroMemoryLimit);
        }
        Ok(())
    }

    // == Memory Threshold ==
    /// Usage level eviction brings memory back down to: 75% of the ceiling.
    pub fn mem_threshold(&self) -> Option<usize> {
        self.max_mem_bytes
            .map(|max| (max as u128 * 3 / 4) as usize)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COUNT, Duration::from_secs(DEFAULT_TTL_SECS))
    }
}
