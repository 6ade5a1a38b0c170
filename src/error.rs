//! Error types for the cache
//!
//! Only construction and reconfiguration can fail. A missing or expired key
//! is reported as `None`, never as an error.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `max_count` must be at least 1
    #[error("Invalid configuration: max_count must be greater than zero")]
    ZeroCapacity,

    /// `expire_interval` must be at least 1
    #[error("Invalid configuration: expire_interval must be greater than zero")]
    ZeroExpireInterval,

    /// `max_mem_bytes`, when set, must be at least 1
    #[error("Invalid configuration: max_mem_bytes must be greater than zero when set")]
    ZeroMemoryLimit,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
