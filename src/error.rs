//! Error types returned by the containers.

use thiserror::Error;

/// Lookup of an absent key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum LookupError {
    #[error("key not found")]
    KeyNotFound,
}

/// Rejected construction parameters.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("bucket count must be at least 1")]
    ZeroBuckets,
    #[error("max load factor must be finite and at least 1/64, got {0}")]
    InvalidLoadFactor(f32),
    #[error("{requested} buckets exceed the addressable limit of {limit}")]
    TooManyBuckets { requested: usize, limit: usize },
}
