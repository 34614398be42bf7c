//! Construction-time tuning for the bucket index.

use crate::error::ConfigError;

/// Initial bucket count and the load factor that triggers doubling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IndexConfig {
    pub initial_buckets: usize,
    pub max_load_factor: f32,
}

impl IndexConfig {
    pub const DEFAULT_BUCKETS: usize = 8;
    pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.75;
    /// Smallest accepted load factor. Below it the index would need more
    /// than 64 buckets per entry, and a factor like `1e-30` asks for more
    /// buckets than memory can address after a single insert.
    pub const MIN_MAX_LOAD_FACTOR: f32 = 1.0 / 64.0;

    pub const fn new() -> Self {
        Self {
            initial_buckets: Self::DEFAULT_BUCKETS,
            max_load_factor: Self::DEFAULT_MAX_LOAD_FACTOR,
        }
    }

    pub const fn with_initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub const fn with_max_load_factor(mut self, factor: f32) -> Self {
        self.max_load_factor = factor;
        self
    }

    /// Rejects a zero bucket count and load factors that are not finite or
    /// fall below [`Self::MIN_MAX_LOAD_FACTOR`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_buckets == 0 {
            return Err(ConfigError::ZeroBuckets);
        }
        if !self.max_load_factor.is_finite() || self.max_load_factor < Self::MIN_MAX_LOAD_FACTOR {
            return Err(ConfigError::InvalidLoadFactor(self.max_load_factor));
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new()
    }
}
