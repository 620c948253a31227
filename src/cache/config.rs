/// Cache configuration
///
/// TTL and capacity bounds for a cache manager instance. Validated at
/// construction; a zero TTL or zero capacity is a construction failure.

use std::time::Duration;

use crate::error::{PerfError, PerfResult};

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live applied to entries stored without an explicit TTL
    pub default_ttl: Duration,

    /// Maximum number of entries (least-recently-accessed eviction when exceeded)
    pub max_size: usize,

    /// Statistics tracking flag, surfaced to callers via `get_config`
    pub enable_stats: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600), // 1 hour
            max_size: 1000,
            enable_stats: true,
        }
    }
}

impl CacheConfig {
    /// Short-lived results (fast-changing source data)
    pub fn short_lived() -> Self {
        Self {
            default_ttl: Duration::from_secs(30),
            max_size: 2000,
            enable_stats: true,
        }
    }

    /// Long-lived results (expensive to recompute, stable data)
    pub fn long_lived() -> Self {
        Self {
            default_ttl: Duration::from_secs(1800), // 30 minutes
            max_size: 3000,
            enable_stats: true,
        }
    }

    /// Custom configuration
    pub fn custom(ttl_secs: u64, max_size: usize) -> Self {
        Self {
            default_ttl: Duration::from_secs(ttl_secs),
            max_size,
            enable_stats: true,
        }
    }

    /// Validate cache configuration
    pub fn validate(&self) -> PerfResult<()> {
        if self.default_ttl.is_zero() {
            return Err(PerfError::Config(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        if self.max_size == 0 {
            return Err(PerfError::Config(
                "max_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(CacheConfig::short_lived().validate().is_ok());
        assert!(CacheConfig::long_lived().validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = CacheConfig::custom(0, 100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = CacheConfig::custom(60, 0);
        assert!(config.validate().is_err());
    }
}
