/// Cache statistics tracking
///
/// Plain counters usable on their own or embedded in a cache manager.
/// Counters only grow; `reset` zeroes them and restarts the clock.

use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub total_operations: u64,
    start_time: Instant,
}

impl Default for CacheStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStatistics {
    pub fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            evictions: 0,
            invalidations: 0,
            total_operations: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a cache hit
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total_operations += 1;
    }

    /// Record a cache miss
    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.total_operations += 1;
    }

    /// Record a cache eviction
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Record a cache invalidation
    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    pub fn get_hit_rate(&self) -> f64 {
        let total_requests = self.hits + self.misses;
        if total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / total_requests as f64
        }
    }

    pub fn get_miss_rate(&self) -> f64 {
        let total_requests = self.hits + self.misses;
        if total_requests == 0 {
            0.0
        } else {
            self.misses as f64 / total_requests as f64
        }
    }

    /// Time since construction or last reset
    pub fn get_uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Owned snapshot of the counters and derived rates
    pub fn get_report(&self) -> StatisticsReport {
        StatisticsReport {
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.get_hit_rate(),
            miss_rate: self.get_miss_rate(),
            evictions: self.evictions,
            invalidations: self.invalidations,
            total_operations: self.total_operations,
            uptime_seconds: self.get_uptime().as_secs_f64(),
        }
    }

    /// Zero all counters and restart the clock
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Point-in-time statistics report
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub evictions: u64,
    pub invalidations: u64,
    pub total_operations: u64,
    pub uptime_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_with_no_requests() {
        let stats = CacheStatistics::new();
        assert_eq!(stats.get_hit_rate(), 0.0);
        assert_eq!(stats.get_miss_rate(), 0.0);
    }

    #[test]
    fn test_recording() {
        let mut stats = CacheStatistics::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();
        stats.record_invalidation();

        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.total_operations, 4);
        assert_eq!(stats.get_hit_rate(), 0.75);
        assert_eq!(stats.get_miss_rate(), 0.25);
    }

    #[test]
    fn test_report_is_a_snapshot() {
        let mut stats = CacheStatistics::new();
        stats.record_hit();
        let report = stats.get_report();

        stats.record_miss();
        assert_eq!(report.hits, 1);
        assert_eq!(report.misses, 0);
        assert_eq!(report.hit_rate, 1.0);
    }

    #[test]
    fn test_reset() {
        let mut stats = CacheStatistics::new();
        stats.record_hit();
        stats.record_miss();
        stats.reset();

        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.total_operations, 0);
        assert_eq!(stats.get_hit_rate(), 0.0);
    }
}
