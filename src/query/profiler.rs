/// Query analysis and profiling
///
/// Classifies individual operation executions, keeps an append-only log,
/// and surfaces slow-operation alerts. Slowness is the pure predicate
/// `execution_time > threshold`; there is no internal state machine.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Coarse query pattern extracted from the leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryPattern {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryPattern {
    /// Classify from the leading keyword of the trimmed, upper-cased text
    fn classify(query: &str) -> Self {
        let upper = query.trim().to_uppercase();
        if upper.starts_with("SELECT") {
            Self::Select
        } else if upper.starts_with("INSERT") {
            Self::Insert
        } else if upper.starts_with("UPDATE") {
            Self::Update
        } else if upper.starts_with("DELETE") {
            Self::Delete
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Other => "OTHER",
        }
    }
}

/// Execution profile for a single analyzed operation
#[derive(Debug, Clone, Serialize)]
pub struct QueryProfile {
    pub query: String,
    pub execution_time: Duration,
    pub timestamp: DateTime<Utc>,
    pub row_count: u64,
    pub is_slow: bool,
    pub pattern: QueryPattern,
}

/// Alert emitted when an execution crosses the slow threshold
#[derive(Debug, Clone, Serialize)]
pub struct SlowQueryAlert {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub execution_time: Duration,
    pub threshold: Duration,
}

#[derive(Default)]
struct ProfilerInner {
    query_log: Vec<QueryProfile>,
    slow_queries: Vec<QueryProfile>,
    patterns: HashMap<QueryPattern, u64>,
    alerts: Vec<SlowQueryAlert>,
}

/// Query profiler with a configurable slow threshold
pub struct QueryProfiler {
    slow_threshold: Duration,
    inner: RwLock<ProfilerInner>,
}

impl QueryProfiler {
    pub fn new(slow_threshold: Duration) -> Self {
        Self {
            slow_threshold,
            inner: RwLock::new(ProfilerInner::default()),
        }
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    /// Analyze one execution and record its profile
    ///
    /// Malformed or empty text is classified `Other` and recorded as-is;
    /// there is no failure path.
    pub fn analyze(&self, query: &str, execution_time: Duration, row_count: u64) -> QueryProfile {
        let is_slow = execution_time > self.slow_threshold;
        let pattern = QueryPattern::classify(query);

        let profile = QueryProfile {
            query: query.to_string(),
            execution_time,
            timestamp: Utc::now(),
            row_count,
            is_slow,
            pattern,
        };

        let mut inner = self.inner.write();
        inner.query_log.push(profile.clone());

        if is_slow {
            log::warn!(
                "Slow query ({:?} > {:?}): {}",
                execution_time,
                self.slow_threshold,
                query
            );
            inner.slow_queries.push(profile.clone());
            inner.alerts.push(SlowQueryAlert {
                timestamp: profile.timestamp,
                query: profile.query.clone(),
                execution_time,
                threshold: self.slow_threshold,
            });
        }

        *inner.patterns.entry(pattern).or_insert(0) += 1;

        profile
    }

    /// Slow-query profiles recorded so far
    pub fn get_slow_queries(&self) -> Vec<QueryProfile> {
        self.inner.read().slow_queries.clone()
    }

    /// Historical distribution of query patterns
    pub fn get_query_patterns(&self) -> HashMap<QueryPattern, u64> {
        self.inner.read().patterns.clone()
    }

    pub fn get_alerts(&self) -> Vec<SlowQueryAlert> {
        self.inner.read().alerts.clone()
    }

    /// Full query log
    pub fn get_log(&self) -> Vec<QueryProfile> {
        self.inner.read().query_log.clone()
    }

    /// Clear log, slow-log, and alerts
    ///
    /// Pattern counters are kept: they represent the historical
    /// distribution, not the current log.
    pub fn clear_log(&self) {
        let mut inner = self.inner.write();
        inner.query_log.clear();
        inner.slow_queries.clear();
        inner.alerts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_query_classification() {
        let profiler = QueryProfiler::new(Duration::from_secs(1));
        let profile = profiler.analyze("SELECT * FROM users", Duration::from_millis(1500), 10);

        assert!(profile.is_slow);
        assert_eq!(profile.pattern, QueryPattern::Select);
        assert_eq!(profile.row_count, 10);
        assert_eq!(profiler.get_log().len(), 1);
        assert_eq!(profiler.get_slow_queries().len(), 1);
        assert_eq!(profiler.get_alerts().len(), 1);
    }

    #[test]
    fn test_fast_query_emits_no_alert() {
        let profiler = QueryProfiler::new(Duration::from_secs(1));
        let profile = profiler.analyze("UPDATE users SET name = 'x'", Duration::from_millis(10), 1);

        assert!(!profile.is_slow);
        assert_eq!(profile.pattern, QueryPattern::Update);
        assert_eq!(profiler.get_log().len(), 1);
        assert!(profiler.get_slow_queries().is_empty());
        assert!(profiler.get_alerts().is_empty());
    }

    #[test]
    fn test_pattern_extraction() {
        let profiler = QueryProfiler::new(Duration::from_secs(1));
        let fast = Duration::from_millis(1);

        assert_eq!(
            profiler.analyze("  select 1", fast, 0).pattern,
            QueryPattern::Select
        );
        assert_eq!(
            profiler.analyze("INSERT INTO t VALUES (1)", fast, 0).pattern,
            QueryPattern::Insert
        );
        assert_eq!(
            profiler.analyze("delete from t", fast, 0).pattern,
            QueryPattern::Delete
        );
        assert_eq!(profiler.analyze("EXPLAIN t", fast, 0).pattern, QueryPattern::Other);
        assert_eq!(profiler.analyze("", fast, 0).pattern, QueryPattern::Other);

        let patterns = profiler.get_query_patterns();
        assert_eq!(patterns[&QueryPattern::Select], 1);
        assert_eq!(patterns[&QueryPattern::Other], 2);
    }

    #[test]
    fn test_clear_log_keeps_patterns() {
        let profiler = QueryProfiler::new(Duration::from_millis(100));
        profiler.analyze("SELECT 1", Duration::from_millis(200), 0);
        profiler.analyze("SELECT 2", Duration::from_millis(10), 0);

        profiler.clear_log();

        assert!(profiler.get_log().is_empty());
        assert!(profiler.get_slow_queries().is_empty());
        assert!(profiler.get_alerts().is_empty());
        assert_eq!(profiler.get_query_patterns()[&QueryPattern::Select], 2);
    }
}
