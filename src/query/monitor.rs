/// Longitudinal query performance monitoring
///
/// Tracks a running average per operation id, keeps a bounded window of
/// recent observations, and derives a trend direction from it. The ring
/// buffer silently drops the oldest sample once full.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Number of recent samples the trend analysis looks at by default
pub const DEFAULT_TREND_WINDOW: usize = 100;

/// Running metrics for one tracked operation
#[derive(Debug, Clone, Serialize)]
pub struct QueryMetrics {
    pub query_id: String,
    /// Running average over all observations of this id
    pub execution_time: Duration,
    pub last_updated: DateTime<Utc>,
    pub query_count: u64,
}

/// One observation in the bounded history window
#[derive(Debug, Clone, Serialize)]
pub struct HistorySample {
    pub query_id: String,
    pub execution_time: Duration,
    pub timestamp: DateTime<Utc>,
}

/// Alert for a single observation over the threshold
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdAlert {
    pub query_id: String,
    pub execution_time: Duration,
    pub threshold: Duration,
    pub timestamp: DateTime<Utc>,
}

/// Trend direction over the recent window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Degrading,
    Improving,
    Stable,
}

/// Result of comparing the recent window to the all-time mean
#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub trend: Trend,
    pub average_recent: Duration,
    pub average_overall: Duration,
    pub sample_size: usize,
}

/// Aggregate statistics over everything tracked so far
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStats {
    pub total_queries: u64,
    pub total_time: Duration,
    pub average_time: Duration,
    pub unique_queries: usize,
    pub alerts_count: usize,
    pub alert_threshold: Duration,
}

struct MonitorInner {
    metrics: HashMap<String, QueryMetrics>,
    history: VecDeque<HistorySample>,
    alerts: Vec<ThresholdAlert>,
    total_queries: u64,
    total_time: Duration,
}

/// Query performance monitor with a bounded history window
pub struct QueryMonitor {
    alert_threshold: Duration,
    max_history: usize,
    inner: RwLock<MonitorInner>,
}

impl QueryMonitor {
    pub fn new(alert_threshold: Duration, max_history: usize) -> Self {
        Self {
            alert_threshold,
            max_history,
            inner: RwLock::new(MonitorInner {
                metrics: HashMap::new(),
                history: VecDeque::with_capacity(max_history),
                alerts: Vec::new(),
                total_queries: 0,
                total_time: Duration::ZERO,
            }),
        }
    }

    pub fn alert_threshold(&self) -> Duration {
        self.alert_threshold
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Record one execution and return the updated metrics for its id
    ///
    /// The history append and the running-average update happen under one
    /// write guard.
    pub fn track(&self, query_id: &str, execution_time: Duration) -> QueryMetrics {
        let now = Utc::now();
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        inner.total_queries += 1;
        inner.total_time += execution_time;

        let metrics = inner
            .metrics
            .entry(query_id.to_string())
            .and_modify(|m| {
                m.query_count += 1;
                let total = m.execution_time.as_secs_f64() * (m.query_count - 1) as f64
                    + execution_time.as_secs_f64();
                m.execution_time = Duration::from_secs_f64(total / m.query_count as f64);
                m.last_updated = now;
            })
            .or_insert_with(|| QueryMetrics {
                query_id: query_id.to_string(),
                execution_time,
                last_updated: now,
                query_count: 1,
            })
            .clone();

        if self.max_history > 0 {
            if inner.history.len() == self.max_history {
                inner.history.pop_front();
            }
            inner.history.push_back(HistorySample {
                query_id: query_id.to_string(),
                execution_time,
                timestamp: now,
            });
        }

        if execution_time > self.alert_threshold {
            log::warn!(
                "Query {} exceeded threshold ({:?} > {:?})",
                query_id,
                execution_time,
                self.alert_threshold
            );
            inner.alerts.push(ThresholdAlert {
                query_id: query_id.to_string(),
                execution_time,
                threshold: self.alert_threshold,
                timestamp: now,
            });
        }

        metrics
    }

    /// Metrics for one query id, if it has been tracked
    pub fn get_metrics(&self, query_id: &str) -> Option<QueryMetrics> {
        self.inner.read().metrics.get(query_id).cloned()
    }

    pub fn get_all_metrics(&self) -> HashMap<String, QueryMetrics> {
        self.inner.read().metrics.clone()
    }

    pub fn get_alerts(&self) -> Vec<ThresholdAlert> {
        self.inner.read().alerts.clone()
    }

    /// Aggregate statistics snapshot
    pub fn get_statistics(&self) -> MonitorStats {
        let inner = self.inner.read();
        let average_time = if inner.total_queries > 0 {
            Duration::from_secs_f64(inner.total_time.as_secs_f64() / inner.total_queries as f64)
        } else {
            Duration::ZERO
        };

        MonitorStats {
            total_queries: inner.total_queries,
            total_time: inner.total_time,
            average_time,
            unique_queries: inner.metrics.len(),
            alerts_count: inner.alerts.len(),
            alert_threshold: self.alert_threshold,
        }
    }

    /// Compare the mean of the recent window to the all-time mean
    ///
    /// A zero `window_size` means the whole retained history.
    pub fn get_trend_analysis(&self, window_size: usize) -> TrendAnalysis {
        let inner = self.inner.read();

        if inner.history.is_empty() {
            return TrendAnalysis {
                trend: Trend::Stable,
                average_recent: Duration::ZERO,
                average_overall: Duration::ZERO,
                sample_size: 0,
            };
        }

        let window = if window_size == 0 {
            inner.history.len()
        } else {
            window_size.min(inner.history.len())
        };

        let recent_total: f64 = inner
            .history
            .iter()
            .rev()
            .take(window)
            .map(|sample| sample.execution_time.as_secs_f64())
            .sum();
        let recent_avg = recent_total / window as f64;

        let overall_avg = if inner.total_queries > 0 {
            inner.total_time.as_secs_f64() / inner.total_queries as f64
        } else {
            0.0
        };

        let trend = if recent_avg > overall_avg * 1.2 {
            Trend::Degrading
        } else if recent_avg < overall_avg * 0.8 {
            Trend::Improving
        } else {
            Trend::Stable
        };

        TrendAnalysis {
            trend,
            average_recent: Duration::from_secs_f64(recent_avg),
            average_overall: Duration::from_secs_f64(overall_avg),
            sample_size: window,
        }
    }

    pub fn clear_alerts(&self) {
        self.inner.write().alerts.clear();
    }

    /// Reset all monitoring data
    pub fn reset(&self) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        inner.metrics.clear();
        inner.history.clear();
        inner.alerts.clear();
        inner.total_queries = 0;
        inner.total_time = Duration::ZERO;
    }
}
