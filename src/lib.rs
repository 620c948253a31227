//! In-process runtime performance layer: a TTL + LRU value cache and a
//! query-optimization subsystem (profiler, plan optimizer, monitor).

pub mod cache;
pub mod error;
pub mod query;

pub use cache::{CacheConfig, CacheManager, CacheStatistics};
pub use error::{PerfError, PerfResult};
pub use query::{QueryMonitor, QueryOptimizer, QueryProfiler};
