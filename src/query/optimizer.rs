/// Query plan optimization
///
/// Produces one cost-annotated plan per distinct query text, with static
/// index and join heuristics. Advisory only; nothing is executed. The
/// plan cache is unbounded and cleared only explicitly.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Join strategy chosen by fixed precedence over the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategy {
    HashJoin,
    NestedLoop,
    MergeJoin,
    Default,
}

/// Heuristic applied while building a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimization {
    IndexSelection,
    JoinOptimization,
}

/// Cost-annotated execution plan for one query text
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub query: String,
    pub plan_id: String,
    pub estimated_cost: f64,
    pub indexes_used: Vec<String>,
    pub join_type: Option<JoinStrategy>,
    pub optimization_applied: Vec<Optimization>,
    pub is_cached: bool,
}

struct OptimizerInner {
    plan_cache: HashMap<String, QueryPlan>,
    index_recommendations: HashMap<String, Vec<String>>,
}

/// Query plan optimizer with a plan cache keyed by query text
pub struct QueryOptimizer {
    inner: RwLock<OptimizerInner>,
}

impl Default for QueryOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryOptimizer {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(OptimizerInner {
                plan_cache: HashMap::new(),
                index_recommendations: HashMap::new(),
            }),
        }
    }

    /// Produce the plan for a query text, or fetch the cached one
    ///
    /// Identical text always maps to the same plan id; a cached id is
    /// returned with `is_cached = true` and no recomputation. The write
    /// guard is held across check and insert, so one plan id resolves to
    /// one deterministic cache slot under concurrency.
    pub fn optimize(&self, query: &str, available_indexes: Option<&[String]>) -> QueryPlan {
        let plan_id = plan_id(query);

        let mut inner = self.inner.write();
        if let Some(cached) = inner.plan_cache.get(&plan_id) {
            let mut plan = cached.clone();
            plan.is_cached = true;
            return plan;
        }

        let upper = query.to_uppercase();
        let mut optimization_applied = Vec::new();

        let indexes_used = match available_indexes {
            Some(available) => select_indexes(&upper, available),
            None => Vec::new(),
        };
        if !indexes_used.is_empty() {
            optimization_applied.push(Optimization::IndexSelection);
        }

        let join_type = if upper.contains("JOIN") {
            optimization_applied.push(Optimization::JoinOptimization);
            Some(join_strategy(&upper))
        } else {
            None
        };

        let plan = QueryPlan {
            query: query.to_string(),
            plan_id: plan_id.clone(),
            estimated_cost: estimate_cost(query, &upper),
            indexes_used,
            join_type,
            optimization_applied,
            is_cached: false,
        };

        log::debug!("Computed plan {} (cost {:.1})", plan_id, plan.estimated_cost);
        inner.plan_cache.insert(plan_id, plan.clone());
        plan
    }

    /// Record a synthetic index recommendation for a table column
    pub fn recommend_index(&self, table: &str, column: &str) {
        let recommendation = format!("INDEX_{}_{}", table, column).to_uppercase();

        let mut inner = self.inner.write();
        let entries = inner
            .index_recommendations
            .entry(table.to_string())
            .or_default();
        if !entries.contains(&recommendation) {
            entries.push(recommendation);
        }
    }

    /// All index recommendations, keyed by table
    pub fn get_index_recommendations(&self) -> HashMap<String, Vec<String>> {
        self.inner.read().index_recommendations.clone()
    }

    /// Drop every cached plan
    pub fn clear_cache(&self) {
        self.inner.write().plan_cache.clear();
    }

    /// Number of cached plans
    pub fn get_cache_size(&self) -> usize {
        self.inner.read().plan_cache.len()
    }
}

// First 16 hex chars of SHA-256 over the literal query text
fn plan_id(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

// Static cost heuristics: joins and subqueries dominate, ORDER BY adds a sort.
// The subquery count is case-sensitive over the raw text.
fn estimate_cost(query: &str, upper: &str) -> f64 {
    let mut cost = 1.0;
    cost += upper.matches("JOIN").count() as f64 * 10.0;
    cost += query.matches("(SELECT").count() as f64 * 5.0;
    if upper.contains("ORDER BY") {
        cost += 2.0;
    }
    cost
}

// Indexes whose name appears literally in the query text (case-insensitive)
fn select_indexes(upper: &str, available: &[String]) -> Vec<String> {
    available
        .iter()
        .filter(|index| upper.contains(&index.to_uppercase()))
        .cloned()
        .collect()
}

// Fixed precedence over the join keywords present in the text
fn join_strategy(upper: &str) -> JoinStrategy {
    if upper.contains("INNER JOIN") {
        JoinStrategy::HashJoin
    } else if upper.contains("LEFT JOIN") {
        JoinStrategy::NestedLoop
    } else if upper.contains("RIGHT JOIN") {
        JoinStrategy::MergeJoin
    } else {
        JoinStrategy::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select_plan() {
        let optimizer = QueryOptimizer::new();
        let plan = optimizer.optimize("SELECT * FROM t WHERE x=1", None);

        assert_eq!(plan.estimated_cost, 1.0);
        assert!(plan.indexes_used.is_empty());
        assert_eq!(plan.join_type, None);
        assert!(plan.optimization_applied.is_empty());
        assert!(!plan.is_cached);
    }

    #[test]
    fn test_plan_caching_is_deterministic() {
        let optimizer = QueryOptimizer::new();
        let first = optimizer.optimize("SELECT * FROM orders", None);
        let second = optimizer.optimize("SELECT * FROM orders", None);

        assert_eq!(first.plan_id, second.plan_id);
        assert_eq!(first.estimated_cost, second.estimated_cost);
        assert!(!first.is_cached);
        assert!(second.is_cached);
        assert_eq!(optimizer.get_cache_size(), 1);

        // Plan ids depend on the text alone, not the instance
        let other = QueryOptimizer::new();
        assert_eq!(other.optimize("SELECT * FROM orders", None).plan_id, first.plan_id);
    }

    #[test]
    fn test_join_cost_is_additive() {
        let optimizer = QueryOptimizer::new();
        let one = optimizer.optimize("SELECT * FROM a INNER JOIN b ON a.id = b.id", None);
        let two = optimizer.optimize(
            "SELECT * FROM a INNER JOIN b ON a.id = b.id INNER JOIN c ON b.id = c.id",
            None,
        );

        assert_eq!(one.estimated_cost, 11.0);
        assert_eq!(two.estimated_cost - one.estimated_cost, 10.0);
    }

    #[test]
    fn test_subquery_and_order_by_cost() {
        let optimizer = QueryOptimizer::new();
        let sub = optimizer.optimize("SELECT * FROM (SELECT id FROM t) x", None);
        assert_eq!(sub.estimated_cost, 6.0);

        let ordered = optimizer.optimize("SELECT * FROM t ORDER BY id", None);
        assert_eq!(ordered.estimated_cost, 3.0);
    }

    #[test]
    fn test_join_strategy_precedence() {
        let optimizer = QueryOptimizer::new();

        let inner = optimizer.optimize("SELECT * FROM a INNER JOIN b ON a.id = b.id", None);
        assert_eq!(inner.join_type, Some(JoinStrategy::HashJoin));
        assert_eq!(inner.optimization_applied, vec![Optimization::JoinOptimization]);

        let left = optimizer.optimize("SELECT * FROM a LEFT JOIN b ON a.id = b.id", None);
        assert_eq!(left.join_type, Some(JoinStrategy::NestedLoop));

        let right = optimizer.optimize("SELECT * FROM a RIGHT JOIN b ON a.id = b.id", None);
        assert_eq!(right.join_type, Some(JoinStrategy::MergeJoin));

        let bare = optimizer.optimize("SELECT * FROM a JOIN b ON a.id = b.id", None);
        assert_eq!(bare.join_type, Some(JoinStrategy::Default));

        // INNER wins when several join keywords are present
        let mixed = optimizer.optimize(
            "SELECT * FROM a INNER JOIN b ON a.id = b.id LEFT JOIN c ON b.id = c.id",
            None,
        );
        assert_eq!(mixed.join_type, Some(JoinStrategy::HashJoin));
    }

    #[test]
    fn test_index_selection_is_case_insensitive() {
        let optimizer = QueryOptimizer::new();
        let available = vec!["Users.ID".to_string(), "orders.total".to_string()];
        let plan = optimizer.optimize("SELECT * FROM users WHERE users.id = 1", Some(&available));

        assert_eq!(plan.indexes_used, vec!["Users.ID".to_string()]);
        assert_eq!(plan.optimization_applied, vec![Optimization::IndexSelection]);
    }

    #[test]
    fn test_index_recommendations_deduplicate() {
        let optimizer = QueryOptimizer::new();
        optimizer.recommend_index("orders", "user_id");
        optimizer.recommend_index("orders", "user_id");
        optimizer.recommend_index("orders", "total");

        let recs = optimizer.get_index_recommendations();
        assert_eq!(
            recs["orders"],
            vec!["INDEX_ORDERS_USER_ID".to_string(), "INDEX_ORDERS_TOTAL".to_string()]
        );
    }

    #[test]
    fn test_clear_cache() {
        let optimizer = QueryOptimizer::new();
        optimizer.optimize("SELECT 1", None);
        optimizer.optimize("SELECT 2", None);
        assert_eq!(optimizer.get_cache_size(), 2);

        optimizer.clear_cache();
        assert_eq!(optimizer.get_cache_size(), 0);

        // A cleared plan is recomputed
        assert!(!optimizer.optimize("SELECT 1", None).is_cached);
    }
}
