//! Per-execution query metadata

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Rough cost class of a query
///
/// The score is 1 for pagination, plus 1 for a sort, plus 1 for a field
/// selection, plus 1 per applied filter.
///
/// # Example
///
/// ```rust
/// use collection_query::paging::QueryComplexity;
///
/// assert_eq!(QueryComplexity::from_score(2), QueryComplexity::Simple);
/// assert_eq!(QueryComplexity::from_score(5), QueryComplexity::Medium);
/// assert_eq!(QueryComplexity::from_score(6), QueryComplexity::Complex);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QueryComplexity {
    /// Score of 2 or less
    #[default]
    Simple,
    /// Score of 3 to 5
    Medium,
    /// Score above 5
    Complex,
}

impl QueryComplexity {
    /// Classify a complexity score
    #[must_use]
    pub const fn from_score(score: usize) -> Self {
        match score {
            0..=2 => Self::Simple,
            3..=5 => Self::Medium,
            _ => Self::Complex,
        }
    }

    /// Score a query from what it asked for
    #[must_use]
    pub const fn score(sorted: bool, projected: bool, filters_applied: usize) -> usize {
        1 + sorted as usize + projected as usize + filters_applied
    }
}

impl fmt::Display for QueryComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "Simple"),
            Self::Medium => write!(f, "Medium"),
            Self::Complex => write!(f, "Complex"),
        }
    }
}

/// Whether a result came from a cache
///
/// The engine itself never caches and always reports `NotCached`. Caching
/// layers in front of it set the other variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheStatus {
    /// Computed for this request
    #[default]
    NotCached,
    /// Served from a cache
    Hit,
    /// Looked up in a cache, then computed
    Miss,
}

/// Facts about a single query execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetadata {
    /// Time spent filtering, sorting, counting, and slicing
    #[serde(rename = "executionTimeMs", serialize_with = "serialize_millis")]
    pub execution_time: Duration,
    /// Number of filters that were applied
    pub filters_applied: usize,
    /// Cost class of the query
    pub query_complexity: QueryComplexity,
    /// When the query ran
    pub executed_at: DateTime<Utc>,
    /// Cache involvement
    pub cache_status: CacheStatus,
}

impl QueryMetadata {
    /// Metadata for a query that just ran
    #[must_use]
    pub fn new(
        execution_time: Duration,
        filters_applied: usize,
        query_complexity: QueryComplexity,
    ) -> Self {
        Self {
            execution_time,
            filters_applied,
            query_complexity,
            executed_at: Utc::now(),
            cache_status: CacheStatus::NotCached,
        }
    }

    /// Set the cache status
    #[must_use]
    pub fn with_cache_status(mut self, cache_status: CacheStatus) -> Self {
        self.cache_status = cache_status;
        self
    }

    /// Execution time in fractional milliseconds
    #[must_use]
    pub fn execution_time_ms(&self) -> f64 {
        millis(self.execution_time)
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(millis(*duration))
}
