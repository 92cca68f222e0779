//! Single-key orderings built from a property path
//!
//! A [`SortComparator`] orders items by one resolved property using
//! [`Value::total_cmp`](crate::schema::Value::total_cmp). Nulls come first
//! when ascending and last when descending; NaN sorts after every number. Sorting is stable, so items with
//! equal keys keep their input order.

use std::cmp::Ordering;
use std::fmt;

use super::issue::QueryIssue;
use super::params::SortOrder;
use crate::schema::{ResolvedPath, Schema, Value};

/// An ordering over items of type `T`
pub struct SortComparator<T> {
    key: Option<(ResolvedPath<T>, SortOrder)>,
    dropped: Option<QueryIssue>,
}

impl<T> Clone for SortComparator<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            dropped: self.dropped.clone(),
        }
    }
}

impl<T> fmt::Debug for SortComparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortComparator")
            .field("path", &self.path())
            .field("order", &self.order())
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl<T> Default for SortComparator<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T> SortComparator<T> {
    /// An ordering that leaves items in input order
    #[must_use]
    pub fn identity() -> Self {
        Self {
            key: None,
            dropped: None,
        }
    }

    /// Build an ordering on `sort_by`
    ///
    /// A missing or blank `sort_by` gives the identity. So does a path that
    /// does not resolve to a scalar property; that case is logged at `debug`
    /// and reported by [`dropped`](Self::dropped).
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::query::{SortComparator, SortOrder};
    /// use collection_query::schema::{Schema, Shape, ValueKind};
    /// use once_cell::sync::Lazy;
    ///
    /// struct Release {
    ///     version: i64,
    /// }
    ///
    /// impl Shape for Release {
    ///     fn schema() -> &'static Schema<Self> {
    ///         static SCHEMA: Lazy<Schema<Release>> = Lazy::new(|| {
    ///             Schema::builder("Release")
    ///                 .field("version", ValueKind::Integer, |r: &Release| r.version)
    ///                 .build()
    ///         });
    ///         &SCHEMA
    ///     }
    /// }
    ///
    /// let releases = vec![Release { version: 2 }, Release { version: 7 }, Release { version: 4 }];
    /// let sorted = SortComparator::build(Release::schema(), Some("version"), "DESC").apply(releases);
    /// let versions: Vec<i64> = sorted.iter().map(|r| r.version).collect();
    /// assert_eq!(versions, vec![7, 4, 2]);
    /// ```
    pub fn build(schema: &Schema<T>, sort_by: Option<&str>, order: impl Into<SortOrder>) -> Self {
        let Some(sort_by) = sort_by.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::identity();
        };

        match schema.resolve(sort_by) {
            Some(path) => Self {
                key: Some((path, order.into())),
                dropped: None,
            },
            None => {
                let issue = QueryIssue::PropertyResolution {
                    path: sort_by.to_string(),
                };
                tracing::debug!(
                    schema = schema.name(),
                    field = %sort_by,
                    reason = %issue,
                    "Ignoring sort key"
                );
                Self {
                    key: None,
                    dropped: Some(issue),
                }
            }
        }
    }

    /// Check if this ordering leaves items untouched
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.key.is_none()
    }

    /// Canonical path of the sort key
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.key.as_ref().map(|(path, _)| path.path())
    }

    /// Direction of the sort key
    #[must_use]
    pub fn order(&self) -> Option<SortOrder> {
        self.key.as_ref().map(|(_, order)| *order)
    }

    /// Why the requested sort key was ignored, if it was
    #[must_use]
    pub fn dropped(&self) -> Option<&QueryIssue> {
        self.dropped.as_ref()
    }

    /// Compare two items under this ordering
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.key {
            Some((path, order)) => directed(&path.read(a), &path.read(b), *order),
            None => Ordering::Equal,
        }
    }

    /// Sort `items`, reading each key once
    #[must_use]
    pub fn apply(&self, items: Vec<T>) -> Vec<T> {
        let Some((path, order)) = &self.key else {
            return items;
        };

        let mut keyed: Vec<(Value, T)> = items
            .into_iter()
            .map(|item| (path.read(&item), item))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| directed(a, b, *order));
        keyed.into_iter().map(|(_, item)| item).collect()
    }
}

fn directed(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    let ordering = a.total_cmp(b);
    if order.is_descending() {
        ordering.reverse()
    } else {
        ordering
    }
}
