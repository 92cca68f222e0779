//! Compiled filter predicates
//!
//! [`FilterPredicate::build`] resolves, validates, and coerces each
//! [`FilterParameter`] against a [`Schema`] once, producing a list of
//! clauses that are evaluated per item and combined with AND. Filters that
//! cannot be compiled are dropped, never fatal.
//!
//! # Null handling
//!
//! When the item's value is null:
//!
//! - `eq` matches only a `null` target, `ne` matches any non-null target
//! - `gt`, `gte`, `lt`, `lte` never match
//! - `contains`, `startswith`, `endswith` never match
//! - `in` matches only when `null` is one of the listed values
//!
//! # Example
//!
//! ```rust
//! use collection_query::query::{FilterParameter, FilterPredicate};
//! use collection_query::schema::{Schema, Shape, ValueKind};
//! use once_cell::sync::Lazy;
//!
//! struct Ticket {
//!     title: String,
//!     points: i64,
//! }
//!
//! impl Shape for Ticket {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Ticket>> = Lazy::new(|| {
//!             Schema::builder("Ticket")
//!                 .field("title", ValueKind::Text, |t: &Ticket| t.title.clone())
//!                 .field("points", ValueKind::Integer, |t: &Ticket| t.points)
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! let predicate = FilterPredicate::build(
//!     Ticket::schema(),
//!     &[
//!         FilterParameter::contains("title", "LOGIN"),
//!         FilterParameter::gte("points", "3"),
//!         FilterParameter::eq("points", "many"),
//!     ],
//! );
//!
//! assert_eq!(predicate.applied_count(), 2);
//! assert_eq!(predicate.dropped().len(), 1);
//! assert!(predicate.matches(&Ticket { title: "Fix login".into(), points: 5 }));
//! assert!(!predicate.matches(&Ticket { title: "Fix login".into(), points: 1 }));
//! ```

use std::cmp::Ordering;
use std::fmt;

use super::filter::{FilterOperator, FilterParameter};
use super::issue::QueryIssue;
use crate::schema::{coerce, ResolvedPath, Schema, Value};

/// A single compiled test against a property value
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// `eq`, `ne`, `gt`, `gte`, `lt`, `lte` against a coerced target
    Compare { op: FilterOperator, target: Value },
    /// Case-insensitive substring tests; `needle` is already lowercased
    Text { op: FilterOperator, needle: String },
    /// `in`: equality against any candidate
    Membership { candidates: Vec<Value> },
}

impl Condition {
    fn test(&self, value: &Value) -> bool {
        match self {
            Self::Compare { op, target } => compare(*op, value, target),
            Self::Text { op, needle } => match value.as_text() {
                Some(text) => {
                    let haystack = text.to_lowercase();
                    match op {
                        FilterOperator::StartsWith => haystack.starts_with(needle.as_str()),
                        FilterOperator::EndsWith => haystack.ends_with(needle.as_str()),
                        _ => haystack.contains(needle.as_str()),
                    }
                }
                None => false,
            },
            Self::Membership { candidates } => candidates.iter().any(|c| equals(value, c)),
        }
    }
}

fn equals(value: &Value, target: &Value) -> bool {
    value.compare(target) == Some(Ordering::Equal)
}

fn compare(op: FilterOperator, value: &Value, target: &Value) -> bool {
    match op {
        FilterOperator::Eq => equals(value, target),
        FilterOperator::Ne => !equals(value, target),
        _ if value.is_null() || target.is_null() => false,
        FilterOperator::Gt => value.compare(target) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(
            value.compare(target),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lt => value.compare(target) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(
            value.compare(target),
            Some(Ordering::Less | Ordering::Equal)
        ),
        _ => false,
    }
}

struct Clause<T> {
    path: ResolvedPath<T>,
    condition: Condition,
}

impl<T> Clone for Clause<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<T> fmt::Debug for Clause<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clause")
            .field("path", &self.path.path())
            .field("condition", &self.condition)
            .finish()
    }
}

/// An AND of compiled filter clauses over items of type `T`
///
/// An empty predicate matches everything.
pub struct FilterPredicate<T> {
    clauses: Vec<Clause<T>>,
    dropped: Vec<QueryIssue>,
}

impl<T> Default for FilterPredicate<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> Clone for FilterPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
            dropped: self.dropped.clone(),
        }
    }
}

impl<T> fmt::Debug for FilterPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPredicate")
            .field("clauses", &self.clauses)
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl<T> FilterPredicate<T> {
    /// A predicate that matches every item
    #[must_use]
    pub fn all() -> Self {
        Self {
            clauses: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// Compile `filters` against `schema`
    ///
    /// Each filter is resolved, checked against the property's kind, and
    /// coerced. Any failure drops that filter, logs it at `debug`, and
    /// records it in [`dropped`](Self::dropped).
    pub fn build(schema: &Schema<T>, filters: &[FilterParameter]) -> Self {
        let mut predicate = Self::all();
        for filter in filters {
            match compile(schema, filter) {
                Ok(clause) => predicate.clauses.push(clause),
                Err(issue) => {
                    tracing::debug!(
                        schema = schema.name(),
                        field = %filter.field,
                        operator = %filter.operator,
                        reason = %issue,
                        "Dropping filter"
                    );
                    predicate.dropped.push(issue);
                }
            }
        }
        predicate
    }

    /// Check whether `item` satisfies every clause
    pub fn matches(&self, item: &T) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.condition.test(&clause.path.read(item)))
    }

    /// Keep the items that satisfy every clause, preserving order
    #[must_use]
    pub fn apply(&self, mut items: Vec<T>) -> Vec<T> {
        if !self.clauses.is_empty() {
            items.retain(|item| self.matches(item));
        }
        items
    }

    /// Number of filters that survived compilation
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.clauses.len()
    }

    /// Check if no filter survived, so every item matches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Filters dropped while compiling, in request order
    #[must_use]
    pub fn dropped(&self) -> &[QueryIssue] {
        &self.dropped
    }

    /// Canonical paths of the surviving clauses, in request order
    #[must_use]
    pub fn applied_paths(&self) -> Vec<&str> {
        self.clauses.iter().map(|c| c.path.path()).collect()
    }
}

impl<T: 'static> FilterPredicate<T> {
    /// Turn the predicate into a plain closure for a storage layer to run
    pub fn into_fn(self) -> impl Fn(&T) -> bool + Send + Sync + 'static {
        move |item: &T| self.matches(item)
    }
}

fn compile<T>(schema: &Schema<T>, filter: &FilterParameter) -> Result<Clause<T>, QueryIssue> {
    let path = schema
        .resolve(&filter.field)
        .ok_or_else(|| QueryIssue::PropertyResolution {
            path: filter.field.clone(),
        })?;

    let kind = path.kind();
    let op = filter.operator;
    let supported = if op.is_ordering() {
        kind.is_orderable()
    } else if op.is_textual() {
        kind.is_textual()
    } else {
        true
    };
    if !supported {
        return Err(QueryIssue::UnsupportedOperator {
            path: path.path().to_string(),
            operator: op.to_string(),
        });
    }

    let condition = match op {
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            Condition::Text {
                op,
                needle: filter.value.to_lowercase(),
            }
        }
        FilterOperator::In => Condition::Membership {
            candidates: coerce_candidates(&path, &filter.value)?,
        },
        _ => Condition::Compare {
            op,
            target: coerce(&filter.value, path.field_type()).map_err(|_| {
                QueryIssue::ValueCoercion {
                    path: path.path().to_string(),
                    value: filter.value.clone(),
                    expected: kind,
                }
            })?,
        },
    };

    Ok(Clause { path, condition })
}

/// Coerce each comma-separated token, skipping the ones that fail
fn coerce_candidates<T>(path: &ResolvedPath<T>, raw: &str) -> Result<Vec<Value>, QueryIssue> {
    let candidates: Vec<Value> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match coerce(token, path.field_type()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(field = %path.path(), token = %token, reason = %e, "Skipping `in` token");
                None
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(QueryIssue::ValueCoercion {
            path: path.path().to_string(),
            value: raw.to_string(),
            expected: path.kind(),
        });
    }
    Ok(candidates)
}
