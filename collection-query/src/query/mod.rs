//! Request parameters, filter predicates, and sort orderings
//!
//! - **Parameters**: [`BaseQueryParameters`] and [`SortOrder`] carry paging, sorting, and field selection
//! - **Filters**: [`FilterParameter`] triples, parsed from `field__operator=value` pairs by [`parse_filter_string`]
//! - **Predicates**: [`FilterPredicate`] compiles filters against a schema into an AND of clauses
//! - **Orderings**: [`SortComparator`] orders items by a single property path
//! - **Issues**: [`QueryIssue`] records every filter or sort key that was dropped

mod filter;
mod issue;
mod params;
mod predicate;
mod sort;

pub use filter::{
    parse_filter_string, FilterOperator, FilterParameter, UnknownOperator, OPERATOR_SEPARATOR,
};
pub use issue::QueryIssue;
pub use params::{BaseQueryParameters, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use predicate::FilterPredicate;
pub use sort::SortComparator;
