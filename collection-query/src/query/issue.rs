//! Non-fatal problems found while compiling a query
//!
//! None of these abort a query. The offending filter or sort key is dropped,
//! the issue is logged at `debug`, and the rest of the query still runs.

use serde::Serialize;
use thiserror::Error;

use crate::schema::ValueKind;

/// Why a filter or sort request was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryIssue {
    /// The requested path does not exist on the item shape
    #[error("property `{path}` does not exist")]
    PropertyResolution {
        /// Path as requested
        path: String,
    },

    /// The value could not be parsed into the property's type
    #[error("value {value:?} for `{path}` is not a valid {expected}")]
    ValueCoercion {
        /// Resolved path
        path: String,
        /// Raw value as requested
        value: String,
        /// Kind the property declares
        expected: ValueKind,
    },

    /// The operator is unknown or does not apply to the property's kind
    #[error("operator `{operator}` is not supported on `{path}`")]
    UnsupportedOperator {
        /// Path as requested or resolved
        path: String,
        /// Operator as requested
        operator: String,
    },
}

impl QueryIssue {
    /// The path the issue refers to
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::PropertyResolution { path }
            | Self::ValueCoercion { path, .. }
            | Self::UnsupportedOperator { path, .. } => path,
        }
    }
}
