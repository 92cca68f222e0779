//! Collection source error types
//!
//! A [`SourceError`] is the only failure the query engine propagates: when
//! the base sequence cannot be retrieved there is nothing to filter.
//!
//! # Example
//!
//! ```rust
//! use collection_query::source::{SourceError, SourceErrorKind};
//!
//! let error = SourceError::timeout("read timed out after 5s").with_collection("tasks");
//! assert_eq!(error.kind, SourceErrorKind::Timeout);
//! assert!(error.is_retriable());
//! assert_eq!(error.to_string(), "Source timeout error: read timed out after 5s [tasks]");
//! ```

use std::fmt;

/// Category of source error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorKind {
    /// The collection does not exist
    NotFound,
    /// Failed to reach the backing store
    ConnectionFailed,
    /// Retrieval timed out
    Timeout,
    /// Stored items could not be decoded
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Failure to retrieve the base sequence of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    /// The category of error
    pub kind: SourceErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The collection involved (e.g., "tasks")
    pub collection: Option<String>,
}

impl SourceError {
    /// Create a new source error
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            collection: None,
        }
    }

    /// The named collection does not exist
    pub fn not_found(collection: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, "Collection not found").with_collection(collection)
    }

    /// The backing store could not be reached
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::ConnectionFailed, message)
    }

    /// Retrieval timed out
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Timeout, message)
    }

    /// Stored items could not be decoded
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::SerializationError, message)
    }

    /// Add collection context to an existing error
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Check if this error is transient and the fetch may succeed on retry
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::ConnectionFailed | SourceErrorKind::Timeout
        )
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source {} error: {}", self.kind, self.message)?;
        if let Some(collection) = &self.collection {
            write!(f, " [{}]", collection)?;
        }
        Ok(())
    }
}

impl std::error::Error for SourceError {}
