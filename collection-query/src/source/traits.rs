//! Collection source trait definitions
//!
//! A [`CollectionSource`] hands the query engine the base sequence of a
//! collection. It uses RPITIT (Return Position Impl Trait In Traits), so
//! implementations write plain `async fn` without `async_trait`.
//!
//! # Example
//!
//! ```rust,ignore
//! use collection_query::source::{CollectionSource, SourceError, SourceResult};
//!
//! struct TaskStore {
//!     pool: PgPool,
//! }
//!
//! impl CollectionSource<Task> for TaskStore {
//!     async fn fetch(&self) -> SourceResult<Vec<Task>> {
//!         sqlx::query_as!(Task, "SELECT * FROM tasks")
//!             .fetch_all(&self.pool)
//!             .await
//!             .map_err(|e| SourceError::connection_failed(e.to_string()).with_collection("tasks"))
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use super::error::SourceError;

/// Result type for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Supplies the base sequence of a collection
pub trait CollectionSource<T>: Send + Sync {
    /// Retrieve every item of the collection
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the backing store cannot be read.
    fn fetch(&self) -> impl Future<Output = SourceResult<Vec<T>>> + Send;
}

/// A collection held in memory, shared cheaply between clones
///
/// # Example
///
/// ```rust
/// use collection_query::source::{CollectionSource, InMemorySource};
///
/// # tokio_test_block(async {
/// let source = InMemorySource::new("numbers", vec![1, 2, 3]);
/// assert_eq!(source.fetch().await.unwrap(), vec![1, 2, 3]);
/// assert_eq!(source.name(), "numbers");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct InMemorySource<T> {
    name: String,
    items: Arc<Vec<T>>,
}

impl<T> Clone for InMemorySource<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> InMemorySource<T> {
    /// Wrap `items` as a collection called `name`
    pub fn new(name: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            name: name.into(),
            items: Arc::new(items),
        }
    }

    /// Collection name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of items held
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone + Send + Sync> CollectionSource<T> for InMemorySource<T> {
    async fn fetch(&self) -> SourceResult<Vec<T>> {
        tracing::trace!(collection = %self.name, count = self.items.len(), "Fetching in-memory collection");
        Ok(self.items.as_ref().clone())
    }
}
