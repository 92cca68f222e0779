//! Storage collaborator seam
//!
//! The engine never talks to storage directly. A [`CollectionSource`]
//! retrieves the base sequence, and any failure surfaces as a
//! [`SourceError`].

mod error;
mod traits;

pub use error::{SourceError, SourceErrorKind};
pub use traits::{CollectionSource, InMemorySource, SourceResult};
