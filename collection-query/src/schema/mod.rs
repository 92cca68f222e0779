//! Schema descriptors for queryable types
//!
//! This module provides the building blocks the query engine uses to work
//! with any item type by property name:
//!
//! - **Values**: [`Value`], [`ValueKind`], and [`FieldType`] describe what a property holds
//! - **Coercion**: [`coerce`] turns raw query-string text into a typed [`Value`]
//! - **Registry**: [`Schema`] and [`Shape`] map declared names to accessors
//! - **Resolution**: [`Schema::resolve`] turns `manager.fullName` into a [`ResolvedPath`]

mod coerce;
mod shape;
mod value;

pub use coerce::{coerce, CoercionError};
pub use shape::{Accessor, Property, ResolvedPath, Schema, SchemaBuilder, Shape};
pub use value::{FieldType, Value, ValueKind};
