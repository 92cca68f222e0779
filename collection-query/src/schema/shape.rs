//! Per-type property registries and dotted-path resolution
//!
//! A [`Schema`] maps declared property names to accessor closures so the
//! query engine can read fields by name without runtime reflection. Each
//! queryable type registers its schema once, usually in a `Lazy` static,
//! and exposes it through the [`Shape`] trait.
//!
//! # Example
//!
//! ```rust
//! use collection_query::schema::{Schema, Shape, Value, ValueKind};
//! use once_cell::sync::Lazy;
//!
//! struct Manager {
//!     full_name: String,
//! }
//!
//! struct Project {
//!     name: String,
//!     budget: i64,
//!     manager: Option<Manager>,
//! }
//!
//! impl Shape for Manager {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Manager>> = Lazy::new(|| {
//!             Schema::builder("Manager")
//!                 .field("fullName", ValueKind::Text, |m: &Manager| m.full_name.clone())
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! impl Shape for Project {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Project>> = Lazy::new(|| {
//!             Schema::builder("Project")
//!                 .field("name", ValueKind::Text, |p: &Project| p.name.clone())
//!                 .field("budget", ValueKind::Integer, |p: &Project| p.budget)
//!                 .nested("manager", |p: &Project| p.manager.as_ref())
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! let project = Project {
//!     name: "Apollo".to_string(),
//!     budget: 1_000,
//!     manager: Some(Manager { full_name: "Ada".to_string() }),
//! };
//!
//! let path = Project::schema().resolve("MANAGER.fullname").unwrap();
//! assert_eq!(path.path(), "manager.fullName");
//! assert_eq!(path.read(&project), Value::from("Ada"));
//! assert!(Project::schema().resolve("manager.salary").is_none());
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::value::{FieldType, Value, ValueKind};

/// Reads a property value from an item
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

type Presence<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

type Parent<T, U> = Arc<dyn Fn(&T) -> Option<&U> + Send + Sync>;

/// A type whose properties can be filtered, sorted, and projected by name
///
/// Nested shapes must not form a cycle (a `Task` whose manager has tasks):
/// schemas are flattened when built.
pub trait Shape: Sized + Send + Sync + 'static {
    /// The registered schema for this type
    fn schema() -> &'static Schema<Self>;
}

/// A declared property: a scalar with an accessor, or a nested object
pub struct Property<T> {
    name: &'static str,
    kind: PropertyKind<T>,
}

enum PropertyKind<T> {
    Scalar {
        field_type: FieldType,
        read: Accessor<T>,
    },
    Object {
        properties: Vec<Property<T>>,
        present: Presence<T>,
    },
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            PropertyKind::Scalar { field_type, read } => PropertyKind::Scalar {
                field_type: *field_type,
                read: Arc::clone(read),
            },
            PropertyKind::Object {
                properties,
                present,
            } => PropertyKind::Object {
                properties: properties.clone(),
                present: Arc::clone(present),
            },
        };
        Self {
            name: self.name,
            kind,
        }
    }
}

impl<T> Property<T> {
    /// The declared property name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type, `None` for nested objects
    #[must_use]
    pub fn field_type(&self) -> Option<FieldType> {
        match &self.kind {
            PropertyKind::Scalar { field_type, .. } => Some(*field_type),
            PropertyKind::Object { .. } => None,
        }
    }

    /// Whether this property is a nested object
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, PropertyKind::Object { .. })
    }

    /// Read the runtime value of this property
    ///
    /// Nested objects become [`Value::Object`] holding every scalar (and
    /// further nested) property in declared order, or `Null` when absent.
    pub fn project(&self, item: &T) -> Value {
        match &self.kind {
            PropertyKind::Scalar { read, .. } => read(item),
            PropertyKind::Object {
                properties,
                present,
            } => {
                if !present(item) {
                    return Value::Null;
                }
                let map: IndexMap<String, Value> = properties
                    .iter()
                    .map(|p| (p.name.to_string(), p.project(item)))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PropertyKind::Scalar { field_type, .. } => f
                .debug_struct("Property")
                .field("name", &self.name)
                .field("type", field_type)
                .finish(),
            PropertyKind::Object { properties, .. } => f
                .debug_struct("Property")
                .field("name", &self.name)
                .field("properties", properties)
                .finish(),
        }
    }
}

/// A property path resolved against a schema, ready to read from items
pub struct ResolvedPath<T> {
    path: String,
    field_type: FieldType,
    read: Accessor<T>,
}

impl<T> ResolvedPath<T> {
    /// Canonical dotted path using declared names
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared type of the final segment
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Kind of the final segment
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.field_type.kind
    }

    /// Read the value at this path from `item`
    pub fn read(&self, item: &T) -> Value {
        (self.read)(item)
    }
}

impl<T> Clone for ResolvedPath<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            field_type: self.field_type,
            read: Arc::clone(&self.read),
        }
    }
}

impl<T> fmt::Debug for ResolvedPath<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPath")
            .field("path", &self.path)
            .field("field_type", &self.field_type)
            .finish()
    }
}

/// Registry of the queryable properties of `T`
pub struct Schema<T> {
    name: &'static str,
    properties: Vec<Property<T>>,
}

impl<T: 'static> Schema<T> {
    /// Start building a schema for a type named `name`
    pub fn builder(name: &'static str) -> SchemaBuilder<T> {
        SchemaBuilder {
            name,
            properties: Vec::new(),
        }
    }
}

impl<T> Schema<T> {
    /// Type name used in log output
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Top-level properties in declared order
    #[must_use]
    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    /// Look up a top-level property, ignoring case
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property<T>> {
        find(&self.properties, name)
    }

    /// Resolve a dotted path such as `manager.fullName` to a scalar property
    ///
    /// Each segment is matched case-insensitively against the properties of
    /// the current level. Returns `None` when a segment is unknown, when the
    /// path continues past a scalar, or when it stops on a nested object.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<ResolvedPath<T>> {
        let mut level = &self.properties;
        let mut names: Vec<&'static str> = Vec::new();
        let mut segments = path.split('.').map(str::trim).peekable();

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return None;
            }
            let property = find(level, segment)?;
            names.push(property.name);
            match &property.kind {
                PropertyKind::Scalar { field_type, read } => {
                    if segments.peek().is_some() {
                        return None;
                    }
                    return Some(ResolvedPath {
                        path: names.join("."),
                        field_type: *field_type,
                        read: Arc::clone(read),
                    });
                }
                PropertyKind::Object { properties, .. } => level = properties,
            }
        }

        None
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish()
    }
}

fn find<'a, T>(level: &'a [Property<T>], name: &str) -> Option<&'a Property<T>> {
    level.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Builder for [`Schema`]
pub struct SchemaBuilder<T> {
    name: &'static str,
    properties: Vec<Property<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Register a scalar property that always holds a value
    #[must_use]
    pub fn field<V, F>(self, name: &'static str, kind: ValueKind, read: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.scalar(name, FieldType::required(kind), move |item| read(item).into())
    }

    /// Register a scalar property that may hold no value
    #[must_use]
    pub fn optional_field<V, F>(self, name: &'static str, kind: ValueKind, read: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&T) -> Option<V> + Send + Sync + 'static,
    {
        self.scalar(name, FieldType::nullable(kind), move |item| read(item).into())
    }

    /// Register a nested object property whose own schema comes from `U`
    ///
    /// Every property of `U` becomes reachable as `name.<property>`, and is
    /// read as nullable because the parent may be absent.
    #[must_use]
    pub fn nested<U, F>(mut self, name: &'static str, read: F) -> Self
    where
        U: Shape,
        F: Fn(&T) -> Option<&U> + Send + Sync + 'static,
    {
        let parent: Parent<T, U> = Arc::new(read);
        let properties = U::schema()
            .properties()
            .iter()
            .map(|child| lift(child, &parent))
            .collect();
        let present_parent = Arc::clone(&parent);
        self.properties.push(Property {
            name,
            kind: PropertyKind::Object {
                properties,
                present: Arc::new(move |item: &T| present_parent(item).is_some()),
            },
        });
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Schema<T> {
        Schema {
            name: self.name,
            properties: self.properties,
        }
    }

    fn scalar<F>(mut self, name: &'static str, field_type: FieldType, read: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        debug_assert!(
            find(&self.properties, name).is_none(),
            "duplicate property `{}`",
            name
        );
        self.properties.push(Property {
            name,
            kind: PropertyKind::Scalar {
                field_type,
                read: Arc::new(read),
            },
        });
        self
    }
}

/// Re-root a property of `U` onto `T` through the `parent` accessor
fn lift<T: 'static, U: 'static>(property: &Property<U>, parent: &Parent<T, U>) -> Property<T> {
    let kind = match &property.kind {
        PropertyKind::Scalar { field_type, read } => {
            let read = Arc::clone(read);
            let parent = Arc::clone(parent);
            PropertyKind::Scalar {
                field_type: field_type.as_nullable(),
                read: Arc::new(move |item: &T| parent(item).map_or(Value::Null, |inner| read(inner))),
            }
        }
        PropertyKind::Object {
            properties,
            present,
        } => {
            let present = Arc::clone(present);
            let outer = Arc::clone(parent);
            PropertyKind::Object {
                properties: properties.iter().map(|child| lift(child, parent)).collect(),
                present: Arc::new(move |item: &T| outer(item).is_some_and(|inner| present(inner))),
            }
        }
    };
    Property {
        name: property.name,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_tasks, Task};

    #[test]
    fn test_resolve_top_level_case_insensitive() {
        let path = Task::schema().resolve("STATUS").unwrap();
        assert_eq!(path.path(), "status");
        assert_eq!(path.kind(), ValueKind::Text);
        assert!(!path.field_type().nullable);
    }

    #[test]
    fn test_resolve_nested() {
        let tasks = sample_tasks();
        let path = Task::schema().resolve("manager.fullName").unwrap();
        assert_eq!(path.path(), "manager.fullName");
        assert!(path.field_type().nullable);
        assert_eq!(path.read(&tasks[0]), Value::from("Ada Lovelace"));
    }

    #[test]
    fn test_resolve_two_levels() {
        let tasks = sample_tasks();
        let path = Task::schema().resolve("project.owner.email").unwrap();
        assert_eq!(path.path(), "project.owner.email");
        assert_eq!(path.read(&tasks[0]), Value::from("grace@example.com"));
    }

    #[test]
    fn test_nested_read_through_missing_parent_is_null() {
        let tasks = sample_tasks();
        let orphan = tasks.iter().find(|t| t.manager.is_none()).unwrap();
        let path = Task::schema().resolve("manager.fullName").unwrap();
        assert_eq!(path.read(orphan), Value::Null);
    }

    #[test]
    fn test_resolve_failures() {
        let schema = Task::schema();
        assert!(schema.resolve("").is_none());
        assert!(schema.resolve("nope").is_none());
        assert!(schema.resolve("manager").is_none());
        assert!(schema.resolve("manager.").is_none());
        assert!(schema.resolve("name.length").is_none());
        assert!(schema.resolve("manager.salary").is_none());
    }

    #[test]
    fn test_property_lookup() {
        let schema = Task::schema();
        assert_eq!(schema.name(), "Task");
        assert!(schema.property("Manager").unwrap().is_object());
        assert_eq!(
            schema.property("priority").unwrap().field_type(),
            Some(FieldType::required(ValueKind::Integer))
        );
        assert!(schema.property("unknown").is_none());
    }

    #[test]
    fn test_project_object_property() {
        let tasks = sample_tasks();
        let manager = Task::schema().property("manager").unwrap();
        match manager.project(&tasks[0]) {
            Value::Object(map) => {
                assert_eq!(map.get("fullName"), Some(&Value::from("Ada Lovelace")));
                assert!(map.contains_key("id"));
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_is_shareable_across_threads() {
        fn assert_send_sync<S: Send + Sync>(_: &S) {}
        assert_send_sync(Task::schema());
    }
}
