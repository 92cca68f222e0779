//! Field selection over a page of items
//!
//! [`project`] turns each item into an ordered map holding only the
//! requested top-level properties. An empty result means there was nothing
//! to project; callers then return the full items instead (see
//! [`EnhancedPagedResult::into_shaped`](crate::paging::EnhancedPagedResult::into_shaped)).
//!
//! # Example
//!
//! ```rust
//! use collection_query::projection::project;
//! use collection_query::schema::{Schema, Shape, Value, ValueKind};
//! use once_cell::sync::Lazy;
//!
//! struct Invoice {
//!     number: String,
//!     total: i64,
//!     paid: bool,
//! }
//!
//! impl Shape for Invoice {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Invoice>> = Lazy::new(|| {
//!             Schema::builder("Invoice")
//!                 .field("number", ValueKind::Text, |i: &Invoice| i.number.clone())
//!                 .field("total", ValueKind::Integer, |i: &Invoice| i.total)
//!                 .field("paid", ValueKind::Boolean, |i: &Invoice| i.paid)
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! let invoices = vec![Invoice { number: "INV-1".into(), total: 90, paid: true }];
//! let projected = project(Invoice::schema(), &invoices, "PAID, number, discount");
//!
//! let keys: Vec<&str> = projected[0].keys().map(String::as_str).collect();
//! assert_eq!(keys, vec!["number", "paid"]);
//! assert_eq!(projected[0]["paid"], Value::Boolean(true));
//!
//! assert!(project(Invoice::schema(), &invoices, "").is_empty());
//! ```

use indexmap::IndexMap;

use crate::schema::{Property, Schema, Value};

/// One projected item: declared property names to values, in declared order
pub type ProjectedItem = IndexMap<String, Value>;

/// The declared properties named in a comma-separated `fields` list
///
/// Matching is case-insensitive and unknown names are ignored. The result
/// follows the schema's declared order, not the request's.
pub fn selected_properties<'a, T>(schema: &'a Schema<T>, fields: &str) -> Vec<&'a Property<T>> {
    let requested: Vec<&str> = fields
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    schema
        .properties()
        .iter()
        .filter(|p| requested.iter().any(|name| p.name().eq_ignore_ascii_case(name)))
        .collect()
}

/// Project `items` down to the properties named in `fields`
///
/// Returns an empty vector when `fields` names nothing or `items` is empty.
/// Nested object properties project to a nested map, or null when absent.
pub fn project<T>(schema: &Schema<T>, items: &[T], fields: &str) -> Vec<ProjectedItem> {
    if items.is_empty() || fields.split(',').all(|name| name.trim().is_empty()) {
        return Vec::new();
    }

    let selected = selected_properties(schema, fields);
    tracing::trace!(
        schema = schema.name(),
        fields = %fields,
        matched = selected.len(),
        "Projecting page"
    );

    items
        .iter()
        .map(|item| {
            selected
                .iter()
                .map(|p| (p.name().to_string(), p.project(item)))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Shape;
    use crate::test_support::{sample_tasks, Task};

    #[test]
    fn test_blank_fields_project_nothing() {
        assert!(project(Task::schema(), &sample_tasks(), "").is_empty());
        assert!(project(Task::schema(), &sample_tasks(), " , ").is_empty());
        assert!(project(Task::schema(), &sample_tasks(), "   ").is_empty());
    }

    #[test]
    fn test_empty_items_project_nothing() {
        assert!(project::<Task>(Task::schema(), &[], "name").is_empty());
    }

    #[test]
    fn test_intersection_in_declared_order() {
        let projected = project(Task::schema(), &sample_tasks(), "status,NAME,bogus");
        assert_eq!(projected.len(), 5);
        for item in &projected {
            let keys: Vec<&str> = item.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["name", "status"]);
        }
        assert_eq!(projected[0]["name"], Value::from("Write proposal"));
        assert_eq!(projected[4]["name"], Value::from("Fix login bug"));
    }

    #[test]
    fn test_only_unknown_fields_yield_empty_maps() {
        let projected = project(Task::schema(), &sample_tasks(), "bogus");
        assert_eq!(projected.len(), 5);
        assert!(projected.iter().all(IndexMap::is_empty));
    }

    #[test]
    fn test_nested_object_projection() {
        let tasks = sample_tasks();
        let projected = project(Task::schema(), &tasks, "manager");
        match &projected[0]["manager"] {
            Value::Object(manager) => {
                assert_eq!(manager["fullName"], Value::from("Ada Lovelace"));
                assert_eq!(manager["email"], Value::from("ada@example.com"));
            }
            other => panic!("expected object, got {:?}", other),
        }
        assert_eq!(projected[3]["manager"], Value::Null);
    }

    #[test]
    fn test_projection_serializes_in_order() {
        let tasks = sample_tasks();
        let projected = project(Task::schema(), &tasks[3..4], "dueDate,priority,name");
        let json = serde_json::to_string(&projected).unwrap();
        assert_eq!(json, r#"[{"name":"Deploy","priority":4,"dueDate":null}]"#);
    }

    #[test]
    fn test_selected_properties() {
        let selected = selected_properties(Task::schema(), " isbillable , project ");
        let names: Vec<&str> = selected.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["isBillable", "project"]);
    }
}
