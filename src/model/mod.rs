//! Access to the building model being checked.
//!
//! The engine never owns model storage. It consumes any type implementing
//! [`Model`], which exposes typed lookup, traversal, polymorphic type tests and
//! attribute access with a default on absence. [`MemoryModel`] is a small
//! in-memory implementation used by tests, benches and demos.

mod memory;
mod schema;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Value};

pub use memory::{MemoryModel, RelationSide};

/// Read-only view of an entity graph.
pub trait Model {
    /// Schema identifier from the file header, e.g. `IFC4`.
    fn schema_identifier(&self) -> &str;

    /// Model view definition from the file header, if one was declared.
    fn model_view_definition(&self) -> Option<&str>;

    /// All instances of `type_name` or any of its subtypes, in model order.
    /// Unknown type names yield an empty list.
    fn by_type(&self, type_name: &str) -> Vec<EntityId>;

    /// The declared type of an instance.
    fn type_name(&self, id: EntityId) -> Option<&str>;

    /// Whether `type_name` equals `ancestor` or derives from it.
    fn is_subtype_of(&self, type_name: &str, ancestor: &str) -> bool;

    /// Raw attribute access; `None` when the instance has no such attribute.
    fn attribute(&self, id: EntityId, name: &str) -> Option<Value>;

    /// Every instance reachable from `id` through forward attributes,
    /// starting with `id` itself.
    fn traverse(&self, id: EntityId) -> Vec<EntityId>;

    /// Polymorphic type test.
    fn is_a(&self, id: EntityId, type_name: &str) -> bool {
        self.type_name(id)
            .is_some_and(|own| self.is_subtype_of(own, type_name))
    }

    /// Attribute access that never fails: absence yields `default`.
    fn attribute_or(&self, id: EntityId, name: &str, default: Value) -> Value {
        self.attribute(id, name).unwrap_or(default)
    }

    /// Entities referenced by an attribute, normalizing scalar and aggregate
    /// values. Absence yields an empty list.
    fn related(&self, id: EntityId, name: &str) -> Vec<EntityId> {
        self.attribute_or(id, name, Value::Null).entities()
    }

    /// A self-contained snapshot of an instance for outcome records.
    fn instance(&self, id: EntityId) -> InstanceRef {
        InstanceRef {
            id,
            type_name: self.type_name(id).unwrap_or("IfcUnknown").to_owned(),
            global_id: self
                .attribute(id, "GlobalId")
                .and_then(|v| v.as_str().map(str::to_owned)),
        }
    }
}

/// Identity of an instance captured at the time a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceRef {
    pub id: EntityId,
    pub type_name: String,
    pub global_id: Option<String>,
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.global_id {
            Some(guid) => write!(f, "{}={}('{guid}')", self.id, self.type_name),
            None => write!(f, "{}={}", self.id, self.type_name),
        }
    }
}

/// Extract the view definition from a header description such as
/// `ViewDefinition [CoordinationView]`.
#[must_use]
pub fn parse_view_definition(description: &str) -> Option<String> {
    let (_, rest) = description.split_once(' ')?;
    let rest = rest.trim();
    let inner = rest.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.to_owned())
}
