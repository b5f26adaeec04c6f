use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::{parse_view_definition, schema, Model};
use crate::types::{EntityId, Value};

/// An in-memory entity graph.
///
/// Forward attributes are set explicitly; inverse attributes
/// (`Decomposes`, `IsNestedBy`, `ContainedInStructure`, ...) are maintained by
/// the relationship helpers [`relate`](Self::relate),
/// [`aggregate`](Self::aggregate), [`nest`](Self::nest) and
/// [`contain`](Self::contain).
#[derive(Debug, Clone)]
pub struct MemoryModel {
    schema: String,
    view_definition: Option<String>,
    supertypes: HashMap<String, String>,
    entities: BTreeMap<EntityId, EntityRecord>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct EntityRecord {
    type_name: String,
    attributes: Vec<(String, Value)>,
    inverses: Vec<(String, Vec<EntityId>)>,
}

/// One side of a relationship passed to [`MemoryModel::relate`].
#[derive(Debug, Clone, Copy)]
pub struct RelationSide<'a> {
    /// Attribute on the relationship holding this side.
    pub attribute: &'a str,
    /// Inverse attribute registered on every entity of this side.
    pub inverse: &'a str,
    /// Whether the attribute holds an aggregate rather than a single reference.
    pub aggregate: bool,
}

impl MemoryModel {
    /// Create an empty model with the built-in IFC type hierarchy.
    #[must_use]
    pub fn new(schema: &str) -> Self {
        let supertypes = schema::SUPERTYPES
            .iter()
            .map(|(child, parent)| (child.to_ascii_lowercase(), parent.to_ascii_lowercase()))
            .collect();
        Self {
            schema: schema.to_owned(),
            view_definition: None,
            supertypes,
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Set the model view definition directly.
    #[must_use]
    pub fn with_view_definition(mut self, mvd: &str) -> Self {
        self.view_definition = Some(mvd.to_owned());
        self
    }

    /// Set the model view definition from a header description such as
    /// `ViewDefinition [CoordinationView]`. Malformed descriptions leave it unset.
    #[must_use]
    pub fn with_header_description(mut self, description: &str) -> Self {
        self.view_definition = parse_view_definition(description);
        self
    }

    /// Declare (or redeclare) the direct supertype of a type.
    pub fn declare_type(&mut self, type_name: &str, supertype: &str) -> &mut Self {
        self.supertypes
            .insert(type_name.to_ascii_lowercase(), supertype.to_ascii_lowercase());
        self
    }

    /// Add an instance without attributes.
    pub fn add(&mut self, type_name: &str) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            EntityRecord {
                type_name: type_name.to_owned(),
                attributes: Vec::new(),
                inverses: Vec::new(),
            },
        );
        id
    }

    /// Add an instance with the given forward attributes.
    pub fn add_with<'a>(
        &mut self,
        type_name: &str,
        attributes: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> EntityId {
        let id = self.add(type_name);
        for (name, value) in attributes {
            self.set(id, name, value);
        }
        id
    }

    /// Set a forward attribute. Unknown ids are ignored.
    pub fn set(&mut self, id: EntityId, name: &str, value: impl Into<Value>) -> &mut Self {
        if let Some(record) = self.entities.get_mut(&id) {
            let value = value.into();
            match record.attributes.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value,
                None => record.attributes.push((name.to_owned(), value)),
            }
        }
        self
    }

    fn push_inverse(&mut self, id: EntityId, name: &str, rel: EntityId) {
        if let Some(record) = self.entities.get_mut(&id) {
            match record.inverses.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1.push(rel),
                None => record.inverses.push((name.to_owned(), vec![rel])),
            }
        }
    }

    /// Create a relationship instance linking `relating` to `related` and
    /// register the inverse attributes on both sides.
    pub fn relate(
        &mut self,
        rel_type: &str,
        relating_side: RelationSide<'_>,
        relating: EntityId,
        related_side: RelationSide<'_>,
        related: &[EntityId],
    ) -> EntityId {
        let rel = self.add(rel_type);
        let relating_value = if relating_side.aggregate {
            Value::List(vec![Value::Entity(relating)])
        } else {
            Value::Entity(relating)
        };
        let related_value = match (related_side.aggregate, related) {
            (false, [single]) => Value::Entity(*single),
            _ => Value::List(related.iter().copied().map(Value::Entity).collect()),
        };
        self.set(rel, relating_side.attribute, relating_value);
        self.set(rel, related_side.attribute, related_value);
        self.push_inverse(relating, relating_side.inverse, rel);
        for &child in related {
            self.push_inverse(child, related_side.inverse, rel);
        }
        rel
    }

    /// `IfcRelAggregates`: `parent.IsDecomposedBy`, `child.Decomposes`.
    pub fn aggregate(&mut self, parent: EntityId, children: &[EntityId]) -> EntityId {
        self.decompose("IfcRelAggregates", "IsDecomposedBy", "Decomposes", parent, children)
    }

    /// `IfcRelNests`: `parent.IsNestedBy`, `child.Nests`.
    pub fn nest(&mut self, parent: EntityId, children: &[EntityId]) -> EntityId {
        self.decompose("IfcRelNests", "IsNestedBy", "Nests", parent, children)
    }

    fn decompose(
        &mut self,
        rel_type: &str,
        parent_inverse: &str,
        child_inverse: &str,
        parent: EntityId,
        children: &[EntityId],
    ) -> EntityId {
        self.relate(
            rel_type,
            RelationSide {
                attribute: "RelatingObject",
                inverse: parent_inverse,
                aggregate: false,
            },
            parent,
            RelationSide {
                attribute: "RelatedObjects",
                inverse: child_inverse,
                aggregate: true,
            },
            children,
        )
    }

    /// `IfcRelContainedInSpatialStructure`: `structure.ContainsElements`,
    /// `element.ContainedInStructure`.
    pub fn contain(&mut self, structure: EntityId, elements: &[EntityId]) -> EntityId {
        self.relate(
            "IfcRelContainedInSpatialStructure",
            RelationSide {
                attribute: "RelatingStructure",
                inverse: "ContainsElements",
                aggregate: false,
            },
            structure,
            RelationSide {
                attribute: "RelatedElements",
                inverse: "ContainedInStructure",
                aggregate: true,
            },
            elements,
        )
    }

    /// Number of instances in the model.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Model for MemoryModel {
    fn schema_identifier(&self) -> &str {
        &self.schema
    }

    fn model_view_definition(&self) -> Option<&str> {
        self.view_definition.as_deref()
    }

    fn by_type(&self, type_name: &str) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, record)| self.is_subtype_of(&record.type_name, type_name))
            .map(|(id, _)| *id)
            .collect()
    }

    fn type_name(&self, id: EntityId) -> Option<&str> {
        self.entities.get(&id).map(|r| r.type_name.as_str())
    }

    fn is_subtype_of(&self, type_name: &str, ancestor: &str) -> bool {
        let ancestor = ancestor.to_ascii_lowercase();
        let mut current = type_name.to_ascii_lowercase();
        // bounded walk, a malformed declaration cycle must not hang
        for _ in 0..=self.supertypes.len() {
            if current == ancestor {
                return true;
            }
            match self.supertypes.get(&current) {
                Some(parent) => current.clone_from(parent),
                None => return false,
            }
        }
        false
    }

    fn attribute(&self, id: EntityId, name: &str) -> Option<Value> {
        let record = self.entities.get(&id)?;
        if let Some((_, value)) = record.attributes.iter().find(|(n, _)| n == name) {
            return Some(value.clone());
        }
        record
            .inverses
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rels)| Value::List(rels.iter().copied().map(Value::Entity).collect()))
    }

    fn traverse(&self, id: EntityId) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(record) = self.entities.get(&current) else {
                continue;
            };
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            for (_, value) in &record.attributes {
                for leaf in value.leaves() {
                    if let Value::Entity(next) = leaf {
                        if !seen.contains(next) {
                            queue.push_back(*next);
                        }
                    }
                }
            }
        }
        order
    }
}
