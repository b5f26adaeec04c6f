use std::collections::HashSet;

use crate::model::Model;
use crate::tables::TableCache;
use crate::types::{Direction, EntityId, EvalError, NestDirection};

/// Instances of `entity` among `current` that take part in at least one
/// `relationship` whose other side holds an `other_entity`.
///
/// With [`Direction::FromTo`] the current instances take the relating role;
/// [`Direction::ToFrom`] swaps the roles.
pub(crate) fn resolve<M: Model + ?Sized>(
    model: &M,
    tables: &mut TableCache,
    relationship: &str,
    direction: Direction,
    entity: &str,
    other_entity: &str,
    current: &[EntityId],
) -> Result<HashSet<EntityId>, EvalError> {
    let roles = tables.relationships()?.roles(relationship).cloned().ok_or_else(|| {
        EvalError::UnknownRelationshipType {
            relationship: relationship.to_owned(),
        }
    })?;
    let (entity_attr, other_attr) = match direction {
        Direction::FromTo => (roles.relating, roles.related),
        Direction::ToFrom => (roles.related, roles.relating),
    };

    let current: HashSet<EntityId> = current.iter().copied().collect();
    let mut matched = HashSet::new();
    for rel in model.by_type(relationship) {
        let others = model.related(rel, &other_attr);
        if !others.iter().any(|&o| model.is_a(o, other_entity)) {
            continue;
        }
        matched.extend(
            model
                .related(rel, &entity_attr)
                .into_iter()
                .filter(|e| current.contains(e) && model.is_a(*e, entity)),
        );
    }
    Ok(matched)
}

/// First entity referenced by `attribute` of the first relationship listed in
/// the inverse attribute `inverse`.
fn first_via<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    inverse: &str,
    attribute: &str,
) -> Option<EntityId> {
    let rel = model.related(id, inverse).first().copied()?;
    model.related(rel, attribute).first().copied()
}

/// The spatial structure an element is directly contained in.
pub(crate) fn containing_structure<M: Model + ?Sized>(model: &M, id: EntityId) -> Option<EntityId> {
    first_via(model, id, "ContainedInStructure", "RelatingStructure")
}

/// The whole an object is a decomposed part of.
pub(crate) fn decomposing_parent<M: Model + ?Sized>(model: &M, id: EntityId) -> Option<EntityId> {
    first_via(model, id, "Decomposes", "RelatingObject")
}

/// Nesting relationships of `id` on the given side, with their members.
///
/// For [`NestDirection::Nest`] the members are the nested parts; for
/// [`NestDirection::NestedBy`] the single member is the nesting whole.
pub(crate) fn nesting<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    direction: NestDirection,
) -> Vec<(EntityId, Vec<EntityId>)> {
    let (inverse, attribute) = match direction {
        NestDirection::Nest => ("IsNestedBy", "RelatedObjects"),
        NestDirection::NestedBy => ("Nests", "RelatingObject"),
    };
    model
        .related(id, inverse)
        .into_iter()
        .map(|rel| (rel, model.related(rel, attribute)))
        .collect()
}

/// Members of every nesting relationship of `id`, flattened in order.
pub(crate) fn nested_members<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    direction: NestDirection,
) -> Vec<EntityId> {
    nesting(model, id, direction)
        .into_iter()
        .flat_map(|(_, members)| members)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemoryModel, RelationSide};

    fn tables() -> TableCache {
        TableCache::new(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
    }

    fn fills(m: &mut MemoryModel, opening: EntityId, door: EntityId) {
        m.relate(
            "IfcRelFillsElement",
            RelationSide {
                attribute: "RelatingOpeningElement",
                inverse: "HasFillings",
                aggregate: false,
            },
            opening,
            RelationSide {
                attribute: "RelatedBuildingElement",
                inverse: "FillsVoids",
                aggregate: false,
            },
            &[door],
        );
    }

    #[test]
    fn resolve_both_directions() {
        let mut m = MemoryModel::new("IFC4");
        let opening = m.add("IfcOpeningElement");
        let door = m.add("IfcDoor");
        let lone = m.add("IfcDoor");
        fills(&mut m, opening, door);

        let mut t = tables();
        let to_from = resolve(
            &m,
            &mut t,
            "IfcRelFillsElement",
            Direction::ToFrom,
            "IfcDoor",
            "IfcOpeningElement",
            &[door, lone],
        )
        .unwrap();
        assert_eq!(to_from, HashSet::from([door]));

        let from_to = resolve(
            &m,
            &mut t,
            "IfcRelFillsElement",
            Direction::FromTo,
            "IfcOpeningElement",
            "IfcDoor",
            &[opening],
        )
        .unwrap();
        assert_eq!(from_to, HashSet::from([opening]));
    }

    #[test]
    fn resolve_ignores_instances_outside_selection() {
        let mut m = MemoryModel::new("IFC4");
        let opening = m.add("IfcOpeningElement");
        let door = m.add("IfcDoor");
        fills(&mut m, opening, door);
        let matched = resolve(
            &m,
            &mut tables(),
            "IfcRelFillsElement",
            Direction::ToFrom,
            "IfcDoor",
            "IfcOpeningElement",
            &[],
        )
        .unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn unknown_relationship_type_fails() {
        let m = MemoryModel::new("IFC4");
        let err = resolve(
            &m,
            &mut tables(),
            "IfcRelMadeUp",
            Direction::FromTo,
            "IfcWall",
            "IfcSlab",
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::UnknownRelationshipType { .. }));
    }

    #[test]
    fn nesting_sides() {
        let mut m = MemoryModel::new("IFC4X3");
        let alignment = m.add("IfcAlignment");
        let h = m.add("IfcAlignmentHorizontal");
        let v = m.add("IfcAlignmentVertical");
        m.nest(alignment, &[h]);
        m.nest(alignment, &[v]);
        assert_eq!(nested_members(&m, alignment, NestDirection::Nest), vec![h, v]);
        assert_eq!(nesting(&m, alignment, NestDirection::Nest).len(), 2);
        assert_eq!(nested_members(&m, h, NestDirection::NestedBy), vec![alignment]);
        assert!(nested_members(&m, alignment, NestDirection::NestedBy).is_empty());
    }

    #[test]
    fn containment_and_decomposition_lookups() {
        let mut m = MemoryModel::new("IFC4");
        let building = m.add("IfcBuilding");
        let storey = m.add("IfcBuildingStorey");
        let wall = m.add("IfcWall");
        m.aggregate(building, &[storey]);
        m.contain(storey, &[wall]);
        assert_eq!(containing_structure(&m, wall), Some(storey));
        assert_eq!(decomposing_parent(&m, storey), Some(building));
        assert_eq!(decomposing_parent(&m, building), None);
    }
}
