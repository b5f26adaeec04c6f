#![allow(dead_code)]

use ifcheck::{EntityId, MemoryModel, Value};
use proptest::prelude::*;

// --- Geometry ---
// A ring is a closed polygon of distinct 3D points. Repeating the same face
// `copies` times references every edge exactly `copies` times.

/// A closed ring of 3..8 points, distinct by construction (x = index).
pub fn arb_ring() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec((-50_i32..50, -50_i32..50), 3..8).prop_map(|yz| {
        yz.into_iter()
            .enumerate()
            .map(|(i, (y, z))| [i as f64, f64::from(y), f64::from(z)])
            .collect()
    })
}

/// A ring together with how many faces reference it.
pub fn arb_ring_with_copies() -> impl Strategy<Value = (Vec<[f64; 3]>, usize)> {
    (arb_ring(), 1_usize..5)
}

/// 1-based face indices walking the whole ring.
pub fn ring_face(len: usize) -> Vec<i64> {
    (1..=len as i64).collect()
}

/// Build an `IfcPolygonalFaceSet` over `coords` with one face per entry of `faces`.
pub fn polygon_mesh(m: &mut MemoryModel, coords: &[[f64; 3]], faces: &[Vec<i64>]) -> EntityId {
    let list = m.add_with(
        "IfcCartesianPointList3D",
        [(
            "CoordList",
            Value::List(coords.iter().map(|c| Value::from(c.to_vec())).collect()),
        )],
    );
    let faces: Vec<EntityId> = faces
        .iter()
        .map(|f| m.add_with("IfcIndexedPolygonalFace", [("CoordIndex", Value::from(f.clone()))]))
        .collect();
    m.add_with(
        "IfcPolygonalFaceSet",
        [("Coordinates", Value::Entity(list)), ("Faces", Value::from(faces))],
    )
}

// --- Type hierarchy ---
// (subtype, supertype) pairs present in the built-in schema.

pub const DERIVED_PAIRS: &[(&str, &str)] = &[
    ("IfcBuilding", "IfcFacility"),
    ("IfcRailway", "IfcFacility"),
    ("IfcWall", "IfcElement"),
    ("IfcWallStandardCase", "IfcWall"),
    ("IfcSite", "IfcSpatialStructureElement"),
    ("IfcAlignmentHorizontal", "IfcLinearElement"),
    ("IfcTriangulatedFaceSet", "IfcTessellatedFaceSet"),
];

pub fn arb_derived_pair() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop::sample::select(DERIVED_PAIRS)
}

// --- Selections ---

/// Attribute values for a selection of 1..12 instances.
pub fn arb_projection() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1_i64..1000, 1..12)
}

// --- Nesting ---

pub const NESTED_KINDS: &[&str] = &[
    "IfcAlignmentHorizontal",
    "IfcAlignmentVertical",
    "IfcAlignmentCant",
    "IfcAlignmentSegment",
];

/// Alignments, each nesting a random list of child kinds.
pub fn arb_alignments() -> impl Strategy<Value = Vec<Vec<&'static str>>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(NESTED_KINDS), 0..4),
        0..6,
    )
}

pub fn alignment_model(alignments: &[Vec<&str>]) -> MemoryModel {
    let mut m = MemoryModel::new("IFC4X3");
    for children in alignments {
        let parent = m.add("IfcAlignment");
        if children.is_empty() {
            continue;
        }
        let ids: Vec<EntityId> = children.iter().map(|kind| m.add(kind)).collect();
        m.nest(parent, &ids);
    }
    m
}
