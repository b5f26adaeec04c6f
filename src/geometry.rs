//! Edge extraction for boundary representations and tessellated meshes.
//!
//! A closed manifold shell references every edge exactly twice (once per
//! adjacent face). Edges compare by coordinate value, never by instance
//! identity, so two faces that reference equal points share an edge.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::types::{EntityId, EvalError, Value};

/// A coordinate tuple compared and hashed by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point(pub Vec<f64>);

impl Point {
    /// Read a point from a numeric aggregate. Non-numeric members yield `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .map(Point),
            _ => None,
        }
    }

    fn bits(&self) -> impl Iterator<Item = u64> + '_ {
        // fold -0.0 into 0.0 so both spellings of the origin coincide
        self.0
            .iter()
            .map(|c| if *c == 0.0 { 0.0_f64.to_bits() } else { c.to_bits() })
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.bits().eq(other.bits())
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for b in self.bits() {
            b.hash(state);
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(&other.0) {
            let a = if *a == 0.0 { 0.0 } else { *a };
            let b = if *b == 0.0 { 0.0 } else { *b };
            match a.total_cmp(&b) {
                Ordering::Equal => {}
                non_eq => return non_eq,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coords = Value::List(self.0.iter().copied().map(Value::Float).collect());
        write!(f, "{coords}")
    }
}

/// A pair of points; unordered edges are stored with their endpoints sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Unordered(Point, Point),
    Oriented(Point, Point),
}

impl Edge {
    #[must_use]
    pub fn new(start: Point, end: Point, oriented: bool) -> Self {
        if oriented {
            Edge::Oriented(start, end)
        } else if start <= end {
            Edge::Unordered(start, end)
        } else {
            Edge::Unordered(end, start)
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Unordered(a, b) => write!(f, "{a} -- {b}"),
            Edge::Oriented(a, b) => write!(f, "{a} -> {b}"),
        }
    }
}

/// Every edge referenced by a face set, one entry per reference.
///
/// # Errors
///
/// Returns [`EvalError::UnsupportedGeometry`] for entity kinds other than
/// connected, triangulated and polygonal face sets.
pub fn extract_edges<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    oriented: bool,
) -> Result<Vec<Edge>, EvalError> {
    let mut edges = Vec::new();
    if model.is_a(id, "IfcConnectedFaceSet") {
        connected_face_set_edges(model, id, oriented, &mut edges);
    } else if model.is_a(id, "IfcTriangulatedFaceSet") {
        let coords = coord_list(model, id);
        let pn_index = pn_index(model, id);
        for face in model.attribute_or(id, "CoordIndex", Value::Null).items() {
            emit_indexed_loop(&coords, &pn_index, face, oriented, &mut edges);
        }
    } else if model.is_a(id, "IfcPolygonalFaceSet") {
        let coords = coord_list(model, id);
        let pn_index = pn_index(model, id);
        for face in model.related(id, "Faces") {
            let outer = model.attribute_or(face, "CoordIndex", Value::Null);
            emit_indexed_loop(&coords, &pn_index, &outer, oriented, &mut edges);
            if model.is_a(face, "IfcIndexedPolygonalFaceWithVoids") {
                let inner = model.attribute_or(face, "InnerCoordIndices", Value::Null);
                for void in inner.items() {
                    emit_indexed_loop(&coords, &pn_index, void, oriented, &mut edges);
                }
            }
        }
    } else {
        return Err(EvalError::UnsupportedGeometry {
            type_name: model.type_name(id).unwrap_or("unknown").to_owned(),
        });
    }
    Ok(edges)
}

/// Reference count per distinct edge, in order of first appearance.
///
/// # Errors
///
/// See [`extract_edges`].
pub fn edge_usage<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    oriented: bool,
) -> Result<Vec<(Edge, usize)>, EvalError> {
    let mut slots: HashMap<Edge, usize> = HashMap::new();
    let mut counts: Vec<(Edge, usize)> = Vec::new();
    for edge in extract_edges(model, id, oriented)? {
        match slots.get(&edge) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(edge.clone(), counts.len());
                counts.push((edge, 1));
            }
        }
    }
    Ok(counts)
}

fn connected_face_set_edges<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    oriented: bool,
    edges: &mut Vec<Edge>,
) {
    let deps = model.traverse(id);

    for &lp in deps.iter().filter(|&&d| model.is_a(d, "IfcPolyLoop")) {
        let coords: Vec<Point> = model
            .related(lp, "Polygon")
            .into_iter()
            .filter_map(|p| Point::from_value(&model.attribute_or(p, "Coordinates", Value::Null)))
            .collect();
        emit_loop(&coords, oriented, edges);
    }

    for &ed in deps.iter().filter(|&&d| model.is_a(d, "IfcOrientedEdge")) {
        let Some(element) = model.related(ed, "EdgeElement").first().copied() else {
            continue;
        };
        let (Some(start), Some(end)) = (
            vertex_point(model, element, "EdgeStart"),
            vertex_point(model, element, "EdgeEnd"),
        ) else {
            continue;
        };
        let sense = model
            .attribute_or(ed, "Orientation", Value::Bool(true))
            .as_bool()
            .unwrap_or(true);
        let edge = if sense {
            Edge::new(start, end, oriented)
        } else {
            Edge::new(end, start, oriented)
        };
        edges.push(edge);
    }
}

fn vertex_point<M: Model + ?Sized>(model: &M, edge: EntityId, attribute: &str) -> Option<Point> {
    let vertex = *model.related(edge, attribute).first()?;
    let point = *model.related(vertex, "VertexGeometry").first()?;
    Point::from_value(&model.attribute_or(point, "Coordinates", Value::Null))
}

/// Points by position; a malformed entry stays as `None` so later indices
/// keep pointing at the right coordinate.
fn coord_list<M: Model + ?Sized>(model: &M, id: EntityId) -> Vec<Option<Point>> {
    let Some(list) = model.related(id, "Coordinates").first().copied() else {
        return Vec::new();
    };
    model
        .attribute_or(list, "CoordList", Value::Null)
        .items()
        .iter()
        .map(Point::from_value)
        .collect()
}

fn pn_index<M: Model + ?Sized>(model: &M, id: EntityId) -> Vec<i64> {
    model
        .attribute_or(id, "PnIndex", Value::Null)
        .items()
        .iter()
        .filter_map(Value::as_i64)
        .collect()
}

/// Resolve a 1-based face index, going through `PnIndex` when present.
fn resolve<'a>(coords: &'a [Option<Point>], pn_index: &[i64], index: i64) -> Option<&'a Point> {
    let index = if pn_index.is_empty() {
        index
    } else {
        *pn_index.get(position(index)?)?
    };
    coords.get(position(index)?)?.as_ref()
}

fn position(index: i64) -> Option<usize> {
    usize::try_from(index.checked_sub(1)?).ok()
}

fn emit_indexed_loop(
    coords: &[Option<Point>],
    pn_index: &[i64],
    face: &Value,
    oriented: bool,
    edges: &mut Vec<Edge>,
) {
    let points: Vec<Point> = face
        .items()
        .iter()
        .filter_map(Value::as_i64)
        .filter_map(|i| resolve(coords, pn_index, i).cloned())
        .collect();
    emit_loop(&points, oriented, edges);
}

/// Consecutive pairs of a closed loop, including the wrap-around pair.
fn emit_loop(points: &[Point], oriented: bool, edges: &mut Vec<Edge>) {
    if points.len() < 2 {
        return;
    }
    for (i, start) in points.iter().enumerate() {
        let end = &points[(i + 1) % points.len()];
        edges.push(Edge::new(start.clone(), end.clone(), oriented));
    }
}
