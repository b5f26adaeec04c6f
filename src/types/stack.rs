use std::fmt;

use super::{EntityId, Value};

/// How a layer participates in path reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    /// A selection the current one was projected from.
    Scope,
    /// A side projection of the current selection, kept for later inspection.
    Branch,
}

/// A labelled snapshot of a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub label: String,
    pub selection: Vec<Value>,
    pub role: LayerRole,
}

/// Append-only list of selection layers.
///
/// Layers are never popped. Scope layers form the ancestor chain of the
/// current selection; all of them stay index-aligned with it, so position `i`
/// in any layer traces back to position `i` in the layer below.
#[derive(Debug, Clone, Default)]
pub struct SelectionStack {
    layers: Vec<Layer>,
}

/// One leaf of the current selection together with every value it was derived
/// from, most recent first and the originating instance last.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPath {
    /// Top-level index in the selection.
    pub index: usize,
    pub values: Vec<Value>,
}

impl StackedPath {
    /// The projected value at the end of the path.
    #[must_use]
    pub fn leaf(&self) -> &Value {
        self.values.first().unwrap_or(&Value::Null)
    }

    /// The top-level instance the path started from.
    #[must_use]
    pub fn instance(&self) -> Option<EntityId> {
        self.values.iter().rev().find_map(Value::as_entity)
    }
}

impl fmt::Display for StackedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().rev().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl SelectionStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, selection: Vec<Value>, role: LayerRole) {
        self.layers.push(Layer {
            label: label.into(),
            selection,
            role,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Ancestor layers in push order.
    pub fn scopes(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.role == LayerRole::Scope)
    }

    /// The outermost scope, i.e. the original top-level instances.
    #[must_use]
    pub fn base(&self) -> Option<&Layer> {
        self.scopes().next()
    }

    /// The most recent branch layer with the given label.
    #[must_use]
    pub fn branch(&self, label: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .rev()
            .find(|l| l.role == LayerRole::Branch && l.label.eq_ignore_ascii_case(label))
    }

    /// Drop the positions where `keep` is false from every layer aligned with
    /// a selection of `keep.len()` elements.
    pub fn retain_indices(&mut self, keep: &[bool]) {
        for layer in &mut self.layers {
            if layer.selection.len() == keep.len() {
                let mut flags = keep.iter();
                layer.selection.retain(|_| flags.next().copied().unwrap_or(false));
            }
        }
    }

    /// Zip the scope layers, `current` and optionally a branch layer by index
    /// (recursing into sequences) into one path per leaf.
    #[must_use]
    pub fn paths(&self, current: &[Value], branch: Option<&Layer>) -> Vec<StackedPath> {
        let n = current.len();
        let mut chain: Vec<&[Value]> = self
            .scopes()
            .map(|l| l.selection.as_slice())
            .filter(|s| s.len() == n)
            .collect();
        chain.push(current);
        if let Some(layer) = branch.filter(|l| l.selection.len() == n) {
            chain.push(&layer.selection);
        }

        let mut out = Vec::new();
        for index in 0..n {
            let column: Vec<&Value> = chain.iter().map(|layer| &layer[index]).collect();
            zip_column(&column, index, &mut out);
        }
        out
    }
}

fn zip_column(column: &[&Value], index: usize, out: &mut Vec<StackedPath>) {
    match column.last() {
        Some(Value::List(top)) => {
            for j in 0..top.len() {
                let next: Vec<&Value> = column
                    .iter()
                    .map(|&v| match v {
                        Value::List(items) => items.get(j).unwrap_or(v),
                        other => other,
                    })
                    .collect();
                zip_column(&next, index, out);
            }
        }
        _ => out.push(StackedPath {
            index,
            values: column.iter().rev().map(|v| (*v).clone()).collect(),
        }),
    }
}

/// Apply `f` to every entity leaf of `selection`, keeping sequence structure.
/// Non-entity leaves project to [`Value::Null`].
pub fn project(selection: &[Value], mut f: impl FnMut(EntityId) -> Value) -> Vec<Value> {
    selection
        .iter()
        .map(|v| {
            v.map_leaves(&mut |leaf| match leaf {
                Value::Entity(id) => f(*id),
                _ => Value::Null,
            })
        })
        .collect()
}
