use std::collections::{BTreeSet, HashMap};

use crate::model::Model;
use crate::types::EntityId;

/// Direction in which [`order_by_inheritance`] sorts candidate types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritanceOrder {
    /// Subtypes before their supertypes.
    MostDerivedFirst,
    /// Supertypes before their subtypes.
    BaseFirst,
}

/// Order candidate type names by the model's inheritance relation.
///
/// Kahn's algorithm over the "derives from" edges between candidates. Ties
/// (unrelated types) are broken by name so the result is deterministic.
/// Duplicates (case-insensitive) are collapsed to their first spelling.
#[must_use]
pub fn order_by_inheritance<M: Model + ?Sized>(
    model: &M,
    candidates: &[&str],
    order: InheritanceOrder,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for c in candidates {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(c)) {
            names.push((*c).to_owned());
        }
    }

    // successors[X] = types that must come after X
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = names.iter().map(|n| (n.as_str(), 0)).collect();

    for a in &names {
        for b in &names {
            if a == b || !model.is_subtype_of(b, a) {
                continue;
            }
            // b derives from a
            let (first, then) = match order {
                InheritanceOrder::BaseFirst => (a.as_str(), b.as_str()),
                InheritanceOrder::MostDerivedFirst => (b.as_str(), a.as_str()),
            };
            successors.entry(first).or_default().push(then);
            *in_degree.entry(then).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut sorted: Vec<String> = Vec::with_capacity(names.len());
    while let Some(name) = ready.pop_first() {
        sorted.push(name.to_owned());
        if let Some(next) = successors.get(name) {
            for &n in next {
                if let Some(deg) = in_degree.get_mut(n) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(n);
                    }
                }
            }
        }
    }

    // mutually-derived declarations never reach zero in-degree
    if sorted.len() < names.len() {
        let mut rest: Vec<String> = names
            .iter()
            .filter(|n| !sorted.contains(n))
            .cloned()
            .collect();
        rest.sort();
        sorted.extend(rest);
    }
    sorted
}

/// The most specific of `candidates` that `id` is an instance of, or `None`
/// when the instance matches none of them.
#[must_use]
pub fn most_specific<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    candidates: &[&str],
) -> Option<String> {
    let matching: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|c| model.is_a(id, c))
        .collect();
    order_by_inheritance(model, &matching, InheritanceOrder::MostDerivedFirst)
        .into_iter()
        .next()
}
