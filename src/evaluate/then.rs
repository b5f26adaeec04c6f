use std::collections::HashSet;

use tracing::debug;

use super::relations::{self, containing_structure, decomposing_parent, nested_members, nesting};
use crate::geometry::edge_usage;
use crate::hierarchy::most_specific;
use crate::model::Model;
use crate::tables::TableCache;
use crate::types::{
    AttributeTypeError, AttributeValueCountError, AttributeValueError, CompareOp, Condition,
    Directness, EdgeUseError, EntityId, EvalError, InstanceCountError, InstanceStructureError,
    MissingRelationshipError, NestCardinality, NestDirection, NestingFragment, Outcome,
    RepresentationShapeError, RepresentationTypeError, RuleEvaluationContext, RuleSuccess, Target,
    Then, Value, ValueConstraint, ValueScope,
};

/// Relationship keyword of table-driven checks; read through `Decomposes`.
pub const AGGREGATED: &str = "aggregated";

/// Collects the records of one Then step.
struct Records<'m, M: ?Sized> {
    model: &'m M,
    report_passed: bool,
    outcomes: Vec<Outcome>,
}

impl<'m, M: Model + ?Sized> Records<'m, M> {
    fn new(model: &'m M, ctx: &RuleEvaluationContext) -> Self {
        Self {
            model,
            report_passed: ctx.error_on_passed_rule(),
            outcomes: Vec::new(),
        }
    }

    fn fail(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    fn pass(&mut self, id: EntityId) {
        if self.report_passed {
            self.outcomes.push(Outcome::RuleSuccess(RuleSuccess {
                inst: self.model.instance(id),
            }));
        }
    }

    fn structure(
        &mut self,
        related: EntityId,
        relating: Vec<Target>,
        relationship: &str,
        condition: Option<Condition>,
        directness: Option<Directness>,
    ) {
        let related = self.model.instance(related);
        self.fail(Outcome::InstanceStructure(InstanceStructureError {
            related,
            relating,
            relationship: relationship.to_owned(),
            condition,
            directness,
        }));
    }

    fn targets(&self, ids: &[EntityId]) -> Vec<Target> {
        ids.iter()
            .map(|&id| Target::Instance(self.model.instance(id)))
            .collect()
    }
}

pub(crate) fn check<M: Model + ?Sized>(
    then: &Then,
    ctx: &RuleEvaluationContext,
    model: &M,
    tables: &mut TableCache,
) -> Result<Vec<Outcome>, EvalError> {
    if !ctx.is_applicable() {
        debug!("context inapplicable; check skipped");
        return Ok(Vec::new());
    }
    let mut records = Records::new(model, ctx);
    match then {
        Then::EdgeUse { oriented, count } => edge_use(&mut records, ctx, *oriented, *count)?,
        Then::InstanceCount { op, count, entity } => {
            instance_count(&mut records, *op, *count, entity);
        }
        Then::AssignedTo {
            related,
            relating,
            other_entity,
            present,
        } => assigned_to(&mut records, related, relating, other_entity, *present),
        Then::Contained {
            entity,
            condition,
            directness,
            structure,
        } => {
            if !ctx.instances().is_empty() {
                contained(&mut records, entity, *condition, *directness, structure);
            }
        }
        Then::AsPerTable {
            relationship,
            table,
        } => as_per_table(&mut records, ctx, tables, relationship, table)?,
        Then::NestCount {
            entity,
            condition,
            op,
            count,
            target,
        } => nest_count(&mut records, entity, *condition, *op, *count, target),
        Then::NestFragment {
            entity,
            fragment,
            target,
        } => nest_fragment(&mut records, entity, *fragment, target),
        Then::NestAllowList { entity, allowed } => nest_allow_list(&mut records, entity, allowed),
        Then::Relationship {
            relationship,
            direction,
            entity,
            other_entity,
        } => {
            let current = ctx.entities();
            let matched = relations::resolve(
                model,
                tables,
                relationship,
                *direction,
                entity,
                other_entity,
                &current,
            )?;
            for id in current {
                if matched.contains(&id) {
                    records.pass(id);
                } else {
                    records.fail(Outcome::MissingRelationship(MissingRelationshipError {
                        inst: model.instance(id),
                        relationship: relationship.clone(),
                        other_entity: other_entity.clone(),
                    }));
                }
            }
        }
        Then::Value {
            scope,
            branch,
            constraint,
        } => {
            let table = table_values(tables, constraint)?;
            value_check(&mut records, ctx, *scope, branch.as_deref(), constraint, &table);
        }
        Then::ValueCount {
            count,
            branch,
            constraint,
        } => {
            let table = table_values(tables, constraint)?;
            value_count(&mut records, ctx, *count, branch.as_deref(), constraint, &table);
        }
        Then::AttributeType {
            attribute,
            expected,
        } => attribute_type(&mut records, ctx, attribute, expected),
        Then::RepresentationShape { identifier } => {
            representation_shape(&mut records, ctx, identifier);
        }
        Then::RepresentationType {
            identifier,
            expected,
        } => representation_type(&mut records, ctx, identifier, expected),
    }
    Ok(records.outcomes)
}

// -- Geometry ---------------------------------------------------------------

fn edge_use<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    ctx: &RuleEvaluationContext,
    oriented: bool,
    required: usize,
) -> Result<(), EvalError> {
    for id in ctx.entities() {
        let mut ok = true;
        for (edge, count) in edge_usage(records.model, id, oriented)? {
            if count != required {
                ok = false;
                let inst = records.model.instance(id);
                records.fail(Outcome::EdgeUse(EdgeUseError { inst, edge, count }));
            }
        }
        if ok {
            records.pass(id);
        }
    }
    Ok(())
}

// -- Counts and structure ---------------------------------------------------

fn instance_count<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    op: CompareOp,
    required: usize,
    entity: &str,
) {
    let ids = records.model.by_type(entity);
    if op.holds(ids.len(), required) {
        ids.into_iter().for_each(|id| records.pass(id));
    } else {
        let insts = ids.iter().map(|&id| records.model.instance(id)).collect();
        records.fail(Outcome::InstanceCount(InstanceCountError {
            insts,
            type_name: entity.to_owned(),
        }));
    }
}

fn assigned_to<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    related: &str,
    relating: &str,
    other_entity: &str,
    present: bool,
) {
    let model = records.model;
    if model.by_type(other_entity).is_empty() == present {
        return;
    }
    for id in model.by_type(related) {
        let mut violated = false;
        for rel in model.related(id, "Decomposes") {
            for parent in model.related(rel, "RelatingObject") {
                if !model.is_a(parent, relating) {
                    violated = true;
                    let target = records.targets(&[parent]);
                    records.structure(
                        id,
                        target,
                        "assigned to",
                        Some(Condition::Must),
                        None,
                    );
                }
            }
        }
        if !violated {
            records.pass(id);
        }
    }
}

/// Directness values under which `id` is contained in a `structure`.
fn observed_containment<M: Model + ?Sized>(
    model: &M,
    id: EntityId,
    structure: &str,
) -> HashSet<Directness> {
    let mut observed = HashSet::new();
    let Some(direct) = containing_structure(model, id) else {
        return observed;
    };
    if model.is_a(direct, structure) {
        observed.insert(Directness::Directly);
    }
    let mut visited = HashSet::from([direct]);
    let mut current = direct;
    while let Some(parent) = decomposing_parent(model, current) {
        if !visited.insert(parent) {
            break;
        }
        if model.is_a(parent, structure) {
            observed.insert(Directness::Indirectly);
            break;
        }
        current = parent;
    }
    observed
}

fn contained<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    entity: &str,
    condition: Condition,
    directness: Directness,
    structure: &str,
) {
    for id in records.model.by_type(entity) {
        let observed = observed_containment(records.model, id, structure);
        let achieved = directness.accepted().iter().any(|d| observed.contains(d));
        if achieved == condition.expects() {
            records.pass(id);
        } else {
            records.structure(
                id,
                vec![Target::Type(structure.to_owned())],
                "contained",
                Some(condition),
                Some(directness),
            );
        }
    }
}

fn as_per_table<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    ctx: &RuleEvaluationContext,
    tables: &mut TableCache,
    relationship: &str,
    table: &str,
) -> Result<(), EvalError> {
    if !relationship.eq_ignore_ascii_case(AGGREGATED) {
        return Err(EvalError::UnknownKeyword {
            keyword: relationship.to_owned(),
        });
    }
    let model = records.model;
    let table = tables.aggregation(table)?;
    let entity_types: Vec<&str> = table.entity_types().collect();

    for id in ctx.entities() {
        let Some(applicable) = most_specific(model, id, &entity_types) else {
            continue;
        };
        let allowed = table.allowed(&applicable).unwrap_or_default();
        let expected = || vec![Target::AnyOf(allowed.to_vec())];

        let Some(rel) = model.related(id, "Decomposes").first().copied() else {
            records.structure(id, expected(), "related to", Some(Condition::Must), None);
            continue;
        };
        let targets = model.related(rel, table.attribute());
        let mut ok = !targets.is_empty();
        for target in targets {
            if !allowed.iter().any(|a| model.is_a(target, a)) {
                ok = false;
                records.structure(id, expected(), "related to", Some(Condition::Must), None);
            }
        }
        if ok {
            records.pass(id);
        }
    }
    Ok(())
}

// -- Nesting ----------------------------------------------------------------

fn relationship_text(direction: NestDirection) -> &'static str {
    match direction {
        NestDirection::Nest => "nesting",
        NestDirection::NestedBy => "nested by",
    }
}

fn nest_count<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    entity: &str,
    condition: Condition,
    op: CompareOp,
    required: usize,
    target: &str,
) {
    let model = records.model;
    for id in model.by_type(entity) {
        let counted: Vec<EntityId> = nested_members(model, id, NestDirection::Nest)
            .into_iter()
            .filter(|&m| model.is_a(m, target))
            .collect();
        if op.holds(counted.len(), required) == condition.expects() {
            records.pass(id);
        } else {
            let relating = records.targets(&counted);
            records.structure(id, relating, "nesting", Some(condition), None);
        }
    }
}

fn nest_fragment<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    entity: &str,
    fragment: NestingFragment,
    target: &str,
) {
    let model = records.model;
    let text = relationship_text(fragment.direction);
    for id in model.by_type(entity) {
        match fragment.cardinality {
            NestCardinality::OnlyOne => {
                let matching: Vec<EntityId> = nested_members(model, id, fragment.direction)
                    .into_iter()
                    .filter(|&m| model.is_a(m, target))
                    .collect();
                match matching.len() {
                    1 => records.pass(id),
                    0 => records.structure(
                        id,
                        vec![Target::Type(target.to_owned())],
                        text,
                        Some(Condition::Must),
                        None,
                    ),
                    _ => {
                        let relating = records.targets(&matching);
                        records.structure(id, relating, text, Some(Condition::Must), None);
                    }
                }
            }
            NestCardinality::ListOfOnly => {
                let lists = nesting(model, id, fragment.direction);
                if lists.len() > 1 {
                    let rels: Vec<EntityId> = lists.iter().map(|(rel, _)| *rel).collect();
                    let relating = records.targets(&rels);
                    records.structure(id, relating, text, None, None);
                    continue;
                }
                let offending: Vec<EntityId> = lists
                    .into_iter()
                    .flat_map(|(_, members)| members)
                    .filter(|&m| !model.is_a(m, target))
                    .collect();
                if offending.is_empty() {
                    records.pass(id);
                } else {
                    let relating = records.targets(&offending);
                    records.structure(id, relating, text, None, None);
                }
            }
        }
    }
}

fn nest_allow_list<M: Model + ?Sized>(records: &mut Records<'_, M>, entity: &str, allowed: &[String]) {
    let model = records.model;
    for id in model.by_type(entity) {
        let unexpected: Vec<EntityId> = nested_members(model, id, NestDirection::Nest)
            .into_iter()
            .filter(|&m| {
                model
                    .type_name(m)
                    .map_or(true, |t| !allowed.iter().any(|a| a.eq_ignore_ascii_case(t)))
            })
            .collect();
        if unexpected.is_empty() {
            records.pass(id);
        } else {
            let relating = records.targets(&unexpected);
            records.structure(id, relating, "nested by", None, None);
        }
    }
}

// -- Values -----------------------------------------------------------------

fn table_values(tables: &mut TableCache, constraint: &ValueConstraint) -> Result<Vec<Value>, EvalError> {
    match constraint {
        ValueConstraint::InTable { table, .. } => Ok(tables.value_list(table)?.values().to_vec()),
        _ => Ok(Vec::new()),
    }
}

/// Distinct originating instances of the current selection, in order.
fn origins(ctx: &RuleEvaluationContext) -> Vec<EntityId> {
    let mut seen = HashSet::new();
    ctx.top_level(None)
        .into_iter()
        .filter_map(|(origin, _)| origin)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn value_check<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    ctx: &RuleEvaluationContext,
    scope: ValueScope,
    branch: Option<&str>,
    constraint: &ValueConstraint,
    table: &[Value],
) {
    let model = records.model;
    let before = records.outcomes.len();
    match scope {
        ValueScope::Value => {
            for (origin, value) in ctx.top_level(branch) {
                if value == Value::Null || constraint.accepts(&value, table) {
                    continue;
                }
                records.fail(Outcome::AttributeValue(AttributeValueError {
                    inst: origin.map(|id| model.instance(id)),
                    path: String::new(),
                    value: value.to_string(),
                    constraint: constraint.to_string(),
                }));
            }
        }
        ValueScope::Values => {
            for path in ctx.paths(branch) {
                let leaf = path.leaf();
                if *leaf == Value::Null || constraint.accepts(leaf, table) {
                    continue;
                }
                records.fail(Outcome::AttributeValue(AttributeValueError {
                    inst: path.instance().map(|id| model.instance(id)),
                    path: path.to_string(),
                    value: leaf.to_string(),
                    constraint: constraint.to_string(),
                }));
            }
        }
    }
    if records.outcomes.len() == before {
        origins(ctx).into_iter().for_each(|id| records.pass(id));
    }
}

fn value_count<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    ctx: &RuleEvaluationContext,
    required: usize,
    branch: Option<&str>,
    constraint: &ValueConstraint,
    table: &[Value],
) {
    let paths: Vec<_> = ctx
        .paths(branch)
        .into_iter()
        .filter(|p| *p.leaf() != Value::Null)
        .collect();
    let observed = paths
        .iter()
        .filter(|p| constraint.accepts(p.leaf(), table))
        .count();
    if observed >= required {
        origins(ctx).into_iter().for_each(|id| records.pass(id));
    } else {
        records.fail(Outcome::AttributeValueCount(AttributeValueCountError {
            paths: paths.iter().map(ToString::to_string).collect(),
            constraint: constraint.to_string(),
            required,
            observed,
        }));
    }
}

fn attribute_type<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    ctx: &RuleEvaluationContext,
    attribute: &str,
    expected: &str,
) {
    let model = records.model;
    for id in ctx.entities() {
        let value = model.attribute_or(id, attribute, Value::Null);
        let (ok, observed) = match &value {
            Value::Null => continue,
            Value::Entity(target) => (
                model.is_a(*target, expected),
                model.type_name(*target).unwrap_or("IfcUnknown").to_owned(),
            ),
            other => (
                other.kind().eq_ignore_ascii_case(expected),
                other.kind().to_owned(),
            ),
        };
        if ok {
            records.pass(id);
        } else {
            records.fail(Outcome::AttributeType(AttributeTypeError {
                inst: model.instance(id),
                attribute: attribute.to_owned(),
                expected: expected.to_owned(),
                observed,
            }));
        }
    }
}

// -- Representations --------------------------------------------------------

/// Shape representations of a product, or `None` when it has no product
/// definition shape.
fn representations<M: Model + ?Sized>(model: &M, id: EntityId) -> Option<Vec<EntityId>> {
    let shape = model.related(id, "Representation").first().copied()?;
    Some(model.related(shape, "Representations"))
}

fn has_identifier<M: Model + ?Sized>(model: &M, rep: EntityId, identifier: &str) -> bool {
    model
        .attribute_or(rep, "RepresentationIdentifier", Value::Null)
        .as_str()
        .is_some_and(|i| i.eq_ignore_ascii_case(identifier))
}

fn representation_shape<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    ctx: &RuleEvaluationContext,
    identifier: &str,
) {
    let model = records.model;
    for id in ctx.entities() {
        let Some(reps) = representations(model, id) else {
            continue;
        };
        if reps.iter().any(|&r| has_identifier(model, r, identifier)) {
            records.pass(id);
        } else {
            records.fail(Outcome::RepresentationShape(RepresentationShapeError {
                inst: model.instance(id),
                identifier: identifier.to_owned(),
            }));
        }
    }
}

fn representation_type<M: Model + ?Sized>(
    records: &mut Records<'_, M>,
    ctx: &RuleEvaluationContext,
    identifier: &str,
    expected: &str,
) {
    let model = records.model;
    for id in ctx.entities() {
        let matching: Vec<EntityId> = representations(model, id)
            .unwrap_or_default()
            .into_iter()
            .filter(|&r| has_identifier(model, r, identifier))
            .collect();
        let mut ok = true;
        for rep in matching {
            let observed = model.attribute_or(rep, "RepresentationType", Value::Null);
            if observed.as_str() != Some(expected) {
                ok = false;
                records.fail(Outcome::RepresentationType(RepresentationTypeError {
                    inst: model.instance(id),
                    identifier: identifier.to_owned(),
                    expected: expected.to_owned(),
                    observed: observed.as_str().map_or_else(|| observed.to_string(), str::to_owned),
                }));
            }
        }
        if ok {
            records.pass(id);
        }
    }
}
