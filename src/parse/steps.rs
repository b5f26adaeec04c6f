use winnow::ascii::space0;
use winnow::combinator::{alt, cut_err, eof, fail, opt, preceded, repeat, separated, terminated};
use winnow::error::{ModalResult, StrContext};
use winnow::prelude::*;
use winnow::token::take_until;

use super::grammar::{
    count, literal, name, nesting_fragment, phrase, sp, string_literal, table_ref,
    value_constraint,
};
use crate::types::{CompareOp, Condition, Direction, Directness, Given, Then, ValueScope};

// -- Shared slots -----------------------------------------------------------

fn condition(input: &mut &str) -> ModalResult<Condition> {
    alt((
        phrase("must not").value(Condition::MustNot),
        phrase("shall not").value(Condition::MustNot),
        "must".value(Condition::Must),
        "shall".value(Condition::Must),
    ))
    .parse_next(input)
}

fn directness(input: &mut &str) -> ModalResult<Directness> {
    alt((
        phrase("directly or indirectly").value(Directness::DirectlyOrIndirectly),
        phrase("indirectly or directly").value(Directness::IndirectlyOrDirectly),
        "directly".value(Directness::Directly),
        "indirectly".value(Directness::Indirectly),
    ))
    .parse_next(input)
}

fn instances_of(input: &mut &str) -> ModalResult<()> {
    (alt(("instance(s)", "instances", "instance")), sp, "of", sp)
        .void()
        .parse_next(input)
}

fn shape_identifier(input: &mut &str) -> ModalResult<String> {
    alt((string_literal, name)).parse_next(input)
}

/// `{relationship} {verb} from {A} to {B}` or `... to {A} from {B}`.
fn relationship_clause(
    input: &mut &str,
    verb: &'static str,
) -> ModalResult<(String, Direction, String, String)> {
    (phrase("A relationship"), sp).parse_next(input)?;
    let relationship = name.parse_next(input)?;
    (sp, phrase(verb), sp).parse_next(input)?;
    let direction = alt((
        "from".value(Direction::FromTo),
        "to".value(Direction::ToFrom),
    ))
    .parse_next(input)?;
    sp.parse_next(input)?;
    let entity = name.parse_next(input)?;
    sp.parse_next(input)?;
    match direction {
        Direction::FromTo => "to".parse_next(input)?,
        Direction::ToFrom => "from".parse_next(input)?,
    };
    sp.parse_next(input)?;
    let other_entity = name.parse_next(input)?;
    eof.parse_next(input)?;
    Ok((relationship, direction, entity, other_entity))
}

// -- Given ------------------------------------------------------------------

fn file_precondition(input: &mut &str) -> ModalResult<Given> {
    (phrase("A file with"), sp).parse_next(input)?;
    let field = take_until(1.., " \"").parse_next(input)?;
    sp.parse_next(input)?;
    let quoted: Vec<String> = separated(1.., string_literal, (sp, "or", sp)).parse_next(input)?;
    eof.parse_next(input)?;
    // a single quoted run may itself hold `a or b`
    let values = quoted
        .iter()
        .flat_map(|q| q.split(" or "))
        .map(|v| v.trim().trim_matches('"').to_owned())
        .collect();
    Ok(Given::File {
        field: field.trim().to_owned(),
        values,
    })
}

fn relationship_given(input: &mut &str) -> ModalResult<Given> {
    let (relationship, direction, entity, other_entity) =
        relationship_clause(input, "exists")?;
    Ok(Given::Relationship {
        relationship,
        direction,
        entity,
        other_entity,
    })
}

fn entity(input: &mut &str) -> ModalResult<Given> {
    (alt(("An", "A")), sp).parse_next(input)?;
    let entity = name.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Given::Entity { entity })
}

fn attribute_path(input: &mut &str) -> ModalResult<Given> {
    (phrase("Its attribute"), sp).parse_next(input)?;
    let first = name.parse_next(input)?;
    let more: Vec<String> = repeat(
        0..,
        preceded((sp, phrase("and following that its attribute"), sp), name),
    )
    .parse_next(input)?;
    let keep_instances = opt((space0, ',', space0, phrase("keeping the instances")))
        .parse_next(input)?
        .is_some();
    eof.parse_next(input)?;
    let mut path = vec![first];
    path.extend(more);
    Ok(Given::Attribute {
        path,
        keep_instances,
    })
}

fn attribute_equals(input: &mut &str) -> ModalResult<Given> {
    let attribute = name.parse_next(input)?;
    (space0, '=', space0).parse_next(input)?;
    let value = literal.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Given::AttributeEquals { attribute, value })
}

pub(crate) fn given(input: &mut &str) -> ModalResult<Given> {
    alt((
        file_precondition,
        relationship_given,
        entity,
        attribute_path,
        attribute_equals,
    ))
    .parse_next(input)
}

// -- Then -------------------------------------------------------------------

fn edge_use(input: &mut &str) -> ModalResult<Then> {
    (phrase("Every"), sp).parse_next(input)?;
    let oriented = alt((
        phrase("oriented edge").value(true),
        "edge".value(false),
    ))
    .parse_next(input)?;
    (sp, phrase("shall be referenced exactly"), sp).parse_next(input)?;
    let count = count.parse_next(input)?;
    (sp, phrase("times by the loops of the face"), eof).parse_next(input)?;
    Ok(Then::EdgeUse { oriented, count })
}

fn instance_count(input: &mut &str) -> ModalResult<Then> {
    ("There", sp, alt(("shall", "must")), sp, "be", sp).parse_next(input)?;
    let op = alt((
        phrase("at least").value(CompareOp::Gte),
        phrase("at most").value(CompareOp::Lte),
        "exactly".value(CompareOp::Eq),
    ))
    .parse_next(input)?;
    sp.parse_next(input)?;
    let count = count.parse_next(input)?;
    (sp, instances_of).parse_next(input)?;
    let entity = name.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::InstanceCount { op, count, entity })
}

fn assigned_to(input: &mut &str) -> ModalResult<Then> {
    ("The", sp).parse_next(input)?;
    let related = name.parse_next(input)?;
    (sp, alt(("must", "shall")), sp, phrase("be assigned to the"), sp).parse_next(input)?;
    let relating = name.parse_next(input)?;
    (sp, "if", sp).parse_next(input)?;
    let other_entity = name.parse_next(input)?;
    sp.parse_next(input)?;
    let present = alt((phrase("is not").value(false), "is".value(true))).parse_next(input)?;
    (sp, "present", eof).parse_next(input)?;
    Ok(Then::AssignedTo {
        related,
        relating,
        other_entity,
        present,
    })
}

fn contained(input: &mut &str) -> ModalResult<Then> {
    ("Each", sp).parse_next(input)?;
    let entity = name.parse_next(input)?;
    sp.parse_next(input)?;
    let condition = condition.parse_next(input)?;
    (sp, "be", sp).parse_next(input)?;
    let directness = directness.parse_next(input)?;
    (sp, phrase("contained in"), sp).parse_next(input)?;
    let structure = name.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::Contained {
        entity,
        condition,
        directness,
        structure,
    })
}

fn as_per_table(input: &mut &str) -> ModalResult<Then> {
    (phrase("It must be"), sp).parse_next(input)?;
    let relationship = name.parse_next(input)?;
    (sp, phrase("as per"), sp).parse_next(input)?;
    let table = table_ref.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::AsPerTable {
        relationship,
        table,
    })
}

fn nest_count(input: &mut &str) -> ModalResult<Then> {
    ("Each", sp).parse_next(input)?;
    let entity = name.parse_next(input)?;
    sp.parse_next(input)?;
    let condition = condition.parse_next(input)?;
    (sp, "nest", sp).parse_next(input)?;
    let op = alt((
        "exactly".value(CompareOp::Eq),
        phrase("at most").value(CompareOp::Lte),
    ))
    .parse_next(input)?;
    sp.parse_next(input)?;
    let count = count.parse_next(input)?;
    (sp, instances_of).parse_next(input)?;
    let target = name.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::NestCount {
        entity,
        condition,
        op,
        count,
        target,
    })
}

fn nest_allow_list(input: &mut &str) -> ModalResult<Then> {
    ("Each", sp).parse_next(input)?;
    let entity = name.parse_next(input)?;
    (
        sp,
        phrase("may be nested by only the following entities:"),
        space0,
    )
        .parse_next(input)?;
    let allowed: Vec<String> = separated(1.., name, (space0, ',', space0)).parse_next(input)?;
    (space0, eof).parse_next(input)?;
    Ok(Then::NestAllowList { entity, allowed })
}

fn nest_fragment(input: &mut &str) -> ModalResult<Then> {
    ("Each", sp).parse_next(input)?;
    let entity = name.parse_next(input)?;
    sp.parse_next(input)?;
    let checkpoint = input.checkpoint();
    let text = take_until(1.., " instance(s) of ").parse_next(input)?;
    " instance(s) of ".parse_next(input)?;
    let target = name.parse_next(input)?;
    eof.parse_next(input)?;

    let mut fragment_input = text;
    match terminated(nesting_fragment, eof).parse_next(&mut fragment_input) {
        Ok(fragment) => Ok(Then::NestFragment {
            entity,
            fragment,
            target,
        }),
        Err(_) => {
            // the template matched but the fragment is not part of the grammar
            input.reset(&checkpoint);
            cut_err(fail)
                .context(StrContext::Label("nesting fragment"))
                .parse_next(input)
        }
    }
}

fn relationship_then(input: &mut &str) -> ModalResult<Then> {
    let (relationship, direction, entity, other_entity) =
        relationship_clause(input, "must exist")?;
    Ok(Then::Relationship {
        relationship,
        direction,
        entity,
        other_entity,
    })
}

fn branch_label(input: &mut &str) -> ModalResult<Option<String>> {
    opt(preceded((sp, "of", sp), name)).parse_next(input)
}

fn value_check(input: &mut &str) -> ModalResult<Then> {
    ("The", sp).parse_next(input)?;
    let scope = alt((
        "values".value(ValueScope::Values),
        "value".value(ValueScope::Value),
    ))
    .parse_next(input)?;
    let branch = branch_label.parse_next(input)?;
    (sp, "must", sp).parse_next(input)?;
    let constraint = value_constraint.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::Value {
        scope,
        branch,
        constraint,
    })
}

fn value_count(input: &mut &str) -> ModalResult<Then> {
    (phrase("At least"), sp).parse_next(input)?;
    let count = count.parse_next(input)?;
    (sp, alt(("value(s)", "values", "value"))).parse_next(input)?;
    let branch = branch_label.parse_next(input)?;
    (sp, "must", sp).parse_next(input)?;
    let constraint = value_constraint.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::ValueCount {
        count,
        branch,
        constraint,
    })
}

fn attribute_type(input: &mut &str) -> ModalResult<Then> {
    (phrase("The type of attribute"), sp).parse_next(input)?;
    let attribute = name.parse_next(input)?;
    (sp, phrase("must be"), sp).parse_next(input)?;
    let expected = name.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::AttributeType {
        attribute,
        expected,
    })
}

fn representation_shape(input: &mut &str) -> ModalResult<Then> {
    (phrase("Its representation must have a"), sp).parse_next(input)?;
    let identifier = shape_identifier.parse_next(input)?;
    (sp, phrase("shape representation"), eof).parse_next(input)?;
    Ok(Then::RepresentationShape { identifier })
}

fn representation_type(input: &mut &str) -> ModalResult<Then> {
    ("Its", sp).parse_next(input)?;
    let identifier = shape_identifier.parse_next(input)?;
    (sp, phrase("shape representation must be of type"), sp).parse_next(input)?;
    let expected = shape_identifier.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(Then::RepresentationType {
        identifier,
        expected,
    })
}

pub(crate) fn then(input: &mut &str) -> ModalResult<Then> {
    alt((
        edge_use,
        instance_count,
        assigned_to,
        contained,
        as_per_table,
        nest_count,
        nest_allow_list,
        nest_fragment,
        relationship_then,
        value_count,
        value_check,
        attribute_type,
        representation_shape,
        representation_type,
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NestCardinality, NestDirection, Value, ValueConstraint};

    fn g(s: &str) -> Given {
        let mut input = s;
        given.parse_next(&mut input).unwrap()
    }

    fn t(s: &str) -> Then {
        let mut input = s;
        then.parse_next(&mut input).unwrap()
    }

    #[test]
    fn entity_given() {
        assert_eq!(g("An IfcWall"), Given::Entity { entity: "IfcWall".into() });
        assert_eq!(g("A IfcSite"), Given::Entity { entity: "IfcSite".into() });
    }

    #[test]
    fn file_given_splits_alternatives() {
        assert_eq!(
            g("A file with Schema Identifier \"IFC4X3_ADD2\" or \"IFC4X3\""),
            Given::File {
                field: "Schema Identifier".into(),
                values: vec!["IFC4X3_ADD2".into(), "IFC4X3".into()],
            }
        );
        assert_eq!(
            g("A file with Model View Definition \"CoordinationView or ReferenceView\""),
            Given::File {
                field: "Model View Definition".into(),
                values: vec!["CoordinationView".into(), "ReferenceView".into()],
            }
        );
    }

    #[test]
    fn attribute_givens() {
        assert_eq!(
            g("PredefinedType = USERDEFINED"),
            Given::AttributeEquals {
                attribute: "PredefinedType".into(),
                value: Value::from("USERDEFINED"),
            }
        );
        assert_eq!(
            g("Its attribute Representation and following that its attribute Representations, keeping the instances"),
            Given::Attribute {
                path: vec!["Representation".into(), "Representations".into()],
                keep_instances: true,
            }
        );
        assert_eq!(
            g("Its attribute Name"),
            Given::Attribute {
                path: vec!["Name".into()],
                keep_instances: false,
            }
        );
    }

    #[test]
    fn relationship_templates() {
        assert_eq!(
            g("A relationship IfcRelNests exists from IfcAlignment to IfcAlignmentHorizontal"),
            Given::Relationship {
                relationship: "IfcRelNests".into(),
                direction: Direction::FromTo,
                entity: "IfcAlignment".into(),
                other_entity: "IfcAlignmentHorizontal".into(),
            }
        );
        assert_eq!(
            t("A relationship IfcRelFillsElement must exist to IfcDoor from IfcOpeningElement"),
            Then::Relationship {
                relationship: "IfcRelFillsElement".into(),
                direction: Direction::ToFrom,
                entity: "IfcDoor".into(),
                other_entity: "IfcOpeningElement".into(),
            }
        );
    }

    #[test]
    fn count_templates() {
        assert_eq!(
            t("There must be at least 1 instance(s) of IfcWall"),
            Then::InstanceCount {
                op: CompareOp::Gte,
                count: 1,
                entity: "IfcWall".into(),
            }
        );
        assert_eq!(
            t("Every oriented edge shall be referenced exactly 1 times by the loops of the face"),
            Then::EdgeUse {
                oriented: true,
                count: 1,
            }
        );
    }

    #[test]
    fn structure_templates() {
        assert_eq!(
            t("Each IfcWall must not be directly or indirectly contained in IfcSite"),
            Then::Contained {
                entity: "IfcWall".into(),
                condition: Condition::MustNot,
                directness: Directness::DirectlyOrIndirectly,
                structure: "IfcSite".into(),
            }
        );
        assert_eq!(
            t("It must be aggregated as per 'spatial_aggregation.csv'"),
            Then::AsPerTable {
                relationship: "aggregated".into(),
                table: "spatial_aggregation.csv".into(),
            }
        );
        assert_eq!(
            t("The IfcBuildingStorey must be assigned to the IfcBuilding if IfcBuilding is present"),
            Then::AssignedTo {
                related: "IfcBuildingStorey".into(),
                relating: "IfcBuilding".into(),
                other_entity: "IfcBuilding".into(),
                present: true,
            }
        );
    }

    #[test]
    fn nesting_templates() {
        assert_eq!(
            t("Each IfcAlignment must nest exactly 1 instance(s) of IfcAlignmentHorizontal"),
            Then::NestCount {
                entity: "IfcAlignment".into(),
                condition: Condition::Must,
                op: CompareOp::Eq,
                count: 1,
                target: "IfcAlignmentHorizontal".into(),
            }
        );
        match t("Each IfcAlignmentSegment must be nested by only 1 instance(s) of IfcAlignmentHorizontal") {
            Then::NestFragment { fragment, .. } => {
                assert_eq!(fragment.direction, NestDirection::NestedBy);
                assert_eq!(fragment.cardinality, NestCardinality::OnlyOne);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            t("Each IfcAlignment may be nested by only the following entities: IfcAlignmentHorizontal, IfcAlignmentVertical"),
            Then::NestAllowList {
                entity: "IfcAlignment".into(),
                allowed: vec!["IfcAlignmentHorizontal".into(), "IfcAlignmentVertical".into()],
            }
        );
    }

    #[test]
    fn unknown_fragment_is_cut() {
        let mut input = "Each IfcAlignment must hold some instance(s) of IfcAlignmentHorizontal";
        let err = then.parse_next(&mut input).unwrap_err();
        assert!(matches!(err, winnow::error::ErrMode::Cut(_)));
    }

    #[test]
    fn value_templates() {
        assert_eq!(
            t("The values of Name must not be in 'names.csv'"),
            Then::Value {
                scope: ValueScope::Values,
                branch: Some("Name".into()),
                constraint: ValueConstraint::InTable {
                    table: "names.csv".into(),
                    negated: true,
                },
            }
        );
        assert_eq!(
            t("At least 2 value(s) must be 'Body' or 'Axis'"),
            Then::ValueCount {
                count: 2,
                branch: None,
                constraint: ValueConstraint::OneOf {
                    values: vec![Value::from("Body"), Value::from("Axis")],
                    negated: false,
                },
            }
        );
    }

    #[test]
    fn representation_templates() {
        assert_eq!(
            t("Its representation must have a Axis shape representation"),
            Then::RepresentationShape { identifier: "Axis".into() }
        );
        assert_eq!(
            t("Its 'Body' shape representation must be of type SweptSolid"),
            Then::RepresentationType {
                identifier: "Body".into(),
                expected: "SweptSolid".into(),
            }
        );
        assert_eq!(
            t("The type of attribute ObjectPlacement must be IfcLocalPlacement"),
            Then::AttributeType {
                attribute: "ObjectPlacement".into(),
                expected: "IfcLocalPlacement".into(),
            }
        );
    }
}
