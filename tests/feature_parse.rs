use ifcheck::parse::{parse_feature, parse_given, parse_nesting_fragment, parse_then, parse_value_constraint};
use ifcheck::{
    CheckError, CompareOp, Condition, Directness, Feature, Given, MemoryModel, NestCardinality,
    NestDirection, Step, Then, Value, ValueConstraint,
};

const ALIGNMENT: &str = r#"
@implementer-agreement
Feature: ALS005 - Alignment shape representation
  The rule verifies the representation of alignments.

  Background:
    Given A file with Schema Identifier "IFC4X3_TC1" or "IFC4X3_ADD1" or "IFC4X3_ADD2" or "IFC4X3"

  Scenario: Agreement on nested elements - horizontal
    Given An IfcAlignment
    Then Each IfcAlignment must nest only 1 instance(s) of IfcAlignmentHorizontal

  Scenario: Agreement on nested elements - vertical
    Given An IfcAlignment
    Then Each IfcAlignment must nest at most 1 instance(s) of IfcAlignmentVertical
"#;

#[test]
fn parse_and_evaluate_feature() {
    let feature = Feature::from_text(ALIGNMENT).unwrap();
    assert_eq!(feature.name(), Some("ALS005 - Alignment shape representation"));
    assert_eq!(feature.scenarios().len(), 2);

    let mut m = MemoryModel::new("IFC4X3_ADD2");
    let alignment = m.add("IfcAlignment");
    let horizontal = m.add("IfcAlignmentHorizontal");
    m.nest(alignment, &[horizontal]);

    let mut engine = ifcheck::Engine::new(ifcheck::EngineConfig::new());
    let reports = engine.check_feature(&feature, &m).unwrap();
    assert!(reports.iter().all(|r| r.applicable() && r.passed()));
}

#[test]
fn background_comes_first() {
    let feature = Feature::from_text(ALIGNMENT).unwrap();
    for scenario in feature.scenarios() {
        assert_eq!(
            scenario.steps()[0],
            Step::Given(Given::File {
                field: "Schema Identifier".into(),
                values: vec![
                    "IFC4X3_TC1".into(),
                    "IFC4X3_ADD1".into(),
                    "IFC4X3_ADD2".into(),
                    "IFC4X3".into(),
                ],
            })
        );
    }
}

#[test]
fn and_but_inherit_the_previous_keyword() {
    let parsed = parse_feature(
        "Scenario: chained\n  Given An IfcWall\n  And Its attribute Name\n  \
         Then The value must be 'Wall'\n  But The value must not be 'Slab'\n",
    )
    .unwrap();
    let steps = &parsed.scenarios[0].steps;
    assert!(matches!(steps[1], Step::Given(Given::Attribute { .. })));
    assert!(matches!(steps[3], Step::Then(Then::Value { .. })));
}

#[test]
fn tags_comments_and_descriptions_are_ignored() {
    let parsed = parse_feature(
        "# leading comment\n@tag-one @tag-two\nFeature: f\n  free text line\n\n  \
         Scenario: s\n    # inside\n    Then There must be at least 1 instance(s) of IfcSite\n",
    )
    .unwrap();
    assert_eq!(parsed.scenarios.len(), 1);
    assert_eq!(parsed.scenarios[0].steps.len(), 1);
}

#[test]
fn unknown_step_reports_line() {
    let err = parse_feature("Scenario: s\n  Then Something nobody wrote a template for\n").unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn step_outside_scenario_is_rejected() {
    assert!(parse_feature("Feature: f\n  Then There must be at least 1 instance(s) of IfcSite\n").is_err());
}

#[test]
fn duplicate_scenario_names_fail_to_compile() {
    let err = Feature::from_text(
        "Scenario: same\n  Then There must be at least 1 instance(s) of IfcWall\n\
         Scenario: same\n  Then There must be at most 1 instance(s) of IfcWall\n",
    )
    .unwrap_err();
    assert!(matches!(err, CheckError::Compile(_)));
}

#[test]
fn single_steps() {
    assert_eq!(
        parse_given("An IfcBuildingStorey").unwrap(),
        Given::Entity {
            entity: "IfcBuildingStorey".into()
        }
    );
    assert_eq!(
        parse_then("Each IfcSpace must be directly contained in IfcBuildingStorey").unwrap(),
        Then::Contained {
            entity: "IfcSpace".into(),
            condition: Condition::Must,
            directness: Directness::Directly,
            structure: "IfcBuildingStorey".into(),
        }
    );
    assert_eq!(
        parse_then("There must be exactly 1 instance(s) of IfcProject").unwrap(),
        Then::InstanceCount {
            op: CompareOp::Eq,
            count: 1,
            entity: "IfcProject".into(),
        }
    );
    assert!(parse_then("Each IfcWall must hover").is_err());
}

#[test]
fn nesting_fragments() {
    for (text, direction, cardinality) in [
        ("must nest only 1", NestDirection::Nest, NestCardinality::OnlyOne),
        ("nests a list of only", NestDirection::Nest, NestCardinality::ListOfOnly),
        ("must be nested by only 1", NestDirection::NestedBy, NestCardinality::OnlyOne),
        ("is nested by a list of only", NestDirection::NestedBy, NestCardinality::ListOfOnly),
    ] {
        let fragment = parse_nesting_fragment(text).unwrap();
        assert_eq!(fragment.direction, direction, "{text}");
        assert_eq!(fragment.cardinality, cardinality, "{text}");
    }
    assert!(parse_nesting_fragment("must contain only 1").is_err());
}

#[test]
fn value_constraint_prefixes_in_any_order() {
    let expected = ValueConstraint::InTable {
        table: "ids.csv".into(),
        negated: true,
    };
    for text in ["not be in 'ids.csv'", "be not in 'ids.csv'", "in not be ids.csv"] {
        assert_eq!(parse_value_constraint(text).unwrap(), expected, "{text}");
    }
    assert_eq!(
        parse_value_constraint("be at least 3").unwrap(),
        ValueConstraint::Compare {
            op: CompareOp::Gte,
            value: Value::Int(3),
        }
    );
    assert_eq!(
        parse_value_constraint("not be 'Body' or 'Axis'").unwrap(),
        ValueConstraint::OneOf {
            values: vec![Value::from("Body"), Value::from("Axis")],
            negated: true,
        }
    );
}
