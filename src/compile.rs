use std::collections::HashSet;

use crate::evaluate::{AGGREGATED, MODEL_VIEW_DEFINITION, SCHEMA_IDENTIFIER};
use crate::parse::ParsedFeature;
use crate::{CompileError, Feature, Given, Scenario, Step, Then};

pub(crate) fn compile(name: String, steps: Vec<Step>) -> Result<Scenario, CompileError> {
    check_then(&name, &steps)?;
    for step in &steps {
        check_file_field(&name, step)?;
        check_keyword(&name, step)?;
        check_count(&name, step)?;
    }
    Ok(Scenario { name, steps })
}

/// Validate every scenario of a parsed feature, prepending the background.
pub(crate) fn compile_feature(parsed: ParsedFeature) -> Result<Feature, CompileError> {
    check_duplicates(parsed.scenarios.iter().map(|s| s.name.as_str()))?;
    let scenarios = parsed
        .scenarios
        .into_iter()
        .map(|s| {
            let steps = parsed.background.iter().cloned().chain(s.steps).collect();
            compile(s.name, steps)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Feature {
        name: parsed.name,
        scenarios,
    })
}

fn check_duplicates<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CompileError::DuplicateScenario {
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

fn check_then(name: &str, steps: &[Step]) -> Result<(), CompileError> {
    if steps.iter().any(Step::is_then) {
        Ok(())
    } else {
        Err(CompileError::NoThen {
            scenario: name.to_owned(),
        })
    }
}

fn check_file_field(name: &str, step: &Step) -> Result<(), CompileError> {
    match step {
        Step::Given(Given::File { field, .. })
            if !field.eq_ignore_ascii_case(MODEL_VIEW_DEFINITION)
                && !field.eq_ignore_ascii_case(SCHEMA_IDENTIFIER) =>
        {
            Err(CompileError::UnknownFileField {
                scenario: name.to_owned(),
                field: field.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn check_keyword(name: &str, step: &Step) -> Result<(), CompileError> {
    match step {
        Step::Then(Then::AsPerTable { relationship, .. })
            if !relationship.eq_ignore_ascii_case(AGGREGATED) =>
        {
            Err(CompileError::UnknownRelationshipKeyword {
                scenario: name.to_owned(),
                keyword: relationship.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn check_count(name: &str, step: &Step) -> Result<(), CompileError> {
    match step {
        Step::Then(Then::EdgeUse { count: 0, .. }) => Err(CompileError::ZeroCount {
            scenario: name.to_owned(),
            step: step.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_feature;
    use crate::{CompileError, Given, ScenarioBuilder, Then};

    fn count_then() -> Then {
        Then::InstanceCount {
            op: crate::CompareOp::Gte,
            count: 1,
            entity: "IfcWall".into(),
        }
    }

    #[test]
    fn compile_minimal() {
        let scenario = ScenarioBuilder::new("walls")
            .given(Given::Entity {
                entity: "IfcWall".into(),
            })
            .then(count_then())
            .compile()
            .unwrap();
        assert_eq!(scenario.name(), "walls");
        assert_eq!(scenario.steps().len(), 2);
    }

    #[test]
    fn then_only_is_allowed() {
        assert!(ScenarioBuilder::new("file level").then(count_then()).compile().is_ok());
    }

    #[test]
    fn no_then_fails() {
        let err = ScenarioBuilder::new("s")
            .given(Given::Entity {
                entity: "IfcWall".into(),
            })
            .compile()
            .unwrap_err();
        assert!(matches!(err, CompileError::NoThen { .. }));
    }

    #[test]
    fn unknown_file_field_fails() {
        let err = ScenarioBuilder::new("s")
            .given(Given::File {
                field: "Originating System".into(),
                values: vec!["x".into()],
            })
            .then(count_then())
            .compile()
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownFileField { ref field, .. } if field == "Originating System"));
    }

    #[test]
    fn unknown_table_keyword_fails() {
        let err = ScenarioBuilder::new("s")
            .then(Then::AsPerTable {
                relationship: "contained".into(),
                table: "spatial_aggregation.csv".into(),
            })
            .compile()
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownRelationshipKeyword { .. }));
    }

    #[test]
    fn zero_edge_count_fails() {
        let err = ScenarioBuilder::new("s")
            .then(Then::EdgeUse {
                oriented: false,
                count: 0,
            })
            .compile()
            .unwrap_err();
        assert!(matches!(err, CompileError::ZeroCount { .. }));
    }

    #[test]
    fn duplicate_scenarios_fail() {
        let parsed = parse_feature(
            "Scenario: a\n  Then There must be at least 1 instance(s) of IfcWall\n\
             Scenario: a\n  Then There must be at least 1 instance(s) of IfcSlab\n",
        )
        .unwrap();
        let err = super::compile_feature(parsed).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateScenario { ref name } if name == "a"));
    }

    #[test]
    fn background_is_prepended() {
        let parsed = parse_feature(
            "Feature: walls\n\
             Background:\n  Given A file with Schema Identifier \"IFC4\"\n\
             Scenario: one\n  Given An IfcWall\n  Then There must be at least 1 instance(s) of IfcWall\n\
             Scenario: two\n  Then There must be at most 3 instance(s) of IfcWall\n",
        )
        .unwrap();
        let feature = super::compile_feature(parsed).unwrap();
        assert_eq!(feature.name(), Some("walls"));
        assert_eq!(feature.scenarios().len(), 2);
        for scenario in feature.scenarios() {
            assert!(matches!(
                scenario.steps()[0],
                crate::Step::Given(Given::File { .. })
            ));
        }
        assert_eq!(feature.scenarios()[1].steps().len(), 2);
    }
}
