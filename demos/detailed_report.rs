use ifcheck::{Engine, EngineConfig, Feature, MemoryModel, ReportFormat, Value};

const RULES: &str = "\
Feature: spatial containment
  Scenario: every wall sits in a storey
    Given A file with Schema Identifier \"IFC4\"
    Given An IfcWall
    Then Each IfcWall must be directly contained in IfcBuildingStorey
    And There must be at most 2 instance(s) of IfcWall
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let feature = Feature::from_text(RULES).expect("failed to parse feature");

    let mut model = MemoryModel::new("IFC4");
    let storey = model.add("IfcBuildingStorey");
    let placed = model.add_with("IfcWall", [("GlobalId", Value::from("2O2Fr$t4X7Zf8NOew3FLOH"))]);
    model.add_with("IfcWall", [("GlobalId", Value::from("1hOSvn6df7F8_7GcBWlRGQ"))]);
    model.contain(storey, &[placed]);

    let config = EngineConfig::new().error_on_passed_rule(true);
    let mut engine = Engine::new(config);
    let report = engine
        .check(&feature.scenarios()[0], &model)
        .expect("failed to evaluate scenario");

    println!("{report}");
    println!();
    for step in report.steps() {
        println!("[{}] {}", step.status(), step.step());
        for outcome in step.outcomes() {
            println!("    {outcome}");
        }
    }
    println!();
    println!("Duration: {:?}", report.duration());

    if let Err(failure) = report.into_result(ReportFormat::Json) {
        println!();
        println!("Structured records for {}:", failure.scenario());
        for line in failure.lines() {
            println!("{line}");
        }
    }
}
