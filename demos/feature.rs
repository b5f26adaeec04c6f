use std::path::PathBuf;

use ifcheck::{Engine, EngineConfig, Feature, MemoryModel};

const ALIGNMENT: &str = "\
Feature: alignment layouts
  Background:
    Given A file with Schema Identifier \"IFC4X3_ADD2\" or \"IFC4X3\"

  Scenario: one horizontal layout
    Given An IfcAlignment
    Then Each IfcAlignment must nest only 1 instance(s) of IfcAlignmentHorizontal

  Scenario: permitted layouts
    Given An IfcAlignment
    Then Each IfcAlignment may be nested by only the following entities: IfcAlignmentHorizontal, IfcAlignmentVertical, IfcAlignmentCant
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // usage: feature [rules.feature] [config.json]
    let mut args = std::env::args().skip(1);
    let feature = match args.next() {
        Some(path) => Feature::from_file(&path).expect("failed to load feature file"),
        None => Feature::from_text(ALIGNMENT).expect("failed to parse feature"),
    };
    let config = args
        .next()
        .map(PathBuf::from)
        .map(|path| EngineConfig::load(path).expect("failed to load configuration"))
        .unwrap_or_default();

    let mut model = MemoryModel::new("IFC4X3");
    let alignment = model.add("IfcAlignment");
    let horizontal = model.add("IfcAlignmentHorizontal");
    let segment = model.add("IfcAlignmentSegment");
    model.nest(alignment, &[horizontal, segment]);

    let mut engine = Engine::new(config);
    let reports = engine
        .check_feature(&feature, &model)
        .expect("failed to evaluate feature");

    println!("Feature: {}", feature.name().unwrap_or("(unnamed)"));
    for report in reports {
        println!("{report}");
        if let Err(failure) = report.into_result(engine.config().format) {
            println!("{failure}");
        }
    }
}
