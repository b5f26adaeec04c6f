use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ifcheck::{Engine, EngineConfig, EntityId, Feature, MemoryModel, Value};

const RULES: &str = "\
Feature: bench
  Scenario: contained
    Given An IfcWall
    Then Each IfcWall must be directly or indirectly contained in IfcBuilding

  Scenario: aggregated
    Given An IfcBuildingStorey
    Then It must be aggregated as per 'spatial_aggregation.csv'

  Scenario: identifiers
    Given An IfcWall
    Given Its attribute Representation and following that its attribute Representations and following that its attribute RepresentationIdentifier
    Then The values must be in 'representation_identifiers.csv'
";

/// A building with `storeys` storeys holding `walls` walls each.
fn build_model(storeys: usize, walls: usize) -> MemoryModel {
    let mut m = MemoryModel::new("IFC4");
    let project = m.add("IfcProject");
    let site = m.add("IfcSite");
    let building = m.add("IfcBuilding");
    m.aggregate(project, &[site]);
    m.aggregate(site, &[building]);
    let body = m.add_with("IfcShapeRepresentation", [("RepresentationIdentifier", Value::from("Body"))]);
    let axis = m.add_with("IfcShapeRepresentation", [("RepresentationIdentifier", Value::from("Axis"))]);
    let shape = m.add_with("IfcProductDefinitionShape", [("Representations", Value::from(vec![body, axis]))]);

    for _ in 0..storeys {
        let storey = m.add("IfcBuildingStorey");
        m.aggregate(building, &[storey]);
        let ids: Vec<EntityId> = (0..walls)
            .map(|_| m.add_with("IfcWall", [("Representation", Value::Entity(shape))]))
            .collect();
        m.contain(storey, &ids);
    }
    m
}

fn config() -> EngineConfig {
    EngineConfig::new().resource_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
}

fn bench_scenarios(c: &mut Criterion) {
    let feature = Feature::from_text(RULES).unwrap();
    let mut group = c.benchmark_group("scenario");

    for &(storeys, walls) in &[(2, 10), (10, 50), (20, 200)] {
        let model = build_model(storeys, walls);
        let mut engine = Engine::new(config());
        for scenario in feature.scenarios() {
            group.bench_function(&format!("{}_{}x{}", scenario.name(), storeys, walls), |b| {
                b.iter(|| engine.check(black_box(scenario), black_box(&model)).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_feature", |b| {
        b.iter(|| Feature::from_text(black_box(RULES)).unwrap());
    });
}

fn bench_table_load(c: &mut Criterion) {
    let feature = Feature::from_text(RULES).unwrap();
    let model = build_model(2, 10);
    let aggregated = feature.scenario("aggregated").unwrap();

    // a fresh engine reloads every lookup table
    c.bench_function("cold_engine_aggregated", |b| {
        b.iter(|| Engine::new(config()).check(black_box(aggregated), black_box(&model)).unwrap());
    });
}

criterion_group!(benches, bench_scenarios, bench_parse, bench_table_load);
criterion_main!(benches);
