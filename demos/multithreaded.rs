use std::sync::Arc;
use std::thread;

use ifcheck::{Engine, EngineConfig, Feature, MemoryModel};

const RULES: &str = "\
Feature: spatial structure
  Scenario: sites
    Then There must be exactly 1 instance(s) of IfcSite

  Scenario: storeys
    Given An IfcBuildingStorey
    Then It must be aggregated as per 'spatial_aggregation.csv'

  Scenario: walls
    Given An IfcWall
    Then Each IfcWall must be directly or indirectly contained in IfcBuilding
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let feature = Arc::new(Feature::from_text(RULES).expect("failed to parse feature"));

    let mut model = MemoryModel::new("IFC4");
    let project = model.add("IfcProject");
    let site = model.add("IfcSite");
    let building = model.add("IfcBuilding");
    let storey = model.add("IfcBuildingStorey");
    let wall = model.add("IfcWall");
    model.aggregate(project, &[site]);
    model.aggregate(site, &[building]);
    model.aggregate(building, &[storey]);
    model.contain(storey, &[wall]);
    let model = Arc::new(model);

    // one engine per worker; scenarios share nothing but the model
    let handles: Vec<_> = (0..feature.scenarios().len())
        .map(|i| {
            let feature = Arc::clone(&feature);
            let model = Arc::clone(&model);
            thread::spawn(move || {
                let mut engine = Engine::new(EngineConfig::new());
                let scenario = &feature.scenarios()[i];
                match engine.check(scenario, model.as_ref()) {
                    Ok(report) => println!("Thread {i}: {report}"),
                    Err(e) => println!("Thread {i}: {} aborted: {e}", scenario.name()),
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
