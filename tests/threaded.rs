use std::sync::Arc;
use std::thread;

use ifcheck::{Engine, EngineConfig, Feature, MemoryModel};

const RULES: &str = "\
Feature: spatial structure
  Scenario: walls exist
    Then There must be at least 1 instance(s) of IfcWall

  Scenario: walls are contained
    Given An IfcWall
    Then Each IfcWall must be directly contained in IfcBuildingStorey

  Scenario: storeys are aggregated
    Given An IfcBuildingStorey
    Then It must be aggregated as per 'spatial_aggregation.csv'
";

fn model() -> MemoryModel {
    let mut m = MemoryModel::new("IFC4");
    let project = m.add("IfcProject");
    let site = m.add("IfcSite");
    let building = m.add("IfcBuilding");
    let storey = m.add("IfcBuildingStorey");
    let inside = m.add("IfcWall");
    m.add("IfcWall");
    m.aggregate(project, &[site]);
    m.aggregate(site, &[building]);
    m.aggregate(building, &[storey]);
    m.contain(storey, &[inside]);
    m
}

fn config() -> EngineConfig {
    EngineConfig::new().resource_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
}

#[test]
fn one_engine_per_scenario_matches_sequential() {
    let feature = Arc::new(Feature::from_text(RULES).unwrap());
    let model = Arc::new(model());

    let sequential: Vec<(bool, Vec<String>)> = {
        let mut engine = Engine::new(config());
        feature
            .scenarios()
            .iter()
            .map(|s| {
                let report = engine.check(s, model.as_ref()).unwrap();
                (report.passed(), report.failures().map(ToString::to_string).collect())
            })
            .collect()
    };

    let handles: Vec<_> = (0..feature.scenarios().len())
        .map(|i| {
            let feature = Arc::clone(&feature);
            let model = Arc::clone(&model);
            thread::spawn(move || {
                let mut engine = Engine::new(config());
                let report = engine.check(&feature.scenarios()[i], model.as_ref()).unwrap();
                (report.passed(), report.failures().map(ToString::to_string).collect::<Vec<_>>())
            })
        })
        .collect();
    let parallel: Vec<(bool, Vec<String>)> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(parallel, sequential);
    assert_eq!(
        parallel.iter().map(|(passed, _)| *passed).collect::<Vec<_>>(),
        vec![true, false, true]
    );
    assert_eq!(
        parallel[1].1,
        vec!["The instance #6=IfcWall is not directly contained in IfcBuildingStorey".to_owned()]
    );
}

#[test]
fn many_threads_same_scenario() {
    let feature = Arc::new(Feature::from_text(RULES).unwrap());
    let model = Arc::new(model());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let feature = Arc::clone(&feature);
            let model = Arc::clone(&model);
            thread::spawn(move || {
                let mut engine = Engine::new(config());
                engine
                    .check_feature(&feature, model.as_ref())
                    .unwrap()
                    .iter()
                    .map(|r| r.failures().count())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), vec![0, 1, 0]);
    }
}
