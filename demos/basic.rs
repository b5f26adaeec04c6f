use ifcheck::{CompareOp, Engine, EngineConfig, Given, MemoryModel, ScenarioBuilder, Then};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Define a scenario
    let scenario = ScenarioBuilder::new("walls in storeys")
        .given(Given::Entity {
            entity: "IfcWall".into(),
        })
        .then(Then::InstanceCount {
            op: CompareOp::Gte,
            count: 1,
            entity: "IfcWall".into(),
        })
        .compile()
        .expect("failed to compile scenario");

    println!("{scenario}");

    // Check it against a small model
    let mut model = MemoryModel::new("IFC4");
    let storey = model.add("IfcBuildingStorey");
    let wall = model.add("IfcWall");
    model.contain(storey, &[wall]);

    let mut engine = Engine::new(EngineConfig::new());
    match engine.check(&scenario, &model) {
        Ok(report) => println!("Result: {report}"),
        Err(e) => println!("Rule could not be evaluated: {e}"),
    }
}
