//! Gherkin-style rule checking for building-model object graphs.
//!
//! Rules are written as feature text, parsed into typed [`Step`]s, validated
//! into [`Scenario`]s and evaluated by an [`Engine`] against any [`Model`].
//! Each Then step yields [`Outcome`] records; a scenario fails when any of
//! them is a violation.
//!
//! ```
//! use ifcheck::{Engine, EngineConfig, Feature, MemoryModel};
//!
//! let feature = Feature::from_text(
//!     "Scenario: walls\n  Then There must be at least 1 instance(s) of IfcWall\n",
//! )
//! .unwrap();
//! let model = MemoryModel::new("IFC4");
//! let mut engine = Engine::new(EngineConfig::new());
//! let report = engine.check(&feature.scenarios()[0], &model).unwrap();
//! assert!(!report.passed());
//! ```

mod compile;
mod engine;
mod error;
mod evaluate;
pub mod geometry;
pub mod hierarchy;
pub mod model;
pub mod parse;
mod report;
pub mod tables;
mod types;

pub use engine::{Engine, EngineConfig};
pub use error::CheckError;
pub use evaluate::{run_step, AGGREGATED, MODEL_VIEW_DEFINITION, SCHEMA_IDENTIFIER};
pub use model::{InstanceRef, MemoryModel, Model, RelationSide};
pub use report::{ReportFormat, RuleFailure, ScenarioReport, StepReport, StepStatus};
pub use types::{
    project, shorten, AttributeTypeError, AttributeValueCountError, AttributeValueError,
    CompareOp, CompileError, Condition, Direction, Directness, EdgeUseError, EntityId, EvalError,
    Feature, Given, InstanceCountError, InstanceStructureError, Layer, LayerRole,
    MissingRelationshipError, NestCardinality, NestDirection, NestingFragment, Outcome,
    RepresentationShapeError, RepresentationTypeError, RuleEvaluationContext, RuleSuccess,
    Scenario, ScenarioBuilder, SelectionStack, StackedPath, Step, StructuredRecord, TableError,
    Target, Then, Value, ValueConstraint, ValueScope,
};
