mod context;
mod error;
mod expr;
pub(crate) mod outcome;
mod scenario;
mod stack;
mod step;
mod value;

pub use context::RuleEvaluationContext;
pub use error::{CompileError, EvalError, TableError};
pub use expr::{CompareOp, Condition, Directness, ValueConstraint};
pub use outcome::{
    shorten, AttributeTypeError, AttributeValueCountError, AttributeValueError, EdgeUseError,
    InstanceCountError, InstanceStructureError, MissingRelationshipError, Outcome,
    RepresentationShapeError, RepresentationTypeError, RuleSuccess, StructuredRecord, Target,
};
pub use scenario::{Feature, Scenario, ScenarioBuilder};
pub use stack::{project, Layer, LayerRole, SelectionStack, StackedPath};
pub use step::{
    Direction, Given, NestCardinality, NestDirection, NestingFragment, Step, Then, ValueScope,
};
pub use value::{EntityId, Value};
