//! Step evaluation against a model.
//!
//! Given steps mutate the [`RuleEvaluationContext`]; Then steps read it and
//! return outcome records. Violations are records, never errors: an `Err`
//! always means the rule itself is malformed or a table is unusable.

mod given;
mod relations;
mod then;

use crate::model::Model;
use crate::tables::TableCache;
use crate::types::{EvalError, Outcome, RuleEvaluationContext, Step};

pub use given::{MODEL_VIEW_DEFINITION, SCHEMA_IDENTIFIER};
pub use then::AGGREGATED;

/// Evaluate one step. Given steps always yield no records.
///
/// # Errors
///
/// Returns [`EvalError`] for unsupported geometry, unknown keywords or
/// relationship types, and table load failures.
pub fn run_step<M: Model + ?Sized>(
    step: &Step,
    ctx: &mut RuleEvaluationContext,
    model: &M,
    tables: &mut TableCache,
) -> Result<Vec<Outcome>, EvalError> {
    match step {
        Step::Given(given) => {
            given::apply(given, ctx, model, tables)?;
            Ok(Vec::new())
        }
        Step::Then(then) => then::check(then, ctx, model, tables),
    }
}
