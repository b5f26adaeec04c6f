use tracing::debug;

use super::relations;
use crate::model::Model;
use crate::tables::TableCache;
use crate::types::{project, CompareOp, Direction, EvalError, Given, RuleEvaluationContext, Value};

pub const MODEL_VIEW_DEFINITION: &str = "Model View Definition";
pub const SCHEMA_IDENTIFIER: &str = "Schema Identifier";

pub(crate) fn apply<M: Model + ?Sized>(
    given: &Given,
    ctx: &mut RuleEvaluationContext,
    model: &M,
    tables: &mut TableCache,
) -> Result<(), EvalError> {
    match given {
        Given::Entity { entity } => {
            let ids = model.by_type(entity);
            debug!(entity = %entity, count = ids.len(), "selected instances");
            ctx.restrict_applicability(!ids.is_empty());
            ctx.select(ids);
        }
        Given::AttributeEquals { attribute, value } => {
            let keep: Vec<bool> = ctx
                .instances()
                .iter()
                .map(|v| {
                    v.as_entity().is_some_and(|id| {
                        model
                            .attribute_or(id, attribute, Value::Null)
                            .compare(CompareOp::Eq, value)
                            == Some(true)
                    })
                })
                .collect();
            ctx.narrow(&keep);
            ctx.restrict_applicability(!ctx.instances().is_empty());
        }
        Given::File { field, values } => {
            let observed = file_field(model, field)?;
            let matched = observed.is_some_and(|o| {
                values.iter().any(|v| v.eq_ignore_ascii_case(o))
            });
            debug!(field = %field, observed = ?observed, matched, "file precondition");
            ctx.restrict_applicability(matched);
        }
        Given::Attribute {
            path,
            keep_instances,
        } => {
            if *keep_instances {
                let mut projected = ctx.instances().to_vec();
                for attribute in path {
                    projected = project(&projected, |id| {
                        model.attribute_or(id, attribute, Value::Null)
                    });
                }
                let label = path.last().map_or("", String::as_str);
                ctx.branch(label, projected);
            } else {
                for attribute in path {
                    let projected = project(ctx.instances(), |id| {
                        model.attribute_or(id, attribute, Value::Null)
                    });
                    if !ctx.descend(attribute, projected) {
                        debug!(attribute = %attribute, "projection found nothing");
                        break;
                    }
                }
            }
        }
        Given::Relationship {
            relationship,
            direction,
            entity,
            other_entity,
        } => {
            let current = ctx.entities();
            let matched = relations::resolve(
                model,
                tables,
                relationship,
                *direction,
                entity,
                other_entity,
                &current,
            )?;
            let keep: Vec<bool> = ctx
                .instances()
                .iter()
                .map(|v| v.as_entity().is_some_and(|id| matched.contains(&id)))
                .collect();
            ctx.narrow(&keep);
            let side = match direction {
                Direction::FromTo => "relating",
                Direction::ToFrom => "related",
            };
            debug!(relationship = %relationship, side, remaining = ctx.instances().len(), "narrowed by relationship");
            ctx.restrict_applicability(!ctx.instances().is_empty());
        }
    }
    Ok(())
}

/// Header field named by a file precondition.
fn file_field<'m, M: Model + ?Sized>(
    model: &'m M,
    field: &str,
) -> Result<Option<&'m str>, EvalError> {
    if field.eq_ignore_ascii_case(MODEL_VIEW_DEFINITION) {
        Ok(model.model_view_definition())
    } else if field.eq_ignore_ascii_case(SCHEMA_IDENTIFIER) {
        Ok(Some(model.schema_identifier()))
    } else {
        Err(EvalError::UnknownFileField {
            field: field.to_owned(),
        })
    }
}
