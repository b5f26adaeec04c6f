use std::fmt;

use super::expr::{CompareOp, Condition, Directness, ValueConstraint};
use super::Value;

/// Which side of a relationship the current instances take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `from A to B`: instances of A are on the relating side.
    FromTo,
    /// `to A from B`: instances of A are on the related side.
    ToFrom,
}

/// Whether the checked entity nests its targets or is nested by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestDirection {
    /// The entity is the whole; targets come from `IsNestedBy`.
    Nest,
    /// The entity is a part; targets come from `Nests`.
    NestedBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestCardinality {
    /// Exactly one target of the expected type.
    OnlyOne,
    /// At most one nesting relationship, all of whose members have the
    /// expected type.
    ListOfOnly,
}

/// Parsed form of a compound nesting phrase such as `must be nested by only 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestingFragment {
    pub direction: NestDirection,
    pub cardinality: NestCardinality,
}

impl fmt::Display for NestingFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            NestDirection::Nest => "nest",
            NestDirection::NestedBy => "be nested by",
        };
        let cardinality = match self.cardinality {
            NestCardinality::OnlyOne => "only 1",
            NestCardinality::ListOfOnly => "a list of only",
        };
        write!(f, "must {direction} {cardinality}")
    }
}

/// Whether a value check looks at whole top-level values or at every leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueScope {
    Value,
    Values,
}

/// Steps that establish or narrow the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Given {
    /// `An {entity}`
    Entity { entity: String },
    /// `{attribute} = {value}`
    AttributeEquals { attribute: String, value: Value },
    /// `A file with {field} "{v1}" or "{v2}"`
    File { field: String, values: Vec<String> },
    /// `Its attribute {A} [and following that its attribute {B}]... [, keeping the instances]`
    Attribute { path: Vec<String>, keep_instances: bool },
    /// `A relationship {relationship} exists from {entity} to {other_entity}`
    Relationship {
        relationship: String,
        direction: Direction,
        entity: String,
        other_entity: String,
    },
}

/// Checks producing outcome records.
#[derive(Debug, Clone, PartialEq)]
pub enum Then {
    /// `Every {edge|oriented edge} shall be referenced exactly {count} times by the loops of the face`
    EdgeUse { oriented: bool, count: usize },
    /// `There shall be {at least|at most} {count} instance(s) of {entity}`
    InstanceCount {
        op: CompareOp,
        count: usize,
        entity: String,
    },
    /// `The {related} must be assigned to the {relating} if {other_entity} {is|is not} present`
    AssignedTo {
        related: String,
        relating: String,
        other_entity: String,
        present: bool,
    },
    /// `Each {entity} {must|must not} be {directness} contained in {structure}`
    Contained {
        entity: String,
        condition: Condition,
        directness: Directness,
        structure: String,
    },
    /// `It must be {relationship} as per {table}`
    AsPerTable { relationship: String, table: String },
    /// `Each {entity} {must|must not} nest {exactly|at most} {count} instance(s) of {target}`
    NestCount {
        entity: String,
        condition: Condition,
        op: CompareOp,
        count: usize,
        target: String,
    },
    /// `Each {entity} {fragment} instance(s) of {target}`
    NestFragment {
        entity: String,
        fragment: NestingFragment,
        target: String,
    },
    /// `Each {entity} may be nested by only the following entities: {allowed}`
    NestAllowList { entity: String, allowed: Vec<String> },
    /// `A relationship {relationship} must exist from {entity} to {other_entity}`
    Relationship {
        relationship: String,
        direction: Direction,
        entity: String,
        other_entity: String,
    },
    /// `The value(s) [of {branch}] must {constraint}`
    Value {
        scope: ValueScope,
        branch: Option<String>,
        constraint: ValueConstraint,
    },
    /// `At least {count} value(s) [of {branch}] must {constraint}`
    ValueCount {
        count: usize,
        branch: Option<String>,
        constraint: ValueConstraint,
    },
    /// `The type of attribute {attribute} must be {expected}`
    AttributeType { attribute: String, expected: String },
    /// `Its representation must have a {identifier} shape representation`
    RepresentationShape { identifier: String },
    /// `Its {identifier} shape representation must be of type {expected}`
    RepresentationType { identifier: String, expected: String },
}

/// One line of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Given(Given),
    Then(Then),
}

impl Step {
    #[must_use]
    pub fn is_then(&self) -> bool {
        matches!(self, Step::Then(_))
    }
}

impl From<Given> for Step {
    fn from(g: Given) -> Self {
        Step::Given(g)
    }
}

impl From<Then> for Step {
    fn from(t: Then) -> Self {
        Step::Then(t)
    }
}

fn direction_words(direction: Direction) -> (&'static str, &'static str) {
    match direction {
        Direction::FromTo => ("from", "to"),
        Direction::ToFrom => ("to", "from"),
    }
}

fn branch_words(branch: Option<&String>) -> String {
    branch.map(|b| format!(" of {b}")).unwrap_or_default()
}

impl fmt::Display for Given {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Given::Entity { entity } => write!(f, "An {entity}"),
            Given::AttributeEquals { attribute, value } => write!(f, "{attribute} = {value}"),
            Given::File { field, values } => {
                let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
                write!(f, "A file with {field} {}", quoted.join(" or "))
            }
            Given::Attribute {
                path,
                keep_instances,
            } => {
                let chain: Vec<String> = path.iter().map(|a| format!("attribute {a}")).collect();
                write!(f, "Its {}", chain.join(" and following that its "))?;
                if *keep_instances {
                    write!(f, ", keeping the instances")?;
                }
                Ok(())
            }
            Given::Relationship {
                relationship,
                direction,
                entity,
                other_entity,
            } => {
                let (a, b) = direction_words(*direction);
                write!(
                    f,
                    "A relationship {relationship} exists {a} {entity} {b} {other_entity}"
                )
            }
        }
    }
}

impl fmt::Display for Then {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Then::EdgeUse { oriented, count } => {
                let kind = if *oriented { "oriented edge" } else { "edge" };
                write!(
                    f,
                    "Every {kind} shall be referenced exactly {count} times by the loops of the face"
                )
            }
            Then::InstanceCount { op, count, entity } => write!(
                f,
                "There shall be {} {count} instance(s) of {entity}",
                op.keyword()
            ),
            Then::AssignedTo {
                related,
                relating,
                other_entity,
                present,
            } => {
                let condition = if *present { "is" } else { "is not" };
                write!(
                    f,
                    "The {related} must be assigned to the {relating} if {other_entity} {condition} present"
                )
            }
            Then::Contained {
                entity,
                condition,
                directness,
                structure,
            } => write!(
                f,
                "Each {entity} {condition} be {directness} contained in {structure}"
            ),
            Then::AsPerTable {
                relationship,
                table,
            } => write!(f, "It must be {relationship} as per {table}"),
            Then::NestCount {
                entity,
                condition,
                op,
                count,
                target,
            } => write!(
                f,
                "Each {entity} {condition} nest {} {count} instance(s) of {target}",
                op.keyword()
            ),
            Then::NestFragment {
                entity,
                fragment,
                target,
            } => write!(f, "Each {entity} {fragment} instance(s) of {target}"),
            Then::NestAllowList { entity, allowed } => write!(
                f,
                "Each {entity} may be nested by only the following entities: {}",
                allowed.join(", ")
            ),
            Then::Relationship {
                relationship,
                direction,
                entity,
                other_entity,
            } => {
                let (a, b) = direction_words(*direction);
                write!(
                    f,
                    "A relationship {relationship} must exist {a} {entity} {b} {other_entity}"
                )
            }
            Then::Value {
                scope,
                branch,
                constraint,
            } => {
                let noun = match scope {
                    ValueScope::Value => "value",
                    ValueScope::Values => "values",
                };
                write!(f, "The {noun}{} must {constraint}", branch_words(branch.as_ref()))
            }
            Then::ValueCount {
                count,
                branch,
                constraint,
            } => write!(
                f,
                "At least {count} value(s){} must {constraint}",
                branch_words(branch.as_ref())
            ),
            Then::AttributeType {
                attribute,
                expected,
            } => write!(f, "The type of attribute {attribute} must be {expected}"),
            Then::RepresentationShape { identifier } => write!(
                f,
                "Its representation must have a {identifier} shape representation"
            ),
            Then::RepresentationType {
                identifier,
                expected,
            } => write!(
                f,
                "Its {identifier} shape representation must be of type {expected}"
            ),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Given(g) => write!(f, "Given {g}"),
            Step::Then(t) => write!(f, "Then {t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_display() {
        let g = Given::Attribute {
            path: vec!["Representation".into(), "Representations".into()],
            keep_instances: false,
        };
        assert_eq!(
            g.to_string(),
            "Its attribute Representation and following that its attribute Representations"
        );
        let file = Given::File {
            field: "Schema Identifier".into(),
            values: vec!["IFC4X3".into(), "IFC4X3_ADD2".into()],
        };
        assert_eq!(
            file.to_string(),
            "A file with Schema Identifier \"IFC4X3\" or \"IFC4X3_ADD2\""
        );
    }

    #[test]
    fn then_display() {
        let t = Then::InstanceCount {
            op: CompareOp::Gte,
            count: 1,
            entity: "IfcWall".into(),
        };
        assert_eq!(t.to_string(), "There shall be at least 1 instance(s) of IfcWall");

        let frag = Then::NestFragment {
            entity: "IfcAlignment".into(),
            fragment: NestingFragment {
                direction: NestDirection::Nest,
                cardinality: NestCardinality::OnlyOne,
            },
            target: "IfcAlignmentHorizontal".into(),
        };
        assert_eq!(
            frag.to_string(),
            "Each IfcAlignment must nest only 1 instance(s) of IfcAlignmentHorizontal"
        );
    }

    #[test]
    fn step_kind() {
        let s = Step::from(Then::EdgeUse {
            oriented: false,
            count: 2,
        });
        assert!(s.is_then());
        assert!(!Step::from(Given::Entity { entity: "IfcWall".into() }).is_then());
    }
}
