use std::fmt;

use serde::{Deserialize, Serialize};

use super::Value;

/// Comparison operators supported by count and value constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Map a rule keyword to its operator.
    ///
    /// The table is fixed: `is`, `equal to` and `exactly` are equality, `is not`
    /// is inequality, `at least`/`at most` are inclusive bounds and
    /// `more than`/`less than` are strict bounds.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let op = match keyword.trim() {
            "is" | "equal to" | "exactly" => CompareOp::Eq,
            "is not" | "not equal to" => CompareOp::Neq,
            "at least" => CompareOp::Gte,
            "at most" => CompareOp::Lte,
            "more than" => CompareOp::Gt,
            "less than" => CompareOp::Lt,
            _ => return None,
        };
        Some(op)
    }

    /// Apply the operator to two counts.
    #[must_use]
    pub fn holds(self, lhs: usize, rhs: usize) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Neq => lhs != rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Gte => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Lte => lhs <= rhs,
        }
    }

    /// The operator accepting exactly the values this one rejects.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Neq,
            CompareOp::Neq => CompareOp::Eq,
            CompareOp::Gt => CompareOp::Lte,
            CompareOp::Gte => CompareOp::Lt,
            CompareOp::Lt => CompareOp::Gte,
            CompareOp::Lte => CompareOp::Gt,
        }
    }

    /// The rule keyword this operator is rendered as.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            CompareOp::Eq => "exactly",
            CompareOp::Neq => "not",
            CompareOp::Gt => "more than",
            CompareOp::Gte => "at least",
            CompareOp::Lt => "less than",
            CompareOp::Lte => "at most",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// Whether a rule requires (`must`) or forbids (`must not`) its relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Must,
    MustNot,
}

impl Condition {
    #[must_use]
    pub fn expects(self) -> bool {
        self == Condition::Must
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Must => write!(f, "must"),
            Condition::MustNot => write!(f, "must not"),
        }
    }
}

/// How a containment relation may be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directness {
    Directly,
    Indirectly,
    DirectlyOrIndirectly,
    IndirectlyOrDirectly,
}

impl Directness {
    /// The set of single directness values this qualifier accepts.
    #[must_use]
    pub fn accepted(self) -> &'static [Directness] {
        match self {
            Directness::Directly => &[Directness::Directly],
            Directness::Indirectly => &[Directness::Indirectly],
            Directness::DirectlyOrIndirectly | Directness::IndirectlyOrDirectly => {
                &[Directness::Directly, Directness::Indirectly]
            }
        }
    }
}

impl fmt::Display for Directness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directness::Directly => write!(f, "directly"),
            Directness::Indirectly => write!(f, "indirectly"),
            Directness::DirectlyOrIndirectly => write!(f, "directly or indirectly"),
            Directness::IndirectlyOrDirectly => write!(f, "indirectly or directly"),
        }
    }
}

/// A predicate over attribute values, the parsed form of "The value must ...".
#[derive(Debug, Clone, PartialEq)]
pub enum ValueConstraint {
    /// Membership in (or, negated, exclusion from) an inline literal set.
    OneOf { values: Vec<Value>, negated: bool },
    /// Keyword comparison against a single literal.
    Compare { op: CompareOp, value: Value },
    /// Membership in a single-column lookup table.
    InTable { table: String, negated: bool },
}

impl ValueConstraint {
    /// Evaluate against an in-memory value list. Table constraints are resolved
    /// by the evaluator, which passes the loaded column as `table_values`.
    #[must_use]
    pub fn accepts(&self, value: &Value, table_values: &[Value]) -> bool {
        match self {
            ValueConstraint::OneOf { values, negated } => values.contains(value) != *negated,
            ValueConstraint::Compare { op, value: expected } => {
                value.compare(*op, expected).unwrap_or(false)
            }
            ValueConstraint::InTable { negated, .. } => {
                table_values.iter().any(|t| t.compare(CompareOp::Eq, value) == Some(true))
                    != *negated
            }
        }
    }
}

impl fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConstraint::OneOf { values, negated } => {
                let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
                let prefix = if *negated { "not " } else { "" };
                write!(f, "{prefix}be {}", joined.join(" or "))
            }
            ValueConstraint::Compare { op, value } => write!(f, "be {} {value}", op.keyword()),
            ValueConstraint::InTable { table, negated } => {
                let prefix = if *negated { "not " } else { "" };
                write!(f, "{prefix}be in '{table}'")
            }
        }
    }
}
