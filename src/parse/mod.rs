mod error;
mod grammar;
mod parser;
mod steps;

use winnow::Parser;

use crate::types::{Given, NestingFragment, Then, ValueConstraint};

pub use error::ParseError;
pub use parser::{ParsedFeature, ParsedScenario};

/// Parse feature text into its background and scenarios.
///
/// # Errors
///
/// Returns [`ParseError`] (with the offending line) if a line is neither
/// structure, description nor a recognized step.
pub fn parse_feature(input: &str) -> Result<ParsedFeature, ParseError> {
    parser::parse_feature(input)
}

/// Parse the text of a Given step, without the keyword.
///
/// # Errors
///
/// Returns [`ParseError`] if the text matches no Given template.
pub fn parse_given(text: &str) -> Result<Given, ParseError> {
    steps::given
        .parse(text.trim())
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse the text of a Then step, without the keyword.
///
/// # Errors
///
/// Returns [`ParseError`] if the text matches no Then template.
pub fn parse_then(text: &str) -> Result<Then, ParseError> {
    steps::then
        .parse(text.trim())
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Decompose a nesting phrase such as `must be nested by only 1`.
///
/// # Errors
///
/// Returns [`ParseError`] for phrases outside the fragment grammar.
pub fn parse_nesting_fragment(text: &str) -> Result<NestingFragment, ParseError> {
    grammar::nesting_fragment
        .parse(text.trim())
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse the constraint part of a value check, e.g. `not be in 'ids.csv'`.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not a constraint.
pub fn parse_value_constraint(text: &str) -> Result<ValueConstraint, ParseError> {
    grammar::value_constraint
        .parse(text.trim())
        .map_err(|e| ParseError::new(e.to_string()))
}

pub(crate) fn parse_csv_record(line: &str) -> Result<Vec<String>, ParseError> {
    grammar::csv_record
        .parse(line)
        .map_err(|e| ParseError::new(e.to_string()))
}
