use winnow::ascii::{digit1, space0, space1};
use winnow::combinator::{alt, delimited, eof, opt, preceded, repeat, separated, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, rest, take_till, take_while};

use crate::types::{
    CompareOp, NestCardinality, NestDirection, NestingFragment, Value, ValueConstraint,
};

// -- Whitespace & words -----------------------------------------------------

pub(crate) fn sp(input: &mut &str) -> ModalResult<()> {
    space1.void().parse_next(input)
}

/// Match the words of `text` separated by runs of blanks.
pub(crate) fn phrase<'i>(text: &'static str) -> impl Parser<&'i str, (), ErrMode<ContextError>> {
    move |input: &mut &'i str| -> ModalResult<()> {
        for (i, mut word) in text.split(' ').enumerate() {
            if i > 0 {
                sp.parse_next(input)?;
            }
            word.parse_next(input)?;
        }
        Ok(())
    }
}

/// Entity, attribute and relationship names.
pub(crate) fn name(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .map(str::to_owned)
        .context(StrContext::Expected(StrContextValue::Description("name")))
        .parse_next(input)
}

pub(crate) fn count(input: &mut &str) -> ModalResult<usize> {
    digit1
        .parse_to()
        .context(StrContext::Expected(StrContextValue::Description("count")))
        .parse_next(input)
}

fn token<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !c.is_whitespace() && c != ',' && c != '"' && c != '\'')
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

pub(crate) fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\'' => s.push('\''),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

/// Interpret an unquoted word the way rule authors write literals.
fn classify(word: &str) -> Value {
    match word {
        "True" | "true" | ".T." => return Value::Bool(true),
        "False" | "false" | ".F." => return Value::Bool(false),
        "None" | "$" => return Value::Null,
        _ => {}
    }
    let numeric = word
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    if numeric && word.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(i) = word.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = word.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::String(word.to_owned())
}

pub(crate) fn literal(input: &mut &str) -> ModalResult<Value> {
    alt((string_literal.map(Value::String), token.map(classify)))
        .context(StrContext::Expected(StrContextValue::Description("value")))
        .parse_next(input)
}

/// `'A' or 'B'`, `"A", "B"`, `A or B`.
pub(crate) fn literal_set(input: &mut &str) -> ModalResult<Vec<Value>> {
    separated(1.., literal, (space0, alt((",", "or")), space0)).parse_next(input)
}

/// A reference to a lookup table file, quoted or bare.
pub(crate) fn table_ref(input: &mut &str) -> ModalResult<String> {
    alt((
        string_literal.verify(|s: &str| s.ends_with(".csv")),
        token
            .verify(|s: &str| s.ends_with(".csv"))
            .map(str::to_owned),
    ))
    .parse_next(input)
}

// -- Value constraints ------------------------------------------------------

fn comparison_keyword(input: &mut &str) -> ModalResult<CompareOp> {
    // longest keywords first
    alt((
        phrase("is not").value(CompareOp::Neq),
        phrase("not equal to").value(CompareOp::Neq),
        phrase("equal to").value(CompareOp::Eq),
        phrase("exactly").value(CompareOp::Eq),
        phrase("more than").value(CompareOp::Gt),
        phrase("less than").value(CompareOp::Lt),
        phrase("at least").value(CompareOp::Gte),
        phrase("at most").value(CompareOp::Lte),
        phrase("is").value(CompareOp::Eq),
    ))
    .parse_next(input)
}

/// The text after `must` in a value check.
///
/// Leading `not `, `be ` and `in ` words are stripped in any order (a `not`
/// negates); what remains is a table reference, a keyword comparison or a
/// literal set.
pub(crate) fn value_constraint(input: &mut &str) -> ModalResult<ValueConstraint> {
    let mut negated = false;
    loop {
        if opt(("not", sp)).parse_next(input)?.is_some() {
            negated = !negated;
        } else if opt((alt(("be", "in")), sp)).parse_next(input)?.is_none() {
            break;
        }
    }
    let parsed = alt((
        table_ref.map(|table| ValueConstraint::InTable { table, negated }),
        (comparison_keyword, sp, literal).map(|(op, _, value)| ValueConstraint::Compare {
            op: if negated { op.negate() } else { op },
            value,
        }),
        literal_set.map(|values| ValueConstraint::OneOf { values, negated }),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "value constraint",
    )))
    .parse_next(input);
    parsed
}

// -- Nesting fragments ------------------------------------------------------

/// `[must] (nest|nests|is nested by|be nested by) (only 1|a list of only)`
pub(crate) fn nesting_fragment(input: &mut &str) -> ModalResult<NestingFragment> {
    opt(("must", sp)).parse_next(input)?;
    let direction = alt((
        phrase("is nested by").value(NestDirection::NestedBy),
        phrase("be nested by").value(NestDirection::NestedBy),
        "nests".value(NestDirection::Nest),
        "nest".value(NestDirection::Nest),
    ))
    .parse_next(input)?;
    sp.parse_next(input)?;
    let cardinality = alt((
        phrase("only 1").value(NestCardinality::OnlyOne),
        phrase("a list of only").value(NestCardinality::ListOfOnly),
    ))
    .parse_next(input)?;
    Ok(NestingFragment {
        direction,
        cardinality,
    })
}

// -- CSV --------------------------------------------------------------------

fn csv_quoted(input: &mut &str) -> ModalResult<String> {
    delimited(
        '"',
        repeat(0.., alt(("\"\"".value('"'), none_of('"')))),
        '"',
    )
    .parse_next(input)
}

fn csv_field(input: &mut &str) -> ModalResult<String> {
    delimited(
        space0,
        alt((
            csv_quoted,
            take_till(0.., ',').map(|s: &str| s.trim().to_owned()),
        )),
        space0,
    )
    .parse_next(input)
}

/// One comma-separated record; quoted fields may contain commas and `""`.
pub(crate) fn csv_record(input: &mut &str) -> ModalResult<Vec<String>> {
    terminated(separated(1.., csv_field, ','), eof).parse_next(input)
}

// -- Feature lines ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Given,
    Then,
    And,
    But,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line<'i> {
    Blank,
    Comment,
    Tag,
    Feature(&'i str),
    Background,
    Scenario(&'i str),
    Step(Keyword, &'i str),
    Text(&'i str),
}

fn keyword(input: &mut &str) -> ModalResult<Keyword> {
    alt((
        "Given".value(Keyword::Given),
        "Then".value(Keyword::Then),
        "And".value(Keyword::And),
        "But".value(Keyword::But),
    ))
    .parse_next(input)
}

/// Classify one trimmed line of a feature file.
pub(crate) fn line<'i>(input: &mut &'i str) -> ModalResult<Line<'i>> {
    alt((
        eof.value(Line::Blank),
        preceded('#', rest).value(Line::Comment),
        preceded('@', rest).value(Line::Tag),
        preceded(("Feature:", space0), rest).map(|s: &str| Line::Feature(s.trim())),
        preceded("Background:", rest).value(Line::Background),
        preceded(("Scenario:", space0), rest).map(|s: &str| Line::Scenario(s.trim())),
        (keyword, sp, rest).map(|(k, (), text): (Keyword, (), &str)| Line::Step(k, text.trim())),
        rest.map(Line::Text),
    ))
    .parse_next(input)
}
