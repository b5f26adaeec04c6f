use winnow::Parser;

use super::error::ParseError;
use super::grammar::{self, Keyword, Line};
use super::steps;
use crate::types::Step;

/// A scenario as written, before validation.
#[derive(Debug, Clone, Default)]
pub struct ParsedScenario {
    pub name: String,
    pub steps: Vec<Step>,
}

/// The result of parsing feature text.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeature {
    pub name: Option<String>,
    /// Steps run before every scenario.
    pub background: Vec<Step>,
    pub scenarios: Vec<ParsedScenario>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Background,
    Scenario,
}

pub(crate) fn parse_feature(input: &str) -> Result<ParsedFeature, ParseError> {
    let mut feature = ParsedFeature::default();
    let mut section = Section::Preamble;
    let mut previous: Option<Keyword> = None;

    for (index, raw) in input.lines().enumerate() {
        let number = index + 1;
        let text = raw.trim_start_matches('\u{feff}').trim();
        let line = grammar::line
            .parse(text)
            .map_err(|e| ParseError::new(e.to_string()).at_line(number))?;

        match line {
            Line::Blank | Line::Comment | Line::Tag => {}
            Line::Feature(name) => {
                if feature.name.is_some() {
                    return Err(ParseError::new("more than one Feature header").at_line(number));
                }
                feature.name = Some(name.to_owned());
            }
            Line::Background => {
                if !feature.scenarios.is_empty() {
                    return Err(
                        ParseError::new("Background must precede every Scenario").at_line(number)
                    );
                }
                section = Section::Background;
                previous = None;
            }
            Line::Scenario(name) => {
                feature.scenarios.push(ParsedScenario {
                    name: name.to_owned(),
                    steps: Vec::new(),
                });
                section = Section::Scenario;
                previous = None;
            }
            Line::Step(keyword, step_text) => {
                let resolved = match keyword {
                    Keyword::Given | Keyword::Then => keyword,
                    Keyword::And | Keyword::But => previous.ok_or_else(|| {
                        ParseError::new("'And'/'But' without a preceding step").at_line(number)
                    })?,
                };
                previous = Some(resolved);
                let step = parse_step(resolved, step_text).map_err(|e| e.at_line(number))?;
                match section {
                    Section::Preamble => {
                        return Err(
                            ParseError::new("step outside of a Scenario or Background")
                                .at_line(number),
                        );
                    }
                    Section::Background => feature.background.push(step),
                    Section::Scenario => {
                        if let Some(scenario) = feature.scenarios.last_mut() {
                            scenario.steps.push(step);
                        }
                    }
                }
            }
            // free text is only allowed as the feature description
            Line::Text(other) => {
                if section != Section::Preamble {
                    return Err(
                        ParseError::new(format!("unexpected line '{other}'")).at_line(number)
                    );
                }
            }
        }
    }
    Ok(feature)
}

pub(crate) fn parse_step(keyword: Keyword, text: &str) -> Result<Step, ParseError> {
    let parsed = match keyword {
        Keyword::Then => steps::then.parse(text).map(Step::Then),
        Keyword::Given | Keyword::And | Keyword::But => steps::given.parse(text).map(Step::Given),
    };
    parsed.map_err(|e| {
        let kind = if keyword == Keyword::Then { "Then" } else { "Given" };
        ParseError::new(format!("unrecognized {kind} step '{text}'\n{e}"))
    })
}
