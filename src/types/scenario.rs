use std::fmt;
use std::path::Path;

use super::error::CompileError;
use super::step::{Given, Step, Then};

/// Builder for constructing a [`Scenario`] from typed steps.
///
/// # Example
///
/// ```
/// use ifcheck::{CompareOp, Given, ScenarioBuilder, Then};
///
/// let scenario = ScenarioBuilder::new("walls exist")
///     .given(Given::Entity { entity: "IfcWall".into() })
///     .then(Then::InstanceCount { op: CompareOp::Gte, count: 1, entity: "IfcWall".into() })
///     .compile()
///     .unwrap();
/// assert_eq!(scenario.steps().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ScenarioBuilder {
    name: String,
    steps: Vec<Step>,
}

impl ScenarioBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn given(self, given: Given) -> Self {
        self.step(given)
    }

    #[must_use]
    pub fn then(self, then: Then) -> Self {
        self.step(then)
    }

    #[must_use]
    pub fn step(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Validate the steps into a `Scenario`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if the scenario has no Then step or names an
    /// unknown file field or relationship keyword.
    pub fn compile(self) -> Result<Scenario, CompileError> {
        crate::compile::compile(self.name, self.steps)
    }
}

/// A validated, immutable scenario. Thread-safe and cheap to share behind `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub(crate) name: String,
    pub(crate) steps: Vec<Step>,
}

impl Scenario {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps in execution order, background steps first.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.name)?;
        for step in &self.steps {
            writeln!(f, "  {step}")?;
        }
        Ok(())
    }
}

/// A validated feature file.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub(crate) name: Option<String>,
    pub(crate) scenarios: Vec<Scenario>,
}

impl Feature {
    /// Parse feature text and validate every scenario.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`](crate::CheckError) on parse or compile failure.
    pub fn from_text(input: &str) -> Result<Self, crate::CheckError> {
        let parsed = crate::parse::parse_feature(input)?;
        let feature = crate::compile::compile_feature(parsed)?;
        Ok(feature)
    }

    /// Read a feature file and validate every scenario.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`](crate::CheckError) on I/O, parse, or compile failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::CheckError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_text(&input)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Look up a scenario by name.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}
