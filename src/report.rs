use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Outcome, Step};

/// How outcome records are rendered in a [`RuleFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One sentence per record.
    #[default]
    Text,
    /// One [`StructuredRecord`](crate::StructuredRecord) JSON object per record.
    Json,
}

impl ReportFormat {
    /// Render a single record.
    #[must_use]
    pub fn render(self, outcome: &Outcome) -> String {
        match self {
            ReportFormat::Text => outcome.to_string(),
            ReportFormat::Json => outcome
                .to_structured()
                .to_json()
                .unwrap_or_else(|_| outcome.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Not run because an earlier step failed.
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Passed => write!(f, "passed"),
            StepStatus::Failed => write!(f, "failed"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// The result of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    step: Step,
    status: StepStatus,
    outcomes: Vec<Outcome>,
}

impl StepReport {
    /// A step fails iff it produced at least one record that is not a success.
    pub(crate) fn evaluated(step: Step, outcomes: Vec<Outcome>) -> Self {
        let status = if outcomes.iter().all(Outcome::is_success) {
            StepStatus::Passed
        } else {
            StepStatus::Failed
        };
        Self {
            step,
            status,
            outcomes,
        }
    }

    pub(crate) fn skipped(step: Step) -> Self {
        Self {
            step,
            status: StepStatus::Skipped,
            outcomes: Vec::new(),
        }
    }

    #[must_use]
    pub fn step(&self) -> &Step {
        &self.step
    }

    #[must_use]
    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Every record produced by the step, successes included.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}

/// Detailed result of evaluating one scenario, returned by
/// [`Engine::check()`](crate::Engine::check).
#[derive(Debug, Clone)]
#[must_use]
pub struct ScenarioReport {
    scenario: String,
    applicable: bool,
    steps: Vec<StepReport>,
    duration: Duration,
}

impl ScenarioReport {
    pub(crate) fn new(
        scenario: String,
        applicable: bool,
        steps: Vec<StepReport>,
        duration: Duration,
    ) -> Self {
        Self {
            scenario,
            applicable,
            steps,
            duration,
        }
    }

    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Whether every precondition held. Inapplicable scenarios pass vacuously.
    #[must_use]
    pub fn applicable(&self) -> bool {
        self.applicable
    }

    #[must_use]
    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// Wall-clock duration of the evaluation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.status != StepStatus::Failed)
    }

    /// Violation records across all steps, in step order.
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes().filter(|o| !o.is_success())
    }

    /// Success records, present only when passed rules are reported.
    pub fn successes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes().filter(|o| o.is_success())
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.steps.iter().flat_map(|s| s.outcomes.iter())
    }

    /// Turn a failed scenario into an error carrying every violation.
    ///
    /// # Errors
    ///
    /// Returns [`RuleFailure`] if any step failed.
    pub fn into_result(self, format: ReportFormat) -> Result<Self, RuleFailure> {
        if self.passed() {
            return Ok(self);
        }
        let lines = self.failures().map(|o| format.render(o)).collect();
        Err(RuleFailure {
            scenario: self.scenario,
            lines,
        })
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "passed" } else { "failed" };
        write!(f, "scenario: {}, {status}", self.scenario)?;
        if !self.applicable {
            write!(f, " (not applicable)")?;
        }
        write!(f, ", failures: {}", self.failures().count())?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}

/// A scenario that produced violations.
#[derive(Debug, Clone, Error)]
#[error("Errors occurred:\n{}", .lines.join("\n"))]
pub struct RuleFailure {
    scenario: String,
    lines: Vec<String>,
}

impl RuleFailure {
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Rendered records, one per violation.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
