use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::evaluate::run_step;
use crate::model::Model;
use crate::report::{ReportFormat, ScenarioReport, StepReport, StepStatus};
use crate::tables::TableCache;
use crate::types::{EvalError, Feature, RuleEvaluationContext, Scenario};
use crate::CheckError;

/// Engine settings. Every field has a default, so partial JSON files load.
///
/// # Example
///
/// ```
/// use ifcheck::{EngineConfig, ReportFormat};
///
/// let config = EngineConfig::new()
///     .resource_dir("resources")
///     .error_on_passed_rule(true)
///     .format(ReportFormat::Json);
/// assert!(config.error_on_passed_rule);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory lookup tables are resolved against.
    pub resource_dir: PathBuf,
    /// Also emit a success record for every instance that passes a check.
    pub error_on_passed_rule: bool,
    pub format: ReportFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("resources"),
            error_on_passed_rule: false,
            format: ReportFormat::Text,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = dir.into();
        self
    }

    #[must_use]
    pub fn error_on_passed_rule(mut self, enabled: bool) -> Self {
        self.error_on_passed_rule = enabled;
        self
    }

    #[must_use]
    pub fn format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// # Errors
    ///
    /// Returns [`CheckError::Json`] if `json` is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, CheckError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CheckError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] on I/O or serialization failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Evaluates scenarios against models.
///
/// Owns its configuration and a table cache, so one engine per worker thread;
/// scenarios and models are shared read-only.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    tables: TableCache,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let tables = TableCache::new(&config.resource_dir);
        Self { config, tables }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every step of `scenario` in order, stopping at the first failing
    /// step. Later steps are reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if a step is malformed for this model (for
    /// example unsupported geometry) or a lookup table cannot be loaded.
    pub fn check<M: Model + ?Sized>(
        &mut self,
        scenario: &Scenario,
        model: &M,
    ) -> Result<ScenarioReport, EvalError> {
        let span = info_span!("scenario", name = %scenario.name());
        let _guard = span.enter();
        let start = Instant::now();

        let mut ctx = RuleEvaluationContext::new(self.config.error_on_passed_rule);
        let mut steps = Vec::with_capacity(scenario.steps().len());
        let mut failed = false;
        for step in scenario.steps() {
            if failed {
                steps.push(StepReport::skipped(step.clone()));
                continue;
            }
            let outcomes = run_step(step, &mut ctx, model, &mut self.tables)?;
            let report = StepReport::evaluated(step.clone(), outcomes);
            debug!(step = %step, status = %report.status(), records = report.outcomes().len(), "step evaluated");
            failed = report.status() == StepStatus::Failed;
            steps.push(report);
        }

        let report = ScenarioReport::new(
            scenario.name().to_owned(),
            ctx.is_applicable(),
            steps,
            start.elapsed(),
        );
        info!(
            passed = report.passed(),
            applicable = report.applicable(),
            failures = report.failures().count(),
            "scenario evaluated"
        );
        Ok(report)
    }

    /// Check every scenario of a feature, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvalError`] encountered.
    pub fn check_feature<M: Model + ?Sized>(
        &mut self,
        feature: &Feature,
        model: &M,
    ) -> Result<Vec<ScenarioReport>, EvalError> {
        feature
            .scenarios()
            .iter()
            .map(|s| self.check(s, model))
            .collect()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
