//! Check outcome types.
//!
//! Each pipeline step records a [`StepOutcome`]; the run as a whole
//! produces a [`CheckResult`] carrying the message and exit status.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CheckError;
use crate::manifest::PackageReference;
use crate::version::{VersionRequirement, VersionTriple};

/// The steps of a contract check, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStep {
    Import,
    Shape,
    VersionRead,
    VersionParse,
    VersionCompare,
    Factory,
}

impl CheckStep {
    /// Human-readable step name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Shape => "shape",
            Self::VersionRead => "version read",
            Self::VersionParse => "version parse",
            Self::VersionCompare => "version comparison",
            Self::Factory => "factory",
        }
    }
}

/// How a single step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step's assertion held.
    Passed,
    /// The step hit a tolerated problem (factory throw in lenient mode).
    Informational,
    /// The step hit a tolerated problem worth flagging.
    Warning,
    /// The step failed; the run stopped here.
    Failed,
}

impl StepStatus {
    /// Whether the run may continue past this step.
    pub fn can_proceed(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Record of one executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: CheckStep,
    pub status: StepStatus,
    pub message: String,
}

impl StepOutcome {
    pub fn new(step: CheckStep, status: StepStatus, message: impl Into<String>) -> Self {
        Self {
            step,
            status,
            message: message.into(),
        }
    }
}

/// Aggregate result of a check run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Whether every fatal step passed.
    pub passed: bool,
    /// Final human-readable message.
    pub message: String,
    /// Process exit status: 0 on success, 1 on failure.
    pub exit_code: i32,
    /// Taxonomy label of the fatal error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub package: PackageReference,
    pub required: VersionRequirement,
    /// Installed version, once it has been read and parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<VersionTriple>,
    /// The step that stopped the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<CheckStep>,
    /// Executed steps in order; steps after a failure are absent.
    pub steps: Vec<StepOutcome>,
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// A passing result.
    pub fn success(
        package: PackageReference,
        required: VersionRequirement,
        found: Option<VersionTriple>,
        steps: Vec<StepOutcome>,
    ) -> Self {
        let message = format!("All checks passed! {} is ready for use.", package.name);
        Self {
            passed: true,
            message,
            exit_code: 0,
            error_kind: None,
            package,
            required,
            found,
            failed_step: None,
            steps,
            checked_at: Utc::now(),
        }
    }

    /// A failing result for `error`.
    pub fn failure(
        error: &CheckError,
        package: PackageReference,
        required: VersionRequirement,
        found: Option<VersionTriple>,
        steps: Vec<StepOutcome>,
    ) -> Self {
        let failed_step = steps
            .iter()
            .find(|s| !s.status.can_proceed())
            .map(|s| s.step);
        Self {
            passed: false,
            message: error.to_string(),
            exit_code: error.exit_code(),
            error_kind: Some(error.kind().to_string()),
            package,
            required,
            found,
            failed_step,
            steps,
            checked_at: Utc::now(),
        }
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
