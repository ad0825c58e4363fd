//! Status and classification enumerations for prompts, files, runs and results.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum PromptStatus {
    /// Prompt is being written and may still be edited
    #[default]
    Draft,

    /// Prompt has been submitted; steps and tests may be generated from it
    Active,

    /// Prompt is retired; terminal state
    Archived,
}

impl FromStr for PromptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PromptStatus::Draft),
            "active" => Ok(PromptStatus::Active),
            "archived" => Ok(PromptStatus::Archived),
            _ => Err(format!("Invalid prompt status: {s}")),
        }
    }
}

impl PromptStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStatus::Draft => "draft",
            PromptStatus::Active => "active",
            PromptStatus::Archived => "archived",
        }
    }
}

/// Kind of test a prompt describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum TestType {
    /// Browser-driven user interface test
    Ui,
    /// HTTP API test
    Api,
    /// End-to-end flow across pages and services
    E2e,
}

impl FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ui" => Ok(TestType::Ui),
            "api" => Ok(TestType::Api),
            "e2e" => Ok(TestType::E2e),
            _ => Err(format!("Invalid test type: {s}")),
        }
    }
}

impl TestType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Ui => "UI",
            TestType::Api => "API",
            TestType::E2e => "E2E",
        }
    }
}

/// Status of a single executed test instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Passed,
    Failed,
    Skipped,
    Pending,
    Running,
}

impl FromStr for ResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passed" | "pass" => Ok(ResultStatus::Passed),
            "failed" | "fail" => Ok(ResultStatus::Failed),
            "skipped" | "skip" => Ok(ResultStatus::Skipped),
            "pending" => Ok(ResultStatus::Pending),
            "running" => Ok(ResultStatus::Running),
            _ => Err(format!("Invalid result status: {s}")),
        }
    }
}

impl ResultStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Passed => "passed",
            ResultStatus::Failed => "failed",
            ResultStatus::Skipped => "skipped",
            ResultStatus::Pending => "pending",
            ResultStatus::Running => "running",
        }
    }

    /// Whether a result in this status has been finished.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResultStatus::Passed | ResultStatus::Failed | ResultStatus::Skipped
        )
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// ```rust
    /// use sentinel_core::models::ResultStatus;
    ///
    /// assert_eq!(ResultStatus::Passed.with_icon(), "✓ Passed");
    /// assert_eq!(ResultStatus::Failed.with_icon(), "✗ Failed");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            ResultStatus::Passed => "✓ Passed",
            ResultStatus::Failed => "✗ Failed",
            ResultStatus::Skipped => "⤼ Skipped",
            ResultStatus::Pending => "○ Pending",
            ResultStatus::Running => "➤ Running",
        }
    }
}

/// Derived status of a file registered in a test suite.
///
/// Ordered by severity so the worst status of a run wins:
/// `Failed > Skipped > Passed > NotRun`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    #[default]
    NotRun,
    Passed,
    Skipped,
    Failed,
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not-run" | "notrun" => Ok(FileStatus::NotRun),
            "passed" => Ok(FileStatus::Passed),
            "skipped" => Ok(FileStatus::Skipped),
            "failed" => Ok(FileStatus::Failed),
            _ => Err(format!("Invalid file status: {s}")),
        }
    }
}

impl FileStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::NotRun => "not-run",
            FileStatus::Passed => "passed",
            FileStatus::Skipped => "skipped",
            FileStatus::Failed => "failed",
        }
    }

    /// File status contributed by a single result, if any.
    ///
    /// Results that have not finished do not contribute.
    pub fn from_result(status: ResultStatus) -> Option<Self> {
        match status {
            ResultStatus::Passed => Some(FileStatus::Passed),
            ResultStatus::Skipped => Some(FileStatus::Skipped),
            ResultStatus::Failed => Some(FileStatus::Failed),
            ResultStatus::Pending | ResultStatus::Running => None,
        }
    }
}

/// Overall status of a recorded run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every finished result passed or was skipped
    Passed,
    /// At least one result failed
    Failed,
    /// No failures, but some results never finished
    Incomplete,
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passed" => Ok(RunStatus::Passed),
            "failed" => Ok(RunStatus::Failed),
            "incomplete" => Ok(RunStatus::Incomplete),
            _ => Err(format!("Invalid run status: {s}")),
        }
    }
}

impl RunStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "passed",
            RunStatus::Failed => "failed",
            RunStatus::Incomplete => "incomplete",
        }
    }
}
