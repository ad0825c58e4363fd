//! Test result model and the execution outcome it is finished with.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ResultStatus;

/// Kind of file attached to a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Screenshot,
    Video,
    Trace,
    Log,
}

/// A file produced while executing a test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub path: String,
}

/// Execution detail for one step of a test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// Position of the step in the executed sequence (0-indexed)
    pub index: u32,

    /// Action that was executed
    pub action: String,

    /// Target the action addressed
    #[serde(default)]
    pub target: String,

    pub status: ResultStatus,

    #[serde(default)]
    pub duration_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Path of a screenshot taken at this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// One record per executed test instance.
///
/// Created in `running` state, finished exactly once, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    /// Unique identifier for the result
    pub id: u64,

    /// Identifier of the executed test
    pub test_id: String,

    /// Suite the result belongs to
    pub test_suite_id: u64,

    /// Environment the test ran in
    pub environment_id: u64,

    /// Run the result is part of
    pub run_id: String,

    /// Suite file the test lives in
    pub file_path: String,

    pub status: ResultStatus,

    pub start_time: Timestamp,

    pub end_time: Option<Timestamp>,

    /// `end_time - start_time` in milliseconds, once finished
    pub duration_ms: Option<i64>,

    /// Per-step execution detail in execution order
    #[serde(default)]
    pub steps: Vec<StepResult>,

    #[serde(default)]
    pub attachments: Vec<Attachment>,

    pub error_message: Option<String>,
}

impl TestResult {
    /// Whether the result has been finished.
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Screenshot attachments plus per-step screenshots.
    pub fn screenshots(&self) -> impl Iterator<Item = &str> {
        self.attachments
            .iter()
            .filter(|a| a.kind == AttachmentKind::Screenshot)
            .map(|a| a.path.as_str())
            .chain(self.steps.iter().filter_map(|s| s.screenshot.as_deref()))
    }
}

/// Handle returned by `start`; owns the result until it is finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ResultHandle {
    pub result_id: u64,
}

/// Per-test outcome reported by the execution engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// Final status (passed, failed or skipped)
    pub status: ResultStatus,

    /// Engine-reported end time; defaults to the time `finish` is called
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub end_time: Option<Timestamp>,

    #[serde(default)]
    pub step_results: Vec<StepResult>,

    #[serde(default)]
    pub attachments: Vec<Attachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ExecutionOutcome {
    /// Outcome with only a status.
    pub fn with_status(status: ResultStatus) -> Self {
        Self {
            status,
            end_time: None,
            step_results: Vec::new(),
            attachments: Vec::new(),
            error_message: None,
        }
    }
}
