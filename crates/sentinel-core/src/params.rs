//! Parameter structures for pipeline operations
//!
//! These structures are shared by every interface (CLI, MCP) and carry no
//! framework-specific derives beyond serde and the optional JSON schema.
//!
//! ## Parameter Wrapper Pattern
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Interface layers define their own argument structs (clap `Args`, or a
//! transparent serde wrapper for MCP) and convert into these types with
//! `From`, so the core stays independent of any front end.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{EnvironmentConfig, ExecutionOutcome, PromptStatus, TestType};

/// Generic parameters for operations requiring just an ID.
///
/// Used for show/submit/archive/parse of prompts, suites, results and
/// environments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for creating an environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateEnvironment {
    /// Unique environment name
    pub name: String,
    /// Configuration bag (BASE_URL, BROWSER, TIMEOUT, RETRIES, HEADLESS, ...)
    #[serde(default)]
    pub config: EnvironmentConfig,
}

/// Parameters for creating a prompt in draft state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePrompt {
    /// Short title
    pub title: String,
    /// Natural-language test description
    pub prompt_content: String,
    /// UI, API or E2E (required before submission)
    pub test_type: Option<TestType>,
    /// URL the test targets
    pub base_url: Option<String>,
    /// Default environment for generation
    pub environment_id: Option<u64>,
    /// Inference model hint
    pub model: Option<String>,
    /// Free-form labels
    #[serde(default)]
    pub tags: Vec<String>,
    /// Extra hints passed to inference
    pub additional_context: Option<String>,
}

/// Optional prompt fields an edit can reset to empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum PromptField {
    TestType,
    BaseUrl,
    EnvironmentId,
    Model,
    AdditionalContext,
}

impl PromptField {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptField::TestType => "test_type",
            PromptField::BaseUrl => "base_url",
            PromptField::EnvironmentId => "environment_id",
            PromptField::Model => "model",
            PromptField::AdditionalContext => "additional_context",
        }
    }
}

/// Parameters for editing a draft prompt.
///
/// `None` leaves a field unchanged; fields listed in `clear` are emptied.
/// Setting and clearing the same field in one edit is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdatePrompt {
    /// Prompt to edit
    pub id: u64,
    pub title: Option<String>,
    pub prompt_content: Option<String>,
    pub test_type: Option<TestType>,
    pub base_url: Option<String>,
    pub environment_id: Option<u64>,
    pub model: Option<String>,
    pub tags: Option<Vec<String>>,
    pub additional_context: Option<String>,
    /// Optional fields to reset to empty
    #[serde(default)]
    pub clear: Vec<PromptField>,
}

impl UpdatePrompt {
    /// Whether this edit assigns a new value to `field`.
    pub fn sets(&self, field: PromptField) -> bool {
        match field {
            PromptField::TestType => self.test_type.is_some(),
            PromptField::BaseUrl => self.base_url.is_some(),
            PromptField::EnvironmentId => self.environment_id.is_some(),
            PromptField::Model => self.model.is_some(),
            PromptField::AdditionalContext => self.additional_context.is_some(),
        }
    }
}

/// Parameters for listing prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListPrompts {
    /// Only prompts in this state; all states when omitted
    pub status: Option<PromptStatus>,
    /// Only prompts of this test type
    pub test_type: Option<TestType>,
    /// Only prompts carrying this tag
    pub tag: Option<String>,
}

/// Parameters for generating a test artifact from an active prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct GenerateTest {
    /// Prompt to generate from
    pub prompt_id: u64,
    /// Environment to compile against; defaults to the prompt's environment
    pub environment_id: Option<u64>,
    /// Reuse the latest sequence number (same test name and path)
    #[serde(default)]
    pub regenerate: bool,
    /// Directory the source file is written under, if any
    pub output_dir: Option<String>,
}

/// Parameters for creating a test suite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateSuite {
    /// Unique suite name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Parameters for registering a file in a suite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddTestFile {
    /// Suite to register the file in
    pub suite_id: u64,
    /// Display name; defaults to the last path component
    pub file_name: Option<String>,
    /// Path results are reported against
    pub file_path: String,
    /// Number of tests in the file
    #[serde(default = "default_test_count")]
    pub test_count: u32,
}

fn default_test_count() -> u32 {
    1
}

/// Parameters for registering a generated test's file in a suite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AttachGeneratedTest {
    /// Suite to register the file in
    pub suite_id: u64,
    /// Generated test to attach
    pub test_id: u64,
}

/// Parameters for starting a test execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StartExecution {
    /// Identifier of the test being executed
    pub test_id: String,
    /// Suite the result belongs to
    pub test_suite_id: u64,
    /// Environment the test runs in
    pub environment_id: u64,
    /// Run the execution is part of
    pub run_id: String,
    /// Registered suite file the test lives in
    pub file_path: String,
}

/// Parameters for finishing a test execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FinishExecution {
    /// Result returned by start
    pub result_id: u64,
    /// Outcome reported by the execution engine
    pub outcome: ExecutionOutcome,
}

/// Parameters for aggregating a run into suite history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RecordRun {
    /// Suite the run belongs to
    pub suite_id: u64,
    /// Run to aggregate
    pub run_id: String,
    /// Location of an external report, if one was produced
    pub report_path: Option<String>,
}

/// Parameters for listing test results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListResults {
    /// Suite to list results for
    pub suite_id: u64,
    /// Only results of this run
    pub run_id: Option<String>,
}
