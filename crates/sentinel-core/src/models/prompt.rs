//! Prompt model definition and generated-test references.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{PromptStatus, StepModel, TestType};

/// Parse results attached to a prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptMetadata {
    /// Ordered steps derived from the prompt content (empty before parsing)
    #[serde(default)]
    pub parsed_steps: Vec<StepModel>,
}

/// Reference to a test artifact generated from a prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedTestRef {
    /// Unique identifier of the generated test
    pub test_id: u64,

    /// ID of the prompt the test was generated from
    pub prompt_id: u64,

    /// Generation sequence number within the prompt (1-based)
    pub sequence: u32,

    /// Deterministic test name
    pub test_name: String,

    /// Deterministic relative path of the test file
    pub file_path: String,

    /// Fingerprint of the generation inputs
    pub fingerprint: String,

    /// Environment the test was compiled against, if one was stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<u64>,

    /// Timestamp when the reference was appended (UTC)
    pub created_at: Timestamp,
}

/// A generated-test reference together with the source it was stored with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedTest {
    #[serde(flatten)]
    pub reference: GeneratedTestRef,

    /// Test source text as compiled at generation time
    pub source_text: String,
}

/// A stored natural-language test description and its generation provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRecord {
    /// Unique identifier for the prompt
    pub id: u64,

    /// Short human-readable title
    pub title: String,

    /// Natural-language test description
    pub prompt_content: String,

    /// Kind of test described (required before submission)
    pub test_type: Option<TestType>,

    /// Lifecycle state
    #[serde(default)]
    pub status: PromptStatus,

    /// URL the test targets; falls back to the environment's BASE_URL
    pub base_url: Option<String>,

    /// Default environment for generation
    pub environment_id: Option<u64>,

    /// Inference model hint
    pub model: Option<String>,

    /// Free-form labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Extra hints passed to inference
    pub additional_context: Option<String>,

    /// Parse results
    #[serde(default)]
    pub metadata: PromptMetadata,

    /// Append-only list of generated tests
    #[serde(default)]
    pub generated_tests: Vec<GeneratedTestRef>,

    /// Timestamp when the prompt was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the prompt was last modified (UTC)
    pub updated_at: Timestamp,
}

impl PromptRecord {
    /// Sequence number the next generated test should use.
    ///
    /// With `regenerate`, the latest sequence is reused so the regenerated
    /// artifact lands on the same name and path.
    pub fn next_sequence(&self, regenerate: bool) -> u32 {
        let latest = self
            .generated_tests
            .iter()
            .map(|t| t.sequence)
            .max()
            .unwrap_or(0);
        if regenerate && latest > 0 {
            latest
        } else {
            latest + 1
        }
    }
}
