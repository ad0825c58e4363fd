//! The inference capability contract and its in-process implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result},
    models::TestType,
};

/// Input handed to the inference capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRequest {
    /// Natural-language test description
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_type: Option<TestType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// External capability that turns a prompt into a candidate step payload.
///
/// Implementations return the raw payload text (a JSON array of candidate
/// steps, or an object with a `steps` array, possibly wrapped in a markdown
/// code fence). Decoding and repair happen in [`super::StepParser`].
#[async_trait]
pub trait InferenceCapability: Send + Sync {
    /// Produces the raw candidate payload for a request.
    ///
    /// # Errors
    ///
    /// Any transport or upstream failure. The parser reports it as a
    /// [`PipelineError::ParseFailure`].
    async fn infer(&self, request: &InferenceRequest) -> Result<String>;
}

/// Capability that always answers with the same payload.
///
/// Used when steps are authored by hand (`--steps-file`) and in tests.
#[derive(Debug, Clone)]
pub struct StaticInference {
    payload: String,
}

impl StaticInference {
    /// Capability returning `payload` for every request.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Loads the payload from a file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| PipelineError::FileSystem {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(payload))
    }
}

#[async_trait]
impl InferenceCapability for StaticInference {
    async fn infer(&self, _request: &InferenceRequest) -> Result<String> {
        Ok(self.payload.clone())
    }
}

/// Capability used when none has been configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredInference;

#[async_trait]
impl InferenceCapability for UnconfiguredInference {
    async fn infer(&self, _request: &InferenceRequest) -> Result<String> {
        Err(PipelineError::Configuration {
            message: "no inference capability configured (set --inference-url or --steps-file)"
                .to_string(),
        })
    }
}
