//! Prompt parsing: natural language to an ordered step sequence.
//!
//! [`StepParser`] sends the prompt to an [`InferenceCapability`] under a
//! bounded timeout, decodes the candidate payload, and repairs it:
//!
//! - markdown code fences around the payload are stripped
//! - the payload must be a JSON array of candidates or an object with a
//!   `steps` array
//! - action aliases are normalized, then each candidate is validated; invalid
//!   candidates and non-object entries are dropped with a warning
//! - if nothing survives, a single `navigate` to the base URL (or `/`) is
//!   synthesized, so a successful parse is never empty
//!
//! Order is preserved and nothing is deduplicated.

use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::{
    error::{PipelineError, Result},
    models::{CandidateStep, StepAction, StepModel, TestType},
};

pub mod http;
pub mod inference;

pub use http::HttpInference;
pub use inference::{InferenceCapability, InferenceRequest, StaticInference, UnconfiguredInference};

/// Default bound on a single inference call.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Hints passed along with the prompt text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseContext {
    pub test_type: Option<TestType>,
    pub base_url: Option<String>,
    pub additional_context: Option<String>,
    pub model: Option<String>,
}

/// Turns prompt text into validated steps through an inference capability.
#[derive(Clone)]
pub struct StepParser {
    inference: Arc<dyn InferenceCapability>,
    timeout: Duration,
}

impl StepParser {
    /// Parser using `inference` with the default timeout.
    pub fn new(inference: Arc<dyn InferenceCapability>) -> Self {
        Self {
            inference,
            timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }

    /// Overrides the inference timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current inference timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parses prompt text into an ordered, non-empty step sequence.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ParseFailure`] when the capability times out, fails,
    /// or returns a payload that is neither a JSON array nor an object with a
    /// `steps` array.
    pub async fn parse(&self, prompt_content: &str, context: &ParseContext) -> Result<Vec<StepModel>> {
        let request = InferenceRequest {
            text: prompt_content.to_string(),
            test_type: context.test_type,
            base_url: context.base_url.clone(),
            additional_context: context.additional_context.clone(),
            model: context.model.clone(),
        };

        debug!("Requesting step inference (timeout {:?})", self.timeout);
        let payload = match tokio::time::timeout(self.timeout, self.inference.infer(&request)).await
        {
            Ok(Ok(payload)) => payload,
            Ok(Err(PipelineError::ParseFailure { message })) => {
                return Err(PipelineError::ParseFailure { message })
            }
            Ok(Err(e)) => {
                return Err(PipelineError::parse_failure(format!(
                    "inference capability failed: {e}"
                )))
            }
            Err(_) => {
                return Err(PipelineError::parse_failure(format!(
                    "inference timed out after {}s",
                    self.timeout.as_secs_f64()
                )))
            }
        };

        let candidates = decode_payload(&payload)?;
        Ok(repair(&candidates, context.base_url.as_deref()))
    }
}

/// Removes a surrounding markdown code fence, if any.
///
/// Prefers a ```` ```json ```` fence and falls back to a bare one; text
/// without a closed fence is returned trimmed.
pub(crate) fn strip_markdown_fences(payload: &str) -> &str {
    let trimmed = payload.trim();

    if let Some(start) = trimmed.find("```json") {
        let body = &trimmed[start + 7..];
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let body = &trimmed[start + 3..];
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    trimmed
}

/// Decodes the raw payload into its candidate entries.
pub(crate) fn decode_payload(payload: &str) -> Result<Vec<Value>> {
    let body = strip_markdown_fences(payload);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        PipelineError::parse_failure(format!("inference payload is not valid JSON: {e}"))
    })?;

    match value {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut object) => match object.remove("steps") {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Err(PipelineError::parse_failure(
                "inference payload object has no 'steps' array",
            )),
        },
        other => Err(PipelineError::parse_failure(format!(
            "inference payload must be an array of steps, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// First present key among `keys`, coerced to a string.
fn field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
}

/// Reads one candidate entry, accepting the key spellings inference output
/// commonly uses.
fn candidate_from_value(value: &Value) -> Option<CandidateStep> {
    let object = value.as_object()?;
    let mut candidate = CandidateStep {
        action: field(object, &["action", "type", "command"]),
        target: field(object, &["target", "selector", "locator", "url"]),
        value: field(object, &["value", "text", "input"]),
        assertion: field(object, &["assertion", "expected", "expect"]),
    };

    // Assertions are often emitted as `{"action": "assert-text", "text": ..}`
    let is_assertion = candidate
        .action
        .as_deref()
        .and_then(|a| a.parse::<StepAction>().ok())
        .is_some_and(|a| a.is_assertion());
    if is_assertion && candidate.assertion.is_none() {
        candidate.assertion = candidate.value.take();
    }

    Some(candidate)
}

/// Validates candidates in order, dropping the invalid ones, and synthesizes
/// a navigation step if nothing survives.
pub(crate) fn repair(candidates: &[Value], base_url: Option<&str>) -> Vec<StepModel> {
    let total = candidates.len();
    let mut steps = Vec::with_capacity(total);

    for (index, entry) in candidates.iter().enumerate() {
        let Some(candidate) = candidate_from_value(entry) else {
            warn!("Dropping step candidate {index}: not an object");
            continue;
        };
        match StepModel::try_from(candidate) {
            Ok(step) => steps.push(step),
            Err(reason) => warn!("Dropping step candidate {index}: {reason}"),
        }
    }

    if steps.is_empty() {
        let target = base_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or("/");
        warn!("No valid steps among {total} candidates, synthesizing navigate to {target}");
        steps.push(StepModel::navigate(target));
    } else {
        debug!("Parsed {} of {total} step candidates", steps.len());
    }

    steps
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct SlowInference;

    #[async_trait]
    impl InferenceCapability for SlowInference {
        async fn infer(&self, _request: &InferenceRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("[]".to_string())
        }
    }

    fn parser(payload: &str) -> StepParser {
        StepParser::new(Arc::new(StaticInference::new(payload)))
    }

    fn context() -> ParseContext {
        ParseContext {
            test_type: Some(TestType::Ui),
            base_url: Some("https://example.test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(strip_markdown_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_markdown_fences("Here you go:\n```\n[2]\n```\nDone"), "[2]");
        assert_eq!(strip_markdown_fences("  [3]  "), "[3]");
    }

    #[test]
    fn test_decode_accepts_steps_object() {
        let entries = decode_payload(r#"{"steps": [{"action": "click"}]}"#).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_decode_rejects_non_array_payloads() {
        assert!(matches!(
            decode_payload("\"navigate\""),
            Err(PipelineError::ParseFailure { .. })
        ));
        assert!(matches!(
            decode_payload(r#"{"result": []}"#),
            Err(PipelineError::ParseFailure { .. })
        ));
        assert!(matches!(
            decode_payload("not json"),
            Err(PipelineError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_repair_drops_invalid_and_keeps_order() {
        let candidates = vec![
            json!({"action": "goto", "url": "/login"}),
            json!("click the button"),
            json!({"action": "fill", "selector": "#user", "text": "alice"}),
            json!({"action": "assertText", "target": "h1"}),
            json!({"action": "fly", "target": "#x"}),
            json!({"action": "assert_visible", "target": ".welcome", "expected": "visible"}),
            json!({"action": "expect-text", "target": "h1", "text": "Welcome"}),
        ];

        let steps = repair(&candidates, Some("https://example.test"));

        let actions: Vec<StepAction> = steps.iter().map(|s| s.action).collect();
        assert_eq!(
            actions,
            vec![
                StepAction::Navigate,
                StepAction::Fill,
                StepAction::AssertVisible,
                StepAction::AssertText
            ]
        );
        assert_eq!(steps[3].assertion.as_deref(), Some("Welcome"));
        assert_eq!(steps[3].value, None);
        assert_eq!(steps[0].target, "/login");
        assert_eq!(steps[1].value.as_deref(), Some("alice"));
    }

    #[test]
    fn test_repair_synthesizes_navigation_when_nothing_survives() {
        let steps = repair(&[json!({"action": "assert-text"})], Some("https://example.test"));
        assert_eq!(steps, vec![StepModel::navigate("https://example.test")]);

        let steps = repair(&[], None);
        assert_eq!(steps, vec![StepModel::navigate("/")]);
    }

    #[tokio::test]
    async fn test_parse_homepage_title_prompt() {
        let payload = r#"```json
[
  {"action": "navigate", "target": "/"},
  {"action": "assert-text", "target": "title", "assertion": "non-empty"}
]
```"#;
        let steps = parser(payload)
            .parse("Open homepage and check title", &context())
            .await
            .unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0], StepModel::navigate("/"));
        assert_eq!(steps[1].action, StepAction::AssertText);
        assert_eq!(steps[1].target, "title");
        assert_eq!(steps[1].assertion.as_deref(), Some("non-empty"));
    }

    #[tokio::test]
    async fn test_parse_never_returns_empty() {
        let steps = parser("[]").parse("anything", &context()).await.unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].action, StepAction::Navigate);
    }

    #[tokio::test]
    async fn test_parse_timeout_is_parse_failure() {
        let parser = StepParser::new(Arc::new(SlowInference)).with_timeout(Duration::from_millis(20));
        let err = parser.parse("anything", &context()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure { ref message } if message.contains("timed out")));
    }

    #[tokio::test]
    async fn test_unconfigured_inference_is_parse_failure() {
        let parser = StepParser::new(Arc::new(UnconfiguredInference));
        let err = parser.parse("anything", &context()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure { .. }));
    }
}
