//! HTTP inference capability.

use async_trait::async_trait;

use super::inference::{InferenceCapability, InferenceRequest};
use crate::error::{PipelineError, Result};

/// Inference capability backed by an HTTP endpoint.
///
/// The request is POSTed as JSON; the response body is returned verbatim as
/// the candidate payload.
pub struct HttpInference {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpInference {
    /// Capability posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Sends `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceCapability for HttpInference {
    async fn infer(&self, request: &InferenceRequest) -> Result<String> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await.map_err(|e| {
            PipelineError::parse_failure(format!("inference request failed: {e}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PipelineError::parse_failure(format!("failed to read inference response: {e}"))
        })?;

        if !status.is_success() {
            return Err(PipelineError::parse_failure(format!(
                "inference endpoint returned {status}: {body}"
            )));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::models::TestType;

    fn request() -> InferenceRequest {
        InferenceRequest {
            text: "Open homepage and check title".to_string(),
            test_type: Some(TestType::Ui),
            base_url: Some("https://example.test".to_string()),
            additional_context: None,
            model: Some("steps-v1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_posts_request_and_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/infer")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({
                "text": "Open homepage and check title",
                "testType": "UI",
                "baseUrl": "https://example.test",
                "model": "steps-v1"
            })))
            .with_status(200)
            .with_body(r#"[{"action":"navigate","target":"/"}]"#)
            .create_async()
            .await;

        let inference =
            HttpInference::new(format!("{}/infer", server.url())).with_api_key("secret");
        let body = inference.infer(&request()).await.unwrap();

        assert_eq!(body, r#"[{"action":"navigate","target":"/"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_parse_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/infer")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let inference = HttpInference::new(format!("{}/infer", server.url()));
        let err = inference.infer(&request()).await.unwrap_err();

        assert!(matches!(err, PipelineError::ParseFailure { .. }));
        assert!(err.to_string().contains("overloaded"));
    }
}
