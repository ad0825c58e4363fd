//! Artifact generation.
//!
//! [`ArtifactGenerator`] compiles a validated step sequence and an
//! environment configuration into a runnable Playwright test module. It is
//! pure: identical inputs always give byte-identical source text and the same
//! fingerprint.

use sha2::{Digest, Sha256};

use crate::{
    error::{PipelineError, Result},
    models::{Artifact, EnvironmentConfig, StepModel},
};

mod compile;

/// Prompt-level inputs that name the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMeta {
    /// Prompt the artifact is generated from
    pub prompt_id: u64,
    /// Generation sequence within the prompt (1-based)
    pub sequence: u32,
    /// Human-readable title used in the test description
    pub title: Option<String>,
}

impl PromptMeta {
    /// Deterministic test name.
    pub fn test_name(&self) -> String {
        format!("prompt-{}-test-{}", self.prompt_id, self.sequence)
    }

    /// Deterministic relative file path.
    pub fn file_path(&self) -> String {
        format!(
            "tests/generated/prompt-{}/test-{:03}.spec.ts",
            self.prompt_id, self.sequence
        )
    }
}

/// Compiles step sequences into Playwright test artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactGenerator;

impl ArtifactGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Compiles `steps` against `env`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidInput`] for an empty step list, a step that
    /// fails validation, or a zero sequence number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sentinel_core::{
    ///     generator::{ArtifactGenerator, PromptMeta},
    ///     models::{EnvironmentConfig, StepModel},
    /// };
    ///
    /// let env = EnvironmentConfig::for_base_url("https://example.test");
    /// let meta = PromptMeta { prompt_id: 4, sequence: 1, title: None };
    /// let artifact = ArtifactGenerator::new()
    ///     .generate(&[StepModel::navigate("/")], &env, &meta)
    ///     .unwrap();
    ///
    /// assert_eq!(artifact.test_name, "prompt-4-test-1");
    /// assert_eq!(artifact.file_path, "tests/generated/prompt-4/test-001.spec.ts");
    /// assert!(artifact.source_text.contains("await page.goto('/');"));
    /// ```
    pub fn generate(
        &self,
        steps: &[StepModel],
        env: &EnvironmentConfig,
        meta: &PromptMeta,
    ) -> Result<Artifact> {
        if steps.is_empty() {
            return Err(PipelineError::invalid_input("steps")
                .with_reason("cannot generate a test from an empty step list"));
        }
        if meta.sequence == 0 {
            return Err(PipelineError::invalid_input("sequence").with_reason("must start at 1"));
        }
        for (index, step) in steps.iter().enumerate() {
            step.validate().map_err(|reason| {
                PipelineError::invalid_input("steps").with_reason(format!("step {index}: {reason}"))
            })?;
        }

        let test_name = meta.test_name();
        let source_text =
            compile::render_module(&test_name, meta.title.as_deref(), steps, env);

        Ok(Artifact {
            source_text,
            fingerprint: fingerprint(steps, env),
            test_name,
            file_path: meta.file_path(),
        })
    }
}

/// Hex SHA-256 over the ordered canonical steps and the environment's
/// `BASE_URL` and `BROWSER`.
pub fn fingerprint(steps: &[StepModel], env: &EnvironmentConfig) -> String {
    let mut hasher = Sha256::new();
    for step in steps {
        hasher.update(step.canonical().as_bytes());
    }
    hasher.update(b"BASE_URL\x1f");
    hasher.update(env.base_url().unwrap_or_default().as_bytes());
    hasher.update(b"\x1eBROWSER\x1f");
    hasher.update(env.browser.as_bytes());
    hasher.update(b"\x1e");
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepAction;

    fn steps() -> Vec<StepModel> {
        vec![
            StepModel::navigate("/"),
            StepModel::new(
                StepAction::AssertText,
                "title",
                None,
                Some("non-empty".to_string()),
            )
            .unwrap(),
        ]
    }

    fn meta() -> PromptMeta {
        PromptMeta {
            prompt_id: 12,
            sequence: 3,
            title: Some("Open homepage and check title".to_string()),
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let env = EnvironmentConfig::for_base_url("https://example.test");
        let generator = ArtifactGenerator::new();

        let first = generator.generate(&steps(), &env, &meta()).unwrap();
        let second = generator.generate(&steps(), &env, &meta()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.fingerprint.len(), 64);
        assert_eq!(first.test_name, "prompt-12-test-3");
        assert_eq!(first.file_path, "tests/generated/prompt-12/test-003.spec.ts");
        assert!(first
            .source_text
            .contains("test('prompt-12-test-3: Open homepage and check title'"));
        assert!(first
            .source_text
            .contains("await expect(page.locator('title')).toContainText('non-empty');"));
        assert!(first.source_text.contains("baseURL: 'https://example.test'"));
    }

    #[test]
    fn test_fingerprint_tracks_steps_and_environment() {
        let env = EnvironmentConfig::for_base_url("https://example.test");
        let base = fingerprint(&steps(), &env);

        let mut reordered = steps();
        reordered.reverse();
        assert_ne!(fingerprint(&reordered, &env), base);

        let other_url = EnvironmentConfig::for_base_url("https://staging.example.test");
        assert_ne!(fingerprint(&steps(), &other_url), base);

        let other_browser = EnvironmentConfig {
            browser: "firefox".to_string(),
            ..env.clone()
        };
        assert_ne!(fingerprint(&steps(), &other_browser), base);

        // Settings outside BASE_URL and BROWSER do not move the fingerprint
        let slower = EnvironmentConfig {
            timeout_ms: 90_000,
            retries: 2,
            ..env.clone()
        };
        assert_eq!(fingerprint(&steps(), &slower), base);
    }

    #[test]
    fn test_rejects_empty_and_invalid_steps() {
        let env = EnvironmentConfig::default();
        let generator = ArtifactGenerator::new();

        let err = generator.generate(&[], &env, &meta()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));

        let invalid = StepModel {
            action: StepAction::AssertTitle,
            target: String::new(),
            value: None,
            assertion: None,
        };
        let err = generator.generate(&[invalid], &env, &meta()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { ref field, .. } if field == "steps"));
    }
}
