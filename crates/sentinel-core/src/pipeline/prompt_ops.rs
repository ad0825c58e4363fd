//! Prompt lifecycle operations: draft, active, archived.
//!
//! Only these operations change a prompt's status. Parsing and generation
//! require an active prompt; editing requires a draft.

use std::path::{Path, PathBuf};

use log::{debug, info};

use super::Pipeline;
use crate::{
    db::Database,
    error::{PipelineError, Result},
    generator::PromptMeta,
    models::{
        EnvironmentConfig, GeneratedTest, PromptFilter, PromptRecord, PromptStatus, StepModel,
    },
    params::{CreatePrompt, GenerateTest, Id, UpdatePrompt},
    parser::ParseContext,
};

/// Error for an operation attempted on a prompt in the wrong state, or on a
/// prompt that does not exist.
fn lifecycle_error(
    db: &Database,
    id: u64,
    operation: &str,
    expected: PromptStatus,
) -> PipelineError {
    match db.get_prompt_status(id) {
        Ok(Some(actual)) => PipelineError::InvalidLifecycleState {
            id,
            operation: operation.to_string(),
            expected,
            actual,
        },
        Ok(None) => PipelineError::PromptNotFound { id },
        Err(e) => e,
    }
}

fn require_status(
    prompt: &PromptRecord,
    operation: &str,
    expected: PromptStatus,
) -> Result<()> {
    if prompt.status == expected {
        Ok(())
    } else {
        Err(PipelineError::InvalidLifecycleState {
            id: prompt.id,
            operation: operation.to_string(),
            expected,
            actual: prompt.status,
        })
    }
}

/// Environment configuration a prompt compiles against, if it names one.
fn prompt_environment(db: &Database, environment_id: Option<u64>) -> Result<Option<EnvironmentConfig>> {
    match environment_id {
        Some(id) => db
            .get_environment(id)?
            .map(|env| Some(env.config))
            .ok_or(PipelineError::EnvironmentNotFound { id }),
        None => Ok(None),
    }
}

/// The prompt's own base URL, falling back to its environment's.
fn effective_base_url(prompt: &PromptRecord, env: Option<&EnvironmentConfig>) -> Option<String> {
    prompt
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| env.and_then(EnvironmentConfig::base_url))
        .map(String::from)
}

impl Pipeline {
    /// Creates a prompt in draft state.
    pub async fn create_prompt(&self, params: &CreatePrompt) -> Result<PromptRecord> {
        let params = params.clone();
        let prompt = self
            .with_db(move |db| db.create_prompt(&params))
            .await?;
        info!("Created prompt {} as draft", prompt.id);
        Ok(prompt)
    }

    /// Retrieves a prompt by its ID.
    pub async fn get_prompt(&self, params: &Id) -> Result<Option<PromptRecord>> {
        let id = params.id;
        self.with_db(move |db| db.get_prompt(id)).await
    }

    /// Retrieves a prompt, failing if it does not exist.
    pub async fn require_prompt(&self, id: u64) -> Result<PromptRecord> {
        self.get_prompt(&Id { id })
            .await?
            .ok_or(PipelineError::PromptNotFound { id })
    }

    /// Lists prompts with optional filtering.
    pub async fn list_prompts(&self, filter: Option<PromptFilter>) -> Result<Vec<PromptRecord>> {
        self.with_db(move |db| db.list_prompts(filter.as_ref())).await
    }

    /// Edits a draft prompt. Fields left as `None` are unchanged and fields
    /// named in `clear` are emptied.
    pub async fn update_prompt(&self, params: &UpdatePrompt) -> Result<PromptRecord> {
        let params = params.clone();
        self.with_db(move |db| match db.update_draft_prompt(&params)? {
            Some(prompt) => Ok(prompt),
            None => Err(lifecycle_error(db, params.id, "update", PromptStatus::Draft)),
        })
        .await
    }

    /// Moves a draft prompt to active.
    ///
    /// The prompt needs non-empty content, a test type, and a base URL of its
    /// own or from its environment; otherwise
    /// [`PipelineError::IncompletePromptState`] lists what is missing.
    /// The check and the transition share one write transaction.
    pub async fn submit_prompt(&self, params: &Id) -> Result<PromptRecord> {
        let id = params.id;
        let prompt = self
            .with_db(move |db| {
                db.immediate(|db| {
                    let prompt = db
                        .get_prompt(id)?
                        .ok_or(PipelineError::PromptNotFound { id })?;
                    require_status(&prompt, "submit", PromptStatus::Draft)?;

                    let env = prompt_environment(db, prompt.environment_id)?;
                    let mut missing = Vec::new();
                    if prompt.prompt_content.trim().is_empty() {
                        missing.push("prompt_content".to_string());
                    }
                    if prompt.test_type.is_none() {
                        missing.push("test_type".to_string());
                    }
                    if effective_base_url(&prompt, env.as_ref()).is_none() {
                        missing.push("base_url".to_string());
                    }
                    if !missing.is_empty() {
                        return Err(PipelineError::IncompletePromptState { id, missing });
                    }

                    db.transition_prompt(id, PromptStatus::Draft, PromptStatus::Active)?
                        .ok_or_else(|| lifecycle_error(db, id, "submit", PromptStatus::Draft))
                })
            })
            .await?;

        info!("Prompt {id} submitted");
        Ok(prompt)
    }

    /// Moves an active prompt to archived. Archived is terminal.
    pub async fn archive_prompt(&self, params: &Id) -> Result<PromptRecord> {
        let id = params.id;
        let prompt = self
            .with_db(move |db| {
                db.transition_prompt(id, PromptStatus::Active, PromptStatus::Archived)?
                    .ok_or_else(|| lifecycle_error(db, id, "archive", PromptStatus::Active))
            })
            .await?;

        info!("Prompt {id} archived");
        Ok(prompt)
    }

    /// Parses an active prompt into steps and stores them as its parsed
    /// steps, replacing any earlier parse.
    pub async fn parse_prompt(&self, params: &Id) -> Result<Vec<StepModel>> {
        let prompt = self.require_prompt(params.id).await?;
        require_status(&prompt, "parse", PromptStatus::Active)?;
        self.parse_and_store(&prompt).await
    }

    async fn parse_and_store(&self, prompt: &PromptRecord) -> Result<Vec<StepModel>> {
        let environment_id = prompt.environment_id;
        let env = self
            .with_db(move |db| prompt_environment(db, environment_id))
            .await?;

        let context = ParseContext {
            test_type: prompt.test_type,
            base_url: effective_base_url(prompt, env.as_ref()),
            additional_context: prompt.additional_context.clone(),
            model: prompt.model.clone(),
        };

        debug!("Parsing prompt {}", prompt.id);
        let steps = self.parser.parse(&prompt.prompt_content, &context).await?;

        let id = prompt.id;
        let stored = steps.clone();
        self.with_db(move |db| {
            if db.set_parsed_steps(id, &stored)? {
                Ok(())
            } else {
                Err(lifecycle_error(db, id, "parse", PromptStatus::Active))
            }
        })
        .await?;

        info!("Prompt {id} parsed into {} steps", steps.len());
        Ok(steps)
    }

    /// Generates a test artifact from an active prompt and appends its
    /// reference to the prompt.
    ///
    /// The prompt is parsed first if it has no parsed steps. The artifact is
    /// compiled against the requested environment, else the prompt's, else a
    /// default configuration built from the prompt's base URL. With
    /// `output_dir`, the source is also written to
    /// `<output_dir>/<file_path>`.
    pub async fn generate_test(&self, params: &GenerateTest) -> Result<GeneratedTest> {
        let prompt = self.require_prompt(params.prompt_id).await?;
        require_status(&prompt, "generate", PromptStatus::Active)?;

        let steps = if prompt.metadata.parsed_steps.is_empty() {
            self.parse_and_store(&prompt).await?
        } else {
            prompt.metadata.parsed_steps.clone()
        };

        let environment_id = params.environment_id.or(prompt.environment_id);
        let env = self
            .with_db(move |db| prompt_environment(db, environment_id))
            .await?;
        let config = match env {
            Some(mut config) => {
                if config.base_url().is_none() {
                    config.base_url = prompt.base_url.clone();
                }
                config
            }
            None => prompt
                .base_url
                .clone()
                .map(EnvironmentConfig::for_base_url)
                .unwrap_or_default(),
        };

        let generator = self.generator;
        let prompt_id = prompt.id;
        let title = Some(prompt.title.clone());
        let regenerate = params.regenerate;
        let generated = self
            .with_db(move |db| {
                db.append_generated_test(prompt_id, environment_id, regenerate, |sequence| {
                    let meta = PromptMeta {
                        prompt_id,
                        sequence,
                        title,
                    };
                    generator.generate(&steps, &config, &meta)
                })?
                .ok_or_else(|| lifecycle_error(db, prompt_id, "generate", PromptStatus::Active))
            })
            .await?;

        info!(
            "Generated {} for prompt {prompt_id} (fingerprint {})",
            generated.reference.test_name, generated.reference.fingerprint
        );

        if let Some(ref dir) = params.output_dir {
            let path = PathBuf::from(dir).join(&generated.reference.file_path);
            write_source(&path, &generated.source_text).await?;
            debug!("Wrote {}", path.display());
        }

        Ok(generated)
    }

    /// Retrieves a generated test and its source by test ID.
    pub async fn get_generated_test(&self, params: &Id) -> Result<Option<GeneratedTest>> {
        let id = params.id;
        self.with_db(move |db| db.get_generated_test(id)).await
    }
}

async fn write_source(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PipelineError::FileSystem {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, source)
        .await
        .map_err(|source| PipelineError::FileSystem {
            path: path.to_path_buf(),
            source,
        })
}
