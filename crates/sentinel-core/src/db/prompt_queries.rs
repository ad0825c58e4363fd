//! Prompt CRUD, lifecycle transitions and the append-only generated-test list.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use super::utils::{enum_column, id_column, json_column, timestamp_column};
use crate::{
    error::{DatabaseResultExt, PipelineError, Result},
    models::{
        Artifact, GeneratedTest, GeneratedTestRef, PromptFilter, PromptMetadata, PromptRecord,
        PromptStatus, StepModel, TestType,
    },
    params::{CreatePrompt, PromptField, UpdatePrompt},
};

const PROMPT_COLUMNS: &str = "id, title, prompt_content, test_type, status, base_url, environment_id, model, tags, additional_context, parsed_steps, created_at, updated_at";
const INSERT_PROMPT_SQL: &str = "INSERT INTO prompts (title, prompt_content, test_type, status, base_url, environment_id, model, tags, additional_context, parsed_steps, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
const UPDATE_DRAFT_PROMPT_SQL: &str = "UPDATE prompts SET title = ?1, prompt_content = ?2, test_type = ?3, base_url = ?4, environment_id = ?5, model = ?6, tags = ?7, additional_context = ?8, updated_at = ?9 WHERE id = ?10 AND status = 'draft'";
const UPDATE_PROMPT_STATUS_SQL: &str =
    "UPDATE prompts SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4";
const UPDATE_PARSED_STEPS_SQL: &str =
    "UPDATE prompts SET parsed_steps = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'active'";
const CHECK_ENVIRONMENT_EXISTS_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM environments WHERE id = ?1)";
const SELECT_PROMPT_STATUS_SQL: &str = "SELECT status FROM prompts WHERE id = ?1";
const TOUCH_PROMPT_SQL: &str = "UPDATE prompts SET updated_at = ?1 WHERE id = ?2";

const GENERATED_TEST_COLUMNS: &str =
    "id, prompt_id, sequence, test_name, file_path, fingerprint, environment_id, created_at, source_text";
const SELECT_LATEST_SEQUENCE_SQL: &str =
    "SELECT COALESCE(MAX(sequence), 0) FROM generated_tests WHERE prompt_id = ?1";
const INSERT_GENERATED_TEST_SQL: &str = "INSERT INTO generated_tests (prompt_id, sequence, test_name, file_path, fingerprint, source_text, environment_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

impl super::Database {
    /// Helper function to construct a PromptRecord from a database row.
    /// Generated tests are loaded separately.
    fn build_prompt_from_row(row: &rusqlite::Row) -> rusqlite::Result<PromptRecord> {
        let test_type = row
            .get::<_, Option<String>>(3)?
            .map(|raw| {
                raw.parse::<TestType>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })
            })
            .transpose()?;

        let tags: Option<String> = row.get(8)?;
        let tags = match tags {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    8,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            None => Vec::new(),
        };

        Ok(PromptRecord {
            id: id_column(row, 0)?,
            title: row.get(1)?,
            prompt_content: row.get(2)?,
            test_type,
            status: enum_column::<PromptStatus>(row, 4)?,
            base_url: row.get(5)?,
            environment_id: row.get::<_, Option<i64>>(6)?.map(|id| id as u64),
            model: row.get(7)?,
            tags,
            additional_context: row.get(9)?,
            metadata: PromptMetadata {
                parsed_steps: json_column::<Vec<StepModel>>(row, 10)?,
            },
            generated_tests: Vec::new(),
            created_at: timestamp_column(row, 11)?,
            updated_at: timestamp_column(row, 12)?,
        })
    }

    fn build_generated_test_from_row(row: &rusqlite::Row) -> rusqlite::Result<GeneratedTest> {
        Ok(GeneratedTest {
            reference: GeneratedTestRef {
                test_id: id_column(row, 0)?,
                prompt_id: id_column(row, 1)?,
                sequence: row.get::<_, i64>(2)? as u32,
                test_name: row.get(3)?,
                file_path: row.get(4)?,
                fingerprint: row.get(5)?,
                environment_id: row.get::<_, Option<i64>>(6)?.map(|id| id as u64),
                created_at: timestamp_column(row, 7)?,
            },
            source_text: row.get(8)?,
        })
    }

    fn check_environment_exists(&self, environment_id: Option<u64>) -> Result<()> {
        if let Some(id) = environment_id {
            let exists: bool = self
                .connection
                .query_row(CHECK_ENVIRONMENT_EXISTS_SQL, params![id as i64], |row| {
                    row.get(0)
                })
                .db_context("Failed to check environment existence")?;
            if !exists {
                return Err(PipelineError::EnvironmentNotFound { id });
            }
        }
        Ok(())
    }

    /// Creates a prompt in draft state.
    pub fn create_prompt(&mut self, prompt: &CreatePrompt) -> Result<PromptRecord> {
        if prompt.title.trim().is_empty() {
            return Err(PipelineError::invalid_input("title").with_reason("must not be empty"));
        }
        self.check_environment_exists(prompt.environment_id)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now();
        let now_str = now.to_string();
        let tags_json = serde_json::to_string(&prompt.tags)?;

        tx.execute(
            INSERT_PROMPT_SQL,
            params![
                prompt.title.trim(),
                prompt.prompt_content,
                prompt.test_type.map(|t| t.as_str()),
                PromptStatus::Draft.as_str(),
                prompt.base_url.as_deref(),
                prompt.environment_id.map(|id| id as i64),
                prompt.model.as_deref(),
                tags_json,
                prompt.additional_context.as_deref(),
                "[]",
                &now_str,
                &now_str
            ],
        )
        .db_context("Failed to insert prompt")?;

        let id = tx.last_insert_rowid() as u64;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(PromptRecord {
            id,
            title: prompt.title.trim().to_string(),
            prompt_content: prompt.prompt_content.clone(),
            test_type: prompt.test_type,
            status: PromptStatus::Draft,
            base_url: prompt.base_url.clone(),
            environment_id: prompt.environment_id,
            model: prompt.model.clone(),
            tags: prompt.tags.clone(),
            additional_context: prompt.additional_context.clone(),
            metadata: PromptMetadata::default(),
            generated_tests: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a prompt by its ID, with its generated-test references.
    pub fn get_prompt(&self, id: u64) -> Result<Option<PromptRecord>> {
        let query = format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = ?1");
        let mut prompt = self
            .connection
            .query_row(&query, params![id as i64], Self::build_prompt_from_row)
            .optional()
            .db_context("Failed to query prompt")?;

        // Eagerly load generated tests if prompt exists
        if let Some(ref mut prompt) = prompt {
            prompt.generated_tests = self.get_generated_tests(prompt.id)?;
        }

        Ok(prompt)
    }

    /// Reads just the lifecycle state of a prompt.
    pub fn get_prompt_status(&self, id: u64) -> Result<Option<PromptStatus>> {
        self.connection
            .query_row(SELECT_PROMPT_STATUS_SQL, params![id as i64], |row| {
                enum_column::<PromptStatus>(row, 0)
            })
            .optional()
            .db_context("Failed to query prompt status")
    }

    /// Lists prompts with optional filtering, newest first.
    pub fn list_prompts(&self, filter: Option<&PromptFilter>) -> Result<Vec<PromptRecord>> {
        let mut query = format!("SELECT {PROMPT_COLUMNS} FROM prompts");

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(f) = filter {
            if let Some(ref status) = f.status {
                conditions.push("status = ?");
                params_vec.push(Box::new(status.as_str().to_string()));
            }

            if let Some(ref test_type) = f.test_type {
                conditions.push("test_type = ?");
                params_vec.push(Box::new(test_type.as_str().to_string()));
            }

            if let Some(ref tag) = f.tag {
                conditions.push("EXISTS (SELECT 1 FROM json_each(prompts.tags) WHERE value = ?)");
                params_vec.push(Box::new(tag.clone()));
            }
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let mut prompts = stmt
            .query_map(&params_refs[..], Self::build_prompt_from_row)
            .db_context("Failed to query prompts")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect prompts")?;

        for prompt in &mut prompts {
            prompt.generated_tests = self.get_generated_tests(prompt.id)?;
        }

        Ok(prompts)
    }

    /// Applies an edit to a draft prompt.
    ///
    /// Returns `None` when the prompt does not exist or is no longer a draft;
    /// nothing is written in that case.
    pub fn update_draft_prompt(&mut self, update: &UpdatePrompt) -> Result<Option<PromptRecord>> {
        let Some(current) = self.get_prompt(update.id)? else {
            return Ok(None);
        };
        if current.status != PromptStatus::Draft {
            return Ok(None);
        }
        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(
                    PipelineError::invalid_input("title").with_reason("must not be empty")
                );
            }
        }
        for &field in &update.clear {
            if update.sets(field) {
                return Err(PipelineError::invalid_input(field.as_str())
                    .with_reason("cannot be set and cleared in one edit"));
            }
        }
        self.check_environment_exists(update.environment_id)?;
        let keep = |field: PromptField| !update.clear.contains(&field);

        let title = update
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.title);
        let prompt_content = update
            .prompt_content
            .as_deref()
            .unwrap_or(&current.prompt_content);
        let test_type = update
            .test_type
            .or(current.test_type.filter(|_| keep(PromptField::TestType)));
        let base_url = update
            .base_url
            .as_deref()
            .or(current.base_url.as_deref().filter(|_| keep(PromptField::BaseUrl)));
        let environment_id = update
            .environment_id
            .or(current.environment_id.filter(|_| keep(PromptField::EnvironmentId)));
        let model = update
            .model
            .as_deref()
            .or(current.model.as_deref().filter(|_| keep(PromptField::Model)));
        let tags = update.tags.as_ref().unwrap_or(&current.tags);
        let additional_context = update.additional_context.as_deref().or(current
            .additional_context
            .as_deref()
            .filter(|_| keep(PromptField::AdditionalContext)));

        let now_str = Timestamp::now().to_string();
        let changed = self
            .connection
            .execute(
                UPDATE_DRAFT_PROMPT_SQL,
                params![
                    title,
                    prompt_content,
                    test_type.map(|t| t.as_str()),
                    base_url,
                    environment_id.map(|id| id as i64),
                    model,
                    serde_json::to_string(tags)?,
                    additional_context,
                    &now_str,
                    update.id as i64
                ],
            )
            .db_context("Failed to update prompt")?;

        if changed == 0 {
            // Submitted by another writer between the read and the update
            return Ok(None);
        }

        self.get_prompt(update.id)
    }

    /// Atomically moves a prompt from `from` to `to`.
    ///
    /// Returns the updated prompt, or `None` if the prompt does not exist or
    /// was not in state `from`.
    pub fn transition_prompt(
        &mut self,
        id: u64,
        from: PromptStatus,
        to: PromptStatus,
    ) -> Result<Option<PromptRecord>> {
        let now_str = Timestamp::now().to_string();
        let changed = self
            .connection
            .execute(
                UPDATE_PROMPT_STATUS_SQL,
                params![to.as_str(), &now_str, id as i64, from.as_str()],
            )
            .db_context("Failed to update prompt status")?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_prompt(id)
    }

    /// Replaces the parsed steps of an active prompt.
    ///
    /// Returns `false` if the prompt does not exist or is not active.
    pub fn set_parsed_steps(&mut self, id: u64, steps: &[StepModel]) -> Result<bool> {
        let steps_json = serde_json::to_string(steps)?;
        let now_str = Timestamp::now().to_string();
        let changed = self
            .connection
            .execute(UPDATE_PARSED_STEPS_SQL, params![steps_json, &now_str, id as i64])
            .db_context("Failed to store parsed steps")?;
        Ok(changed > 0)
    }

    /// Appends a generated test to an active prompt.
    ///
    /// Runs under a write lock: the prompt's state is re-checked, the
    /// sequence is chosen (the latest one again with `regenerate`), `compile`
    /// builds the artifact for that sequence, and the reference is inserted.
    /// Returns `None` if the prompt is missing or not active.
    pub fn append_generated_test<F>(
        &mut self,
        prompt_id: u64,
        environment_id: Option<u64>,
        regenerate: bool,
        compile: F,
    ) -> Result<Option<GeneratedTest>>
    where
        F: FnOnce(u32) -> Result<Artifact>,
    {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let status: Option<PromptStatus> = tx
            .query_row(SELECT_PROMPT_STATUS_SQL, params![prompt_id as i64], |row| {
                enum_column::<PromptStatus>(row, 0)
            })
            .optional()
            .db_context("Failed to query prompt status")?;
        if status != Some(PromptStatus::Active) {
            return Ok(None);
        }

        let latest: i64 = tx
            .query_row(SELECT_LATEST_SEQUENCE_SQL, params![prompt_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to query latest sequence")?;
        let latest = latest as u32;
        let sequence = if regenerate && latest > 0 {
            latest
        } else {
            latest + 1
        };

        let artifact = compile(sequence)?;

        let now = Timestamp::now();
        let now_str = now.to_string();
        tx.execute(
            INSERT_GENERATED_TEST_SQL,
            params![
                prompt_id as i64,
                sequence as i64,
                artifact.test_name,
                artifact.file_path,
                artifact.fingerprint,
                artifact.source_text,
                environment_id.map(|id| id as i64),
                &now_str
            ],
        )
        .db_context("Failed to insert generated test")?;
        let test_id = tx.last_insert_rowid() as u64;

        tx.execute(TOUCH_PROMPT_SQL, params![&now_str, prompt_id as i64])
            .db_context("Failed to update prompt timestamp")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Some(GeneratedTest {
            reference: GeneratedTestRef {
                test_id,
                prompt_id,
                sequence,
                test_name: artifact.test_name,
                file_path: artifact.file_path,
                fingerprint: artifact.fingerprint,
                environment_id,
                created_at: now,
            },
            source_text: artifact.source_text,
        }))
    }

    /// Generated-test references of a prompt in append order.
    pub fn get_generated_tests(&self, prompt_id: u64) -> Result<Vec<GeneratedTestRef>> {
        let query = format!(
            "SELECT {GENERATED_TEST_COLUMNS} FROM generated_tests WHERE prompt_id = ?1 ORDER BY id"
        );
        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let tests = stmt
            .query_map(params![prompt_id as i64], Self::build_generated_test_from_row)
            .db_context("Failed to query generated tests")?
            .map(|r| r.map(|t| t.reference))
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect generated tests")?;

        Ok(tests)
    }

    /// Retrieves a generated test, including its source, by test ID.
    pub fn get_generated_test(&self, test_id: u64) -> Result<Option<GeneratedTest>> {
        let query = format!("SELECT {GENERATED_TEST_COLUMNS} FROM generated_tests WHERE id = ?1");
        self.connection
            .query_row(
                &query,
                params![test_id as i64],
                Self::build_generated_test_from_row,
            )
            .optional()
            .db_context("Failed to query generated test")
    }
}
