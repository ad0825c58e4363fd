//! Handler operations that return display wrapper types.
//!
//! Both front ends (CLI and MCP) call these so list and update output stays
//! identical across interfaces.

use super::Pipeline;
use crate::{
    display::{
        CreateResult, Environments, OperationStatus, Prompts, RunHistory, Steps, Suites,
        TestResults, UpdateResult,
    },
    error::Result,
    models::{PromptFilter, PromptRecord, PromptStatus, TestResult},
    params::{FinishExecution, Id, ListPrompts, ListResults, StartExecution, UpdatePrompt},
};

impl Pipeline {
    /// Handle listing prompts with optional filtering.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use sentinel_core::{params::ListPrompts, PipelineBuilder};
    /// # async {
    /// let pipeline = PipelineBuilder::new().build().await?;
    /// let prompts = pipeline.list_prompts_summary(&ListPrompts::default()).await?;
    /// println!("{prompts}");
    /// # Result::<(), sentinel_core::PipelineError>::Ok(())
    /// # };
    /// ```
    pub async fn list_prompts_summary(&self, params: &ListPrompts) -> Result<Prompts> {
        let filter = Some(PromptFilter::from(params));
        Ok(Prompts(self.list_prompts(filter).await?))
    }

    /// Handle editing a draft prompt, listing which fields changed.
    pub async fn update_prompt_result(
        &self,
        params: &UpdatePrompt,
    ) -> Result<UpdateResult<PromptRecord>> {
        let prompt = self.update_prompt(params).await?;

        let mut changes = Vec::new();
        if params.title.is_some() {
            changes.push("Updated title".to_string());
        }
        if params.prompt_content.is_some() {
            changes.push("Updated prompt content".to_string());
        }
        if let Some(test_type) = params.test_type {
            changes.push(format!("Set test type to {test_type}"));
        }
        if params.base_url.is_some() {
            changes.push("Updated base URL".to_string());
        }
        if let Some(env) = params.environment_id {
            changes.push(format!("Set environment to {env}"));
        }
        if params.model.is_some() {
            changes.push("Updated model".to_string());
        }
        if params.tags.is_some() {
            changes.push("Updated tags".to_string());
        }
        if params.additional_context.is_some() {
            changes.push("Updated additional context".to_string());
        }

        Ok(UpdateResult::with_changes(prompt, changes))
    }

    /// Handle submitting a prompt with a confirmation message.
    pub async fn submit_prompt_status(&self, params: &Id) -> Result<OperationStatus> {
        let prompt = self.submit_prompt(params).await?;
        Ok(OperationStatus::prompt_transition(&prompt, PromptStatus::Draft))
    }

    /// Handle archiving a prompt with a confirmation message.
    pub async fn archive_prompt_status(&self, params: &Id) -> Result<OperationStatus> {
        let prompt = self.archive_prompt(params).await?;
        Ok(OperationStatus::prompt_transition(&prompt, PromptStatus::Active))
    }

    /// Handle parsing a prompt, returning the numbered steps.
    pub async fn parse_prompt_steps(&self, params: &Id) -> Result<Steps> {
        Ok(Steps(self.parse_prompt(params).await?))
    }

    /// Handle listing environments.
    pub async fn list_environments_summary(&self) -> Result<Environments> {
        Ok(Environments(self.list_environments().await?))
    }

    /// Handle listing suites.
    pub async fn list_suites_summary(&self) -> Result<Suites> {
        Ok(Suites(self.list_suites().await?))
    }

    /// Handle showing a suite's run history.
    pub async fn run_history_summary(&self, params: &Id) -> Result<RunHistory> {
        Ok(RunHistory(self.get_run_history(params).await?))
    }

    /// Handle starting an execution, returning the created record.
    pub async fn start_execution_result(
        &self,
        params: &StartExecution,
    ) -> Result<CreateResult<TestResult>> {
        Ok(CreateResult::new(self.start_execution_record(params).await?))
    }

    /// Handle finishing an execution.
    pub async fn finish_execution_result(
        &self,
        params: &FinishExecution,
    ) -> Result<UpdateResult<TestResult>> {
        let result = self.finish_execution(params).await?;
        let changes = vec![format!("Status set to {}", result.status)];
        Ok(UpdateResult::with_changes(result, changes))
    }

    /// Handle listing results of a suite or run.
    pub async fn list_results_summary(&self, params: &ListResults) -> Result<TestResults> {
        Ok(TestResults(self.list_results(params).await?))
    }
}
