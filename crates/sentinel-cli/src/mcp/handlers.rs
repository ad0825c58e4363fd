//! MCP tool handlers

use std::{fmt::Display, sync::Arc};

use log::debug;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        Prompt, PromptArgument, PromptMessage, PromptMessageContent, PromptMessageRole,
    },
    ErrorData,
};
use schemars::JsonSchema;
use sentinel_core::{display::CreateResult, params as core, Pipeline, PipelineError};
use serde::Deserialize;

use super::{errors::to_mcp_error, prompts::get_prompt_templates};

/// Transparent wrapper giving core parameter types the serde and schema
/// impls the MCP tool router needs.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type CreateEnvironment = McpParams<core::CreateEnvironment>;
pub type CreatePrompt = McpParams<core::CreatePrompt>;
pub type UpdatePrompt = McpParams<core::UpdatePrompt>;
pub type ListPrompts = McpParams<core::ListPrompts>;
pub type GenerateTest = McpParams<core::GenerateTest>;
pub type CreateSuite = McpParams<core::CreateSuite>;
pub type AddTestFile = McpParams<core::AddTestFile>;
pub type AttachGeneratedTest = McpParams<core::AttachGeneratedTest>;
pub type StartExecution = McpParams<core::StartExecution>;
pub type FinishExecution = McpParams<core::FinishExecution>;
pub type RecordRun = McpParams<core::RecordRun>;
pub type ListResults = McpParams<core::ListResults>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl Display) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    pipeline: Arc<Pipeline>,
}

impl McpHandlers {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    // ------------------------------------------------------------------
    // Environments
    // ------------------------------------------------------------------

    pub async fn create_environment(
        &self,
        Parameters(params): Parameters<CreateEnvironment>,
    ) -> McpResult {
        debug!("create_environment: {params:?}");
        let env = self
            .pipeline
            .create_environment(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create environment", e))?;
        text(CreateResult::new(env))
    }

    pub async fn list_environments(&self) -> McpResult {
        debug!("list_environments");
        let environments = self
            .pipeline
            .list_environments_summary()
            .await
            .map_err(|e| to_mcp_error("Failed to list environments", e))?;
        text(environments)
    }

    pub async fn show_environment(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_environment: {params:?}");
        let id = params.as_ref().id;
        let env = self
            .pipeline
            .get_environment(params.as_ref())
            .await
            .and_then(|env| env.ok_or(PipelineError::EnvironmentNotFound { id }))
            .map_err(|e| to_mcp_error("Failed to show environment", e))?;
        text(env)
    }

    // ------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------

    pub async fn create_prompt(&self, Parameters(params): Parameters<CreatePrompt>) -> McpResult {
        debug!("create_prompt: {params:?}");
        let prompt = self
            .pipeline
            .create_prompt(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create prompt", e))?;
        text(CreateResult::new(prompt))
    }

    pub async fn list_prompt_records(
        &self,
        Parameters(params): Parameters<ListPrompts>,
    ) -> McpResult {
        debug!("list_prompts: {params:?}");
        let prompts = self
            .pipeline
            .list_prompts_summary(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list prompts", e))?;
        text(prompts)
    }

    pub async fn show_prompt(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_prompt: {params:?}");
        let id = params.as_ref().id;
        let prompt = self
            .pipeline
            .get_prompt(params.as_ref())
            .await
            .and_then(|prompt| prompt.ok_or(PipelineError::PromptNotFound { id }))
            .map_err(|e| to_mcp_error("Failed to show prompt", e))?;
        text(prompt)
    }

    pub async fn update_prompt(&self, Parameters(params): Parameters<UpdatePrompt>) -> McpResult {
        debug!("update_prompt: {params:?}");
        let result = self
            .pipeline
            .update_prompt_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update prompt", e))?;
        text(result)
    }

    pub async fn submit_prompt(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("submit_prompt: {params:?}");
        let status = self
            .pipeline
            .submit_prompt_status(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to submit prompt", e))?;
        text(status)
    }

    pub async fn archive_prompt(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("archive_prompt: {params:?}");
        let status = self
            .pipeline
            .archive_prompt_status(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to archive prompt", e))?;
        text(status)
    }

    pub async fn parse_prompt(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("parse_prompt: {params:?}");
        let steps = self
            .pipeline
            .parse_prompt_steps(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to parse prompt", e))?;
        text(steps)
    }

    pub async fn generate_test(&self, Parameters(params): Parameters<GenerateTest>) -> McpResult {
        debug!("generate_test: {params:?}");
        let generated = self
            .pipeline
            .generate_test(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to generate test", e))?;
        text(CreateResult::new(generated))
    }

    pub async fn show_generated_test(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_generated_test: {params:?}");
        let id = params.as_ref().id;
        let generated = self
            .pipeline
            .get_generated_test(params.as_ref())
            .await
            .and_then(|test| test.ok_or(PipelineError::GeneratedTestNotFound { id }))
            .map_err(|e| to_mcp_error("Failed to show generated test", e))?;
        text(generated)
    }

    // ------------------------------------------------------------------
    // Suites
    // ------------------------------------------------------------------

    pub async fn create_suite(&self, Parameters(params): Parameters<CreateSuite>) -> McpResult {
        debug!("create_suite: {params:?}");
        let suite = self
            .pipeline
            .create_suite(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create suite", e))?;
        text(CreateResult::new(suite))
    }

    pub async fn list_suites(&self) -> McpResult {
        debug!("list_suites");
        let suites = self
            .pipeline
            .list_suites_summary()
            .await
            .map_err(|e| to_mcp_error("Failed to list suites", e))?;
        text(suites)
    }

    pub async fn show_suite(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_suite: {params:?}");
        let id = params.as_ref().id;
        let suite = self
            .pipeline
            .get_suite(params.as_ref())
            .await
            .and_then(|suite| suite.ok_or(PipelineError::SuiteNotFound { id }))
            .map_err(|e| to_mcp_error("Failed to show suite", e))?;
        text(suite)
    }

    pub async fn add_test_file(&self, Parameters(params): Parameters<AddTestFile>) -> McpResult {
        debug!("add_test_file: {params:?}");
        let file = self
            .pipeline
            .add_test_file(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to register test file", e))?;
        text(CreateResult::new(file))
    }

    pub async fn attach_generated_test(
        &self,
        Parameters(params): Parameters<AttachGeneratedTest>,
    ) -> McpResult {
        debug!("attach_generated_test: {params:?}");
        let file = self
            .pipeline
            .attach_generated_test(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to attach generated test", e))?;
        text(CreateResult::new(file))
    }

    pub async fn record_run(&self, Parameters(params): Parameters<RecordRun>) -> McpResult {
        debug!("record_run: {params:?}");
        let entry = self
            .pipeline
            .record_run(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to record run", e))?;
        text(entry)
    }

    pub async fn run_history(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("run_history: {params:?}");
        let history = self
            .pipeline
            .run_history_summary(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to load run history", e))?;
        text(history)
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    pub async fn start_execution(
        &self,
        Parameters(params): Parameters<StartExecution>,
    ) -> McpResult {
        debug!("start_execution: {params:?}");
        let result = self
            .pipeline
            .start_execution_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to start execution", e))?;
        text(result)
    }

    pub async fn finish_execution(
        &self,
        Parameters(params): Parameters<FinishExecution>,
    ) -> McpResult {
        debug!("finish_execution: {params:?}");
        let result = self
            .pipeline
            .finish_execution_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to finish execution", e))?;
        text(result)
    }

    pub async fn show_result(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_result: {params:?}");
        let id = params.as_ref().id;
        let result = self
            .pipeline
            .get_result(params.as_ref())
            .await
            .and_then(|result| result.ok_or(PipelineError::ResultNotFound { id }))
            .map_err(|e| to_mcp_error("Failed to show result", e))?;
        text(result)
    }

    pub async fn list_results(&self, Parameters(params): Parameters<ListResults>) -> McpResult {
        debug!("list_results: {params:?}");
        let results = self
            .pipeline
            .list_results_summary(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list results", e))?;
        text(results)
    }

    // ------------------------------------------------------------------
    // Prompt templates
    // ------------------------------------------------------------------

    /// Lists the available prompt templates
    pub fn list_prompt_templates(&self) -> ListPromptsResult {
        debug!("list_prompts");

        let prompts = get_prompt_templates()
            .iter()
            .map(|template| {
                Prompt::new(
                    &template.name,
                    Some(&template.description),
                    Some(
                        template
                            .arguments
                            .iter()
                            .map(|arg| PromptArgument {
                                name: arg.name.clone(),
                                title: None,
                                description: Some(arg.description.clone()),
                                required: Some(arg.required),
                            })
                            .collect(),
                    ),
                )
            })
            .collect();

        ListPromptsResult {
            next_cursor: None,
            prompts,
        }
    }

    /// Renders a prompt template with its arguments substituted.
    ///
    /// Missing optional arguments render as "(not provided)".
    pub fn get_prompt_template(
        &self,
        request: GetPromptRequestParam,
    ) -> Result<GetPromptResult, ErrorData> {
        debug!("get_prompt: {}", request.name);

        let template = get_prompt_templates()
            .into_iter()
            .find(|t| t.name == request.name)
            .ok_or_else(|| {
                ErrorData::invalid_params(format!("Prompt '{}' not found", request.name), None)
            })?;

        let mut prompt_text = template.template.clone();
        for arg_def in &template.arguments {
            let value = request
                .arguments
                .as_ref()
                .and_then(|args| args.get(&arg_def.name));
            let placeholder = format!("{{{}}}", arg_def.name);
            match value.and_then(|v| v.as_str()) {
                Some(arg_str) => prompt_text = prompt_text.replace(&placeholder, arg_str),
                None if value.is_some() => {
                    return Err(ErrorData::invalid_params(
                        format!("Argument '{}' must be a string", arg_def.name),
                        None,
                    ))
                }
                None if arg_def.required => {
                    return Err(ErrorData::invalid_params(
                        format!("Required argument '{}' is missing", arg_def.name),
                        None,
                    ))
                }
                None => prompt_text = prompt_text.replace(&placeholder, "(not provided)"),
            }
        }

        Ok(GetPromptResult {
            description: Some(template.description),
            messages: vec![PromptMessage {
                role: PromptMessageRole::User,
                content: PromptMessageContent::text(prompt_text),
            }],
        })
    }
}
