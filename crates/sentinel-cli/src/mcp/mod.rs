//! MCP server for Sentinel
//!
//! Exposes every pipeline operation as an MCP tool over stdio, plus prompt
//! templates for authoring tests and triaging runs.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use sentinel_core::Pipeline;
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;
pub mod prompts;

pub use handlers::{
    AddTestFile, AttachGeneratedTest, CreateEnvironment, CreatePrompt, CreateSuite,
    FinishExecution, GenerateTest, Id, ListPrompts, ListResults, McpResult, RecordRun,
    StartExecution, UpdatePrompt,
};

/// MCP server for Sentinel
///
/// Operations open their own database connection, so the pipeline is shared
/// without a lock.
#[derive(Clone)]
pub struct SentinelMcpServer {
    pipeline: Arc<Pipeline>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SentinelMcpServer {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.pipeline.clone())
    }

    #[tool(
        name = "create_environment",
        description = "Create a named environment configuration. The config object uses upper-case keys: BASE_URL, BROWSER (chromium, firefox, webkit), TIMEOUT (ms), RETRIES, HEADLESS; any other key is passed through as a variable. Environment names are unique."
    )]
    async fn create_environment(&self, params: Parameters<CreateEnvironment>) -> McpResult {
        self.handlers().create_environment(params).await
    }

    #[tool(
        name = "list_environments",
        description = "List all environments with their base URL and browser."
    )]
    async fn list_environments(&self) -> McpResult {
        self.handlers().list_environments().await
    }

    #[tool(
        name = "show_environment",
        description = "Show an environment's full configuration by ID."
    )]
    async fn show_environment(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_environment(params).await
    }

    #[tool(
        name = "create_prompt",
        description = "Create a natural-language test prompt in draft state. Provide a title and prompt_content; test_type (UI, API, E2E) and a base_url (or an environment_id whose config has BASE_URL) are required before the prompt can be submitted. Returns the new prompt ID."
    )]
    async fn create_prompt(&self, params: Parameters<CreatePrompt>) -> McpResult {
        self.handlers().create_prompt(params).await
    }

    #[tool(
        name = "list_prompts",
        description = "List test prompts, optionally filtered by status (draft, active, archived), test_type, or tag."
    )]
    async fn list_prompt_records(&self, params: Parameters<ListPrompts>) -> McpResult {
        self.handlers().list_prompt_records(params).await
    }

    #[tool(
        name = "show_prompt",
        description = "Show a prompt with its status, parsed steps and generated test references."
    )]
    async fn show_prompt(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_prompt(params).await
    }

    #[tool(
        name = "update_prompt",
        description = "Edit a draft prompt. Only the provided fields change; tags replace the whole list. List optional fields (test_type, base_url, environment_id, model, additional_context) in `clear` to empty them. Active and archived prompts cannot be edited."
    )]
    async fn update_prompt(&self, params: Parameters<UpdatePrompt>) -> McpResult {
        self.handlers().update_prompt(params).await
    }

    #[tool(
        name = "submit_prompt",
        description = "Move a draft prompt to active. Fails listing the missing fields if content, test type or base URL are absent."
    )]
    async fn submit_prompt(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().submit_prompt(params).await
    }

    #[tool(
        name = "archive_prompt",
        description = "Move an active prompt to archived. Archived prompts can no longer be parsed or generated from."
    )]
    async fn archive_prompt(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().archive_prompt(params).await
    }

    #[tool(
        name = "parse_prompt",
        description = "Parse an active prompt into automation steps through the configured inference endpoint and store them on the prompt. Invalid candidate steps are dropped; the result is never empty."
    )]
    async fn parse_prompt(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().parse_prompt(params).await
    }

    #[tool(
        name = "generate_test",
        description = "Generate a Playwright test from an active prompt, parsing it first if needed. Optionally compile against environment_id, reuse the latest sequence with regenerate=true, or write the file under output_dir. Returns the test name, file path, fingerprint and source."
    )]
    async fn generate_test(&self, params: Parameters<GenerateTest>) -> McpResult {
        self.handlers().generate_test(params).await
    }

    #[tool(
        name = "show_generated_test",
        description = "Show a generated test's reference and TypeScript source by test ID."
    )]
    async fn show_generated_test(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_generated_test(params).await
    }

    #[tool(
        name = "create_suite",
        description = "Create a test suite that groups test files and records run history. Suite names are unique."
    )]
    async fn create_suite(&self, params: Parameters<CreateSuite>) -> McpResult {
        self.handlers().create_suite(params).await
    }

    #[tool(name = "list_suites", description = "List suites with file and run counts.")]
    async fn list_suites(&self) -> McpResult {
        self.handlers().list_suites().await
    }

    #[tool(
        name = "show_suite",
        description = "Show a suite with its registered files, their latest status, and its run history."
    )]
    async fn show_suite(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_suite(params).await
    }

    #[tool(
        name = "add_test_file",
        description = "Register a test file path in a suite. Executions can only be started for registered files."
    )]
    async fn add_test_file(&self, params: Parameters<AddTestFile>) -> McpResult {
        self.handlers().add_test_file(params).await
    }

    #[tool(
        name = "attach_generated_test",
        description = "Register the file of a generated test (by test ID) in a suite."
    )]
    async fn attach_generated_test(&self, params: Parameters<AttachGeneratedTest>) -> McpResult {
        self.handlers().attach_generated_test(params).await
    }

    #[tool(
        name = "start_execution",
        description = "Start a test execution in a suite run. Creates a running result for a registered file and returns its result ID."
    )]
    async fn start_execution(&self, params: Parameters<StartExecution>) -> McpResult {
        self.handlers().start_execution(params).await
    }

    #[tool(
        name = "finish_execution",
        description = "Finish a running result with an outcome: status (passed, failed, skipped), optional endTime, stepResults, attachments and errorMessage. A result can be finished only once."
    )]
    async fn finish_execution(&self, params: Parameters<FinishExecution>) -> McpResult {
        self.handlers().finish_execution(params).await
    }

    #[tool(name = "show_result", description = "Show a test result by ID.")]
    async fn show_result(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_result(params).await
    }

    #[tool(
        name = "list_results",
        description = "List results of a suite, optionally restricted to one run."
    )]
    async fn list_results(&self, params: Parameters<ListResults>) -> McpResult {
        self.handlers().list_results(params).await
    }

    #[tool(
        name = "record_run",
        description = "Aggregate all results of a run into the suite's execution history and update file statuses. Unfinished results make the run incomplete. A run can be recorded only once."
    )]
    async fn record_run(&self, params: Parameters<RecordRun>) -> McpResult {
        self.handlers().record_run(params).await
    }

    #[tool(
        name = "run_history",
        description = "Show the recorded runs of a suite, oldest first."
    )]
    async fn run_history(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().run_history(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SentinelMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "sentinel".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(r#"Sentinel turns natural-language test prompts into generated Playwright tests and tracks their execution.

## Core Concepts
- **Prompts**: test descriptions moving through draft → active → archived. Only drafts can be edited; only active prompts can be parsed or generated from.
- **Steps**: parsed automation actions (navigate, click, fill, assert-text, ...).
- **Generated tests**: deterministic Playwright files with a fingerprint over steps, base URL and browser.
- **Suites**: groups of registered test files with an append-only run history.
- **Results**: one per test execution, started as running and finished exactly once.

## Workflow
1. `create_prompt`, then `submit_prompt`
2. `parse_prompt` to review steps, then `generate_test`
3. `create_suite` and `attach_generated_test`
4. For each execution: `start_execution`, then `finish_execution`
5. `record_run` once the run is over; `run_history` to compare runs"#.to_string()),
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(self.handlers().list_prompt_templates())
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.handlers().get_prompt_template(request)
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: SentinelMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Sentinel MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
