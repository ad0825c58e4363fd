//! Command handlers: run a pipeline operation and render its display wrapper.

use std::path::Path;

use anyhow::{Context, Result};
use sentinel_core::{
    display::CreateResult,
    models::{ExecutionOutcome, ResultStatus},
    params::{
        AddTestFile, AttachGeneratedTest, CreateEnvironment, CreatePrompt, CreateSuite,
        FinishExecution, GenerateTest, Id, ListPrompts, ListResults, RecordRun, StartExecution,
        UpdatePrompt,
    },
    Pipeline, PipelineError,
};

use crate::{
    args::{EnvCommands, FinishArgs, OutcomeStatusArg, PromptCommands, ResultCommands, SuiteCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    pipeline: Pipeline,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(pipeline: Pipeline, renderer: TerminalRenderer) -> Self {
        Self { pipeline, renderer }
    }

    /// Hands the pipeline over to another front end.
    pub fn into_pipeline(self) -> Pipeline {
        self.pipeline
    }

    fn render(&self, output: impl std::fmt::Display) -> Result<()> {
        self.renderer.render(&output.to_string())
    }

    pub async fn handle_prompt_command(&self, command: PromptCommands) -> Result<()> {
        match command {
            PromptCommands::Create(args) => {
                let prompt = self.pipeline.create_prompt(&CreatePrompt::from(args)).await?;
                self.render(CreateResult::new(prompt))
            }
            PromptCommands::List(args) => self.list_prompts(&ListPrompts::from(args)).await,
            PromptCommands::Show(args) => {
                let id = args.id;
                let prompt = self
                    .pipeline
                    .get_prompt(&Id::from(args))
                    .await?
                    .ok_or(PipelineError::PromptNotFound { id })?;
                self.render(prompt)
            }
            PromptCommands::Edit(args) => {
                let result = self
                    .pipeline
                    .update_prompt_result(&UpdatePrompt::from(args))
                    .await?;
                self.render(result)
            }
            PromptCommands::Submit(args) => {
                let status = self.pipeline.submit_prompt_status(&Id::from(args)).await?;
                self.render(status)
            }
            PromptCommands::Archive(args) => {
                let status = self.pipeline.archive_prompt_status(&Id::from(args)).await?;
                self.render(status)
            }
            PromptCommands::Parse(args) => {
                let steps = self.pipeline.parse_prompt_steps(&Id::from(args)).await?;
                self.render(steps)
            }
            PromptCommands::Generate(args) => {
                let generated = self.pipeline.generate_test(&GenerateTest::from(args)).await?;
                self.render(CreateResult::new(generated))
            }
            PromptCommands::Test(args) => {
                let id = args.id;
                let generated = self
                    .pipeline
                    .get_generated_test(&Id::from(args))
                    .await?
                    .ok_or(PipelineError::GeneratedTestNotFound { id })?;
                self.render(generated)
            }
        }
    }

    pub async fn list_prompts(&self, params: &ListPrompts) -> Result<()> {
        let prompts = self.pipeline.list_prompts_summary(params).await?;
        self.render(prompts)
    }

    pub async fn handle_env_command(&self, command: EnvCommands) -> Result<()> {
        match command {
            EnvCommands::Create(args) => {
                let env = self
                    .pipeline
                    .create_environment(&CreateEnvironment::from(args))
                    .await?;
                self.render(CreateResult::new(env))
            }
            EnvCommands::List => {
                let environments = self.pipeline.list_environments_summary().await?;
                self.render(environments)
            }
            EnvCommands::Show(args) => {
                let id = args.id;
                let env = self
                    .pipeline
                    .get_environment(&Id::from(args))
                    .await?
                    .ok_or(PipelineError::EnvironmentNotFound { id })?;
                self.render(env)
            }
        }
    }

    pub async fn handle_suite_command(&self, command: SuiteCommands) -> Result<()> {
        match command {
            SuiteCommands::Create(args) => {
                let suite = self.pipeline.create_suite(&CreateSuite::from(args)).await?;
                self.render(CreateResult::new(suite))
            }
            SuiteCommands::List => {
                let suites = self.pipeline.list_suites_summary().await?;
                self.render(suites)
            }
            SuiteCommands::Show(args) => {
                let id = args.id;
                let suite = self
                    .pipeline
                    .get_suite(&Id::from(args))
                    .await?
                    .ok_or(PipelineError::SuiteNotFound { id })?;
                self.render(suite)
            }
            SuiteCommands::AddFile(args) => {
                let file = self.pipeline.add_test_file(&AddTestFile::from(args)).await?;
                self.render(CreateResult::new(file))
            }
            SuiteCommands::Attach(args) => {
                let file = self
                    .pipeline
                    .attach_generated_test(&AttachGeneratedTest::from(args))
                    .await?;
                self.render(CreateResult::new(file))
            }
            SuiteCommands::RecordRun(args) => {
                let entry = self.pipeline.record_run(&RecordRun::from(args)).await?;
                self.render(entry)
            }
            SuiteCommands::History(args) => {
                let history = self.pipeline.run_history_summary(&Id::from(args)).await?;
                self.render(history)
            }
        }
    }

    pub async fn handle_result_command(&self, command: ResultCommands) -> Result<()> {
        match command {
            ResultCommands::Start(args) => {
                let result = self
                    .pipeline
                    .start_execution_result(&StartExecution::from(args))
                    .await?;
                self.render(result)
            }
            ResultCommands::Finish(args) => {
                let params = finish_params(args).await?;
                let result = self.pipeline.finish_execution_result(&params).await?;
                self.render(result)
            }
            ResultCommands::Show(args) => {
                let id = args.id;
                let result = self
                    .pipeline
                    .get_result(&Id::from(args))
                    .await?
                    .ok_or(PipelineError::ResultNotFound { id })?;
                self.render(result)
            }
            ResultCommands::List(args) => {
                let results = self
                    .pipeline
                    .list_results_summary(&ListResults::from(args))
                    .await?;
                self.render(results)
            }
        }
    }
}

/// Builds finish parameters from either an outcome file or the status flags.
async fn finish_params(args: FinishArgs) -> Result<FinishExecution> {
    let outcome = match (args.outcome_file, args.status) {
        (Some(path), _) => read_outcome(&path).await?,
        (None, Some(status)) => {
            let mut outcome = ExecutionOutcome::with_status(match status {
                OutcomeStatusArg::Passed => ResultStatus::Passed,
                OutcomeStatusArg::Failed => ResultStatus::Failed,
                OutcomeStatusArg::Skipped => ResultStatus::Skipped,
            });
            outcome.error_message = args.error;
            outcome
        }
        (None, None) => anyhow::bail!("either --status or --outcome-file is required"),
    };

    Ok(FinishExecution {
        result_id: args.result_id,
        outcome,
    })
}

async fn read_outcome(path: &Path) -> Result<ExecutionOutcome> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read outcome file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid outcome JSON in {}", path.display()))
}
