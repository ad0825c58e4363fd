//! Command-line interface definitions using clap.
//!
//! Each subcommand has its own clap `Args` struct that converts into the
//! matching core parameter type with `From`, so the core stays free of clap
//! attributes:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Pipeline
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use sentinel_core::{
    models::{PromptStatus, TestType},
    models::EnvironmentConfig,
    params::{
        AddTestFile, AttachGeneratedTest, CreateEnvironment, CreatePrompt, CreateSuite,
        GenerateTest, Id, ListPrompts, ListResults, PromptField, RecordRun, StartExecution,
        UpdatePrompt,
    },
};

/// Turn natural-language test prompts into tracked browser tests
///
/// Sentinel stores prompts, parses them into automation steps through an
/// inference endpoint, generates deterministic Playwright tests, and records
/// execution results into per-suite run history. Run `sentinel serve` to
/// expose the same operations as an MCP server.
#[derive(Parser)]
#[command(version, about, name = "sentinel")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/sentinel/sentinel.db
    #[arg(long, global = true, env = "SENTINEL_DATABASE_FILE")]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Endpoint prompts are POSTed to for step inference
    #[arg(long, global = true, env = "SENTINEL_INFERENCE_URL")]
    pub inference_url: Option<String>,

    /// Bearer token sent to the inference endpoint
    #[arg(long, global = true, env = "SENTINEL_INFERENCE_API_KEY", hide_env_values = true)]
    pub inference_api_key: Option<String>,

    /// Seconds to wait for a single inference call
    #[arg(long, global = true, env = "SENTINEL_INFERENCE_TIMEOUT", default_value_t = 30)]
    pub inference_timeout: u64,

    /// Answer every parse with the step JSON in this file instead of calling
    /// an inference endpoint
    #[arg(long, global = true, env = "SENTINEL_STEPS_FILE", conflicts_with = "inference_url")]
    pub steps_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage prompts and generate tests from them
    #[command(alias = "p")]
    Prompt {
        #[command(subcommand)]
        command: PromptCommands,
    },
    /// Manage named environment configurations
    #[command(alias = "e")]
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    /// Manage test suites and their run history
    #[command(alias = "s")]
    Suite {
        #[command(subcommand)]
        command: SuiteCommands,
    },
    /// Start, finish and inspect test results
    #[command(alias = "r")]
    Result {
        #[command(subcommand)]
        command: ResultCommands,
    },
    /// Start the MCP server
    Serve,
}

// ============================================================================
// Prompts
// ============================================================================

/// Test type accepted on the command line
#[derive(Clone, Copy, ValueEnum)]
pub enum TestTypeArg {
    Ui,
    Api,
    E2e,
}

impl From<TestTypeArg> for TestType {
    fn from(val: TestTypeArg) -> Self {
        match val {
            TestTypeArg::Ui => TestType::Ui,
            TestTypeArg::Api => TestType::Api,
            TestTypeArg::E2e => TestType::E2e,
        }
    }
}

/// Prompt state accepted on the command line
#[derive(Clone, Copy, ValueEnum)]
pub enum PromptStatusArg {
    Draft,
    Active,
    Archived,
}

impl From<PromptStatusArg> for PromptStatus {
    fn from(val: PromptStatusArg) -> Self {
        match val {
            PromptStatusArg::Draft => PromptStatus::Draft,
            PromptStatusArg::Active => PromptStatus::Active,
            PromptStatusArg::Archived => PromptStatus::Archived,
        }
    }
}

/// Optional prompt field accepted by `--clear`
#[derive(Clone, Copy, ValueEnum)]
pub enum PromptFieldArg {
    #[value(name = "type")]
    TestType,
    BaseUrl,
    #[value(name = "env")]
    EnvironmentId,
    Model,
    Context,
}

impl From<PromptFieldArg> for PromptField {
    fn from(val: PromptFieldArg) -> Self {
        match val {
            PromptFieldArg::TestType => PromptField::TestType,
            PromptFieldArg::BaseUrl => PromptField::BaseUrl,
            PromptFieldArg::EnvironmentId => PromptField::EnvironmentId,
            PromptFieldArg::Model => PromptField::Model,
            PromptFieldArg::Context => PromptField::AdditionalContext,
        }
    }
}

/// Create a prompt in draft state
#[derive(ClapArgs)]
pub struct CreatePromptArgs {
    /// Short title of the prompt
    pub title: String,
    /// Natural-language description of the test
    pub content: String,
    /// Kind of test described
    #[arg(short = 't', long = "type", value_enum)]
    pub test_type: Option<TestTypeArg>,
    /// URL the test targets
    #[arg(short, long)]
    pub base_url: Option<String>,
    /// Default environment for generation
    #[arg(short, long = "env")]
    pub environment_id: Option<u64>,
    /// Inference model hint
    #[arg(long)]
    pub model: Option<String>,
    /// Labels, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
    /// Extra hints passed to inference
    #[arg(long)]
    pub context: Option<String>,
}

impl From<CreatePromptArgs> for CreatePrompt {
    fn from(val: CreatePromptArgs) -> Self {
        CreatePrompt {
            title: val.title,
            prompt_content: val.content,
            test_type: val.test_type.map(Into::into),
            base_url: val.base_url,
            environment_id: val.environment_id,
            model: val.model,
            tags: val.tags,
            additional_context: val.context,
        }
    }
}

/// Edit a draft prompt; omitted fields are unchanged
#[derive(ClapArgs)]
pub struct EditPromptArgs {
    /// ID of the draft prompt to edit
    pub id: u64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(short = 't', long = "type", value_enum)]
    pub test_type: Option<TestTypeArg>,
    #[arg(short, long)]
    pub base_url: Option<String>,
    #[arg(short, long = "env")]
    pub environment_id: Option<u64>,
    #[arg(long)]
    pub model: Option<String>,
    /// Replace all tags, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    #[arg(long)]
    pub context: Option<String>,
    /// Empty optional fields, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub clear: Vec<PromptFieldArg>,
}

impl From<EditPromptArgs> for UpdatePrompt {
    fn from(val: EditPromptArgs) -> Self {
        UpdatePrompt {
            id: val.id,
            title: val.title,
            prompt_content: val.content,
            test_type: val.test_type.map(Into::into),
            base_url: val.base_url,
            environment_id: val.environment_id,
            model: val.model,
            tags: val.tags,
            additional_context: val.context,
            clear: val.clear.into_iter().map(Into::into).collect(),
        }
    }
}

/// List prompts
#[derive(ClapArgs)]
pub struct ListPromptsArgs {
    /// Only prompts in this state
    #[arg(long, value_enum)]
    pub status: Option<PromptStatusArg>,
    /// Only prompts of this test type
    #[arg(short = 't', long = "type", value_enum)]
    pub test_type: Option<TestTypeArg>,
    /// Only prompts carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
}

impl From<ListPromptsArgs> for ListPrompts {
    fn from(val: ListPromptsArgs) -> Self {
        ListPrompts {
            status: val.status.map(Into::into),
            test_type: val.test_type.map(Into::into),
            tag: val.tag,
        }
    }
}

/// Identify a resource by ID
#[derive(ClapArgs)]
pub struct IdArgs {
    /// ID of the resource
    pub id: u64,
}

impl From<IdArgs> for Id {
    fn from(val: IdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Generate a test from an active prompt
#[derive(ClapArgs)]
pub struct GenerateArgs {
    /// ID of the active prompt
    pub prompt_id: u64,
    /// Environment to compile against (defaults to the prompt's)
    #[arg(short, long = "env")]
    pub environment_id: Option<u64>,
    /// Reuse the latest sequence number, overwriting its path
    #[arg(long)]
    pub regenerate: bool,
    /// Also write the test source under this directory
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

impl From<GenerateArgs> for GenerateTest {
    fn from(val: GenerateArgs) -> Self {
        GenerateTest {
            prompt_id: val.prompt_id,
            environment_id: val.environment_id,
            regenerate: val.regenerate,
            output_dir: val.output_dir,
        }
    }
}

#[derive(Subcommand)]
pub enum PromptCommands {
    /// Create a prompt in draft state
    #[command(alias = "c")]
    Create(CreatePromptArgs),
    /// List prompts
    #[command(aliases = ["l", "ls"])]
    List(ListPromptsArgs),
    /// Show a prompt with its parsed steps and generated tests
    #[command(alias = "s")]
    Show(IdArgs),
    /// Edit a draft prompt
    #[command(alias = "e")]
    Edit(EditPromptArgs),
    /// Submit a draft prompt, making it active
    Submit(IdArgs),
    /// Archive an active prompt
    #[command(alias = "a")]
    Archive(IdArgs),
    /// Parse an active prompt into steps
    Parse(IdArgs),
    /// Generate a test from an active prompt
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Show a generated test and its source
    Test(IdArgs),
}

// ============================================================================
// Environments
// ============================================================================

/// Create a named environment
#[derive(ClapArgs)]
pub struct CreateEnvArgs {
    /// Unique environment name
    pub name: String,
    /// Base URL tests navigate relative to
    #[arg(short, long)]
    pub base_url: Option<String>,
    /// Browser engine (chromium, firefox, webkit)
    #[arg(long)]
    pub browser: Option<String>,
    /// Per-action timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Retries per test
    #[arg(long)]
    pub retries: Option<u32>,
    /// Run with a visible browser window
    #[arg(long)]
    pub headed: bool,
    /// Extra variables as KEY=VALUE
    #[arg(long = "var", value_parser = parse_key_value)]
    pub variables: Vec<(String, String)>,
}

impl From<CreateEnvArgs> for CreateEnvironment {
    fn from(val: CreateEnvArgs) -> Self {
        let defaults = EnvironmentConfig::default();
        CreateEnvironment {
            name: val.name,
            config: EnvironmentConfig {
                base_url: val.base_url,
                browser: val.browser.unwrap_or(defaults.browser),
                timeout_ms: val.timeout.unwrap_or(defaults.timeout_ms),
                retries: val.retries.unwrap_or(defaults.retries),
                headless: !val.headed,
                variables: val.variables.into_iter().collect(),
            },
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

#[derive(Subcommand)]
pub enum EnvCommands {
    /// Create a named environment
    #[command(alias = "c")]
    Create(CreateEnvArgs),
    /// List environments
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show an environment
    #[command(alias = "s")]
    Show(IdArgs),
}

// ============================================================================
// Suites
// ============================================================================

/// Create a suite
#[derive(ClapArgs)]
pub struct CreateSuiteArgs {
    /// Unique suite name
    pub name: String,
    #[arg(short, long)]
    pub description: Option<String>,
}

impl From<CreateSuiteArgs> for CreateSuite {
    fn from(val: CreateSuiteArgs) -> Self {
        CreateSuite {
            name: val.name,
            description: val.description,
        }
    }
}

/// Register a test file in a suite
#[derive(ClapArgs)]
pub struct AddFileArgs {
    /// Suite to register the file in
    pub suite_id: u64,
    /// Path results are reported against
    pub file_path: String,
    /// Display name (defaults to the last path component)
    #[arg(long)]
    pub name: Option<String>,
    /// Number of tests in the file
    #[arg(long, default_value_t = 1)]
    pub tests: u32,
}

impl From<AddFileArgs> for AddTestFile {
    fn from(val: AddFileArgs) -> Self {
        AddTestFile {
            suite_id: val.suite_id,
            file_name: val.name,
            file_path: val.file_path,
            test_count: val.tests,
        }
    }
}

/// Register a generated test's file in a suite
#[derive(ClapArgs)]
pub struct AttachArgs {
    pub suite_id: u64,
    /// ID of the generated test
    pub test_id: u64,
}

impl From<AttachArgs> for AttachGeneratedTest {
    fn from(val: AttachArgs) -> Self {
        AttachGeneratedTest {
            suite_id: val.suite_id,
            test_id: val.test_id,
        }
    }
}

/// Aggregate a run into the suite history
#[derive(ClapArgs)]
pub struct RecordRunArgs {
    pub suite_id: u64,
    pub run_id: String,
    /// Location of an external report
    #[arg(long)]
    pub report: Option<String>,
}

impl From<RecordRunArgs> for RecordRun {
    fn from(val: RecordRunArgs) -> Self {
        RecordRun {
            suite_id: val.suite_id,
            run_id: val.run_id,
            report_path: val.report,
        }
    }
}

#[derive(Subcommand)]
pub enum SuiteCommands {
    /// Create a suite
    #[command(alias = "c")]
    Create(CreateSuiteArgs),
    /// List suites
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show a suite with its files and history
    #[command(alias = "s")]
    Show(IdArgs),
    /// Register a test file in a suite
    AddFile(AddFileArgs),
    /// Register a generated test's file in a suite
    Attach(AttachArgs),
    /// Aggregate a run's results into the suite history
    RecordRun(RecordRunArgs),
    /// Show recorded runs of a suite
    History(IdArgs),
}

// ============================================================================
// Results
// ============================================================================

/// Start a test execution
#[derive(ClapArgs)]
pub struct StartArgs {
    /// Suite the result belongs to
    pub suite_id: u64,
    /// Registered file the test lives in
    pub file_path: String,
    /// Identifier of the test
    pub test_id: String,
    /// Run the execution is part of
    #[arg(long)]
    pub run: String,
    /// Environment the test runs in
    #[arg(short, long = "env")]
    pub environment_id: u64,
}

impl From<StartArgs> for StartExecution {
    fn from(val: StartArgs) -> Self {
        StartExecution {
            test_id: val.test_id,
            test_suite_id: val.suite_id,
            environment_id: val.environment_id,
            run_id: val.run,
            file_path: val.file_path,
        }
    }
}

/// Finish a running result
#[derive(ClapArgs)]
pub struct FinishArgs {
    /// Result ID returned by start
    pub result_id: u64,
    /// Final status
    #[arg(long, value_enum, required_unless_present = "outcome_file")]
    pub status: Option<OutcomeStatusArg>,
    /// Error message for a failed test
    #[arg(long)]
    pub error: Option<String>,
    /// Full engine outcome as JSON (status, endTime, stepResults, ...)
    #[arg(long, conflicts_with_all = ["status", "error"])]
    pub outcome_file: Option<PathBuf>,
}

/// Terminal statuses a result can be finished with
#[derive(Clone, Copy, ValueEnum)]
pub enum OutcomeStatusArg {
    Passed,
    Failed,
    Skipped,
}

/// List results of a suite
#[derive(ClapArgs)]
pub struct ListResultsArgs {
    pub suite_id: u64,
    /// Only results of this run
    #[arg(long)]
    pub run: Option<String>,
}

impl From<ListResultsArgs> for ListResults {
    fn from(val: ListResultsArgs) -> Self {
        ListResults {
            suite_id: val.suite_id,
            run_id: val.run,
        }
    }
}

#[derive(Subcommand)]
pub enum ResultCommands {
    /// Start a test execution
    Start(StartArgs),
    /// Finish a running result
    Finish(FinishArgs),
    /// Show a result
    #[command(alias = "s")]
    Show(IdArgs),
    /// List results of a suite
    #[command(aliases = ["l", "ls"])]
    List(ListResultsArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("API_TOKEN=abc=def"),
            Ok(("API_TOKEN".to_string(), "abc=def".to_string()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_create_prompt_conversion() {
        let args = Args::parse_from([
            "sentinel",
            "prompt",
            "create",
            "Homepage",
            "Open homepage and check title",
            "--type",
            "ui",
            "--tags",
            "smoke,home",
        ]);
        let Some(Commands::Prompt {
            command: PromptCommands::Create(create),
        }) = args.command
        else {
            panic!("expected prompt create");
        };
        let params = CreatePrompt::from(create);
        assert_eq!(params.test_type, Some(TestType::Ui));
        assert_eq!(params.tags, vec!["smoke", "home"]);
    }

    #[test]
    fn test_edit_prompt_clear_list() {
        let args = Args::parse_from([
            "sentinel", "prompt", "edit", "4", "--clear", "base-url,env", "--clear", "context",
        ]);
        let Some(Commands::Prompt {
            command: PromptCommands::Edit(edit),
        }) = args.command
        else {
            panic!("expected prompt edit");
        };
        let params = UpdatePrompt::from(edit);
        assert_eq!(params.id, 4);
        assert_eq!(
            params.clear,
            vec![
                PromptField::BaseUrl,
                PromptField::EnvironmentId,
                PromptField::AdditionalContext
            ]
        );
        assert!(params.base_url.is_none());
    }
}
