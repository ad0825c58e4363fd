//! Core library for the Sentinel prompt-to-test pipeline.
//!
//! Sentinel turns natural-language test descriptions into runnable browser
//! tests and tracks what happens when they run:
//!
//! - [`parser`]: prompt text to an ordered, validated [`models::StepModel`]
//!   sequence through a pluggable inference capability
//! - [`generator`]: steps plus an environment to a deterministic Playwright
//!   module and its fingerprint
//! - [`pipeline`]: prompt lifecycle (draft, active, archived), execution
//!   collection and suite run aggregation over a SQLite store
//! - [`aggregate`]: the pure roll-up of a run's results
//!
//! # Display Architecture
//!
//! Domain models implement [`std::fmt::Display`] as markdown; [`display`]
//! adds collection and result wrappers. The CLI renders the markdown for the
//! terminal and the MCP server returns it as text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sentinel_core::{
//!     models::TestType,
//!     params::{CreatePrompt, GenerateTest, Id},
//!     parser::StaticInference,
//!     PipelineBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = PipelineBuilder::new()
//!     .with_database_path(Some("sentinel.db"))
//!     .with_inference(Arc::new(StaticInference::new(
//!         r#"[{"action": "navigate", "target": "/"}]"#,
//!     )))
//!     .build()
//!     .await?;
//!
//! let prompt = pipeline
//!     .create_prompt(&CreatePrompt {
//!         title: "Homepage".to_string(),
//!         prompt_content: "Open homepage and check title".to_string(),
//!         test_type: Some(TestType::Ui),
//!         base_url: Some("https://example.test".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! pipeline.submit_prompt(&Id { id: prompt.id }).await?;
//!
//! let generated = pipeline
//!     .generate_test(&GenerateTest {
//!         prompt_id: prompt.id,
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{generated}");
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod db;
pub mod display;
pub mod error;
pub mod generator;
pub mod models;
pub mod params;
pub mod parser;
pub mod pipeline;

// Re-export commonly used types
pub use aggregate::{RunSummary, summarize_run};
pub use db::Database;
pub use display::{
    CreateResult, Elapsed, Environments, LocalDateTime, OperationStatus, Prompts, RunHistory,
    Steps, Suites, TestResults, UpdateResult,
};
pub use error::{PipelineError, Result};
pub use generator::{ArtifactGenerator, PromptMeta};
pub use models::{
    Artifact, Environment, EnvironmentConfig, ExecutionHistoryEntry, ExecutionOutcome,
    FileStatus, GeneratedTest, GeneratedTestRef, PromptFilter, PromptRecord, PromptStatus,
    ResultHandle, ResultStatus, RunStatus, StepAction, StepModel, TestFile, TestResult,
    TestSuite, TestType,
};
pub use parser::{HttpInference, InferenceCapability, StaticInference, StepParser};
pub use pipeline::{Pipeline, PipelineBuilder};
