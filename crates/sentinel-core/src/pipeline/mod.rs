//! High-level pipeline API.
//!
//! [`Pipeline`] is the entry point every interface uses. It coordinates the
//! step parser, the artifact generator and the SQLite store, and implements
//! the lifecycle rules for prompts, test results and suite runs.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Handlers     │    │   Operations    │    │    Database     │
//! │  (display-ready │───▶│ (prompt_ops,    │───▶│   (via db/)     │
//! │   wrappers)     │    │  suite_ops, ..) │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: configuration and construction of a [`Pipeline`]
//! - [`prompt_ops`]: prompt lifecycle, parsing and test generation
//! - [`environment_ops`]: stored environment configurations
//! - [`execution_ops`]: start and finish of test results
//! - [`suite_ops`]: suites, registered files and run aggregation
//! - [`handlers`]: operations returning display wrappers for the CLI and MCP
//!
//! Each operation opens its own connection on the blocking pool, so
//! concurrent calls never share a connection.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sentinel_core::{
//!     params::{CreatePrompt, Id},
//!     models::TestType,
//!     PipelineBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = PipelineBuilder::new()
//!     .with_database_path(Some("/tmp/sentinel.db"))
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
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::task;

use crate::{
    db::Database,
    error::{PipelineError, Result},
    generator::ArtifactGenerator,
    parser::StepParser,
};

pub mod builder;
pub mod environment_ops;
pub mod execution_ops;
pub mod handlers;
pub mod prompt_ops;
pub mod suite_ops;

#[cfg(test)]
mod tests;

pub use builder::PipelineBuilder;

/// Main pipeline interface.
pub struct Pipeline {
    pub(crate) db_path: PathBuf,
    pub(crate) parser: StepParser,
    pub(crate) generator: ArtifactGenerator,
}

impl Pipeline {
    pub(crate) fn new(db_path: PathBuf, parser: StepParser) -> Self {
        Self {
            db_path,
            parser,
            generator: ArtifactGenerator::new(),
        }
    }

    /// Path of the backing database file.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Runs `op` against a fresh connection on the blocking pool.
    pub(crate) async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(PipelineError::join)?
    }
}
