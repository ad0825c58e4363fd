//! Builder for creating and configuring Pipeline instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::task;

use super::Pipeline;
use crate::{
    db::Database,
    error::{PipelineError, Result},
    parser::{InferenceCapability, StepParser, UnconfiguredInference, DEFAULT_INFERENCE_TIMEOUT},
};

/// Builder for creating and configuring Pipeline instances.
#[derive(Clone)]
pub struct PipelineBuilder {
    database_path: Option<PathBuf>,
    inference: Option<Arc<dyn InferenceCapability>>,
    inference_timeout: Duration,
}

impl PipelineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            inference: None,
            inference_timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/sentinel/sentinel.db` or
    /// `~/.local/share/sentinel/sentinel.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the inference capability used to parse prompts.
    ///
    /// Without one, parsing fails with a parse failure naming the missing
    /// configuration; every other operation works.
    pub fn with_inference(mut self, inference: Arc<dyn InferenceCapability>) -> Self {
        self.inference = Some(inference);
        self
    }

    /// Bounds each inference call. Defaults to 30 seconds.
    pub fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }

    /// Builds the configured pipeline instance.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::FileSystem` if the database directory cannot be
    /// created, `PipelineError::XdgDirectory` if no default location can be
    /// determined, and `PipelineError::Database` if schema initialization fails.
    pub async fn build(self) -> Result<Pipeline> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), PipelineError>(())
        })
        .await
        .map_err(PipelineError::join)??;

        let inference = self
            .inference
            .unwrap_or_else(|| Arc::new(UnconfiguredInference));
        let parser = StepParser::new(inference).with_timeout(self.inference_timeout);

        log::debug!("Pipeline ready with database {}", db_path.display());
        Ok(Pipeline::new(db_path, parser))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("sentinel")
            .place_data_file("sentinel.db")
            .map_err(|e| PipelineError::XdgDirectory(e.to_string()))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
