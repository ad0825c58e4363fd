//! Suite operations and run aggregation for the Pipeline.

use log::info;

use super::Pipeline;
use crate::{
    db::utils::file_name_of,
    error::{PipelineError, Result},
    models::{ExecutionHistoryEntry, TestFile, TestSuite},
    params::{AddTestFile, AttachGeneratedTest, CreateSuite, Id, RecordRun},
};

impl Pipeline {
    /// Creates an empty suite.
    pub async fn create_suite(&self, params: &CreateSuite) -> Result<TestSuite> {
        let params = params.clone();
        let suite = self
            .with_db(move |db| db.create_suite(&params.name, params.description.as_deref()))
            .await?;
        info!("Created suite {} ({})", suite.id, suite.name);
        Ok(suite)
    }

    /// Retrieves a suite with its files and run history.
    pub async fn get_suite(&self, params: &Id) -> Result<Option<TestSuite>> {
        let id = params.id;
        self.with_db(move |db| db.get_suite(id)).await
    }

    /// Lists all suites.
    pub async fn list_suites(&self) -> Result<Vec<TestSuite>> {
        self.with_db(|db| db.list_suites()).await
    }

    /// Registers a test file in a suite.
    pub async fn add_test_file(&self, params: &AddTestFile) -> Result<TestFile> {
        let params = params.clone();
        self.with_db(move |db| {
            db.add_test_file(
                params.suite_id,
                params.file_name.as_deref(),
                &params.file_path,
                params.test_count,
            )
        })
        .await
    }

    /// Registers the file of a generated test in a suite.
    pub async fn attach_generated_test(&self, params: &AttachGeneratedTest) -> Result<TestFile> {
        let AttachGeneratedTest { suite_id, test_id } = *params;
        self.with_db(move |db| {
            let generated = db
                .get_generated_test(test_id)?
                .ok_or(PipelineError::GeneratedTestNotFound { id: test_id })?;
            let file_path = generated.reference.file_path;
            let file_name = file_name_of(&file_path);
            db.add_test_file(suite_id, Some(&file_name), &file_path, 1)
        })
        .await
    }

    /// Rolls a run's results into the suite's execution history.
    ///
    /// Counts are taken from the stored results of the run, so every result
    /// is counted exactly once. File statuses are re-derived from the run.
    ///
    /// # Errors
    ///
    /// - `DuplicateRun` if the run was already recorded; history is unchanged
    /// - `InvalidInput` if the run has no results
    /// - `SuiteNotFound` for an unknown suite
    pub async fn record_run(&self, params: &RecordRun) -> Result<ExecutionHistoryEntry> {
        let params = params.clone();
        let suite_id = params.suite_id;
        let entry = self
            .with_db(move |db| {
                db.record_run(
                    params.suite_id,
                    &params.run_id,
                    params.report_path.as_deref(),
                )
            })
            .await?;
        info!(
            "Recorded run '{}' for suite {suite_id}: {} ({} passed, {} failed, {} skipped, {} other)",
            entry.run_id,
            entry.status.as_str(),
            entry.passed,
            entry.failed,
            entry.skipped,
            entry.other
        );
        Ok(entry)
    }

    /// Recorded runs of a suite in recording order.
    pub async fn get_run_history(&self, params: &Id) -> Result<Vec<ExecutionHistoryEntry>> {
        let id = params.id;
        self.with_db(move |db| {
            if db.get_suite(id)?.is_none() {
                return Err(PipelineError::SuiteNotFound { id });
            }
            db.get_execution_history(id)
        })
        .await
    }
}
