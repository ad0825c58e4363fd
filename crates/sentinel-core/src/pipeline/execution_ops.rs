//! Execution collection: start and finish of test results.
//!
//! A result is created `running` by [`Pipeline::start_execution`] and
//! finished exactly once by [`Pipeline::finish_execution`]. Finishing is a
//! compare-and-set on the unfinished status, so concurrent finishes of the
//! same result cannot both succeed and a finished record never changes.

use log::{debug, info};

use super::Pipeline;
use crate::{
    error::Result,
    models::{ResultHandle, TestResult},
    params::{FinishExecution, Id, ListResults, StartExecution},
};

impl Pipeline {
    /// Starts a test execution and returns the handle that finishes it.
    ///
    /// The suite, the environment, and the file within the suite must exist.
    pub async fn start_execution(&self, params: &StartExecution) -> Result<ResultHandle> {
        let result = self.start_execution_record(params).await?;
        Ok(ResultHandle {
            result_id: result.id,
        })
    }

    /// Starts a test execution and returns the created `running` record.
    pub async fn start_execution_record(&self, params: &StartExecution) -> Result<TestResult> {
        let params = params.clone();
        let result = self.with_db(move |db| db.start_result(&params)).await?;
        debug!(
            "Started result {} for test '{}' in run '{}'",
            result.id, result.test_id, result.run_id
        );
        Ok(result)
    }

    /// Finishes a running result with the engine's outcome.
    ///
    /// # Errors
    ///
    /// - `DoubleFinish` if the result was already finished; the stored record
    ///   is unchanged
    /// - `InvalidInput` if the outcome status is not terminal or its end time
    ///   precedes the start time
    /// - `ResultNotFound` for an unknown result
    pub async fn finish_execution(&self, params: &FinishExecution) -> Result<TestResult> {
        let result_id = params.result_id;
        let outcome = params.outcome.clone();
        let result = self
            .with_db(move |db| db.finish_result(result_id, &outcome))
            .await?;
        info!(
            "Result {} finished as {} in {}ms",
            result.id,
            result.status.as_str(),
            result.duration_ms.unwrap_or_default()
        );
        Ok(result)
    }

    /// Retrieves a result by its ID.
    pub async fn get_result(&self, params: &Id) -> Result<Option<TestResult>> {
        let id = params.id;
        self.with_db(move |db| db.get_result(id)).await
    }

    /// Lists the results of a suite, optionally for one run.
    pub async fn list_results(&self, params: &ListResults) -> Result<Vec<TestResult>> {
        let suite_id = params.suite_id;
        let run_id = params.run_id.clone();
        self.with_db(move |db| db.list_results(suite_id, run_id.as_deref()))
            .await
    }
}
