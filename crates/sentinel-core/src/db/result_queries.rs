//! Test result storage: start, compare-and-set finish, and queries.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::suite_queries::CHECK_RUN_RECORDED_SQL;
use super::utils::{
    enum_column, id_column, json_column, normalize_file_path, optional_timestamp_column,
    timestamp_column,
};
use crate::{
    error::{DatabaseResultExt, PipelineError, Result},
    models::{Attachment, ExecutionOutcome, ResultStatus, StepResult, TestResult},
    params::StartExecution,
};

const RESULT_COLUMNS: &str = "id, test_id, suite_id, environment_id, run_id, file_path, status, start_time, end_time, duration_ms, steps, attachments, error_message";
const INSERT_RESULT_SQL: &str = "INSERT INTO test_results (test_id, suite_id, environment_id, run_id, file_path, status, start_time, steps, attachments) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '[]', '[]')";
const FINISH_RESULT_SQL: &str = "UPDATE test_results SET status = ?1, end_time = ?2, duration_ms = ?3, steps = ?4, attachments = ?5, error_message = ?6 WHERE id = ?7 AND status IN ('pending', 'running')";
const CHECK_SUITE_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM test_suites WHERE id = ?1)";
const CHECK_ENVIRONMENT_EXISTS_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM environments WHERE id = ?1)";
const CHECK_SUITE_FILE_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM test_files WHERE suite_id = ?1 AND file_path = ?2)";

impl super::Database {
    /// Helper function to construct a TestResult from a database row
    pub(super) fn build_result_from_row(row: &rusqlite::Row) -> rusqlite::Result<TestResult> {
        Ok(TestResult {
            id: id_column(row, 0)?,
            test_id: row.get(1)?,
            test_suite_id: id_column(row, 2)?,
            environment_id: id_column(row, 3)?,
            run_id: row.get(4)?,
            file_path: row.get(5)?,
            status: enum_column::<ResultStatus>(row, 6)?,
            start_time: timestamp_column(row, 7)?,
            end_time: optional_timestamp_column(row, 8)?,
            duration_ms: row.get(9)?,
            steps: json_column::<Vec<StepResult>>(row, 10)?,
            attachments: json_column::<Vec<Attachment>>(row, 11)?,
            error_message: row.get(12)?,
        })
    }

    /// Loads every result of one run of a suite, in start order.
    pub(super) fn query_run_results(
        connection: &Connection,
        suite_id: u64,
        run_id: &str,
    ) -> Result<Vec<TestResult>> {
        let query = format!(
            "SELECT {RESULT_COLUMNS} FROM test_results WHERE suite_id = ?1 AND run_id = ?2 ORDER BY id"
        );
        let mut stmt = connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let results = stmt
            .query_map(params![suite_id as i64, run_id], Self::build_result_from_row)
            .db_context("Failed to query run results")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect run results")?;

        Ok(results)
    }

    /// Creates a `running` result for a test in a registered suite file.
    ///
    /// Runs that already have a history row are closed; starting another
    /// result under one fails with [`PipelineError::DuplicateRun`].
    pub fn start_result(&mut self, request: &StartExecution) -> Result<TestResult> {
        let test_id = request.test_id.trim();
        if test_id.is_empty() {
            return Err(PipelineError::invalid_input("test_id").with_reason("must not be empty"));
        }
        let run_id = request.run_id.trim();
        if run_id.is_empty() {
            return Err(PipelineError::invalid_input("run_id").with_reason("must not be empty"));
        }
        let file_path = normalize_file_path(&request.file_path)?;

        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let suite_exists: bool = tx
            .query_row(
                CHECK_SUITE_EXISTS_SQL,
                params![request.test_suite_id as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check suite existence")?;
        if !suite_exists {
            return Err(PipelineError::SuiteNotFound {
                id: request.test_suite_id,
            });
        }

        let environment_exists: bool = tx
            .query_row(
                CHECK_ENVIRONMENT_EXISTS_SQL,
                params![request.environment_id as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check environment existence")?;
        if !environment_exists {
            return Err(PipelineError::EnvironmentNotFound {
                id: request.environment_id,
            });
        }

        let file_registered: bool = tx
            .query_row(
                CHECK_SUITE_FILE_SQL,
                params![request.test_suite_id as i64, &file_path],
                |row| row.get(0),
            )
            .db_context("Failed to check suite file")?;
        if !file_registered {
            return Err(PipelineError::invalid_input("file_path").with_reason(format!(
                "'{file_path}' is not registered in suite {}",
                request.test_suite_id
            )));
        }

        let run_recorded: bool = tx
            .query_row(
                CHECK_RUN_RECORDED_SQL,
                params![request.test_suite_id as i64, run_id],
                |row| row.get(0),
            )
            .db_context("Failed to check run history")?;
        if run_recorded {
            return Err(PipelineError::DuplicateRun {
                suite_id: request.test_suite_id,
                run_id: run_id.to_string(),
            });
        }

        let now = Timestamp::now();
        tx.execute(
            INSERT_RESULT_SQL,
            params![
                test_id,
                request.test_suite_id as i64,
                request.environment_id as i64,
                run_id,
                &file_path,
                ResultStatus::Running.as_str(),
                now.to_string()
            ],
        )
        .db_context("Failed to insert test result")?;

        let id = tx.last_insert_rowid() as u64;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(TestResult {
            id,
            test_id: test_id.to_string(),
            test_suite_id: request.test_suite_id,
            environment_id: request.environment_id,
            run_id: run_id.to_string(),
            file_path,
            status: ResultStatus::Running,
            start_time: now,
            end_time: None,
            duration_ms: None,
            steps: Vec::new(),
            attachments: Vec::new(),
            error_message: None,
        })
    }

    /// Finishes a result exactly once.
    ///
    /// The write is a single compare-and-set on the unfinished status; if it
    /// matches nothing the stored record is left as it was and
    /// [`PipelineError::DoubleFinish`] is returned.
    pub fn finish_result(&mut self, result_id: u64, outcome: &ExecutionOutcome) -> Result<TestResult> {
        if !outcome.status.is_terminal() {
            return Err(PipelineError::invalid_input("status").with_reason(format!(
                "outcome status must be passed, failed or skipped, got {}",
                outcome.status.as_str()
            )));
        }

        let Some(current) = self.get_result(result_id)? else {
            return Err(PipelineError::ResultNotFound { id: result_id });
        };
        if current.is_finished() {
            return Err(PipelineError::DoubleFinish { id: result_id });
        }

        let end_time = outcome.end_time.unwrap_or_else(Timestamp::now);
        if end_time < current.start_time {
            return Err(PipelineError::invalid_input("end_time").with_reason(format!(
                "end time {end_time} is before start time {}",
                current.start_time
            )));
        }
        let duration_ms = end_time.as_millisecond() - current.start_time.as_millisecond();

        let changed = self
            .connection
            .execute(
                FINISH_RESULT_SQL,
                params![
                    outcome.status.as_str(),
                    end_time.to_string(),
                    duration_ms,
                    serde_json::to_string(&outcome.step_results)?,
                    serde_json::to_string(&outcome.attachments)?,
                    outcome.error_message.as_deref(),
                    result_id as i64
                ],
            )
            .db_context("Failed to finish test result")?;

        if changed == 0 {
            // Another caller finished it between the read and the write
            return Err(PipelineError::DoubleFinish { id: result_id });
        }

        Ok(TestResult {
            status: outcome.status,
            end_time: Some(end_time),
            duration_ms: Some(duration_ms),
            steps: outcome.step_results.clone(),
            attachments: outcome.attachments.clone(),
            error_message: outcome.error_message.clone(),
            ..current
        })
    }

    /// Retrieves a result by its ID.
    pub fn get_result(&self, result_id: u64) -> Result<Option<TestResult>> {
        let query = format!("SELECT {RESULT_COLUMNS} FROM test_results WHERE id = ?1");
        self.connection
            .query_row(&query, params![result_id as i64], Self::build_result_from_row)
            .optional()
            .db_context("Failed to query test result")
    }

    /// Lists the results of a suite, optionally restricted to one run.
    pub fn list_results(&self, suite_id: u64, run_id: Option<&str>) -> Result<Vec<TestResult>> {
        if let Some(run_id) = run_id {
            return Self::query_run_results(&self.connection, suite_id, run_id);
        }

        let query = format!("SELECT {RESULT_COLUMNS} FROM test_results WHERE suite_id = ?1 ORDER BY id");
        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let results = stmt
            .query_map(params![suite_id as i64], Self::build_result_from_row)
            .db_context("Failed to query test results")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect test results")?;

        Ok(results)
    }
}
