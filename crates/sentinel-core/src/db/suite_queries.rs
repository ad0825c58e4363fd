//! Test suite storage: suites, registered files, and run history.

use jiff::Timestamp;
use rusqlite::{params, ErrorCode, OptionalExtension, TransactionBehavior};

use super::utils::{
    enum_column, file_name_of, id_column, normalize_file_path, optional_timestamp_column,
    timestamp_column,
};
use crate::{
    aggregate::summarize_run,
    error::{DatabaseResultExt, PipelineError, Result},
    models::{ExecutionHistoryEntry, FileStatus, RunStatus, TestFile, TestSuite},
};

const SUITE_COLUMNS: &str = "id, name, description, created_at, updated_at";
const INSERT_SUITE_SQL: &str =
    "INSERT INTO test_suites (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)";
const CHECK_SUITE_NAME_SQL: &str = "SELECT EXISTS(SELECT 1 FROM test_suites WHERE name = ?1)";
const CHECK_SUITE_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM test_suites WHERE id = ?1)";
const TOUCH_SUITE_SQL: &str = "UPDATE test_suites SET updated_at = ?1 WHERE id = ?2";

const FILE_COLUMNS: &str = "id, suite_id, file_name, file_path, test_count, last_run, status";
const INSERT_FILE_SQL: &str = "INSERT INTO test_files (suite_id, file_name, file_path, test_count, status) VALUES (?1, ?2, ?3, ?4, ?5)";
const CHECK_FILE_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM test_files WHERE suite_id = ?1 AND file_path = ?2)";
const UPDATE_FILE_STATUS_SQL: &str =
    "UPDATE test_files SET status = ?1, last_run = ?2 WHERE suite_id = ?3 AND file_path = ?4";
const UPDATE_FILE_LAST_RUN_SQL: &str =
    "UPDATE test_files SET last_run = ?1 WHERE suite_id = ?2 AND file_path = ?3";

const HISTORY_COLUMNS: &str = "run_id, start_time, end_time, status, total_tests, passed, failed, skipped, other, duration_ms, report_path, recorded_at";
pub(super) const CHECK_RUN_RECORDED_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM execution_history WHERE suite_id = ?1 AND run_id = ?2)";
const INSERT_HISTORY_SQL: &str = "INSERT INTO execution_history (suite_id, run_id, start_time, end_time, status, total_tests, passed, failed, skipped, other, duration_ms, report_path, recorded_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

impl super::Database {
    fn build_suite_from_row(row: &rusqlite::Row) -> rusqlite::Result<TestSuite> {
        Ok(TestSuite {
            id: id_column(row, 0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            test_files: Vec::new(),
            execution_history: Vec::new(),
            created_at: timestamp_column(row, 3)?,
            updated_at: timestamp_column(row, 4)?,
        })
    }

    fn build_file_from_row(row: &rusqlite::Row) -> rusqlite::Result<TestFile> {
        Ok(TestFile {
            id: id_column(row, 0)?,
            suite_id: id_column(row, 1)?,
            file_name: row.get(2)?,
            file_path: row.get(3)?,
            test_count: row.get::<_, i64>(4)? as u32,
            last_run: optional_timestamp_column(row, 5)?,
            status: enum_column::<FileStatus>(row, 6)?,
        })
    }

    fn build_history_from_row(row: &rusqlite::Row) -> rusqlite::Result<ExecutionHistoryEntry> {
        Ok(ExecutionHistoryEntry {
            run_id: row.get(0)?,
            start_time: timestamp_column(row, 1)?,
            end_time: timestamp_column(row, 2)?,
            status: enum_column::<RunStatus>(row, 3)?,
            total_tests: row.get::<_, i64>(4)? as u32,
            passed: row.get::<_, i64>(5)? as u32,
            failed: row.get::<_, i64>(6)? as u32,
            skipped: row.get::<_, i64>(7)? as u32,
            other: row.get::<_, i64>(8)? as u32,
            duration_ms: row.get(9)?,
            report_path: row.get(10)?,
            recorded_at: timestamp_column(row, 11)?,
        })
    }

    fn suite_exists(&self, suite_id: u64) -> Result<bool> {
        self.connection
            .query_row(CHECK_SUITE_EXISTS_SQL, params![suite_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to check suite existence")
    }

    /// Creates an empty suite.
    pub fn create_suite(&mut self, name: &str, description: Option<&str>) -> Result<TestSuite> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PipelineError::invalid_input("name").with_reason("must not be empty"));
        }

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_SUITE_NAME_SQL, params![name], |row| row.get(0))
            .db_context("Failed to check suite name")?;
        if exists {
            return Err(PipelineError::invalid_input("name")
                .with_reason(format!("a suite named '{name}' already exists")));
        }

        let now = Timestamp::now();
        let now_str = now.to_string();
        tx.execute(
            INSERT_SUITE_SQL,
            params![name, description, &now_str, &now_str],
        )
        .db_context("Failed to insert suite")?;

        let id = tx.last_insert_rowid() as u64;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(TestSuite {
            id,
            name: name.to_string(),
            description: description.map(String::from),
            test_files: Vec::new(),
            execution_history: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a suite with its files and run history.
    pub fn get_suite(&self, suite_id: u64) -> Result<Option<TestSuite>> {
        let query = format!("SELECT {SUITE_COLUMNS} FROM test_suites WHERE id = ?1");
        let mut suite = self
            .connection
            .query_row(&query, params![suite_id as i64], Self::build_suite_from_row)
            .optional()
            .db_context("Failed to query suite")?;

        if let Some(ref mut suite) = suite {
            suite.test_files = self.get_test_files(suite.id)?;
            suite.execution_history = self.get_execution_history(suite.id)?;
        }

        Ok(suite)
    }

    /// Lists all suites with their files and history, in creation order.
    pub fn list_suites(&self) -> Result<Vec<TestSuite>> {
        let query = format!("SELECT {SUITE_COLUMNS} FROM test_suites ORDER BY id");
        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let mut suites = stmt
            .query_map([], Self::build_suite_from_row)
            .db_context("Failed to query suites")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect suites")?;

        for suite in &mut suites {
            suite.test_files = self.get_test_files(suite.id)?;
            suite.execution_history = self.get_execution_history(suite.id)?;
        }

        Ok(suites)
    }

    /// Registers a file in a suite. The file starts as `not-run`.
    pub fn add_test_file(
        &mut self,
        suite_id: u64,
        file_name: Option<&str>,
        file_path: &str,
        test_count: u32,
    ) -> Result<TestFile> {
        let file_path = normalize_file_path(file_path)?;
        let file_name = file_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| file_name_of(&file_path), String::from);

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let suite_exists: bool = tx
            .query_row(CHECK_SUITE_EXISTS_SQL, params![suite_id as i64], |row| {
                row.get(0)
            })
            .db_context("Failed to check suite existence")?;
        if !suite_exists {
            return Err(PipelineError::SuiteNotFound { id: suite_id });
        }

        let registered: bool = tx
            .query_row(CHECK_FILE_SQL, params![suite_id as i64, &file_path], |row| {
                row.get(0)
            })
            .db_context("Failed to check suite file")?;
        if registered {
            return Err(PipelineError::invalid_input("file_path").with_reason(format!(
                "'{file_path}' is already registered in suite {suite_id}"
            )));
        }

        tx.execute(
            INSERT_FILE_SQL,
            params![
                suite_id as i64,
                &file_name,
                &file_path,
                test_count as i64,
                FileStatus::NotRun.as_str()
            ],
        )
        .db_context("Failed to insert test file")?;
        let id = tx.last_insert_rowid() as u64;

        tx.execute(
            TOUCH_SUITE_SQL,
            params![Timestamp::now().to_string(), suite_id as i64],
        )
        .db_context("Failed to update suite timestamp")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(TestFile {
            id,
            suite_id,
            file_name,
            file_path,
            test_count,
            last_run: None,
            status: FileStatus::NotRun,
        })
    }

    /// Registered files of a suite in registration order.
    pub fn get_test_files(&self, suite_id: u64) -> Result<Vec<TestFile>> {
        let query = format!("SELECT {FILE_COLUMNS} FROM test_files WHERE suite_id = ?1 ORDER BY id");
        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let files = stmt
            .query_map(params![suite_id as i64], Self::build_file_from_row)
            .db_context("Failed to query test files")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect test files")?;

        Ok(files)
    }

    /// Recorded runs of a suite in recording order.
    pub fn get_execution_history(&self, suite_id: u64) -> Result<Vec<ExecutionHistoryEntry>> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM execution_history WHERE suite_id = ?1 ORDER BY id"
        );
        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let history = stmt
            .query_map(params![suite_id as i64], Self::build_history_from_row)
            .db_context("Failed to query execution history")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect execution history")?;

        Ok(history)
    }

    /// Rolls the results of a run into the suite's history and re-derives
    /// the status of every file the run touched.
    ///
    /// The whole operation holds the database write lock, so two recordings
    /// of the same run cannot both succeed and file statuses always reflect
    /// the last committed run.
    pub fn record_run(
        &mut self,
        suite_id: u64,
        run_id: &str,
        report_path: Option<&str>,
    ) -> Result<ExecutionHistoryEntry> {
        let run_id = run_id.trim();
        if run_id.is_empty() {
            return Err(PipelineError::invalid_input("run_id").with_reason("must not be empty"));
        }
        if !self.suite_exists(suite_id)? {
            return Err(PipelineError::SuiteNotFound { id: suite_id });
        }

        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let recorded: bool = tx
            .query_row(
                CHECK_RUN_RECORDED_SQL,
                params![suite_id as i64, run_id],
                |row| row.get(0),
            )
            .db_context("Failed to check run history")?;
        if recorded {
            return Err(PipelineError::DuplicateRun {
                suite_id,
                run_id: run_id.to_string(),
            });
        }

        let results = Self::query_run_results(&tx, suite_id, run_id)?;
        let summary = summarize_run(run_id, &results)?;

        let now = Timestamp::now();
        let run_start = summary.start_time.to_string();
        let file_statuses = summary.file_statuses.clone();
        let entry = summary.into_entry(report_path.map(String::from), now);

        tx.execute(
            INSERT_HISTORY_SQL,
            params![
                suite_id as i64,
                &entry.run_id,
                entry.start_time.to_string(),
                entry.end_time.to_string(),
                entry.status.as_str(),
                entry.total_tests as i64,
                entry.passed as i64,
                entry.failed as i64,
                entry.skipped as i64,
                entry.other as i64,
                entry.duration_ms,
                entry.report_path.as_deref(),
                now.to_string()
            ],
        )
        .map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => PipelineError::DuplicateRun {
                suite_id,
                run_id: run_id.to_string(),
            },
            _ => PipelineError::database("Failed to insert execution history").with_source(e),
        })?;

        for (file_path, status) in &file_statuses {
            match status {
                Some(status) => tx.execute(
                    UPDATE_FILE_STATUS_SQL,
                    params![status.as_str(), &run_start, suite_id as i64, file_path],
                ),
                None => tx.execute(
                    UPDATE_FILE_LAST_RUN_SQL,
                    params![&run_start, suite_id as i64, file_path],
                ),
            }
            .db_context("Failed to update test file status")?;
        }

        tx.execute(TOUCH_SUITE_SQL, params![now.to_string(), suite_id as i64])
            .db_context("Failed to update suite timestamp")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(entry)
    }
}
