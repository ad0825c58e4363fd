//! Test suite model: registered files and append-only run history.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{FileStatus, RunStatus};

/// A test file registered in a suite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestFile {
    /// Unique identifier for the file entry
    pub id: u64,

    /// ID of the owning suite
    pub suite_id: u64,

    /// Display name of the file
    pub file_name: String,

    /// Path the execution engine reports results against
    pub file_path: String,

    /// Number of tests in the file
    pub test_count: u32,

    /// Start time of the last run that touched this file
    pub last_run: Option<Timestamp>,

    /// Derived from the latest recorded run; never set by clients
    pub status: FileStatus,
}

/// Aggregate of one recorded run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionHistoryEntry {
    /// Caller-supplied run identifier, unique per suite
    pub run_id: String,

    /// Earliest start time across the run's results
    pub start_time: Timestamp,

    /// Latest end time across the run's results
    pub end_time: Timestamp,

    /// Overall outcome
    pub status: RunStatus,

    pub total_tests: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,

    /// Results that were still pending or running when the run was recorded
    pub other: u32,

    /// Wall-clock span of the run in milliseconds
    pub duration_ms: i64,

    /// Location of an external report, if one was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,

    /// Timestamp when the entry was appended (UTC)
    pub recorded_at: Timestamp,
}

/// A group of test files with their execution history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSuite {
    /// Unique identifier for the suite
    pub id: u64,

    /// Unique suite name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Registered files in registration order
    #[serde(default)]
    pub test_files: Vec<TestFile>,

    /// Recorded runs in recording order
    #[serde(default)]
    pub execution_history: Vec<ExecutionHistoryEntry>,

    /// Timestamp when the suite was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the suite was last modified (UTC)
    pub updated_at: Timestamp,
}

impl TestSuite {
    /// Looks up a registered file by path.
    pub fn file(&self, file_path: &str) -> Option<&TestFile> {
        self.test_files.iter().find(|f| f.file_path == file_path)
    }

    /// Most recently recorded run.
    pub fn latest_run(&self) -> Option<&ExecutionHistoryEntry> {
        self.execution_history.last()
    }
}
