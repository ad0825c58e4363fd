//! Pure run aggregation.
//!
//! [`summarize_run`] turns the test results of one run into the counts,
//! span, status and per-file outcomes that the suite history records. It is
//! free of storage concerns so the same rules apply wherever a run is rolled
//! up.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result},
    models::{ExecutionHistoryEntry, FileStatus, ResultStatus, RunStatus, TestResult},
};

/// Aggregate of one run before it is appended to a suite's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: RunStatus,
    pub total_tests: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Pending plus running results
    pub other: u32,
    pub duration_ms: i64,
    /// Every file path represented in the run, with the worst terminal
    /// status among its results (`None` if all its results are unfinished)
    pub file_statuses: BTreeMap<String, Option<FileStatus>>,
}

impl RunSummary {
    /// Converts the summary into a history entry.
    pub fn into_entry(
        self,
        report_path: Option<String>,
        recorded_at: Timestamp,
    ) -> ExecutionHistoryEntry {
        ExecutionHistoryEntry {
            run_id: self.run_id,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status,
            total_tests: self.total_tests,
            passed: self.passed,
            failed: self.failed,
            skipped: self.skipped,
            other: self.other,
            duration_ms: self.duration_ms,
            report_path,
            recorded_at,
        }
    }
}

/// Rolls the results of one run into a [`RunSummary`].
///
/// Each result is counted exactly once. The run spans from the earliest start
/// to the latest end, where an unfinished result's start stands in for its
/// end. The run failed if any result failed, is incomplete if any result is
/// still pending or running, and passed otherwise. A file's status is the
/// worst of failed, skipped and passed among its finished results.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] for an empty result set.
///
/// # Examples
///
/// ```rust
/// use sentinel_core::aggregate::summarize_run;
///
/// let err = summarize_run("run-1", &[]).unwrap_err();
/// assert!(err.to_string().contains("no results"));
/// ```
pub fn summarize_run(run_id: &str, results: &[TestResult]) -> Result<RunSummary> {
    let (first, rest) = results.split_first().ok_or_else(|| {
        PipelineError::invalid_input("run_id")
            .with_reason(format!("run '{run_id}' has no results"))
    })?;

    let mut start_time = first.start_time;
    let mut end_time = first.end_time.unwrap_or(first.start_time);
    for result in rest {
        start_time = start_time.min(result.start_time);
        end_time = end_time.max(result.end_time.unwrap_or(result.start_time));
    }

    let (mut passed, mut failed, mut skipped, mut other) = (0u32, 0u32, 0u32, 0u32);
    let mut file_statuses: BTreeMap<String, Option<FileStatus>> = BTreeMap::new();

    for result in results {
        match result.status {
            ResultStatus::Passed => passed += 1,
            ResultStatus::Failed => failed += 1,
            ResultStatus::Skipped => skipped += 1,
            ResultStatus::Pending | ResultStatus::Running => other += 1,
        }

        let slot = file_statuses.entry(result.file_path.clone()).or_default();
        if let Some(status) = FileStatus::from_result(result.status) {
            *slot = Some(slot.map_or(status, |current| current.max(status)));
        }
    }

    let status = if failed > 0 {
        RunStatus::Failed
    } else if other > 0 {
        RunStatus::Incomplete
    } else {
        RunStatus::Passed
    };

    Ok(RunSummary {
        run_id: run_id.to_string(),
        start_time,
        end_time,
        status,
        total_tests: results.len() as u32,
        passed,
        failed,
        skipped,
        other,
        duration_ms: end_time.as_millisecond() - start_time.as_millisecond(),
        file_statuses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u64, file: &str, status: ResultStatus, start_ms: i64, end_ms: Option<i64>) -> TestResult {
        TestResult {
            id,
            test_id: format!("t{id}"),
            test_suite_id: 1,
            environment_id: 1,
            run_id: "run-1".to_string(),
            file_path: file.to_string(),
            status,
            start_time: Timestamp::from_millisecond(start_ms).unwrap(),
            end_time: end_ms.map(|ms| Timestamp::from_millisecond(ms).unwrap()),
            duration_ms: end_ms.map(|ms| ms - start_ms),
            steps: Vec::new(),
            attachments: Vec::new(),
            error_message: None,
        }
    }

    #[test]
    fn test_mixed_run_counts_and_file_status() {
        let base = 1_700_000_000_000;
        let results = vec![
            result(1, "a.spec.ts", ResultStatus::Passed, base, Some(base + 100)),
            result(2, "a.spec.ts", ResultStatus::Passed, base + 10, Some(base + 200)),
            result(3, "b.spec.ts", ResultStatus::Passed, base + 20, Some(base + 150)),
            result(4, "b.spec.ts", ResultStatus::Failed, base + 30, Some(base + 900)),
            result(5, "c.spec.ts", ResultStatus::Skipped, base + 40, Some(base + 50)),
        ];

        let summary = summarize_run("run-1", &results).unwrap();
        assert_eq!(summary.total_tests, 5);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.other, 0);
        assert_eq!(summary.status, RunStatus::Failed);
        assert_eq!(summary.duration_ms, 900);
        assert_eq!(summary.file_statuses["a.spec.ts"], Some(FileStatus::Passed));
        assert_eq!(summary.file_statuses["b.spec.ts"], Some(FileStatus::Failed));
        assert_eq!(summary.file_statuses["c.spec.ts"], Some(FileStatus::Skipped));
    }

    #[test]
    fn test_unfinished_results_make_run_incomplete() {
        let base = 1_700_000_000_000;
        let results = vec![
            result(1, "a.spec.ts", ResultStatus::Passed, base, Some(base + 100)),
            result(2, "a.spec.ts", ResultStatus::Running, base + 500, None),
            result(3, "b.spec.ts", ResultStatus::Pending, base + 50, None),
        ];

        let summary = summarize_run("run-1", &results).unwrap();
        assert_eq!(summary.status, RunStatus::Incomplete);
        assert_eq!(summary.other, 2);
        assert_eq!(summary.total_tests, 3);
        // The running result's start stands in for its end
        assert_eq!(summary.duration_ms, 500);
        assert_eq!(summary.file_statuses["a.spec.ts"], Some(FileStatus::Passed));
        assert_eq!(summary.file_statuses["b.spec.ts"], None);
    }

    #[test]
    fn test_failure_outranks_incomplete() {
        let base = 1_700_000_000_000;
        let results = vec![
            result(1, "a.spec.ts", ResultStatus::Failed, base, Some(base + 100)),
            result(2, "a.spec.ts", ResultStatus::Running, base, None),
        ];
        let summary = summarize_run("run-1", &results).unwrap();
        assert_eq!(summary.status, RunStatus::Failed);
    }

    #[test]
    fn test_empty_run_is_rejected() {
        let err = summarize_run("run-9", &[]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
    }
}
