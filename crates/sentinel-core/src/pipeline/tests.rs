//! Tests for the pipeline module.

use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::{
    generator::fingerprint,
    models::{
        EnvironmentConfig, ExecutionOutcome, FileStatus, PromptStatus, ResultStatus, RunStatus,
        StepAction, TestType,
    },
    params::{
        AddTestFile, AttachGeneratedTest, CreateEnvironment, CreatePrompt, CreateSuite,
        FinishExecution, GenerateTest, Id, ListPrompts, ListResults, PromptField, RecordRun,
        StartExecution, UpdatePrompt,
    },
    parser::StaticInference,
};

const HOMEPAGE_STEPS: &str = r#"[
  {"action": "navigate", "target": "/"},
  {"action": "assert-text", "target": "title", "assertion": "non-empty"}
]"#;

/// Helper function to create a test pipeline answering every parse with
/// `payload`.
async fn create_test_pipeline(payload: &str) -> (TempDir, Pipeline) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let pipeline = PipelineBuilder::new()
        .with_database_path(Some(&db_path))
        .with_inference(Arc::new(StaticInference::new(payload)))
        .build()
        .await
        .expect("Failed to create pipeline");
    (temp_dir, pipeline)
}

fn homepage_prompt() -> CreatePrompt {
    CreatePrompt {
        title: "Homepage".to_string(),
        prompt_content: "Open homepage and check title".to_string(),
        test_type: Some(TestType::Ui),
        base_url: Some("https://example.test".to_string()),
        ..Default::default()
    }
}

async fn active_prompt(pipeline: &Pipeline) -> u64 {
    let prompt = pipeline
        .create_prompt(&homepage_prompt())
        .await
        .expect("Failed to create prompt");
    pipeline
        .submit_prompt(&Id { id: prompt.id })
        .await
        .expect("Failed to submit prompt");
    prompt.id
}

/// Suite with one registered file and an environment to run in.
async fn suite_fixture(pipeline: &Pipeline) -> (u64, u64) {
    let env = pipeline
        .create_environment(&CreateEnvironment {
            name: "local".to_string(),
            config: EnvironmentConfig::for_base_url("https://example.test"),
        })
        .await
        .expect("Failed to create environment");
    let suite = pipeline
        .create_suite(&CreateSuite {
            name: "smoke".to_string(),
            description: None,
        })
        .await
        .expect("Failed to create suite");
    pipeline
        .add_test_file(&AddTestFile {
            suite_id: suite.id,
            file_name: None,
            file_path: "tests/home.spec.ts".to_string(),
            test_count: 5,
        })
        .await
        .expect("Failed to add file");
    (suite.id, env.id)
}

async fn start(pipeline: &Pipeline, suite_id: u64, env_id: u64, run_id: &str, test_id: &str) -> u64 {
    pipeline
        .start_execution(&StartExecution {
            test_id: test_id.to_string(),
            test_suite_id: suite_id,
            environment_id: env_id,
            run_id: run_id.to_string(),
            file_path: "tests/home.spec.ts".to_string(),
        })
        .await
        .expect("Failed to start execution")
        .result_id
}

async fn finish(pipeline: &Pipeline, result_id: u64, status: ResultStatus) {
    pipeline
        .finish_execution(&FinishExecution {
            result_id,
            outcome: ExecutionOutcome::with_status(status),
        })
        .await
        .expect("Failed to finish execution");
}

#[tokio::test]
async fn test_prompt_lifecycle_transitions() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;

    let prompt = pipeline
        .create_prompt(&homepage_prompt())
        .await
        .expect("Failed to create prompt");
    assert_eq!(prompt.status, PromptStatus::Draft);
    assert!(prompt.metadata.parsed_steps.is_empty());

    // Archive requires active
    let err = pipeline.archive_prompt(&Id { id: prompt.id }).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidLifecycleState {
            expected: PromptStatus::Active,
            actual: PromptStatus::Draft,
            ..
        }
    ));

    // Parse requires active
    let err = pipeline.parse_prompt(&Id { id: prompt.id }).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidLifecycleState { .. }));

    let active = pipeline
        .submit_prompt(&Id { id: prompt.id })
        .await
        .expect("Failed to submit");
    assert_eq!(active.status, PromptStatus::Active);

    // Edits are only allowed in draft
    let err = pipeline
        .update_prompt(&UpdatePrompt {
            id: prompt.id,
            title: Some("Renamed".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidLifecycleState { .. }));

    let archived = pipeline
        .archive_prompt(&Id { id: prompt.id })
        .await
        .expect("Failed to archive");
    assert_eq!(archived.status, PromptStatus::Archived);

    // Archived is terminal
    let err = pipeline.submit_prompt(&Id { id: prompt.id }).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidLifecycleState {
            actual: PromptStatus::Archived,
            ..
        }
    ));
    let err = pipeline
        .generate_test(&GenerateTest {
            prompt_id: prompt.id,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidLifecycleState { .. }));
}

#[tokio::test]
async fn test_submit_reports_missing_fields() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;

    let prompt = pipeline
        .create_prompt(&CreatePrompt {
            title: "Empty".to_string(),
            prompt_content: "   ".to_string(),
            ..Default::default()
        })
        .await
        .expect("Failed to create prompt");

    let err = pipeline.submit_prompt(&Id { id: prompt.id }).await.unwrap_err();
    match err {
        PipelineError::IncompletePromptState { id, missing } => {
            assert_eq!(id, prompt.id);
            assert_eq!(missing, vec!["prompt_content", "test_type", "base_url"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let unchanged = pipeline
        .get_prompt(&Id { id: prompt.id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, PromptStatus::Draft);
}

#[tokio::test]
async fn test_submit_accepts_environment_base_url() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;

    let env = pipeline
        .create_environment(&CreateEnvironment {
            name: "staging".to_string(),
            config: EnvironmentConfig::for_base_url("https://staging.example.test"),
        })
        .await
        .unwrap();
    let prompt = pipeline
        .create_prompt(&CreatePrompt {
            base_url: None,
            environment_id: Some(env.id),
            ..homepage_prompt()
        })
        .await
        .unwrap();

    let active = pipeline.submit_prompt(&Id { id: prompt.id }).await.unwrap();
    assert_eq!(active.status, PromptStatus::Active);
}

#[tokio::test]
async fn test_edit_clears_optional_fields() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let prompt = pipeline
        .create_prompt(&CreatePrompt {
            model: Some("small".to_string()),
            additional_context: Some("logged out".to_string()),
            ..homepage_prompt()
        })
        .await
        .unwrap();

    let edited = pipeline
        .update_prompt(&UpdatePrompt {
            id: prompt.id,
            title: Some("Homepage (anonymous)".to_string()),
            clear: vec![PromptField::BaseUrl, PromptField::Model],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(edited.title, "Homepage (anonymous)");
    assert_eq!(edited.base_url, None);
    assert_eq!(edited.model, None);
    assert_eq!(edited.test_type, Some(TestType::Ui));
    assert_eq!(edited.additional_context.as_deref(), Some("logged out"));

    // Without a base URL the draft can no longer be submitted
    let err = pipeline.submit_prompt(&Id { id: prompt.id }).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::IncompletePromptState { ref missing, .. } if missing == &["base_url"]
    ));

    let err = pipeline
        .update_prompt(&UpdatePrompt {
            id: prompt.id,
            base_url: Some("https://example.test".to_string()),
            clear: vec![PromptField::BaseUrl],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { ref field, .. } if field == "base_url"));
    let unchanged = pipeline.get_prompt(&Id { id: prompt.id }).await.unwrap().unwrap();
    assert_eq!(unchanged.base_url, None);
}

#[tokio::test]
async fn test_concurrent_submits_activate_once() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let prompt = pipeline.create_prompt(&homepage_prompt()).await.unwrap();
    let id = Id { id: prompt.id };

    let (a, b, c) = tokio::join!(
        pipeline.submit_prompt(&id),
        pipeline.submit_prompt(&id),
        pipeline.submit_prompt(&id)
    );
    let outcomes = [a, b, c];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    for err in outcomes.into_iter().filter_map(|r| r.err()) {
        assert!(matches!(
            err,
            PipelineError::InvalidLifecycleState { ref operation, .. } if operation == "submit"
        ));
    }

    let active = pipeline.get_prompt(&id).await.unwrap().unwrap();
    assert_eq!(active.status, PromptStatus::Active);
}

#[tokio::test]
async fn test_missing_prompt_is_not_found() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;

    let err = pipeline.submit_prompt(&Id { id: 99 }).await.unwrap_err();
    assert!(matches!(err, PipelineError::PromptNotFound { id: 99 }));
    let err = pipeline.archive_prompt(&Id { id: 99 }).await.unwrap_err();
    assert!(matches!(err, PipelineError::PromptNotFound { id: 99 }));
    assert!(pipeline.get_prompt(&Id { id: 99 }).await.unwrap().is_none());
}

#[tokio::test]
async fn test_homepage_prompt_to_artifact() {
    let (temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let prompt_id = active_prompt(&pipeline).await;

    let steps = pipeline
        .parse_prompt(&Id { id: prompt_id })
        .await
        .expect("Failed to parse");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].action, StepAction::Navigate);
    assert_eq!(steps[1].action, StepAction::AssertText);
    assert_eq!(steps[1].target, "title");

    let output_dir = temp_dir.path().join("out");
    let generated = pipeline
        .generate_test(&GenerateTest {
            prompt_id,
            output_dir: Some(output_dir.to_string_lossy().into_owned()),
            ..Default::default()
        })
        .await
        .expect("Failed to generate");

    let reference = &generated.reference;
    assert_eq!(reference.sequence, 1);
    assert_eq!(reference.test_name, format!("prompt-{prompt_id}-test-1"));
    assert!(reference.file_path.contains(&format!("prompt-{prompt_id}")));
    assert_eq!(
        reference.fingerprint,
        fingerprint(&steps, &EnvironmentConfig::for_base_url("https://example.test"))
    );

    let written = std::fs::read_to_string(output_dir.join(&reference.file_path))
        .expect("Generated file should be written");
    assert_eq!(written, generated.source_text);

    let stored = pipeline.require_prompt(prompt_id).await.unwrap();
    assert_eq!(stored.metadata.parsed_steps, steps);
    assert_eq!(stored.generated_tests.len(), 1);
    assert_eq!(stored.generated_tests[0], *reference);
}

#[tokio::test]
async fn test_generate_parses_when_needed_and_sequences() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let prompt_id = active_prompt(&pipeline).await;

    let first = pipeline
        .generate_test(&GenerateTest {
            prompt_id,
            ..Default::default()
        })
        .await
        .expect("Failed to generate");
    let second = pipeline
        .generate_test(&GenerateTest {
            prompt_id,
            ..Default::default()
        })
        .await
        .expect("Failed to generate");
    let regenerated = pipeline
        .generate_test(&GenerateTest {
            prompt_id,
            regenerate: true,
            ..Default::default()
        })
        .await
        .expect("Failed to regenerate");

    assert_eq!(first.reference.sequence, 1);
    assert_eq!(second.reference.sequence, 2);
    assert_eq!(regenerated.reference.sequence, 2);
    assert_eq!(regenerated.reference.file_path, second.reference.file_path);
    // Same steps and environment give the same artifact
    assert_eq!(regenerated.reference.fingerprint, first.reference.fingerprint);
    assert_ne!(regenerated.reference.test_id, second.reference.test_id);

    let stored = pipeline.require_prompt(prompt_id).await.unwrap();
    assert_eq!(stored.generated_tests.len(), 3);
    assert_eq!(stored.metadata.parsed_steps.len(), 2);
}

#[tokio::test]
async fn test_generate_against_environment_changes_fingerprint() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let prompt_id = active_prompt(&pipeline).await;
    let firefox = pipeline
        .create_environment(&CreateEnvironment {
            name: "firefox".to_string(),
            config: EnvironmentConfig {
                browser: "firefox".to_string(),
                ..EnvironmentConfig::for_base_url("https://example.test")
            },
        })
        .await
        .unwrap();

    let default = pipeline
        .generate_test(&GenerateTest {
            prompt_id,
            ..Default::default()
        })
        .await
        .unwrap();
    let in_firefox = pipeline
        .generate_test(&GenerateTest {
            prompt_id,
            environment_id: Some(firefox.id),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_ne!(default.reference.fingerprint, in_firefox.reference.fingerprint);
    assert_eq!(in_firefox.reference.environment_id, Some(firefox.id));
    assert!(in_firefox.source_text.contains("browserName: 'firefox'"));
}

#[tokio::test]
async fn test_parse_failure_leaves_prompt_unchanged() {
    let (_temp_dir, pipeline) = create_test_pipeline("this is not json").await;
    let prompt_id = active_prompt(&pipeline).await;

    let err = pipeline.parse_prompt(&Id { id: prompt_id }).await.unwrap_err();
    assert!(matches!(err, PipelineError::ParseFailure { .. }));

    let stored = pipeline.require_prompt(prompt_id).await.unwrap();
    assert!(stored.metadata.parsed_steps.is_empty());
    assert_eq!(stored.status, PromptStatus::Active);
}

#[tokio::test]
async fn test_attach_generated_test_registers_file() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let prompt_id = active_prompt(&pipeline).await;
    let (suite_id, _) = suite_fixture(&pipeline).await;

    let generated = pipeline
        .generate_test(&GenerateTest {
            prompt_id,
            ..Default::default()
        })
        .await
        .unwrap();
    let file = pipeline
        .attach_generated_test(&AttachGeneratedTest {
            suite_id,
            test_id: generated.reference.test_id,
        })
        .await
        .expect("Failed to attach");

    assert_eq!(file.file_path, generated.reference.file_path);
    assert_eq!(file.file_name, "test-001.spec.ts");
    assert_eq!(file.status, FileStatus::NotRun);

    let err = pipeline
        .attach_generated_test(&AttachGeneratedTest {
            suite_id,
            test_id: 999,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::GeneratedTestNotFound { id: 999 }));
}

#[tokio::test]
async fn test_double_finish_is_rejected() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;

    let result_id = start(&pipeline, suite_id, env_id, "run-1", "home-title").await;
    let started = pipeline.get_result(&Id { id: result_id }).await.unwrap().unwrap();
    assert_eq!(started.status, ResultStatus::Running);
    assert!(started.end_time.is_none());

    finish(&pipeline, result_id, ResultStatus::Passed).await;
    let finished = pipeline.get_result(&Id { id: result_id }).await.unwrap().unwrap();

    let err = pipeline
        .finish_execution(&FinishExecution {
            result_id,
            outcome: ExecutionOutcome::with_status(ResultStatus::Failed),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::DoubleFinish { id } if id == result_id));

    let after = pipeline.get_result(&Id { id: result_id }).await.unwrap().unwrap();
    assert_eq!(after, finished);
    assert_eq!(after.status, ResultStatus::Passed);
    assert!(after.duration_ms.unwrap() >= 0);
}

#[tokio::test]
async fn test_finish_rejects_non_terminal_outcome() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;
    let result_id = start(&pipeline, suite_id, env_id, "run-1", "t").await;

    let err = pipeline
        .finish_execution(&FinishExecution {
            result_id,
            outcome: ExecutionOutcome::with_status(ResultStatus::Running),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { .. }));

    let err = pipeline
        .finish_execution(&FinishExecution {
            result_id: 4242,
            outcome: ExecutionOutcome::with_status(ResultStatus::Passed),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ResultNotFound { id: 4242 }));
}

#[tokio::test]
async fn test_start_requires_registered_file() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;

    let err = pipeline
        .start_execution(&StartExecution {
            test_id: "t".to_string(),
            test_suite_id: suite_id,
            environment_id: env_id,
            run_id: "run-1".to_string(),
            file_path: "tests/other.spec.ts".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { ref field, .. } if field == "file_path"));

    let err = pipeline
        .start_execution(&StartExecution {
            test_id: "t".to_string(),
            test_suite_id: 77,
            environment_id: env_id,
            run_id: "run-1".to_string(),
            file_path: "tests/home.spec.ts".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::SuiteNotFound { id: 77 }));

    // Paths are normalized before the lookup
    let handle = pipeline
        .start_execution(&StartExecution {
            test_id: "t".to_string(),
            test_suite_id: suite_id,
            environment_id: env_id,
            run_id: "run-1".to_string(),
            file_path: "./tests/../tests/home.spec.ts".to_string(),
        })
        .await
        .expect("Normalized path should match");
    let result = pipeline
        .get_result(&Id { id: handle.result_id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.file_path, "tests/home.spec.ts");
}

#[tokio::test]
async fn test_record_run_aggregates_results() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;

    let statuses = [
        ResultStatus::Passed,
        ResultStatus::Passed,
        ResultStatus::Passed,
        ResultStatus::Failed,
        ResultStatus::Skipped,
    ];
    for (index, status) in statuses.into_iter().enumerate() {
        let result_id = start(&pipeline, suite_id, env_id, "run-1", &format!("t{index}")).await;
        finish(&pipeline, result_id, status).await;
    }

    let entry = pipeline
        .record_run(&RecordRun {
            suite_id,
            run_id: "run-1".to_string(),
            report_path: Some("reports/run-1.html".to_string()),
        })
        .await
        .expect("Failed to record run");

    assert_eq!(entry.total_tests, 5);
    assert_eq!(entry.passed, 3);
    assert_eq!(entry.failed, 1);
    assert_eq!(entry.skipped, 1);
    assert_eq!(entry.other, 0);
    assert_eq!(entry.status, RunStatus::Failed);
    assert!(entry.end_time >= entry.start_time);

    let suite = pipeline.get_suite(&Id { id: suite_id }).await.unwrap().unwrap();
    let file = suite.file("tests/home.spec.ts").unwrap();
    assert_eq!(file.status, FileStatus::Failed);
    assert_eq!(file.last_run, Some(entry.start_time));
    assert_eq!(suite.execution_history, vec![entry]);
}

#[tokio::test]
async fn test_duplicate_run_is_rejected() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;

    let result_id = start(&pipeline, suite_id, env_id, "run-1", "t").await;
    finish(&pipeline, result_id, ResultStatus::Passed).await;

    let params = RecordRun {
        suite_id,
        run_id: "run-1".to_string(),
        report_path: None,
    };
    pipeline.record_run(&params).await.expect("First record");
    let err = pipeline.record_run(&params).await.unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateRun { ref run_id, .. } if run_id == "run-1"));
    assert!(err.is_protocol_violation());

    let history = pipeline.get_run_history(&Id { id: suite_id }).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_start_in_recorded_run_is_rejected() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;

    let result_id = start(&pipeline, suite_id, env_id, "run-1", "t1").await;
    finish(&pipeline, result_id, ResultStatus::Passed).await;
    pipeline
        .record_run(&RecordRun {
            suite_id,
            run_id: "run-1".to_string(),
            report_path: None,
        })
        .await
        .expect("Failed to record run");

    let err = pipeline
        .start_execution(&StartExecution {
            test_id: "t2".to_string(),
            test_suite_id: suite_id,
            environment_id: env_id,
            run_id: " run-1 ".to_string(),
            file_path: "tests/home.spec.ts".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::DuplicateRun { suite_id: s, ref run_id } if s == suite_id && run_id == "run-1"
    ));

    let results = pipeline
        .list_results(&ListResults {
            suite_id,
            run_id: Some("run-1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    let history = pipeline.get_run_history(&Id { id: suite_id }).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_tests, 1);

    // Other runs of the same suite still start
    start(&pipeline, suite_id, env_id, "run-2", "t2").await;
}

#[tokio::test]
async fn test_record_run_with_unfinished_results() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;

    let done = start(&pipeline, suite_id, env_id, "run-1", "a").await;
    finish(&pipeline, done, ResultStatus::Passed).await;
    start(&pipeline, suite_id, env_id, "run-1", "b").await;

    let entry = pipeline
        .record_run(&RecordRun {
            suite_id,
            run_id: "run-1".to_string(),
            report_path: None,
        })
        .await
        .unwrap();
    assert_eq!(entry.status, RunStatus::Incomplete);
    assert_eq!(entry.total_tests, 2);
    assert_eq!(entry.other, 1);

    // An unknown run has no results to aggregate
    let err = pipeline
        .record_run(&RecordRun {
            suite_id,
            run_id: "never-ran".to_string(),
            report_path: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_latest_run_sets_file_status() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let (suite_id, env_id) = suite_fixture(&pipeline).await;

    for (run_id, status) in [("run-1", ResultStatus::Failed), ("run-2", ResultStatus::Passed)] {
        let result_id = start(&pipeline, suite_id, env_id, run_id, "t").await;
        finish(&pipeline, result_id, status).await;
        pipeline
            .record_run(&RecordRun {
                suite_id,
                run_id: run_id.to_string(),
                report_path: None,
            })
            .await
            .unwrap();
    }

    let suite = pipeline.get_suite(&Id { id: suite_id }).await.unwrap().unwrap();
    assert_eq!(suite.test_files[0].status, FileStatus::Passed);
    let runs: Vec<&str> = suite
        .execution_history
        .iter()
        .map(|e| e.run_id.as_str())
        .collect();
    assert_eq!(runs, vec!["run-1", "run-2"]);

    let run_one = pipeline
        .list_results(&ListResults {
            suite_id,
            run_id: Some("run-1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(run_one.len(), 1);
    assert_eq!(run_one[0].status, ResultStatus::Failed);
}

#[tokio::test]
async fn test_handlers_return_display_wrappers() {
    let (_temp_dir, pipeline) = create_test_pipeline(HOMEPAGE_STEPS).await;
    let prompt_id = active_prompt(&pipeline).await;
    pipeline
        .create_prompt(&CreatePrompt {
            title: "Draft".to_string(),
            tags: vec!["wip".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    let all = pipeline
        .list_prompts_summary(&ListPrompts::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let drafts = pipeline
        .list_prompts_summary(&ListPrompts {
            status: Some(PromptStatus::Draft),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Draft");

    let tagged = pipeline
        .list_prompts_summary(&ListPrompts {
            tag: Some("wip".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);

    let steps = pipeline
        .parse_prompt_steps(&Id { id: prompt_id })
        .await
        .unwrap();
    assert!(steps.to_string().starts_with("1. navigate `/`"));

    let status = pipeline
        .archive_prompt_status(&Id { id: prompt_id })
        .await
        .unwrap();
    assert!(status.success);
    assert!(status.to_string().contains("is now archived"));
}
