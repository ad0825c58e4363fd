mod common;

use sentinel_core::{
    models::{
        EnvironmentConfig, ExecutionOutcome, FileStatus, PromptStatus, ResultStatus, RunStatus,
        StepResult,
    },
    params::{
        AddTestFile, AttachGeneratedTest, CreateEnvironment, CreatePrompt, CreateSuite, FinishExecution,
        GenerateTest, Id, RecordRun, StartExecution,
    },
    PipelineError, TestType,
};

use common::create_test_pipeline;

const LOGIN_STEPS: &str = r##"{"steps": [
  {"action": "goto", "url": "/login"},
  {"action": "fill", "selector": "#email", "value": "qa@example.test"},
  {"action": "fill", "selector": "#password", "value": "hunter2"},
  {"action": "click", "selector": "button[type=submit]"},
  {"action": "assertVisible", "selector": ".dashboard", "expected": "visible"},
  {"action": "summon", "selector": "#nothing"}
]}"##;

#[tokio::test]
#[allow(clippy::too_many_lines)]
async fn test_prompt_to_history_workflow() {
    let (temp_dir, pipeline) = create_test_pipeline(LOGIN_STEPS).await;

    let env = pipeline
        .create_environment(&CreateEnvironment {
            name: "staging".to_string(),
            config: EnvironmentConfig::for_base_url("https://staging.example.test"),
        })
        .await
        .expect("Failed to create environment");

    let prompt = pipeline
        .create_prompt(&CreatePrompt {
            title: "Login".to_string(),
            prompt_content: "Log in with valid credentials and see the dashboard".to_string(),
            test_type: Some(TestType::E2e),
            environment_id: Some(env.id),
            tags: vec!["auth".to_string()],
            ..Default::default()
        })
        .await
        .expect("Failed to create prompt");
    pipeline
        .submit_prompt(&Id { id: prompt.id })
        .await
        .expect("Failed to submit prompt");

    let output_dir = temp_dir.path().join("workspace");
    let generated = pipeline
        .generate_test(&GenerateTest {
            prompt_id: prompt.id,
            output_dir: Some(output_dir.to_string_lossy().into_owned()),
            ..Default::default()
        })
        .await
        .expect("Failed to generate test");

    // The unknown action was dropped, the rest kept in order
    let stored = pipeline.require_prompt(prompt.id).await.unwrap();
    assert_eq!(stored.metadata.parsed_steps.len(), 5);
    assert_eq!(stored.status, PromptStatus::Active);
    assert!(generated
        .source_text
        .contains("baseURL: 'https://staging.example.test'"));
    assert!(output_dir.join(&generated.reference.file_path).exists());

    let suite = pipeline
        .create_suite(&CreateSuite {
            name: "auth".to_string(),
            description: Some("Authentication flows".to_string()),
        })
        .await
        .expect("Failed to create suite");
    let file = pipeline
        .attach_generated_test(&AttachGeneratedTest {
            suite_id: suite.id,
            test_id: generated.reference.test_id,
        })
        .await
        .expect("Failed to attach generated test");

    let handle = pipeline
        .start_execution(&StartExecution {
            test_id: generated.reference.test_name.clone(),
            test_suite_id: suite.id,
            environment_id: env.id,
            run_id: "nightly-1".to_string(),
            file_path: file.file_path.clone(),
        })
        .await
        .expect("Failed to start execution");

    let outcome = ExecutionOutcome {
        step_results: vec![StepResult {
            index: 0,
            action: "navigate".to_string(),
            target: "/login".to_string(),
            status: ResultStatus::Passed,
            duration_ms: 140,
            error: None,
            screenshot: Some("shots/login.png".to_string()),
        }],
        ..ExecutionOutcome::with_status(ResultStatus::Passed)
    };
    let finished = pipeline
        .finish_execution(&FinishExecution {
            result_id: handle.result_id,
            outcome,
        })
        .await
        .expect("Failed to finish execution");
    assert_eq!(finished.screenshots().collect::<Vec<_>>(), vec!["shots/login.png"]);

    let entry = pipeline
        .record_run(&RecordRun {
            suite_id: suite.id,
            run_id: "nightly-1".to_string(),
            report_path: None,
        })
        .await
        .expect("Failed to record run");
    assert_eq!(entry.status, RunStatus::Passed);
    assert_eq!(entry.total_tests, 1);

    let suite = pipeline
        .get_suite(&Id { id: suite.id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(suite.test_files[0].status, FileStatus::Passed);
    assert_eq!(suite.latest_run().map(|e| e.run_id.as_str()), Some("nightly-1"));
}

#[tokio::test]
async fn test_concurrent_finish_has_one_winner() {
    let (_temp_dir, pipeline) = create_test_pipeline("[]").await;
    let env = pipeline
        .create_environment(&CreateEnvironment {
            name: "local".to_string(),
            config: EnvironmentConfig::default(),
        })
        .await
        .unwrap();
    let suite = pipeline
        .create_suite(&CreateSuite {
            name: "race".to_string(),
            description: None,
        })
        .await
        .unwrap();
    pipeline
        .add_test_file(&AddTestFile {
            suite_id: suite.id,
            file_name: None,
            file_path: "race.spec.ts".to_string(),
            test_count: 1,
        })
        .await
        .unwrap();
    let handle = pipeline
        .start_execution(&StartExecution {
            test_id: "race".to_string(),
            test_suite_id: suite.id,
            environment_id: env.id,
            run_id: "r1".to_string(),
            file_path: "race.spec.ts".to_string(),
        })
        .await
        .unwrap();

    let passed = FinishExecution {
        result_id: handle.result_id,
        outcome: ExecutionOutcome::with_status(ResultStatus::Passed),
    };
    let failed = FinishExecution {
        result_id: handle.result_id,
        outcome: ExecutionOutcome::with_status(ResultStatus::Failed),
    };
    let (first, second) = tokio::join!(
        pipeline.finish_execution(&passed),
        pipeline.finish_execution(&failed)
    );

    let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser, Err(PipelineError::DoubleFinish { .. })));

    // Only the winning outcome was stored
    let entry = pipeline
        .record_run(&RecordRun {
            suite_id: suite.id,
            run_id: "r1".to_string(),
            report_path: None,
        })
        .await
        .unwrap();
    assert_eq!(entry.total_tests, 1);
    assert_eq!(entry.passed + entry.failed, 1);
}

#[tokio::test]
async fn test_concurrent_record_run_has_one_winner() {
    let (_temp_dir, pipeline) = create_test_pipeline("[]").await;
    let env = pipeline
        .create_environment(&CreateEnvironment {
            name: "local".to_string(),
            config: EnvironmentConfig::default(),
        })
        .await
        .unwrap();
    let suite = pipeline
        .create_suite(&CreateSuite {
            name: "race".to_string(),
            description: None,
        })
        .await
        .unwrap();
    pipeline
        .add_test_file(&AddTestFile {
            suite_id: suite.id,
            file_name: None,
            file_path: "race.spec.ts".to_string(),
            test_count: 1,
        })
        .await
        .unwrap();
    let handle = pipeline
        .start_execution(&StartExecution {
            test_id: "race".to_string(),
            test_suite_id: suite.id,
            environment_id: env.id,
            run_id: "r1".to_string(),
            file_path: "race.spec.ts".to_string(),
        })
        .await
        .unwrap();
    pipeline
        .finish_execution(&FinishExecution {
            result_id: handle.result_id,
            outcome: ExecutionOutcome::with_status(ResultStatus::Passed),
        })
        .await
        .unwrap();

    let params = RecordRun {
        suite_id: suite.id,
        run_id: "r1".to_string(),
        report_path: None,
    };
    let (first, second) = tokio::join!(pipeline.record_run(&params), pipeline.record_run(&params));

    assert_eq!([&first, &second].iter().filter(|r| r.is_ok()).count(), 1);
    let history = pipeline
        .get_run_history(&Id { id: suite.id })
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_run_history_of_unknown_suite() {
    let (_temp_dir, pipeline) = create_test_pipeline("[]").await;
    let err = pipeline.get_run_history(&Id { id: 5 }).await.unwrap_err();
    assert!(matches!(err, PipelineError::SuiteNotFound { id: 5 }));
}
