use rusqlite::Connection;
use sentinel_core::{
    models::{
        EnvironmentConfig, ExecutionOutcome, FileStatus, PromptStatus, ResultStatus, StepModel,
    },
    params::{CreatePrompt, StartExecution},
    ArtifactGenerator, Database, PipelineError, PromptMeta,
};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

/// Suite with one file, an environment and one finished result in `run-1`.
fn seed_finished_run(db: &mut Database) -> (u64, u64) {
    let env = db
        .create_environment("local", &EnvironmentConfig::for_base_url("http://localhost"))
        .expect("Failed to create environment");
    let suite = db.create_suite("smoke", None).expect("Failed to create suite");
    db.add_test_file(suite.id, None, "tests/a.spec.ts", 1)
        .expect("Failed to add file");
    let result = db
        .start_result(&StartExecution {
            test_id: "a".to_string(),
            test_suite_id: suite.id,
            environment_id: env.id,
            run_id: "run-1".to_string(),
            file_path: "tests/a.spec.ts".to_string(),
        })
        .expect("Failed to start result");
    db.finish_result(result.id, &ExecutionOutcome::with_status(ResultStatus::Passed))
        .expect("Failed to finish result");
    (suite.id, result.id)
}

#[test]
fn test_database_initialization_is_idempotent() {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let first = Database::new(temp_file.path()).expect("First open");
    drop(first);
    let _second = Database::new(temp_file.path()).expect("Second open");
    assert!(temp_file.path().exists());
}

#[test]
fn test_environment_names_are_unique() {
    let (_temp_file, mut db) = create_test_db();

    let env = db
        .create_environment("staging", &EnvironmentConfig::default())
        .expect("Failed to create environment");
    assert_eq!(db.get_environment(env.id).unwrap().unwrap().name, "staging");

    let err = db
        .create_environment("staging", &EnvironmentConfig::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { ref field, .. } if field == "name"));
}

#[test]
fn test_duplicate_file_path_is_rejected() {
    let (_temp_file, mut db) = create_test_db();
    let suite = db.create_suite("smoke", Some("Fast checks")).unwrap();

    let file = db
        .add_test_file(suite.id, None, "./tests/login.spec.ts", 2)
        .expect("Failed to add file");
    assert_eq!(file.file_path, "tests/login.spec.ts");
    assert_eq!(file.file_name, "login.spec.ts");
    assert_eq!(file.status, FileStatus::NotRun);

    let err = db
        .add_test_file(suite.id, None, "tests/login.spec.ts", 1)
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { .. }));

    let err = db.add_test_file(999, None, "tests/x.spec.ts", 1).unwrap_err();
    assert!(matches!(err, PipelineError::SuiteNotFound { id: 999 }));
}

#[test]
fn test_history_is_append_only() {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let mut db = Database::new(temp_file.path()).unwrap();
    let (suite_id, _) = seed_finished_run(&mut db);
    db.record_run(suite_id, "run-1", None).expect("Failed to record run");

    let raw = Connection::open(temp_file.path()).unwrap();
    let update = raw.execute("UPDATE execution_history SET passed = 0", []);
    assert!(update.is_err());
    let delete = raw.execute("DELETE FROM execution_history", []);
    assert!(delete.is_err());

    let history = db.get_execution_history(suite_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].passed, 1);
}

#[test]
fn test_finished_results_are_immutable() {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let mut db = Database::new(temp_file.path()).unwrap();
    let (_, result_id) = seed_finished_run(&mut db);

    let raw = Connection::open(temp_file.path()).unwrap();
    let update = raw.execute(
        "UPDATE test_results SET status = 'failed' WHERE id = ?1",
        [result_id as i64],
    );
    assert!(update.is_err());
    let delete = raw.execute("DELETE FROM test_results WHERE id = ?1", [result_id as i64]);
    assert!(delete.is_err());

    let result = db.get_result(result_id).unwrap().unwrap();
    assert_eq!(result.status, ResultStatus::Passed);
}

#[test]
fn test_generated_tests_are_append_only() {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let mut db = Database::new(temp_file.path()).unwrap();

    let prompt = db
        .create_prompt(&CreatePrompt {
            title: "Home".to_string(),
            prompt_content: "Open home".to_string(),
            ..Default::default()
        })
        .unwrap();
    db.transition_prompt(prompt.id, PromptStatus::Draft, PromptStatus::Active)
        .unwrap()
        .expect("Draft prompt should activate");

    let generator = ArtifactGenerator::new();
    let env = EnvironmentConfig::default();
    let steps = vec![StepModel::navigate("/")];
    let generated = db
        .append_generated_test(prompt.id, None, false, |sequence| {
            generator.generate(
                &steps,
                &env,
                &PromptMeta {
                    prompt_id: prompt.id,
                    sequence,
                    title: None,
                },
            )
        })
        .unwrap()
        .expect("Active prompt should accept generation");

    let raw = Connection::open(temp_file.path()).unwrap();
    let update = raw.execute("UPDATE generated_tests SET fingerprint = 'x'", []);
    assert!(update.is_err());
    let delete = raw.execute("DELETE FROM generated_tests", []);
    assert!(delete.is_err());

    let stored = db
        .get_generated_test(generated.reference.test_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored, generated);
}

#[test]
fn test_double_finish_leaves_record_unchanged() {
    let (_temp_file, mut db) = create_test_db();
    let (_, result_id) = seed_finished_run(&mut db);
    let before = db.get_result(result_id).unwrap().unwrap();

    let mut outcome = ExecutionOutcome::with_status(ResultStatus::Failed);
    outcome.error_message = Some("late report".to_string());
    let err = db.finish_result(result_id, &outcome).unwrap_err();
    assert!(matches!(err, PipelineError::DoubleFinish { .. }));

    assert_eq!(db.get_result(result_id).unwrap().unwrap(), before);
}

#[test]
fn test_finish_rejects_end_before_start() {
    let (_temp_file, mut db) = create_test_db();
    let env = db.create_environment("e", &EnvironmentConfig::default()).unwrap();
    let suite = db.create_suite("s", None).unwrap();
    db.add_test_file(suite.id, None, "a.spec.ts", 1).unwrap();
    let result = db
        .start_result(&StartExecution {
            test_id: "a".to_string(),
            test_suite_id: suite.id,
            environment_id: env.id,
            run_id: "r".to_string(),
            file_path: "a.spec.ts".to_string(),
        })
        .unwrap();

    let mut outcome = ExecutionOutcome::with_status(ResultStatus::Passed);
    outcome.end_time = Some("2000-01-01T00:00:00Z".parse().unwrap());
    let err = db.finish_result(result.id, &outcome).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput { ref field, .. } if field == "end_time"));

    // Still running and finishable
    let finished = db
        .finish_result(result.id, &ExecutionOutcome::with_status(ResultStatus::Skipped))
        .unwrap();
    assert_eq!(finished.status, ResultStatus::Skipped);
}
