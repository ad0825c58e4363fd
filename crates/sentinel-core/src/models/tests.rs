use serde_json::json;

use super::*;

#[test]
fn test_action_aliases() {
    let cases = [
        ("goto", StepAction::Navigate),
        ("Navigate", StepAction::Navigate),
        ("assertText", StepAction::AssertText),
        ("assert_visible", StepAction::AssertVisible),
        ("expect-url", StepAction::AssertUrl),
        ("type", StepAction::Fill),
        ("dblclick", StepAction::DoubleClick),
        ("press key", StepAction::Press),
    ];
    for (input, expected) in cases {
        assert_eq!(input.parse::<StepAction>().unwrap(), expected, "{input}");
    }

    assert_eq!("".parse::<StepAction>(), Err(InvalidStep::EmptyAction));
    assert!(matches!(
        "teleport".parse::<StepAction>(),
        Err(InvalidStep::UnknownAction { .. })
    ));
}

#[test]
fn test_step_validation() {
    assert!(StepModel::new(StepAction::Click, "#submit", None, None).is_ok());
    assert_eq!(
        StepModel::new(StepAction::Click, "  ", None, None),
        Err(InvalidStep::EmptyTarget {
            action: StepAction::Click
        })
    );
    assert_eq!(
        StepModel::new(StepAction::AssertVisible, ".banner", None, Some(" ".to_string())),
        Err(InvalidStep::MissingAssertion {
            action: StepAction::AssertVisible
        })
    );
    assert_eq!(
        StepModel::new(StepAction::Fill, "#name", None, None),
        Err(InvalidStep::MissingValue {
            action: StepAction::Fill
        })
    );
    // Page-level actions need no target
    assert!(StepModel::new(StepAction::Screenshot, "", None, None).is_ok());
    assert!(StepModel::new(StepAction::AssertUrl, "", None, Some("/home".to_string())).is_ok());
}

#[test]
fn test_candidate_conversion_trims() {
    let candidate = CandidateStep {
        action: Some("assert-text".to_string()),
        target: Some("  h1 ".to_string()),
        value: None,
        assertion: Some(" Welcome ".to_string()),
    };
    let step = StepModel::try_from(candidate).unwrap();
    assert_eq!(step.target, "h1");
    assert_eq!(step.assertion.as_deref(), Some("Welcome"));

    let missing_action = CandidateStep::default();
    assert_eq!(
        StepModel::try_from(missing_action),
        Err(InvalidStep::EmptyAction)
    );
}

#[test]
fn test_canonical_distinguishes_missing_from_empty() {
    let without = StepModel::navigate("/");
    let with_empty = StepModel {
        value: Some(String::new()),
        ..StepModel::navigate("/")
    };
    assert_ne!(without.canonical(), with_empty.canonical());
}

#[test]
fn test_result_status_terminal() {
    assert!(ResultStatus::Passed.is_terminal());
    assert!(ResultStatus::Failed.is_terminal());
    assert!(ResultStatus::Skipped.is_terminal());
    assert!(!ResultStatus::Pending.is_terminal());
    assert!(!ResultStatus::Running.is_terminal());
}

#[test]
fn test_file_status_severity_order() {
    assert!(FileStatus::Failed > FileStatus::Skipped);
    assert!(FileStatus::Skipped > FileStatus::Passed);
    assert!(FileStatus::Passed > FileStatus::NotRun);
    assert_eq!(FileStatus::from_result(ResultStatus::Running), None);
    assert_eq!("not-run".parse::<FileStatus>(), Ok(FileStatus::NotRun));
}

#[test]
fn test_environment_config_keys() {
    let config: EnvironmentConfig = serde_json::from_value(json!({
        "BASE_URL": "https://example.test",
        "RETRIES": 2,
        "API_TOKEN": "secret"
    }))
    .unwrap();

    assert_eq!(config.base_url(), Some("https://example.test"));
    assert_eq!(config.browser, environment::DEFAULT_BROWSER);
    assert_eq!(config.timeout_ms, 30_000);
    assert_eq!(config.retries, 2);
    assert!(config.headless);
    assert_eq!(config.variables.get("API_TOKEN").map(String::as_str), Some("secret"));

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["BASE_URL"], "https://example.test");
    assert_eq!(value["API_TOKEN"], "secret");

    let blank = EnvironmentConfig::for_base_url("   ");
    assert_eq!(blank.base_url(), None);
}

#[test]
fn test_next_sequence() {
    let mut prompt: PromptRecord = serde_json::from_value(json!({
        "id": 1,
        "title": "t",
        "prompt_content": "c",
        "test_type": "UI",
        "status": "active",
        "base_url": null,
        "environment_id": null,
        "model": null,
        "tags": [],
        "additional_context": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap();
    assert_eq!(prompt.next_sequence(false), 1);
    assert_eq!(prompt.next_sequence(true), 1);

    for sequence in [1, 2] {
        prompt.generated_tests.push(GeneratedTestRef {
            test_id: u64::from(sequence),
            prompt_id: 1,
            sequence,
            test_name: format!("prompt-1-test-{sequence}"),
            file_path: format!("tests/generated/prompt-1/test-{sequence:03}.spec.ts"),
            fingerprint: "f".repeat(64),
            environment_id: None,
            created_at: prompt.created_at,
        });
    }
    assert_eq!(prompt.next_sequence(false), 3);
    assert_eq!(prompt.next_sequence(true), 2);
}

#[test]
fn test_outcome_deserializes_camel_case() {
    let outcome: ExecutionOutcome = serde_json::from_value(json!({
        "status": "failed",
        "endTime": "2024-05-01T10:00:03Z",
        "stepResults": [
            {"index": 0, "action": "navigate", "target": "/", "status": "passed", "durationMs": 120},
            {"index": 1, "action": "click", "target": "#go", "status": "failed",
             "error": "timeout", "screenshot": "shots/1.png"}
        ],
        "attachments": [{"kind": "trace", "path": "trace.zip"}],
        "errorMessage": "timeout"
    }))
    .unwrap();

    assert_eq!(outcome.status, ResultStatus::Failed);
    assert!(outcome.end_time.is_some());
    assert_eq!(outcome.step_results.len(), 2);
    assert_eq!(outcome.step_results[1].screenshot.as_deref(), Some("shots/1.png"));
    assert_eq!(outcome.attachments[0].kind, AttachmentKind::Trace);
}
