// tests/cli_tests.rs
#![cfg(feature = "cli")]

use jsonsift::Output;
use jsonsift::cli::{CheckOptions, CheckResult, CliError, execute_check, get_doc_category, get_docs_overview};
use serde_json::json;

fn check(query: &str, input: &str) -> CheckOptions {
    CheckOptions {
        query: query.to_string(),
        input: Some(input.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_check_evaluates_query() {
    match execute_check(&check("$.a.b", r#"{"a": {"b": [1, 2]}}"#)).unwrap() {
        CheckResult::Success(output) => assert_eq!(output, Output::Value(json!([1, 2]))),
        other => panic!("Expected success, got {:?}", other),
    }
}

#[test]
fn test_check_with_config() {
    let mut options = check(".u", r#"{"user": {"name": "Ann"}}"#);
    options.config = Some(r#"{"aliases": [{"alias": "u", "path": "$.user.name"}]}"#.to_string());
    match execute_check(&options).unwrap() {
        CheckResult::Success(output) => assert_eq!(output, Output::Value(json!("Ann"))),
        other => panic!("Expected success, got {:?}", other),
    }
}

#[test]
fn test_syntax_only_needs_no_input() {
    let options = CheckOptions {
        query: "$.a[1:2]".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(execute_check(&options).unwrap(), CheckResult::SyntaxValid));
}

#[test]
fn test_syntax_only_reports_errors() {
    let options = CheckOptions {
        query: "$.a[".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    let err = execute_check(&options).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("E_SYNTAX"), "{}", err);
}

#[test]
fn test_missing_input() {
    let options = CheckOptions {
        query: "$".to_string(),
        ..Default::default()
    };
    assert!(matches!(execute_check(&options), Err(CliError::NoInput)));
}

#[test]
fn test_invalid_json_input() {
    let err = execute_check(&check("$", "{not json")).unwrap_err();
    assert!(matches!(err, CliError::Json(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_invalid_config_file() {
    let mut options = check("$", "{}");
    options.config = Some(r#"{"fallback": {"strategy": "default"}}"#.to_string());
    let err = execute_check(&options).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("E_INVALID_CONFIG"), "{}", err);
}

#[test]
fn test_path_not_found_shows_hint() {
    let message = execute_check(&check("$.missing", "{}")).unwrap_err().to_string();
    assert!(message.contains("E_PATH_NOT_FOUND"), "{}", message);
    assert!(message.contains("hint:"), "{}", message);
}

#[test]
fn test_docs() {
    let overview = get_docs_overview();
    for category in ["syntax", "conditions", "functions", "config"] {
        assert!(overview.contains(category), "overview missing {}", category);
        assert!(get_doc_category(category).is_ok(), "no doc for {}", category);
    }
    assert!(get_doc_category("functions").unwrap().contains("filter("));
    assert!(matches!(
        get_doc_category("unknown"),
        Err(CliError::UnknownCategory(_))
    ));
}
