mod common;

use common::TestStack;
use predicates::prelude::*;

const STACK_FILE: &str = r#"{
    "codeLocation": "./wwwroot.zip",
    "sqlPassword": "hunter2!"
}"#;

#[test]
fn deploy_resolves_the_whole_stack() {
    let stack = TestStack::new();
    stack.write_stack_file(STACK_FILE);

    stack
        .cmd()
        .args(["deploy", "--stack", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10 resolved, 0 failed, 0 skipped"))
        .stdout(predicate::str::contains(
            "endpoint: https://test-as.azurewebsites.example",
        ));
}

#[test]
fn deploy_does_not_print_the_connection_string() {
    let stack = TestStack::new();
    stack.write_stack_file(STACK_FILE);

    stack
        .cmd()
        .args(["deploy", "--stack", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2!").not());
}

#[test]
fn validate_reports_resource_and_derived_counts() {
    let stack = TestStack::new();
    stack.write_stack_file(STACK_FILE);

    stack
        .cmd()
        .args(["validate", "--stack", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "8 resources, 2 derived outputs, no cycles",
        ));
}

#[test]
fn graph_lists_dependencies_in_evaluation_order() {
    let stack = TestStack::new();
    stack.write_stack_file(STACK_FILE);

    let assert = stack
        .cmd()
        .args(["graph", "--stack", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10 nodes"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let position = |needle: &str| {
        stdout
            .find(needle)
            .unwrap_or_else(|| panic!("'{needle}' missing from graph output"))
    };
    assert!(position("test-rg") < position("testsa"));
    assert!(position("testsa") < position("test-b"));
    assert!(position("test-as") < position("endpoint"));
}

#[test]
fn missing_config_key_exits_nonzero() {
    let stack = TestStack::new();
    // No stack file and no env; codeLocation is required first.

    stack
        .cmd()
        .args(["deploy", "--stack", "test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("codeLocation"));
}

#[test]
fn env_vars_stand_in_for_the_stack_file() {
    let stack = TestStack::new();

    stack
        .cmd()
        .args(["validate", "--stack", "test"])
        .env("STRATA_CONFIG_CODELOCATION", "./wwwroot.zip")
        .env("STRATA_CONFIG_SQLPASSWORD", "hunter2!")
        .assert()
        .success();
}
