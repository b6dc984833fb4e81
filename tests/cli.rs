//! Integration tests for the reelsmith binary.
//!
//! Each test runs in its own temporary directory marked as a repository root,
//! so configuration discovery never picks up files from the host.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

fn reelsmith(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("reelsmith"));
    cmd.current_dir(dir)
        .env_remove("REELSMITH_LLM_PROVIDER")
        .env_remove("REELSMITH_CALL_BUDGET")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = workspace();
    reelsmith(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_output() {
    let dir = workspace();
    reelsmith(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reelsmith"))
        .stdout(predicate::str::is_match(r"\b\d+\.\d+\.\d+\b").unwrap());
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let dir = workspace();
    reelsmith(dir.path()).arg("publish").assert().code(2);
}

#[test]
fn plan_prints_budgets_without_provider() {
    let dir = workspace();
    reelsmith(dir.path())
        .args(["plan", "--duration", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan for a 4-minute video"))
        .stdout(predicate::str::contains("Iterations:     2"))
        .stdout(predicate::str::contains("code_skeleton"))
        .stdout(predicate::str::contains("(parallel with visual_plan)"));
}

#[test]
fn plan_json_is_machine_readable() {
    let dir = workspace();
    let output = reelsmith(dir.path())
        .args(["--model-class", "fast", "plan", "--duration", "12", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["minutes"], 12);
    assert_eq!(plan["model_class"], "fast");
    assert_eq!(plan["fast_path"], false);
    assert_eq!(plan["max_iterations"], 3);
    assert_eq!(plan["stages"].as_array().unwrap().len(), 4);
}

#[test]
fn parse_recovers_file_input() {
    let dir = workspace();
    let input = dir.path().join("answer.txt");
    std::fs::write(
        &input,
        "Sure! Here it is:\n```json\n{\"title\": \"Limits\", \"sections\": [1, 2,],}\n```",
    )
    .unwrap();

    reelsmith(dir.path())
        .arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Limits\""));
}

#[test]
fn parse_failure_reports_diagnostic() {
    let dir = workspace();
    reelsmith(dir.path())
        .arg("parse")
        .write_stdin("nothing structured in here")
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("could not be parsed"));
}

#[test]
fn config_shows_sources() {
    let dir = workspace();
    std::fs::create_dir(dir.path().join(".reelsmith")).unwrap();
    std::fs::write(
        dir.path().join(".reelsmith").join("config.toml"),
        "[defaults]\nduration_minutes = 7\n",
    )
    .unwrap();

    reelsmith(dir.path())
        .args(["--model-class", "fast", "config"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"duration_minutes\s+= 7  \(config\)").unwrap())
        .stdout(predicate::str::is_match(r"model_class\s+= fast  \(cli\)").unwrap())
        .stdout(predicate::str::is_match(r"render_binary\s+= manim  \(default\)").unwrap());
}

#[test]
fn invalid_model_class_is_config_error() {
    let dir = workspace();
    reelsmith(dir.path())
        .args(["--model-class", "turbo", "config"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("model_class"));
}

#[test]
fn missing_explicit_config_is_config_error() {
    let dir = workspace();
    reelsmith(dir.path())
        .args(["--config", "nowhere.toml", "plan"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nowhere.toml"));
}

#[test]
fn generate_without_api_key_fails_before_any_call() {
    let dir = workspace();
    reelsmith(dir.path())
        .args(["generate", "Bayes theorem", "--no-render"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));

    assert!(!dir.path().join("output").exists());
}

#[test]
fn render_missing_script_is_internal_error() {
    let dir = workspace();
    reelsmith(dir.path())
        .args(["render", "missing.py"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.py"));
}
