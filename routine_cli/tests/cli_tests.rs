//! Integration tests for the gymroutine binary.
//!
//! These tests verify end-to-end behavior including:
//! - Split planning and fuzzy matching commands
//! - Classic generation as text and JSON
//! - Graceful fallback when the model server is unreachable
//! - Saving routines to disk

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Unroutable local port: connections are refused immediately
const DEAD_SERVER: &str = "http://127.0.0.1:9";

/// Helper to create an isolated config directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary with config lookups isolated in `home`
fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gymroutine"));
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("HOME", home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let home = setup_test_dir();
    cli(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("AI-assisted gym routine generator"));
}

#[test]
fn test_split_three_days() {
    let home = setup_test_dir();
    cli(&home)
        .args(["split", "--days", "3", "--level", "Intermedio"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 1: Chest, Shoulders, Triceps  [2, 2, 1]"))
        .stdout(predicate::str::contains("Day 2: Back, Biceps  [3, 2]"))
        .stdout(predicate::str::contains("Day 3: Legs, Glutes, Core"));
}

#[test]
fn test_split_rejects_unknown_level() {
    let home = setup_test_dir();
    cli(&home)
        .args(["split", "--days", "3", "--level", "olympian"])
        .assert()
        .failure();
}

#[test]
fn test_match_prefers_exact_name() {
    let home = setup_test_dir();
    cli(&home)
        .args(["match", "press de banca"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bench Press (Press de Banca) [exact]"));
}

#[test]
fn test_match_keyword_and_no_match() {
    let home = setup_test_dir();
    cli(&home)
        .args(["match", "goblet squat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[keyword]"));

    cli(&home)
        .args(["match", "underwater basket weaving"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match"));
}

#[test]
fn test_match_with_csv_catalog() {
    let home = setup_test_dir();
    let csv_path = home.path().join("catalog.csv");
    fs::write(
        &csv_path,
        "name,localized_name,muscle_groups,equipment,difficulty\n\
         Cable Fly,Cruce de Poleas,Pecho,Machine,2\n",
    )
    .unwrap();

    cli(&home)
        .args(["match", "cruce de poleas", "--catalog-csv"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cable Fly"))
        .stdout(predicate::str::contains("Muscle groups: Pecho"));
}

#[test]
fn test_generate_classic_json() {
    let home = setup_test_dir();
    let output = cli(&home)
        .args([
            "generate", "--name", "Ana", "--age", "30", "--level", "Intermedio", "--days", "3",
            "--goal", "Ganar fuerza", "--no-ai", "--json", "--seed", "7",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["generated_with_ai"], false);
    let days = result["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    for day in days {
        let exercises = day["exercises"].as_array().unwrap();
        assert!(!exercises.is_empty());
        assert!(exercises.len() <= 5);
        assert_eq!(day["source"], "classic");
    }
}

#[test]
fn test_generate_text_output() {
    let home = setup_test_dir();
    cli(&home)
        .args(["generate", "--name", "Luis", "--days", "2", "--no-ai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PERSONALIZED ROUTINE"))
        .stdout(predicate::str::contains("Name: Luis"))
        .stdout(predicate::str::contains("DAY 2:"))
        .stdout(predicate::str::contains("classic method"));
}

#[test]
fn test_generate_with_unreachable_model_falls_back() {
    let home = setup_test_dir();
    let output = cli(&home)
        .args(["generate", "--days", "2", "--json", "--ollama-url", DEAD_SERVER])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["generated_with_ai"], false);
    assert_eq!(result["days"].as_array().unwrap().len(), 2);
}

#[test]
fn test_generate_rejects_invalid_days() {
    let home = setup_test_dir();
    cli(&home)
        .args(["generate", "--days", "9", "--no-ai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("days_per_week"));
}

#[test]
fn test_generate_saves_routine() {
    let home = setup_test_dir();
    let path = home.path().join("out").join("ana.json");

    cli(&home)
        .args(["generate", "--name", "Ana", "--days", "1", "--no-ai", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Routine saved"));

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["profile"]["name"], "Ana");
    assert!(saved["id"].is_string());
    assert_eq!(saved["result"]["days"].as_array().unwrap().len(), 1);
}

#[test]
fn test_generate_save_uses_data_dir() {
    let home = setup_test_dir();

    cli(&home)
        .args(["generate", "--name", "Ana", "--days", "2", "--no-ai", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Routine saved"));

    let routines = home.path().join("data").join("gymroutine").join("routines");
    let files: Vec<_> = fs::read_dir(&routines).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "json");

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(
        files[0].file_stem().unwrap().to_str().unwrap(),
        saved["id"].as_str().unwrap()
    );
    assert_eq!(saved["result"]["days"].as_array().unwrap().len(), 2);
}

#[test]
fn test_generate_save_honours_configured_data_dir() {
    let home = setup_test_dir();
    let data_dir = home.path().join("elsewhere");
    let config_path = home.path().join("custom.toml");
    fs::write(&config_path, format!("[data]\ndata_dir = {:?}\n", data_dir)).unwrap();

    cli(&home)
        .arg("--config")
        .arg(&config_path)
        .args(["generate", "--days", "1", "--no-ai", "--json", "--save"])
        .assert()
        .success();

    assert_eq!(fs::read_dir(data_dir.join("routines")).unwrap().count(), 1);
    assert!(!home.path().join("data").join("gymroutine").exists());
}

#[test]
fn test_split_follows_configured_exercises_per_day() {
    let home = setup_test_dir();
    let config_path = home.path().join("custom.toml");
    fs::write(&config_path, "[generation]\nexercises_per_day = 6\n").unwrap();

    cli(&home)
        .arg("--config")
        .arg(&config_path)
        .args(["split", "--days", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 1: Chest, Shoulders, Triceps  [2, 2, 2]"))
        .stdout(predicate::str::contains("Day 2: Back, Biceps  [3, 3]"));
}

#[test]
fn test_status_reports_unreachable_server() {
    let home = setup_test_dir();
    cli(&home)
        .args(["status", "--ollama-url", DEAD_SERVER])
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT REACHABLE"));
}

#[test]
fn test_explicit_config_file() {
    let home = setup_test_dir();
    let config_path = home.path().join("custom.toml");
    fs::write(&config_path, "[generation]\nexercises_per_day = 3\nuse_ai = false\n").unwrap();

    let output = cli(&home)
        .arg("--config")
        .arg(&config_path)
        .args(["generate", "--days", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["days"][0]["exercises"].as_array().unwrap().len(), 3);
}
