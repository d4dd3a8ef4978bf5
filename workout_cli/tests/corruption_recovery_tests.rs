//! Corruption handling tests for wlog.
//!
//! These tests verify the system can handle:
//! - Damaged workout files (reported, never mistaken for "missing")
//! - Stray files inside the storage tree
//! - Leftover temp files from an interrupted save

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wlog"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

const VALID: &str = r#"{
  "workout_date": "2024-12-05",
  "user_id": "nettle",
  "exercises": [
    {"name": "Squat", "equipment": "barbell", "sets": [{"reps": 5, "weight_lbs": 185.0}]}
  ]
}"#;

fn month_dir(data_dir: &Path) -> std::path::PathBuf {
    let dir = data_dir.join("workouts/nettle/2024/12");
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_corrupted_workout_file_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(month_dir(data_dir).join("05.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted workout");

    cli(data_dir)
        .arg("show")
        .arg("nettle")
        .arg("2024-12-05")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupt workout payload"))
        .stdout(predicate::str::contains("No workout found").not());

    // The date is still listed: the entry exists, it is damaged
    cli(data_dir)
        .arg("dates")
        .arg("nettle")
        .assert()
        .success()
        .stdout("2024-12-05\n");
}

#[test]
fn test_truncated_workout_file_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // Simulate a write cut off half way through
    fs::write(month_dir(data_dir).join("05.json"), &VALID[..VALID.len() / 2]).unwrap();

    cli(data_dir)
        .arg("range")
        .arg("nettle")
        .arg("--from")
        .arg("2024-12-01")
        .arg("--to")
        .arg("2024-12-31")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupt workout payload"));
}

#[test]
fn test_corrupted_file_can_be_replaced() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(month_dir(data_dir).join("05.json"), "garbage").unwrap();

    cli(data_dir)
        .arg("log")
        .write_stdin(VALID)
        .assert()
        .success();

    cli(data_dir)
        .arg("show")
        .arg("nettle")
        .arg("2024-12-05")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Squat\""));
}

#[test]
fn test_stray_files_are_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir).arg("log").write_stdin(VALID).assert().success();

    let dir = month_dir(data_dir);
    fs::write(dir.join(".tmpX1y2Z3"), "partial write").unwrap();
    fs::write(dir.join("notes.txt"), "not a workout").unwrap();
    fs::write(dir.join("31.json.bak"), "backup").unwrap();
    fs::create_dir_all(data_dir.join("workouts/nettle/misc")).unwrap();

    cli(data_dir)
        .arg("dates")
        .arg("nettle")
        .assert()
        .success()
        .stdout("2024-12-05\n");

    cli(data_dir)
        .arg("summary")
        .arg("nettle")
        .arg("--from")
        .arg("2024-01-01")
        .arg("--to")
        .arg("2024-12-31")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts: 1"));
}

#[test]
fn test_unreadable_config_fails_cleanly() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[data\nbroken").unwrap();

    cli(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("dates")
        .arg("nettle")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}
