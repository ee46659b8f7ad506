//! Integration tests for `scf init`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scf(project: &TempDir, data: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scf").expect("scf binary");
    cmd.current_dir(project.path());
    cmd.env("SCF_DATA_DIR", data.path());
    cmd
}

#[test]
fn init_writes_both_buildstate_files() {
    let project = TempDir::new().expect("project dir");
    let data = TempDir::new().expect("data dir");

    scf(&project, &data)
        .args(["init", "--path", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));

    assert!(project.path().join("buildstate.json").exists());
    assert!(project.path().join("buildstate.md").exists());
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let project = TempDir::new().expect("project dir");
    let data = TempDir::new().expect("data dir");

    scf(&project, &data).args(["init"]).assert().success();

    scf(&project, &data)
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    scf(&project, &data)
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn init_detects_rust_from_cargo_manifest() {
    let project = TempDir::new().expect("project dir");
    let data = TempDir::new().expect("data dir");
    std::fs::write(
        project.path().join("Cargo.toml"),
        "[package]\nname = \"widget\"\nversion = \"0.1.0\"\n",
    )
    .expect("write manifest");

    scf(&project, &data).args(["init"]).assert().success();

    let contents =
        std::fs::read_to_string(project.path().join("buildstate.json")).expect("read buildstate");
    let value: serde_json::Value = serde_json::from_str(&contents).expect("parse buildstate");
    assert_eq!(value["project"]["kind"], "rust");
    assert_eq!(value["project"]["name"], "widget");
    assert_eq!(value["schema"], "scf.buildstate.v1");
}

#[test]
fn init_name_flag_overrides_detection() {
    let project = TempDir::new().expect("project dir");
    let data = TempDir::new().expect("data dir");

    scf(&project, &data)
        .args(["init", "--name", "renamed", "--description", "a test project"])
        .assert()
        .success();

    let contents =
        std::fs::read_to_string(project.path().join("buildstate.json")).expect("read buildstate");
    let value: serde_json::Value = serde_json::from_str(&contents).expect("parse buildstate");
    assert_eq!(value["project"]["name"], "renamed");
    assert_eq!(value["project"]["description"], "a test project");
}

#[test]
fn fresh_init_validates_against_schema() {
    let project = TempDir::new().expect("project dir");
    let data = TempDir::new().expect("data dir");

    scf(&project, &data).args(["init"]).assert().success();

    scf(&project, &data)
        .args(["validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scf.buildstate.v1"));
}

#[test]
fn validate_reports_violations_with_their_location() {
    let project = TempDir::new().expect("project dir");
    let data = TempDir::new().expect("data dir");

    scf(&project, &data).args(["init"]).assert().success();

    let path = project.path().join("buildstate.json");
    let contents = std::fs::read_to_string(&path).expect("read buildstate");
    let mut value: serde_json::Value = serde_json::from_str(&contents).expect("parse buildstate");
    value["tool"]["version"] = serde_json::json!(42);
    std::fs::write(&path, serde_json::to_string_pretty(&value).expect("serialize"))
        .expect("write buildstate");

    scf(&project, &data)
        .args(["validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("schema violation"))
        .stderr(predicate::str::contains("/tool/version"));
}

#[test]
fn validate_rejects_wrong_schema_id() {
    let project = TempDir::new().expect("project dir");
    let data = TempDir::new().expect("data dir");

    scf(&project, &data).args(["init"]).assert().success();

    let path = project.path().join("buildstate.json");
    let contents = std::fs::read_to_string(&path).expect("read buildstate");
    let mut value: serde_json::Value = serde_json::from_str(&contents).expect("parse buildstate");
    value["schema"] = serde_json::json!("scf.buildstate.v999");
    std::fs::write(&path, serde_json::to_string_pretty(&value).expect("serialize"))
        .expect("write buildstate");

    scf(&project, &data).args(["validate"]).assert().failure();
}
