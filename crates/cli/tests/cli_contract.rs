use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn write_json(path: &Path, value: &Value) {
    let bytes = serde_json::to_vec_pretty(value).expect("json should serialize");
    fs::write(path, bytes).expect("file should be written");
}

fn offline_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pdf-studio-cli");
    cmd.arg("--dir").arg(dir).arg("--config").arg(dir.join("config.json"));
    cmd
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("pdf-studio-cli")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn get_of_unedited_file_is_empty_document() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    let output = offline_cmd(temp.path())
        .arg("get")
        .arg("report.pdf")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output).expect("stdout should contain valid json");
    assert_eq!(value, json!({"version": 1, "pages": {}}));
}

#[test]
fn validate_accepts_well_formed_document() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("edits.json");
    write_json(
        &path,
        &json!({"version": 1, "pages": {"0": [
            {"id": "r1", "type": "redact", "x": 10, "y": 10, "w": 160, "h": 48, "color": "#000000"}
        ]}}),
    );

    cargo_bin_cmd!("pdf-studio-cli")
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 1 items on 1 pages"));
}

#[test]
fn validate_reports_short_strokes() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("edits.json");
    write_json(
        &path,
        &json!({"version": 1, "pages": {"0": [
            {"id": "f1", "type": "freehand", "points": [[0, 0], [4, 4]],
             "strokeColor": "#0066ff", "strokeWidth": 2}
        ]}}),
    );

    cargo_bin_cmd!("pdf-studio-cli")
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("only 2 points"))
        .stderr(predicate::str::contains("1 validation issue(s)"));
}

#[test]
fn validate_fails_for_missing_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cargo_bin_cmd!("pdf-studio-cli")
        .arg("validate")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn replay_creates_items_and_writes_once_per_quiet_period() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = temp.path().join("session.json");
    write_json(
        &script,
        &json!({"steps": [
            {"action": "tool", "tool": "rectangle"},
            {"action": "down", "x": 10, "y": 10},
            {"action": "move", "x": 60, "y": 30},
            {"action": "up", "x": 110, "y": 60},
            {"action": "wait", "ms": 300},
            {"action": "tool", "tool": "textbox"},
            {"action": "click", "x": 200, "y": 300},
            {"action": "click", "x": 200, "y": 300},
            {"action": "type", "text": "Hello"},
            {"action": "click", "x": 600, "y": 900},
            {"action": "wait", "ms": 300}
        ]}),
    );

    let output = offline_cmd(temp.path())
        .arg("replay")
        .arg("report.pdf")
        .arg(&script)
        .assert()
        .success()
        .stderr(predicate::str::contains("2 writes"))
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output).expect("stdout should contain valid json");
    let items = value["pages"]["0"].as_array().expect("page 0 should have items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "rectangle");
    assert_eq!((items[0]["x"].as_f64(), items[0]["w"].as_f64()), (Some(10.0), Some(100.0)));
    assert_eq!(items[1]["type"], "textbox");
    assert_eq!(items[1]["text"], "Hello");

    let stored = fs::read(temp.path().join("report.json")).expect("edits file should be written");
    let stored: Value = serde_json::from_slice(&stored).expect("edits file should be json");
    assert_eq!(stored, value);
}

#[test]
fn replay_discards_tiny_drags() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = temp.path().join("session.json");
    write_json(
        &script,
        &json!({"steps": [
            {"action": "tool", "tool": "circle"},
            {"action": "down", "x": 10, "y": 10},
            {"action": "up", "x": 12, "y": 13},
            {"action": "wait", "ms": 300}
        ]}),
    );

    offline_cmd(temp.path())
        .arg("replay")
        .arg("report.pdf")
        .arg(&script)
        .assert()
        .success()
        .stderr(predicate::str::contains("0 writes"));

    assert!(!temp.path().join("report.json").exists());
}

#[test]
fn replay_flushes_pending_write_on_exit() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = temp.path().join("session.json");
    write_json(
        &script,
        &json!({"steps": [
            {"action": "tool", "tool": "redact"},
            {"action": "click", "x": 50, "y": 50}
        ]}),
    );

    offline_cmd(temp.path())
        .arg("replay")
        .arg("report.pdf")
        .arg(&script)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 writes"));

    assert!(temp.path().join("report.json").exists());
}

#[test]
fn replay_rejects_malformed_script() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = temp.path().join("session.json");
    fs::write(&script, r#"{"steps": [{"action": "teleport"}]}"#).expect("script should be written");

    offline_cmd(temp.path())
        .arg("replay")
        .arg("report.pdf")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid replay script"));
}
