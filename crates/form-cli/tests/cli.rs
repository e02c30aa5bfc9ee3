use std::{fs, path::Path};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn cli(store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("greentic-form").expect("binary");
    cmd.arg("--store")
        .arg(store)
        .env_remove("GREENTIC_FORM_STORE_DIR");
    cmd
}

fn add(store: &Path, args: &[&str]) -> String {
    let output = cli(store).arg("add").args(args).output().expect("run add");
    assert!(output.status.success(), "add failed: {:?}", output);
    String::from_utf8(output.stdout).expect("utf8").trim().to_string()
}

fn saved_fields(store: &Path) -> Value {
    let text = fs::read_to_string(store.join("formConfig.json")).expect("saved schema");
    serde_json::from_str(&text).expect("json")
}

#[test]
fn add_then_list_persists_fields() {
    let dir = TempDir::new().expect("temp dir");
    let id = add(dir.path(), &["--type", "checkbox", "--options", "3"]);

    let fields = saved_fields(dir.path());
    assert_eq!(fields[0]["id"], id.as_str());
    assert_eq!(fields[0]["options"].as_array().expect("options").len(), 3);

    let output = cli(dir.path()).arg("list").output().expect("list");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains(&format!("{} [checkbox]", id)));
}

#[test]
fn add_rejects_missing_option_count() {
    let dir = TempDir::new().expect("temp dir");
    cli(dir.path())
        .args(["add", "--type", "radio"])
        .assert()
        .failure();
    assert!(!dir.path().join("formConfig.json").exists());
}

#[test]
fn remove_declined_keeps_field() {
    let dir = TempDir::new().expect("temp dir");
    let id = add(dir.path(), &["--type", "text"]);

    cli(dir.path())
        .args(["remove", "--id", &id])
        .write_stdin("n\n")
        .assert()
        .success();
    assert_eq!(saved_fields(dir.path()).as_array().expect("array").len(), 1);

    cli(dir.path())
        .args(["remove", "--id", &id, "--yes"])
        .assert()
        .success();
    assert_eq!(saved_fields(dir.path()).as_array().expect("array").len(), 0);
}

#[test]
fn validate_reports_conditional_errors() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let store = workspace.path();
    let trigger = add(store, &["--type", "text"]);
    let phone = add(store, &["--type", "text"]);

    cli(store)
        .args(["edit", "--id", &trigger, "--label", "yes"])
        .assert()
        .success();
    cli(store)
        .args([
            "edit",
            "--id",
            &phone,
            "--validation-type",
            "phone",
            "--depends-on",
            &trigger,
            "--depends-value",
            "yes",
        ])
        .assert()
        .success();

    let answers = store.join("answers.json");
    fs::write(&answers, format!(r#"{{"{}": "1234567890"}}"#, phone))?;
    let output = cli(store)
        .arg("validate")
        .arg("--answers")
        .arg(&answers)
        .output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("Validation result: invalid"));

    fs::write(&answers, format!(r#"{{"{}": "9123456789"}}"#, phone))?;
    cli(store)
        .arg("validate")
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success();
    Ok(())
}

#[test]
fn edit_rejects_self_dependency() {
    let dir = TempDir::new().expect("temp dir");
    let id = add(dir.path(), &["--type", "text"]);
    cli(dir.path())
        .args(["edit", "--id", &id, "--depends-on", &id, "--depends-value", "x"])
        .assert()
        .failure();
    assert!(saved_fields(dir.path())[0]["condition"].get("dependentField").is_none());
}

#[test]
fn preview_json_lists_visible_fields() {
    let dir = TempDir::new().expect("temp dir");
    add(dir.path(), &["--type", "file"]);
    let output = cli(dir.path())
        .args(["preview", "--format", "json"])
        .output()
        .expect("preview");
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["visible"], 1);
    assert_eq!(value["fields"][0]["inputType"], "file");
}
