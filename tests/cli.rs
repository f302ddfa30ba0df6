use slideshow_curator::{ImageRecord, SIDECAR_FILE};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

/// Run the `curator` binary with its config directory inside `home`
fn curator(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_curator"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn sidecar(dir: &Path) -> Vec<ImageRecord> {
    serde_json::from_str(&fs::read_to_string(dir.join(SIDECAR_FILE)).unwrap()).unwrap()
}

fn write_orphan_sidecar(dir: &Path) {
    fs::write(
        dir.join(SIDECAR_FILE),
        r#"[{ "name": "gone.jpg", "alwaysShow": true, "start": null, "end": null }]"#,
    )
    .unwrap();
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn test_set_clear_start_drops_the_bound() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    fs::write(project.path().join("a.jpg"), b"image").unwrap();
    fs::write(
        project.path().join(SIDECAR_FILE),
        r#"[{ "name": "a.jpg", "alwaysShow": false, "start": "2024-01-01T10:00", "end": "2024-01-02T10:00" }]"#,
    )
    .unwrap();
    let dir = project.path().to_str().unwrap();

    let output = curator(home.path(), &["--project", dir, "set", "a.jpg", "--clear-start"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let records = sidecar(project.path());
    assert_eq!(records[0].start, None);
    assert_eq!(records[0].end.as_deref(), Some("2024-01-02T10:00"));
    assert!(!records[0].always_show);
}

#[test]
fn test_remove_drops_record_whose_file_is_gone() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    write_orphan_sidecar(project.path());
    let dir = project.path().to_str().unwrap();

    let output = curator(home.path(), &["--project", dir, "remove", "gone.jpg"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!stdout(&output).contains("had no record"));
    assert!(sidecar(project.path()).is_empty());
}

#[test]
fn test_delete_reports_record_whose_file_is_gone() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    write_orphan_sidecar(project.path());
    let dir = project.path().to_str().unwrap();

    let output = curator(home.path(), &["--project", dir, "delete", "gone.jpg"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("file already gone, record removed"));
    assert!(sidecar(project.path()).is_empty());
}

#[test]
fn test_without_project_or_last_project_fails() {
    let home = tempdir().unwrap();

    let output = curator(home.path(), &["list"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No project folder is open"));
}

#[test]
fn test_project_flag_does_not_change_remembered_project() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    let dir = project.path().to_str().unwrap();

    let output = curator(home.path(), &["--project", dir, "list"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(is_empty_dir(home.path()));
}

#[test]
fn test_open_becomes_the_default_project() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    fs::write(project.path().join("a.jpg"), b"image").unwrap();
    let dir = project.path().to_str().unwrap();

    let output = curator(home.path(), &["open", dir]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!is_empty_dir(home.path()));

    let output = curator(home.path(), &["untracked"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "a.jpg");
}
