//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own config file in a
//! temporary directory and checks stdout and the exit code.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn config_file(dir: &TempDir) -> PathBuf {
    dir.path().join("quiz.toml")
}

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(config: &Path, args: &[&str], stdin: Option<&str>) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_habilis"))
        .arg("--config")
        .arg(config)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }

    let output = child.wait_with_output().expect("wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

#[test]
fn test_resolve_tie_uses_priority() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&config_file(&dir), &["resolve", "artistic", "explorer"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("Profile: explorer"));
    assert!(stdout.contains("Product: 2"));
}

#[test]
fn test_resolve_json() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &config_file(&dir),
        &["resolve", "motor", "motor", "logical", "--json"],
        None,
    );
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["profile"], "motor");
    assert_eq!(parsed["product"], 7);
}

#[test]
fn test_resolve_unknown_label_fails() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&config_file(&dir), &["resolve", "musical"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("no product mapped for profile 'musical'"));
}

#[test]
fn test_first_run_writes_default_config() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);
    let (code, _, _) = run_cli(&path, &["profiles"], None);
    assert_eq!(code, 0);
    assert!(path.exists());
}

#[test]
fn test_questions_list() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&config_file(&dir), &["questions"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("5. "));
    assert!(stdout.contains("[explorer]"));
}

#[test]
fn test_profiles_json() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&config_file(&dir), &["profiles", "--json"], None);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["tie_break"][0], "logical");
    assert_eq!(parsed["profiles"].as_array().unwrap().len(), 4);
}

#[test]
fn test_config_set_get() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);

    let (code, _, _) = run_cli(
        &path,
        &["config", "set", "api.base_url", "https://habilis.test"],
        None,
    );
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(&path, &["config", "get", "api.base_url"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "https://habilis.test");
}

#[test]
fn test_config_set_rejects_unmapped_priority() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);

    let (code, _, _) = run_cli(
        &path,
        &["config", "set", "tie_break", r#"["logical","explorer","artistic","musical"]"#],
        None,
    );
    assert_eq!(code, 1);

    let (code, stdout, _) = run_cli(&path, &["config", "validate"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("4 profiles"));
}

#[test]
fn test_config_path() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);
    let (code, stdout, _) = run_cli(&path, &["config", "path"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), path.display().to_string());
}

#[test]
fn test_offline_quiz_saves_pending_checkout() {
    let dir = TempDir::new().unwrap();
    let pending = dir.path().join("pending.json");
    let pending_arg = pending.to_str().unwrap();

    let (code, stdout, _) = run_cli(
        &config_file(&dir),
        &["quiz", "--offline", "--email", "parent@example.com", "--save-pending", pending_arg],
        Some("Lucia\n5\nD\nB\nB\nA\nD\ny\n"),
    );
    assert_eq!(code, 0, "quiz failed: {stdout}");
    assert!(stdout.contains("Profile: Naturalist"));
    assert!(stdout.contains("Explorer Kit: Paper Animals"));
    assert!(stdout.contains("you need to create an account"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&pending).unwrap()).unwrap();
    assert_eq!(saved["childName"], "Lucia");
    assert_eq!(saved["productId"], 2);
}

/// Run an offline quiz that ends at registration and saves the pending record.
fn save_pending_checkout(dir: &TempDir) -> PathBuf {
    let pending = dir.path().join("pending.json");
    let (code, stdout, _) = run_cli(
        &config_file(dir),
        &[
            "quiz",
            "--offline",
            "--email",
            "parent@example.com",
            "--save-pending",
            pending.to_str().unwrap(),
        ],
        Some("Lucia\n5\nD\nB\nB\nA\nD\ny\n"),
    );
    assert_eq!(code, 0, "quiz failed: {stdout}");
    pending
}

#[test]
fn test_resume_reuses_saved_email() {
    let dir = TempDir::new().unwrap();
    let pending = save_pending_checkout(&dir);

    // No stdin: asking for the email again would fail on closed input.
    let (code, stdout, stderr) = run_cli(
        &config_file(&dir),
        &["quiz", "--offline", "--resume", pending.to_str().unwrap()],
        None,
    );
    assert_eq!(code, 0, "resume failed: {stderr}");
    assert!(stdout.contains("Welcome back"));
    assert!(!stdout.contains("Your email:"));
    assert!(stdout.contains("you need to create an account"));
    assert!(pending.exists());
}

#[test]
fn test_resume_to_payment_removes_pending_record() {
    let dir = TempDir::new().unwrap();
    let pending = save_pending_checkout(&dir);
    let config = config_file(&dir);

    let mut server = mockito::Server::new();
    let _me = server
        .mock("GET", "/api/auth/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":9,"correoElectronico":"parent@example.com"}"#)
        .create();

    let (code, _, _) = run_cli(&config, &["config", "set", "api.base_url", &server.url()], None);
    assert_eq!(code, 0);

    let (code, stdout, stderr) =
        run_cli(&config, &["quiz", "--resume", pending.to_str().unwrap()], None);
    assert_eq!(code, 0, "resume failed: {stderr}");
    assert!(stdout.contains("Continue to secure payment as parent@example.com"));
    assert!(!pending.exists());
}

#[test]
fn test_resume_rejects_tampered_record() {
    let dir = TempDir::new().unwrap();
    let pending = save_pending_checkout(&dir);

    let mut record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&pending).unwrap()).unwrap();
    record["productId"] = 4.into();
    std::fs::write(&pending, record.to_string()).unwrap();

    let (code, _, stderr) = run_cli(
        &config_file(&dir),
        &["quiz", "--offline", "--resume", pending.to_str().unwrap()],
        None,
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("saved checkout is not valid"));
}

#[test]
fn test_config_set_questions_from_json() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);
    let bank = r#"[{"id":1,"context":"At the park","text":"what does {child} do?","options":[
        {"letter":"A","text":"Climbs","profile":"motor"},
        {"letter":"B","text":"Counts leaves","profile":"logical"}]}]"#;

    let (code, _, stderr) = run_cli(&path, &["config", "set", "questions", bank], None);
    assert_eq!(code, 0, "set failed: {stderr}");

    let (code, stdout, _) = run_cli(&path, &["questions", "--json"], None);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&config_file(&dir), &["completions", "bash"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("habilis"));
}
