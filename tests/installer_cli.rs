//! Installer CLI tests, run against a scratch HOME.

use serde_json::Value;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper to run the installer with args and capture output
fn run_installer(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_opencode-glm-clipboard"))
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute opencode-glm-clipboard");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn config_path(home: &Path) -> std::path::PathBuf {
    home.join(".config").join("opencode").join("opencode.jsonc")
}

#[test]
fn test_help_exits_zero() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_installer(home.path(), &["--help"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("--uninstall"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn test_install_then_uninstall() {
    let home = TempDir::new().unwrap();
    let config = config_path(home.path());

    let (stdout, stderr, code) = run_installer(home.path(), &[]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains(&format!("Created {}", config.display())));
    assert!(stdout.contains("Done. Restart OpenCode."));

    let data: Value = serde_json::from_str(&std::fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(data["plugin"], serde_json::json!(["opencode-glm-clipboard"]));

    let (stdout, _, code) = run_installer(home.path(), &["--uninstall"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(&format!("Updated {}", config.display())));

    let data: Value = serde_json::from_str(&std::fs::read_to_string(&config).unwrap()).unwrap();
    assert!(data.get("plugin").is_none());
}

#[test]
fn test_dry_run_writes_nothing() {
    let home = TempDir::new().unwrap();

    let (stdout, _, code) = run_installer(home.path(), &["--dry-run"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Would create"));
    assert!(!config_path(home.path()).exists());
}

#[test]
fn test_uninstall_without_config() {
    let home = TempDir::new().unwrap();

    let (stdout, _, code) = run_installer(home.path(), &["--uninstall"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Nothing to uninstall"));
}

#[test]
fn test_invalid_config_exits_one() {
    let home = TempDir::new().unwrap();
    let config = config_path(home.path());
    std::fs::create_dir_all(config.parent().unwrap()).unwrap();
    std::fs::write(&config, "{ \"plugin\": [").unwrap();

    let (_, stderr, code) = run_installer(home.path(), &[]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Installer failed"));
    assert!(stderr.contains("Invalid JSONC"));
}
