//! End-to-end tests for the `consent-fixtures` binary.
//!
//! The engine is replaced by a shell bridge written into a temp directory,
//! so these run without a browser.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_consent-fixtures"));
    cmd.env_remove("RUST_LOG")
        .env_remove("FORCE_COLOR")
        .env_remove("BRAVE_BINARY");
    cmd
}

/// Fixture pages plus a config pointing at a bridge that never finds a notice.
#[cfg(unix)]
fn workspace(names: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("data");
    for name in names {
        fs::create_dir_all(root.join(name)).unwrap();
        fs::write(root.join(name).join("index.html"), "<html><body></body></html>").unwrap();
    }

    let bridge = temp.path().join("bridge.sh");
    fs::write(
        &bridge,
        r#"cat >/dev/null
[ "$1" = prepare ] && exit 0
printf '{"identified":false,"scrollBlocked":false}'
"#,
    )
    .unwrap();

    fs::write(
        config_path(temp.path()),
        format!(
            "fixtures_root = \"{}\"\njobs = 2\n\n[engine]\nprogram = \"sh\"\nargs = [\"{}\"]\n",
            root.display(),
            bridge.display()
        ),
    )
    .unwrap();
    temp
}

fn config_path(dir: &Path) -> std::path::PathBuf {
    dir.join("consent-fixtures.toml")
}

#[test]
fn list_prints_the_catalog() {
    bin()
        .args(["--no-color", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("brave.com"))
        .stdout(predicate::str::contains("scroll unverified"));
}

#[test]
fn unknown_fixture_is_fatal() {
    bin()
        .args(["--no-color", "run", "--only", "nope.example"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown fixture 'nope.example'"));
}

#[test]
fn missing_config_file_is_fatal() {
    bin()
        .args(["run", "--config", "/nonexistent/consent-fixtures.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[cfg(unix)]
#[test]
fn passing_run_exits_zero() {
    let temp = workspace(&["abxxx.com", "brave.com"]);

    bin()
        .arg("--no-color")
        .arg("run")
        .arg("--config")
        .arg(config_path(temp.path()))
        .args(["--only", "abxxx.com", "brave.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS abxxx.com"))
        .stdout(predicate::str::contains("SKIP scroll blocking"))
        .stdout(predicate::str::contains("2 fixtures: 2 passed, 0 failed"));
}

#[cfg(unix)]
#[test]
fn failing_fixture_exits_one() {
    // cam4.com expects a notice; the bridge reports none.
    let temp = workspace(&["abxxx.com", "cam4.com"]);

    bin()
        .arg("--no-color")
        .arg("run")
        .arg("--config")
        .arg(config_path(temp.path()))
        .args(["--only", "abxxx.com", "cam4.com"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL cam4.com"))
        .stdout(predicate::str::contains("PASS abxxx.com"));
}

#[cfg(unix)]
#[test]
fn json_report_is_machine_readable() {
    let temp = workspace(&["brave.com"]);

    let output = bin()
        .arg("run")
        .arg("--config")
        .arg(config_path(temp.path()))
        .args(["--only", "brave.com", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["worker_budget"], 2);
    assert_eq!(report["fixtures"][0]["name"], "brave.com");
    assert_eq!(report["fixtures"][0]["notice"]["status"], "pass");
    assert_eq!(report["fixtures"][0]["scroll_blocking"]["status"], "not_verified");
}
