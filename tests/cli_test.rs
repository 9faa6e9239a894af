//! End-to-end tests for the pkgcheck binary.
//!
//! A fake `node` shell script stands in for the real runtime: it answers
//! the probe's `describe` and `factory` requests with canned JSON.
#![cfg(unix)]
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CALLABLE: &str = r#"{"status":"present","kind":"function"}"#;
const RETURNS_FUNCTION: &str = r#"{"status":"returned","kind":"function"}"#;
const THROWS: &str = r#"{"status":"threw","name":"TypeError","message":"bad options"}"#;

/// Project with `package` installed at `version` and a fake node binary.
fn setup_project(
    package: &str,
    version: &str,
    inspect: &str,
    factory: &str,
) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();

    let pkg_dir = temp.path().join("node_modules").join(package);
    fs::create_dir_all(&pkg_dir).unwrap();
    fs::write(
        pkg_dir.join("package.json"),
        format!(r#"{{"name": "{}", "version": "{}"}}"#, package, version),
    )
    .unwrap();

    let node = fake_node(temp.path(), inspect, factory);
    (temp, node)
}

fn fake_node(dir: &Path, inspect: &str, factory: &str) -> PathBuf {
    let path = dir.join("fake-node");
    let script = format!(
        concat!(
            "#!/bin/sh\n",
            "case \"$3\" in\n",
            "  describe) printf '%s' '{}' ;;\n",
            "  factory) printf '%s' '{}' ;;\n",
            "  *) exit 9 ;;\n",
            "esac\n",
        ),
        inspect, factory
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn pkgcheck(project: &Path, node: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("pkgcheck"));
    cmd.env_remove("PKGCHECK_PACKAGE")
        .env_remove("PKGCHECK_NODE")
        .env_remove("RUST_LOG")
        .arg("--project")
        .arg(project)
        .arg("--node")
        .arg(node);
    cmd
}

#[test]
fn passing_package_prints_every_success_message() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.2.1", CALLABLE, RETURNS_FUNCTION);

    pkgcheck(temp.path(), &node)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Testing @octokit/request import and basic functionality...",
        ))
        .stdout(predicate::str::contains(
            "✓ @octokit/request is correctly installed and importable",
        ))
        .stdout(predicate::str::contains(
            "✓ Package exports request function correctly",
        ))
        .stdout(predicate::str::contains(
            "✓ Version: @octokit/request@9.2.1 (meets requirement >= 9.2.1)",
        ))
        .stdout(predicate::str::contains(
            "✓ Request defaults function works correctly",
        ))
        .stdout(predicate::str::contains(
            "✓ All checks passed! @octokit/request is ready for use.",
        ));
    Ok(())
}

#[test]
fn old_version_fails_with_both_versions() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.1.9", CALLABLE, RETURNS_FUNCTION);

    pkgcheck(temp.path(), &node)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "✗ Version 9.1.9 does not meet requirement >= 9.2.1",
        ))
        .stdout(predicate::str::contains("All checks passed").not());
    Ok(())
}

#[test]
fn missing_export_fails() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project(
        "@octokit/request",
        "9.2.1",
        r#"{"status":"missing"}"#,
        RETURNS_FUNCTION,
    );

    pkgcheck(temp.path(), &node)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no export named 'request'"));
    Ok(())
}

#[test]
fn non_function_export_fails() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project(
        "@octokit/request",
        "9.2.1",
        r#"{"status":"present","kind":"object"}"#,
        RETURNS_FUNCTION,
    );

    pkgcheck(temp.path(), &node)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("did not export a function"));
    Ok(())
}

#[test]
fn factory_throw_still_passes() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.2.1", CALLABLE, THROWS);

    pkgcheck(temp.path(), &node)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "✓ Request function structure is valid",
        ));
    Ok(())
}

#[test]
fn strict_factory_makes_throw_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.2.1", CALLABLE, THROWS);

    pkgcheck(temp.path(), &node)
        .arg("--strict-factory")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("threw TypeError: bad options"));
    Ok(())
}

#[test]
fn uninstalled_manifest_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let node = fake_node(temp.path(), CALLABLE, RETURNS_FUNCTION);

    pkgcheck(temp.path(), &node)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("manifest not found"));
    Ok(())
}

#[test]
fn missing_node_binary_fails() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, _) = setup_project("@octokit/request", "9.2.1", CALLABLE, RETURNS_FUNCTION);
    let missing = temp.path().join("no-such-node");

    pkgcheck(temp.path(), &missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not run"));
    Ok(())
}

#[test]
fn json_report_is_written_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.3.0", CALLABLE, RETURNS_FUNCTION);

    let output = pkgcheck(temp.path(), &node).arg("--json").output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["passed"], true);
    assert_eq!(report["exit_code"], 0);
    assert_eq!(report["found"], "9.3.0");
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(6));
    Ok(())
}

#[test]
fn json_report_on_failure() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "8.0.0", CALLABLE, RETURNS_FUNCTION);

    let output = pkgcheck(temp.path(), &node).arg("--json").output()?;
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["passed"], false);
    assert_eq!(report["error_kind"], "VersionTooLowError");
    Ok(())
}

#[test]
fn config_file_selects_package() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("got", "14.4.0", CALLABLE, RETURNS_FUNCTION);
    fs::write(
        temp.path().join(".pkgcheck.yml"),
        "package: got\nexport: got\nfactory: extend\nmin_version: \">= 14.0.0\"\n",
    )?;

    pkgcheck(temp.path(), &node)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Version: got@14.4.0 (meets requirement >= 14.0.0)"))
        .stdout(predicate::str::contains("✓ Got extend function works correctly"));
    Ok(())
}

#[test]
fn flags_override_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("got", "14.4.0", CALLABLE, RETURNS_FUNCTION);
    fs::write(
        temp.path().join(".pkgcheck.yml"),
        "package: got\nexport: got\nmin_version: 14.0.0\n",
    )?;

    pkgcheck(temp.path(), &node)
        .args(["--min-version", "15.0.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Version 14.4.0 does not meet requirement >= 15.0.0",
        ));
    Ok(())
}

#[test]
fn invalid_config_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.2.1", CALLABLE, RETURNS_FUNCTION);
    fs::write(temp.path().join(".pkgcheck.yml"), "packge: typo\n")?;

    pkgcheck(temp.path(), &node)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}

#[test]
fn invalid_config_file_still_writes_json_report() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.2.1", CALLABLE, RETURNS_FUNCTION);
    fs::write(temp.path().join(".pkgcheck.yml"), "packge: typo\n")?;

    let output = pkgcheck(temp.path(), &node).arg("--json").output()?;
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["passed"], false);
    assert_eq!(report["exit_code"], 1);
    assert_eq!(report["error_kind"], "ConfigError");
    Ok(())
}

#[test]
fn quiet_mode_hides_progress() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, node) = setup_project("@octokit/request", "9.2.1", CALLABLE, RETURNS_FUNCTION);

    pkgcheck(temp.path(), &node)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Testing").not())
        .stdout(predicate::str::contains("All checks passed!"));
    Ok(())
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("pkgcheck"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--strict-factory"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("pkgcheck"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_rejects_bad_version_flag() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("pkgcheck"));
    cmd.args(["--min-version", "latest"]);
    cmd.assert().code(2);
    Ok(())
}
