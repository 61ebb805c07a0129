//! End-to-end tests for the `cli-template version` command.
//!
//! The metadata values depend on how the binary was built, so these tests
//! check the shape of the output rather than the values.

#[allow(dead_code)]
mod common;
use common::prelude::*;

fn version_lines(args: &[&str]) -> Vec<String> {
    let mut cmd = cargo_bin_cmd!("cli-template");
    let output = cmd.arg("version").args(args).output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_version_prints_three_lines_in_order() {
    let lines = version_lines(&[]);
    assert_eq!(lines.len(), 3, "unexpected output: {:?}", lines);
    assert!(lines[0].starts_with("Version:    "));
    assert!(lines[1].starts_with("Build Time: "));
    assert!(lines[2].starts_with("Commit:     "));
}

#[test]
fn test_version_ignores_args() {
    assert_eq!(version_lines(&["extra", "--flag"]), version_lines(&[]));
}

#[test]
fn test_version_matches_version_flag() {
    let lines = version_lines(&[]);
    let version = lines[0].trim_start_matches("Version:").trim();

    let mut cmd = cargo_bin_cmd!("cli-template");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{} {}", BIN, version)));
}

#[test]
fn test_help_version_shows_help_text() {
    let mut cmd = cargo_bin_cmd!("cli-template");
    cmd.args(["help", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Shows the command version and build metadata",
        ));
}
