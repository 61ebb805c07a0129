//! Housekeeping tasks: tool checks, cleanup, vendoring, linting, tests and
//! dependency scanning.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

use crate::build::PKG_DIR;
use crate::metadata::Environment;
use crate::tools;

/// Directory release archives are written to.
pub const BUILD_DIR: &str = "build";
/// Coverage report written by `test`.
pub const COVERAGE_FILE: &str = "lcov.info";
/// Vendored dependency sources.
pub const VENDOR_DIR: &str = "vendor";

/// Tools that must be on `PATH` before building.
const REQUIRED_TOOLS: &[&str] = &["cargo", "git", "cargo-audit"];

/// Workspace packages checked by `lint`, in order.
const LINT_PACKAGES: &[&str] = &["cli-template", "xtask"];

/// Fail if a required tool is missing.
pub fn check() -> Result<()> {
    tools::require(REQUIRED_TOOLS)
}

/// Remove the coverage report, the per-platform output directories and the
/// release archives under `root`.
pub fn clean(root: &Path) -> Result<()> {
    let mut paths = vec![root.join(COVERAGE_FILE), root.join(BUILD_DIR)];

    let pkg_dir = root.join(PKG_DIR);
    if pkg_dir.is_dir() {
        for entry in WalkDir::new(&pkg_dir).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("Failed to read {}", pkg_dir.display()))?;
            if entry.file_type().is_dir() {
                paths.push(entry.into_path());
            }
        }
    }

    for path in paths {
        remove(&path)?;
    }

    Ok(())
}

/// Remove a file or directory tree; a missing path is not an error.
fn remove(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => {
            log::debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// Vendor dependency sources and refresh the lockfile.
pub fn lock() -> Result<()> {
    tools::run(Command::new("cargo").args(["vendor", VENDOR_DIR]))?;
    tools::run(Command::new("cargo").args(["update", "--workspace"]))
}

/// `cargo fmt` and `cargo clippy` for every workspace package.
///
/// On CI formatting is only checked, locally it is applied.
pub fn lint_commands(env: &Environment) -> Vec<Command> {
    let mut commands = Vec::new();

    for &package in LINT_PACKAGES {
        let mut fmt = Command::new("cargo");
        fmt.args(["fmt", "--package", package]);
        if env.ci {
            fmt.args(["--", "--check"]);
        }
        commands.push(fmt);

        let mut clippy = Command::new("cargo");
        clippy.args([
            "clippy",
            "--package",
            package,
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ]);
        commands.push(clippy);
    }

    commands
}

/// Run the lint commands, stopping at the first failure.
pub fn lint(env: &Environment) -> Result<()> {
    for mut cmd in lint_commands(env) {
        tools::run(&mut cmd)?;
    }

    Ok(())
}

/// Run the test suite with coverage, writing `lcov.info`.
pub fn test() -> Result<()> {
    if tools::require(&["cargo-tarpaulin"]).is_err() {
        println!("cargo-tarpaulin is not installed.");
        println!("Install with: cargo install cargo-tarpaulin");
        bail!("cargo-tarpaulin not found");
    }

    tools::run(Command::new("cargo").args([
        "tarpaulin",
        "--workspace",
        "--out",
        "Lcov",
        "--output-dir",
        ".",
    ]))
}

/// Scan dependencies for known vulnerabilities.
pub fn scan() -> Result<()> {
    if tools::require(&["cargo-audit"]).is_err() {
        println!("cargo-audit is not installed.");
        println!("Install with: cargo install cargo-audit");
        bail!("cargo-audit not found");
    }

    tools::run(Command::new("cargo").args(["audit", "--deny", "warnings"]))
}

/// Clean, then replace the vendor directory with an empty one.
pub fn reset(root: &Path) -> Result<()> {
    clean(root)?;

    let vendor: PathBuf = root.join(VENDOR_DIR);
    remove(&vendor)?;
    fs::create_dir(&vendor).with_context(|| format!("Failed to create {}", vendor.display()))?;

    Ok(())
}
