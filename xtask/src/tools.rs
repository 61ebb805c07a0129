//! Running external tools and finding them on `PATH`.

use anyhow::{bail, Context, Result};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fail with an error naming the first tool that is not on `PATH`.
pub fn require(tools: &[&str]) -> Result<()> {
    let path = env::var_os("PATH").unwrap_or_default();

    for tool in tools {
        match find_in(tool, &path) {
            Some(found) => log::debug!("Found {} at {}", tool, found.display()),
            None => bail!("{} not found on PATH", tool),
        }
    }

    Ok(())
}

/// Search the directories of a `PATH`-style list for an executable.
pub fn find_in(tool: &str, path: &OsStr) -> Option<PathBuf> {
    env::split_paths(path).find_map(|dir| executable(&dir, tool))
}

fn executable(dir: &Path, tool: &str) -> Option<PathBuf> {
    let candidate = dir.join(tool);
    if candidate.is_file() {
        return Some(candidate);
    }

    if cfg!(windows) {
        let candidate = dir.join(format!("{}.exe", tool));
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}

/// Run `cmd` with inherited stdio; a non-zero exit is an error.
pub fn run(cmd: &mut Command) -> Result<()> {
    let line = describe(cmd);
    log::info!("exec: {}", line);

    let status = cmd
        .status()
        .with_context(|| format!("Failed to run {}", line))?;

    if !status.success() {
        bail!("`{}` failed with {}", line, status);
    }

    Ok(())
}

/// Run `cmd` and return its trimmed stdout; a non-zero exit is an error
/// carrying stderr.
pub fn output(cmd: &mut Command) -> Result<String> {
    let line = describe(cmd);
    log::debug!("exec: {}", line);

    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {}", line))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("`{}` failed with {}: {}", line, output.status, stderr.trim());
    }

    let stdout = String::from_utf8(output.stdout)
        .with_context(|| format!("Invalid UTF-8 in output of {}", line))?;
    Ok(stdout.trim().to_string())
}

/// Render a command the way it would be typed in a shell.
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
