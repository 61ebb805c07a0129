//! Build metadata injected into the compiled binaries.
//!
//! The values reach the binary as environment variables read by its build
//! script. Commit and version lookups are best effort: a failure is logged
//! as a warning and the value is left out, never failing the build.

use anyhow::{bail, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::env;
use std::path::PathBuf;
use std::process::Command;

use crate::tools;

/// Environment variable names understood by the binary's build script.
pub const COMMIT_VAR: &str = "CLI_TEMPLATE_COMMIT";
pub const BUILD_TIME_VAR: &str = "CLI_TEMPLATE_BUILD_TIME";
pub const VERSION_VAR: &str = "CLI_TEMPLATE_VERSION";

/// Length of an abbreviated commit hash.
const SHORT_SHA_LEN: usize = 7;

/// Settings read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `CI` is set.
    pub ci: bool,
    /// `GITHUB_SHA`, the commit being built on GitHub Actions.
    pub github_sha: Option<String>,
    /// `GITHUB_OUTPUT`, the file step outputs are appended to.
    pub github_output: Option<PathBuf>,
}

impl Environment {
    pub fn from_env() -> Self {
        Self {
            ci: env::var_os("CI").is_some(),
            github_sha: env::var("GITHUB_SHA").ok().filter(|s| !s.is_empty()),
            github_output: env::var_os("GITHUB_OUTPUT")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Source control queries.
pub trait Git {
    /// Run git with `args` and return its trimmed stdout.
    fn output(&self, args: &[&str]) -> Result<String>;
}

/// The `git` executable on `PATH`.
pub struct SystemGit;

impl Git for SystemGit {
    fn output(&self, args: &[&str]) -> Result<String> {
        tools::output(Command::new("git").args(args))
    }
}

/// Short hash of the commit being built.
///
/// On CI the commit comes from `GITHUB_SHA` when it is set.
pub fn commit(git: &dyn Git, env: &Environment) -> Result<String> {
    if env.ci {
        if let Some(sha) = &env.github_sha {
            return Ok(sha.chars().take(SHORT_SHA_LEN).collect());
        }
    }

    let hash = git.output(&["rev-parse", "--short", "HEAD"])?;
    if hash.is_empty() {
        bail!("git returned an empty commit hash");
    }

    Ok(hash)
}

/// The highest `v*` tag by version order.
pub fn version_tag(git: &dyn Git) -> Result<String> {
    let tags = git.output(&["tag", "--sort=-version:refname", "-l", "v*"])?;

    match tags.lines().map(str::trim).find(|tag| !tag.is_empty()) {
        Some(tag) => Ok(tag.to_string()),
        None => bail!("Release tag not found"),
    }
}

/// Values compiled into every binary of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
    /// RFC3339 timestamp of the build.
    pub build_time: String,
    pub commit: Option<String>,
    pub version: Option<String>,
}

impl BuildMetadata {
    /// Gather metadata for a build started at `now`.
    pub fn collect(git: &dyn Git, env: &Environment, now: DateTime<Utc>) -> Self {
        Self {
            build_time: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            commit: best_effort("commit hash", commit(git, env)),
            version: best_effort("version tag", version_tag(git)),
        }
    }

    /// Environment variables to pass to `cargo build`. Missing values are
    /// left out so the build script falls back to its defaults.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![(BUILD_TIME_VAR, self.build_time.clone())];

        if let Some(commit) = &self.commit {
            vars.push((COMMIT_VAR, commit.clone()));
        }
        if let Some(version) = &self.version {
            vars.push((VERSION_VAR, version.clone()));
        }

        vars
    }
}

fn best_effort<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Could not determine {}, leaving it out: {:#}", what, e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// Answers git queries from a fixed table keyed by the first argument.
    #[derive(Default)]
    pub struct FakeGit {
        pub responses: HashMap<&'static str, Result<String, String>>,
    }

    impl FakeGit {
        pub fn with(mut self, subcommand: &'static str, response: Result<&str, &str>) -> Self {
            self.responses.insert(
                subcommand,
                response.map(str::to_string).map_err(str::to_string),
            );
            self
        }
    }

    impl Git for FakeGit {
        fn output(&self, args: &[&str]) -> Result<String> {
            match self.responses.get(args[0]) {
                Some(Ok(out)) => Ok(out.clone()),
                Some(Err(e)) => bail!("{}", e),
                None => bail!("unexpected git {}", args.join(" ")),
            }
        }
    }
}
