//! Cross-compiling every command for every supported platform.
//!
//! Each `(platform, command)` pair is compiled as its own job. Jobs run
//! concurrently on the rayon pool and a failed job never stops the others;
//! failures are counted and reported once every job has finished.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

use crate::metadata::{BuildMetadata, Environment, SystemGit};
use crate::platform::{Platform, SUPPORTED_PLATFORMS};
use crate::{tasks, tools};

/// Root holding one directory per shippable binary.
pub const COMMANDS_DIR: &str = "src/bin";
/// Root of the per-platform output directories.
pub const PKG_DIR: &str = "pkg";

/// Cargo profile used for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Release,
}

impl Profile {
    /// Directory cargo writes artifacts of this profile to.
    pub fn dir_name(self) -> &'static str {
        match self {
            Profile::Dev => "debug",
            Profile::Release => "release",
        }
    }
}

/// One command compiled for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    pub platform: Platform,
    pub command: String,
}

/// Outcome of running a set of build jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub attempted: usize,
    pub failed: usize,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Compiles a single build job.
pub trait Compiler: Sync {
    fn compile(&self, job: &BuildJob) -> Result<()>;
}

/// Names of the immediate subdirectories of `root`, sorted.
pub fn discover_commands(root: &Path) -> Result<Vec<String>> {
    let mut commands = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| format!("Failed to read command directory {}", root.display()))?;
        if entry.file_type().is_dir() {
            commands.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    Ok(commands)
}

/// The cross product of `platforms` and `commands`.
pub fn plan(platforms: &[Platform], commands: &[String]) -> Vec<BuildJob> {
    platforms
        .iter()
        .flat_map(|platform| {
            commands.iter().map(move |command| BuildJob {
                platform: *platform,
                command: command.clone(),
            })
        })
        .collect()
}

/// Run every job and count the failures.
pub fn run_jobs(jobs: &[BuildJob], compiler: &dyn Compiler) -> BuildReport {
    let failed = AtomicUsize::new(0);

    let attempted = jobs
        .par_iter()
        .map(|job| match compiler.compile(job) {
            Ok(()) => log::info!("Build of {} for {} completed", job.command, job.platform),
            Err(e) => {
                log::error!("Build of {} for {} failed: {:#}", job.command, job.platform, e);
                failed.fetch_add(1, Ordering::Relaxed);
            }
        })
        .count();

    BuildReport {
        attempted,
        failed: failed.into_inner(),
    }
}

/// Builds with `cargo` into a per-platform target directory and copies the
/// binary to `pkg/<os>_<arch>/`.
pub struct CargoCompiler<'a> {
    pub profile: Profile,
    pub metadata: &'a BuildMetadata,
}

impl CargoCompiler<'_> {
    fn target_dir(platform: &Platform) -> PathBuf {
        Path::new("target").join("xtask").join(platform.dir_name())
    }

    /// The `cargo build` invocation for `job`.
    pub fn command(&self, job: &BuildJob) -> Command {
        let mut cmd = Command::new("cargo");
        cmd.args(["build", "--bin", job.command.as_str()])
            .args(["--target", job.platform.triple])
            .arg("--target-dir")
            .arg(Self::target_dir(&job.platform))
            // Build from the sources `lock` vendored.
            .args([
                "--config",
                "source.crates-io.replace-with=\"vendored-sources\"",
                "--config",
                "source.vendored-sources.directory=\"vendor\"",
            ])
            .envs(self.metadata.env_vars());

        if self.profile == Profile::Release {
            cmd.arg("--release");
        }

        cmd
    }
}

impl Compiler for CargoCompiler<'_> {
    fn compile(&self, job: &BuildJob) -> Result<()> {
        tools::run(&mut self.command(job))?;

        let executable = job.platform.executable_name(&job.command);
        let artifact = Self::target_dir(&job.platform)
            .join(job.platform.triple)
            .join(self.profile.dir_name())
            .join(&executable);

        let output_dir = Path::new(PKG_DIR).join(job.platform.dir_name());
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let destination = output_dir.join(&executable);
        fs::copy(&artifact, &destination).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                artifact.display(),
                destination.display()
            )
        })?;

        Ok(())
    }
}

/// Check tools, clean, vendor, then compile every command for every
/// supported platform.
///
/// Returns the metadata compiled into the binaries.
pub fn build(env: &Environment, profile: Profile) -> Result<BuildMetadata> {
    tasks::check()?;
    tasks::clean(Path::new("."))?;
    tasks::lock()?;

    let commands = discover_commands(Path::new(COMMANDS_DIR))?;
    if commands.is_empty() {
        log::warn!("No commands found in {}", COMMANDS_DIR);
    }

    let metadata = BuildMetadata::collect(&SystemGit, env, Utc::now());
    let jobs = plan(SUPPORTED_PLATFORMS, &commands);
    log::info!(
        "Building {} command(s) for {} platform(s)",
        commands.len(),
        SUPPORTED_PLATFORMS.len()
    );

    let compiler = CargoCompiler {
        profile,
        metadata: &metadata,
    };
    let report = run_jobs(&jobs, &compiler);

    if !report.is_success() {
        bail!(
            "{} of {} build processes failed",
            report.failed,
            report.attempted
        );
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every job and fails the ones for `fail_os`.
    struct RecordingCompiler {
        fail_os: Option<&'static str>,
        seen: Mutex<Vec<BuildJob>>,
    }

    impl RecordingCompiler {
        fn new(fail_os: Option<&'static str>) -> Self {
            Self {
                fail_os,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Compiler for RecordingCompiler {
        fn compile(&self, job: &BuildJob) -> Result<()> {
            self.seen.lock().unwrap().push(job.clone());
            if Some(job.platform.os) == self.fail_os {
                bail!("linker error");
            }
            Ok(())
        }
    }

    fn commands(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn metadata() -> BuildMetadata {
        BuildMetadata {
            build_time: "2024-01-01T00:00:00Z".to_string(),
            commit: Some("abc1234".to_string()),
            version: None,
        }
    }

    #[test]
    fn test_discover_commands_lists_immediate_directories() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("beta/nested")).unwrap();
        fs::create_dir(root.path().join("alpha")).unwrap();
        fs::write(root.path().join("loose.rs"), "").unwrap();

        let found = discover_commands(root.path()).unwrap();
        assert_eq!(found, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_discover_commands_missing_root_is_error() {
        let root = tempfile::tempdir().unwrap();
        assert!(discover_commands(&root.path().join("missing")).is_err());
    }

    #[test]
    fn test_plan_is_cross_product() {
        let jobs = plan(SUPPORTED_PLATFORMS, &commands(&["foo", "bar"]));
        assert_eq!(jobs.len(), SUPPORTED_PLATFORMS.len() * 2);

        let unique: HashSet<_> = jobs
            .iter()
            .map(|job| (job.platform.dir_name(), job.command.clone()))
            .collect();
        assert_eq!(unique.len(), jobs.len());
    }

    #[test]
    fn test_plan_without_commands_is_empty() {
        assert!(plan(SUPPORTED_PLATFORMS, &[]).is_empty());
    }

    #[test]
    fn test_run_jobs_all_succeed() {
        let compiler = RecordingCompiler::new(None);
        let jobs = plan(SUPPORTED_PLATFORMS, &commands(&["foo"]));

        let report = run_jobs(&jobs, &compiler);
        assert_eq!(
            report,
            BuildReport {
                attempted: SUPPORTED_PLATFORMS.len(),
                failed: 0
            }
        );
        assert!(report.is_success());
    }

    #[test]
    fn test_run_jobs_failure_does_not_stop_siblings() {
        let compiler = RecordingCompiler::new(Some("windows"));
        let jobs = plan(SUPPORTED_PLATFORMS, &commands(&["foo", "bar", "baz"]));

        let report = run_jobs(&jobs, &compiler);

        // windows/amd64 is the only windows platform.
        assert_eq!(report.attempted, jobs.len());
        assert_eq!(report.failed, 3);
        assert!(!report.is_success());
        assert_eq!(compiler.seen.lock().unwrap().len(), jobs.len());
    }

    #[test]
    fn test_run_jobs_empty() {
        let report = run_jobs(&[], &RecordingCompiler::new(None));
        assert_eq!(report, BuildReport::default());
        assert!(report.is_success());
    }

    #[test]
    fn test_cargo_command_for_release() {
        let metadata = metadata();
        let compiler = CargoCompiler {
            profile: Profile::Release,
            metadata: &metadata,
        };
        let job = BuildJob {
            platform: SUPPORTED_PLATFORMS[2],
            command: "cli-template".to_string(),
        };

        let cmd = compiler.command(&job);
        let line = tools::describe(&cmd);
        assert!(line.starts_with(
            "cargo build --bin cli-template --target x86_64-unknown-linux-musl"
        ));
        assert!(line.contains("--target-dir target/xtask/linux_amd64"));
        assert!(line.ends_with("--release"));

        let envs: Vec<_> = cmd
            .get_envs()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.map(|v| v.to_string_lossy().into_owned()),
                )
            })
            .collect();
        assert!(envs.contains(&(
            "CLI_TEMPLATE_COMMIT".to_string(),
            Some("abc1234".to_string())
        )));
        assert!(!envs.iter().any(|(k, _)| k == "CLI_TEMPLATE_VERSION"));
    }

    #[test]
    fn test_cargo_command_for_dev_has_no_release_flag() {
        let metadata = metadata();
        let compiler = CargoCompiler {
            profile: Profile::Dev,
            metadata: &metadata,
        };
        let job = BuildJob {
            platform: SUPPORTED_PLATFORMS[0],
            command: "cli-template".to_string(),
        };

        let line = tools::describe(&compiler.command(&job));
        assert!(!line.contains("--release"));
    }
}
