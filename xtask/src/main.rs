//! Development automation tasks for cli-template.
//!
//! This crate provides `cargo xtask` commands that build, check and package
//! the binaries under `src/bin`. It is never shipped with them.
//!
//! # Usage
//!
//! ```bash
//! cargo xtask build          # Cross-compile every command for every platform
//! cargo xtask release        # Build release binaries and package archives
//! cargo xtask lint           # cargo fmt + cargo clippy
//! cargo xtask test           # Run tests with coverage (cargo-tarpaulin)
//! ```

mod build;
mod metadata;
mod platform;
mod release;
mod tasks;
mod tools;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::build::Profile;
use crate::metadata::Environment;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development automation tasks for cli-template")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that required tools are installed
    Check,
    /// Cross-compile every command for every supported platform
    Build {
        /// Build with the release profile
        #[arg(long)]
        release: bool,
    },
    /// Remove build output and coverage reports
    Clean,
    /// Vendor dependencies and refresh the lockfile
    Lock,
    /// Run formatting and static analysis checks
    Lint,
    /// Run the test suite with coverage
    Test,
    /// Scan dependencies for known vulnerabilities
    Scan,
    /// Build release binaries and package one archive per platform
    Release,
    /// Clean and empty the vendor directory
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Find workspace root
    let workspace_root = workspace_root()?;
    env::set_current_dir(&workspace_root).with_context(|| {
        format!(
            "Failed to change to workspace root: {}",
            workspace_root.display()
        )
    })?;

    let env = Environment::from_env();
    let root = Path::new(".");

    match cli.command {
        Commands::Check => tasks::check(),
        Commands::Build { release } => {
            let profile = if release {
                Profile::Release
            } else {
                Profile::Dev
            };
            build::build(&env, profile).map(|_| ())
        }
        Commands::Clean => tasks::clean(root),
        Commands::Lock => tasks::lock(),
        Commands::Lint => tasks::lint(&env),
        Commands::Test => tasks::test(),
        Commands::Scan => tasks::scan(),
        Commands::Release => release::release(&env),
        Commands::Reset => tasks::reset(root),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Find the workspace root directory.
fn workspace_root() -> Result<PathBuf> {
    let output = Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("Failed to run 'cargo locate-project'")?;

    if !output.status.success() {
        bail!("Failed to locate workspace root");
    }

    let path = String::from_utf8(output.stdout).context("Invalid UTF-8 in cargo output")?;
    let path = PathBuf::from(path.trim());

    // The output is Cargo.toml path, we need the directory
    path.parent()
        .map(|p| p.to_path_buf())
        .context("Failed to get parent directory of Cargo.toml")
}
