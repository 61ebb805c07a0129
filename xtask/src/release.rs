//! Packaging per-platform build output into release archives.

use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::build::{self, Profile, PKG_DIR};
use crate::metadata::{BuildMetadata, Environment};
use crate::platform::{Platform, SUPPORTED_PLATFORMS};
use crate::tasks::BUILD_DIR;

/// `<program>-<version>-<os>-<arch>.tar.gz`, without the version's leading `v`.
pub fn archive_name(program: &str, version: &str, platform: &Platform) -> String {
    let version = version.strip_prefix('v').unwrap_or(version);
    format!(
        "{}-{}-{}-{}.tar.gz",
        program, version, platform.os, platform.arch
    )
}

/// Write the contents of `source` to a gzip-compressed tarball at `dest`.
///
/// Entries are stored relative to `source`. On failure no partial archive is
/// left at `dest`.
pub fn create_archive(source: &Path, dest: &Path) -> Result<()> {
    let result = write_archive(source, dest);

    if result.is_err() && dest.is_file() {
        if let Err(e) = fs::remove_file(dest) {
            log::warn!("Failed to remove partial archive {}: {}", dest.display(), e);
        }
    }

    result
}

fn write_archive(source: &Path, dest: &Path) -> Result<()> {
    let file =
        File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let name = entry.path().strip_prefix(source)?;

        if entry.file_type().is_dir() {
            tar.append_dir(name, entry.path())?;
        } else {
            tar.append_path_with_name(entry.path(), name)?;
        }
    }

    tar.into_inner()?.finish()?;
    Ok(())
}

/// Create one archive per platform under `root/build`.
///
/// A platform without build output is skipped with a warning. Every platform
/// is attempted; the call fails afterwards if any archive could not be
/// written. Returns the paths of the archives created.
pub fn package(
    root: &Path,
    program: &str,
    version: &str,
    platforms: &[Platform],
) -> Result<Vec<PathBuf>> {
    let build_dir = root.join(BUILD_DIR);
    fs::create_dir_all(&build_dir)
        .with_context(|| format!("Failed to create {}", build_dir.display()))?;

    let mut archives = Vec::new();
    let mut failed = 0;

    for platform in platforms {
        let source = root.join(PKG_DIR).join(platform.dir_name());
        if !source.is_dir() {
            log::warn!(
                "No build output for {} at {}, skipping",
                platform,
                source.display()
            );
            continue;
        }

        let dest = build_dir.join(archive_name(program, version, platform));
        match create_archive(&source, &dest) {
            Ok(()) => {
                log::info!("Created {}", dest.display());
                archives.push(dest);
            }
            Err(e) => {
                log::error!("Archive for {} failed: {:#}", platform, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} release archive(s) failed", failed);
    }

    Ok(archives)
}

/// Name of the program: the final component of the workspace directory.
pub fn program_name(workspace: &Path) -> Result<String> {
    workspace
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a program name from {}", workspace.display()))
}

/// Publish the released version as a CI step output.
pub fn publish_version(env: &Environment, version: &str) -> Result<()> {
    match &env.github_output {
        Some(path) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            writeln!(file, "version={}", version)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("::set-output name=version::{}", version),
    }

    Ok(())
}

/// The version a release is published under; releasing without a version
/// tag is an error.
pub fn release_version(metadata: BuildMetadata) -> Result<String> {
    metadata
        .version
        .context("Release tag not found; tag the commit as vX.Y.Z before releasing")
}

/// Build release binaries and package them.
pub fn release(env: &Environment) -> Result<()> {
    let metadata = build::build(env, Profile::Release)?;
    let version = release_version(metadata)?;

    let workspace = std::env::current_dir().context("Failed to get current directory")?;
    let program = program_name(&workspace)?;

    let archives = package(Path::new("."), &program, &version, SUPPORTED_PLATFORMS)?;
    println!("Released {} {} ({} archive(s))", program, version, archives.len());

    if env.ci {
        publish_version(env, &version)?;
    }

    Ok(())
}
