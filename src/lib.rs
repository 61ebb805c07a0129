//! # CLI Template Library
//!
//! Skeleton for a small command-line program. The binary in
//! `src/bin/cli-template` is a thin wrapper around [`cli::run`].
//!
//! ## Quick Example
//!
//! ```
//! use cli_template::build_info::BuildInfo;
//! use cli_template::cli::Cli;
//!
//! let cli = Cli::new(BuildInfo::current());
//! let mut out = Vec::new();
//! let status = cli.execute(["cli-template", "foo", "bar"], &mut out).unwrap();
//!
//! assert_eq!(status, 0);
//! assert_eq!(out, b"bar\n");
//! ```
//!
//! ## Adding a Command
//!
//! 1. Implement [`commands::Command`] in a new module under `commands`.
//! 2. Register a factory for it in [`commands::default_registry`].
//!
//! The dispatcher builds the `clap` command tree from the registry, so the
//! new command appears in `--help` without further changes.

pub mod build_info;
pub mod cli;
pub mod commands;
pub mod error;
