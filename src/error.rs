//! # Error Handling
//!
//! Errors raised while dispatching a subcommand. Failures inside a command
//! are reported through its exit status instead, so this enum only covers
//! what can go wrong before a command runs.

use thiserror::Error;

/// Main error type for command dispatch
#[derive(Error, Debug)]
pub enum Error {
    /// Argument parsing failed, or the user asked for `--help`/`--version`.
    ///
    /// The wrapped clap error knows how to print itself and which exit code
    /// to use.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// The subcommand name has no factory in the registry.
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, Error>;
