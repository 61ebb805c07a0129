//! # CLI Template
//!
//! Binary entry point. Argument parsing and dispatch live in the library;
//! this only forwards the process arguments and exits with the status of
//! the command that ran.

use std::{env, process};

fn main() {
    let status = cli_template::cli::run(env::args_os());
    process::exit(status)
}
