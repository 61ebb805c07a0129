//! # Foo Command Implementation
//!
//! Example command kept as a starting point for new subcommands. It echoes
//! every argument it receives, one per line.

use std::io::Write;

use super::{emit, Command};

/// Echoes its arguments
#[derive(Debug, Default, Clone, Copy)]
pub struct FooCommand;

impl Command for FooCommand {
    fn help(&self) -> &str {
        "This is Foo"
    }

    fn synopsis(&self) -> &str {
        "This is Foo"
    }

    fn run(&self, args: &[String], out: &mut dyn Write) -> i32 {
        if args.is_empty() {
            return 0;
        }

        let text: String = args.iter().map(|arg| format!("{}\n", arg)).collect();
        emit(out, &text)
    }
}
