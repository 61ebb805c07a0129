//! # Command Implementations
//!
//! Every subcommand of `cli-template` implements the [`Command`] trait and is
//! made available to the dispatcher through a [`Registry`] entry that maps
//! the subcommand name to a factory.
//!
//! ## Structure
//!
//! Each command module contains:
//! - A struct holding whatever the command needs, passed in by its factory.
//! - A [`Command`] impl providing the one-line synopsis, the longer help text,
//!   and `run`, which performs the whole command and returns an exit status.
//!
//! Commands write to the `out` handle they are given rather than to stdout
//! directly, so the dispatcher decides where output goes.

pub mod foo;
pub mod version;

use std::collections::BTreeMap;
use std::io::Write;

use crate::build_info::BuildInfo;
use crate::error::{Error, Result};

pub use foo::FooCommand;
pub use version::VersionCommand;

/// A subcommand that can be dispatched by name.
pub trait Command {
    /// Longer description shown by `help <command>`.
    fn help(&self) -> &str;

    /// One-line description shown in the command list.
    fn synopsis(&self) -> &str;

    /// Run the command with the arguments following its name.
    ///
    /// Returns the process exit status, 0 on success.
    fn run(&self, args: &[String], out: &mut dyn Write) -> i32;
}

/// Builds a fresh command instance.
pub type CommandFactory = Box<dyn Fn() -> Box<dyn Command>>;

/// Maps subcommand names to command factories.
///
/// Names iterate in sorted order, which is also the order they are listed in
/// the help output.
#[derive(Default)]
pub struct Registry {
    factories: BTreeMap<&'static str, CommandFactory>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &'static str, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Command> + 'static,
    {
        self.factories.insert(name, Box::new(factory));
        self
    }

    /// Construct the command registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Command>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownCommand {
                name: name.to_string(),
            })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Whether a factory is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

/// The registry shipped with the binary: `foo` and `version`.
pub fn default_registry(info: BuildInfo) -> Registry {
    let mut registry = Registry::new();
    registry
        .register("foo", || Box::new(FooCommand))
        .register("version", move || Box::new(VersionCommand::new(info)));
    registry
}

/// Write `text` to `out`, mapping a failed write to exit status 1.
pub(crate) fn emit(out: &mut dyn Write, text: &str) -> i32 {
    match out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("Failed to write command output: {}", e);
            1
        }
    }
}
