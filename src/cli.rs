//! CLI argument parsing and command dispatch

use std::ffi::OsString;
use std::io::{self, Write};

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches};

use crate::build_info::BuildInfo;
use crate::commands::{self, Registry};
use crate::error::{Error, Result};

/// Name of the shipped binary.
pub const APP_NAME: &str = "cli-template";

/// Log level used when neither `--log-level` nor `RUST_LOG` is given.
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Dispatches the first argument to a registered command
pub struct Cli {
    registry: Registry,
    info: BuildInfo,
}

impl Cli {
    /// A CLI with the default `foo` and `version` commands.
    pub fn new(info: BuildInfo) -> Self {
        Self::with_registry(commands::default_registry(info), info)
    }

    pub fn with_registry(registry: Registry, info: BuildInfo) -> Self {
        Self { registry, info }
    }

    /// Build the clap command tree, one subcommand per registry entry.
    pub fn command(&self) -> clap::Command {
        let mut cmd = clap::Command::new(APP_NAME)
            .version(self.info.version)
            .about("Template for building simple command-line programs")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                Arg::new("log_level")
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Set log level (error, warn, info, debug, trace)")
                    .default_value(DEFAULT_LOG_LEVEL),
            );

        for name in self.registry.names() {
            let Ok(command) = self.registry.create(name) else {
                continue;
            };

            cmd = cmd.subcommand(
                clap::Command::new(name)
                    .about(command.synopsis().to_string())
                    .long_about(command.help().to_string())
                    .arg(
                        Arg::new("args")
                            .value_name("ARGS")
                            .action(ArgAction::Append)
                            .num_args(0..)
                            .trailing_var_arg(true)
                            .allow_hyphen_values(true),
                    ),
            );
        }

        cmd
    }

    /// Parse `args` (including the program name), then run the selected
    /// command against `out`.
    ///
    /// Everything after the subcommand name reaches the command unparsed,
    /// including `--` and tokens that look like top-level options.
    ///
    /// Returns the command's exit status.
    pub fn execute<I, T>(&self, args: I, out: &mut dyn Write) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let position = self.subcommand_position(&argv);

        // clap only sees the top-level options and the subcommand name.
        let parsed = match position {
            Some(pos) => &argv[..=pos],
            None => &argv[..],
        };
        let matches = self.command().try_get_matches_from(parsed)?;

        if let Some(level) = matches.get_one::<String>("log_level") {
            init_logging(level);
        }

        let Some((name, sub_matches)) = matches.subcommand() else {
            let err = self
                .command()
                .error(ErrorKind::MissingSubcommand, "a subcommand is required");
            return Err(Error::Usage(err));
        };
        let command = self.registry.create(name)?;
        let command_args = match position {
            Some(pos) => argv[pos + 1..]
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
            None => command_args(sub_matches),
        };

        log::debug!(
            "Running command '{}' with {} argument(s)",
            name,
            command_args.len()
        );
        let status = command.run(&command_args, out);
        log::debug!("Command '{}' exited with status {}", name, status);

        Ok(status)
    }

    /// Index in `argv` of the registered subcommand name, skipping the
    /// top-level `--log-level` option.
    ///
    /// `None` when the first other token is not a registered name; clap then
    /// parses the whole line and reports help, version or usage errors.
    fn subcommand_position(&self, argv: &[OsString]) -> Option<usize> {
        let mut index = 1;

        while let Some(token) = argv.get(index) {
            match token.to_str() {
                Some("--log-level") => index += 2,
                Some(t) if t.starts_with("--log-level=") => index += 1,
                Some(t) if self.registry.contains(t) => return Some(index),
                _ => return None,
            }
        }

        None
    }
}

fn command_args(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Set up `env_logger`; `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when dispatching more than once in a
    // process.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Entry point used by the binary.
///
/// Runs the command selected by `args` with stdout as output and returns the
/// process exit status. Usage errors print clap's message and use its exit
/// code; any other dispatch error exits with 1.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::new(BuildInfo::current());
    let mut stdout = io::stdout().lock();

    match cli.execute(args, &mut stdout) {
        Ok(status) => status,
        Err(Error::Usage(e)) => {
            // Fails only when stdout/stderr are gone.
            let _ = e.print();
            e.exit_code()
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}
