//! # Version Command Implementation
//!
//! Prints the version, build time and commit embedded in the binary.

use std::io::Write;

use super::{emit, Command};
use crate::build_info::BuildInfo;

/// Outputs metadata about the program
#[derive(Debug, Clone, Copy)]
pub struct VersionCommand {
    info: BuildInfo,
}

impl VersionCommand {
    pub fn new(info: BuildInfo) -> Self {
        Self { info }
    }

    /// The three lines printed by `run`.
    pub fn render(&self) -> String {
        format!(
            "Version:    {}\nBuild Time: {}\nCommit:     {}\n",
            self.info.version, self.info.build_time, self.info.commit
        )
    }
}

impl Command for VersionCommand {
    fn help(&self) -> &str {
        "Shows the command version and build metadata"
    }

    fn synopsis(&self) -> &str {
        "Shows the command version and other related information"
    }

    fn run(&self, _args: &[String], out: &mut dyn Write) -> i32 {
        emit(out, &self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::BrokenPipe;

    fn command() -> VersionCommand {
        VersionCommand::new(BuildInfo {
            commit: "abc123",
            build_time: "2024-01-01T00:00:00Z",
            version: "v1.0.0",
        })
    }

    #[test]
    fn test_help_not_empty() {
        assert!(!command().help().trim().is_empty());
    }

    #[test]
    fn test_synopsis_not_empty() {
        assert!(!command().synopsis().trim().is_empty());
    }

    #[test]
    fn test_render() {
        insta::assert_snapshot!(command().render(), @r"
        Version:    v1.0.0
        Build Time: 2024-01-01T00:00:00Z
        Commit:     abc123
        ");
    }

    #[test]
    fn test_run_ignores_args() {
        let mut out = Vec::new();
        let args = vec!["--anything".to_string(), "extra".to_string()];
        assert_eq!(command().run(&args, &mut out), 0);
        assert_eq!(String::from_utf8(out).unwrap(), command().render());
    }

    #[test]
    fn test_run_prints_three_lines_in_order() {
        let mut out = Vec::new();
        assert_eq!(command().run(&[], &mut out), 0);

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Version:    v1.0.0",
                "Build Time: 2024-01-01T00:00:00Z",
                "Commit:     abc123",
            ]
        );
    }

    #[test]
    fn test_run_with_empty_metadata() {
        let cmd = VersionCommand::new(BuildInfo {
            commit: "",
            build_time: "",
            version: "dev",
        });
        let mut out = Vec::new();
        assert_eq!(cmd.run(&[], &mut out), 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_run_write_failure_returns_one() {
        assert_eq!(command().run(&[], &mut BrokenPipe), 1);
    }
}
