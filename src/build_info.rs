//! Build metadata embedded at compile time.
//!
//! `build.rs` forwards `CLI_TEMPLATE_COMMIT`, `CLI_TEMPLATE_BUILD_TIME` and
//! `CLI_TEMPLATE_VERSION` from the build environment. The orchestrator in
//! `xtask` sets them; a plain `cargo build` embeds empty strings and `dev`.

/// Commit, build timestamp and version of the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    /// Short hash of the commit the binary was built from.
    pub commit: &'static str,
    /// Build timestamp in RFC3339 format.
    pub build_time: &'static str,
    /// Version tag, `dev` for local builds.
    pub version: &'static str,
}

impl BuildInfo {
    /// Metadata of the current binary.
    pub const fn current() -> Self {
        Self {
            commit: env!("CLI_TEMPLATE_COMMIT"),
            build_time: env!("CLI_TEMPLATE_BUILD_TIME"),
            version: env!("CLI_TEMPLATE_VERSION"),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_version_is_never_empty() {
        assert!(!BuildInfo::current().version.is_empty());
    }

    #[test]
    fn test_default_matches_current() {
        assert_eq!(BuildInfo::default(), BuildInfo::current());
    }
}
