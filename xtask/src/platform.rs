//! Platforms the binaries are cross-compiled for.

use std::fmt;

/// An operating system and CPU architecture pair, with the Rust target
/// triple used to compile for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
    pub triple: &'static str,
}

/// Every platform a build produces binaries for.
pub const SUPPORTED_PLATFORMS: &[Platform] = &[
    Platform::new("darwin", "amd64", "x86_64-apple-darwin"),
    Platform::new("darwin", "arm64", "aarch64-apple-darwin"),
    Platform::new("linux", "amd64", "x86_64-unknown-linux-musl"),
    Platform::new("linux", "arm64", "aarch64-unknown-linux-musl"),
    Platform::new("windows", "amd64", "x86_64-pc-windows-gnu"),
];

impl Platform {
    pub const fn new(os: &'static str, arch: &'static str, triple: &'static str) -> Self {
        Self { os, arch, triple }
    }

    /// Name of the per-platform output directory, e.g. `linux_amd64`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }

    /// File name of the compiled `command` binary on this platform.
    pub fn executable_name(&self, command: &str) -> String {
        if self.os == "windows" {
            format!("{}.exe", command)
        } else {
            command.to_string()
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
