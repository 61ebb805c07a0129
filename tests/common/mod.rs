//! Shared test utilities for the CLI E2E tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use predicates::prelude::*;

    pub use super::BIN;
}

/// Name of the binary under test.
pub const BIN: &str = "cli-template";
