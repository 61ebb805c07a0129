//! Forwards build metadata from the environment into the compiled binary.
//!
//! `cargo xtask build` sets these variables when cross-compiling. A plain
//! `cargo build` leaves them unset and the defaults below are embedded.

const METADATA: [(&str, &str); 3] = [
    ("CLI_TEMPLATE_COMMIT", ""),
    ("CLI_TEMPLATE_BUILD_TIME", ""),
    ("CLI_TEMPLATE_VERSION", "dev"),
];

fn main() {
    for (name, default) in METADATA {
        println!("cargo:rerun-if-env-changed={}", name);

        let value = std::env::var(name).unwrap_or_else(|_| default.to_string());
        println!("cargo:rustc-env={}={}", name, value);
    }
}
