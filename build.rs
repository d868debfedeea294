//! Build script: embeds the version reported by `bashgen version`.
//!
//! Release builds pass `BASHGEN_VERSION` (the tag being published). Local
//! builds describe the checkout instead, so a binary built from a dirty tree
//! says so. Outside a git checkout the package version is used at runtime.
use std::process::Command;

const VERSION_ENV: &str = "BASHGEN_VERSION";

fn describe_checkout() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !version.is_empty()).then_some(version)
}

fn main() {
    let version = std::env::var(VERSION_ENV).ok().or_else(describe_checkout);
    if let Some(version) = version {
        println!("cargo:rustc-env={VERSION_ENV}={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed={VERSION_ENV}");
}
