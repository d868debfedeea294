//! Command: print version information.
use std::io::Write as _;

use anyhow::Result;

/// Version embedded by the build script, or the package version.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("BASHGEN_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Print the bashgen version to stdout.
///
/// # Errors
///
/// Returns an error if standard output cannot be written.
pub fn run() -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "bashgen {}", version())?;
    Ok(())
}
