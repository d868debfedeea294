//! Bash script template generator.
//!
//! A [`ScriptConfig`] of thirteen feature switches selects fragments from a
//! fixed catalogue; the fragments render, slot by slot, into one script (or a
//! script plus a helper file in split mode). The same configuration always
//! produces the same text.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: the raw JSON form, its validation, and enumeration
//! - **[`fragments`]**: the catalogue of text units with their rules
//! - **[`resolver`]** and **[`assembler`]**: selection and rendering
//! - **[`commands`]**: top-level subcommand orchestration (`generate`, `matrix`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod assembler;
pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod fragments;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod resolver;

use assembler::{Output, RenderOptions};
use config::ScriptConfig;
use error::DependencyError;

/// Render `config` with default options.
///
/// # Errors
///
/// Returns a [`DependencyError`] if the selected fragments break a rule.
/// A configuration obtained from [`ScriptConfig::validate`] never does.
pub fn generate(config: &ScriptConfig) -> Result<Output, DependencyError> {
    generate_with(config, &RenderOptions::default())
}

/// Render `config` with explicit indentation and helper file name.
///
/// # Errors
///
/// Returns a [`DependencyError`] if the selected fragments break a rule.
pub fn generate_with(
    config: &ScriptConfig,
    options: &RenderOptions,
) -> Result<Output, DependencyError> {
    let set = resolver::resolve(config)?;
    Ok(assembler::assemble_with(config, &set, options))
}
