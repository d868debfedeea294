//! Top-level subcommand orchestration.
pub mod generate;
pub mod matrix;
pub mod version;
