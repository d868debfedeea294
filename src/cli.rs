//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::assembler::DEFAULT_INDENT;
use crate::prompt::Level;

/// Top-level CLI entry point for the Bash script generator.
#[derive(Parser, Debug)]
#[command(
    name = "bashgen",
    about = "Provide a starting point for Bash scripts",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a script template, asking questions unless told otherwise
    Generate(GenerateOpts),
    /// Render every valid configuration into a directory
    Matrix(MatrixOpts),
    /// Print version information
    Version,
}

/// Options for the `generate` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct GenerateOpts {
    /// Number of spaces used to indent the generated script
    #[arg(short, long = "indent-size", default_value_t = DEFAULT_INDENT)]
    pub indent: usize,

    /// Write the script to a file instead of standard output ("-" for stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// How many questions to ask
    #[arg(short, long, value_enum, default_value_t = Level::Default)]
    pub level: Level,

    /// Load a configuration (file or inline JSON) and skip all questions
    #[arg(short = 'c', long = "load-config", conflicts_with = "base_config")]
    pub load_config: Option<String>,

    /// Load a configuration (file or inline JSON) as defaults for the questions
    #[arg(short = 'b', long = "base-config")]
    pub base_config: Option<String>,

    /// Print ("-") or save the resulting configuration as JSON
    #[arg(short = 'd', long = "dump-config")]
    pub dump_config: Option<String>,
}

impl GenerateOpts {
    /// The question level actually used: loading a configuration with `-c`
    /// forces batch mode.
    #[must_use]
    pub const fn effective_level(&self) -> Level {
        if self.load_config.is_some() {
            Level::Batch
        } else {
            self.level
        }
    }

    /// The configuration source, if any.
    #[must_use]
    pub fn config_source(&self) -> Option<&str> {
        self.load_config.as_deref().or(self.base_config.as_deref())
    }
}

/// Options for the `matrix` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct MatrixOpts {
    /// Directory receiving one subdirectory per configuration
    #[arg(long)]
    pub out: PathBuf,

    /// Number of spaces used to indent the generated scripts
    #[arg(short, long = "indent-size", default_value_t = DEFAULT_INDENT)]
    pub indent: usize,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn generate_opts(args: &[&str]) -> GenerateOpts {
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Generate(opts) => opts,
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_defaults() {
        let opts = generate_opts(&["bashgen", "generate"]);
        assert_eq!(opts.indent, 4);
        assert_eq!(opts.level, Level::Default);
        assert!(opts.output.is_none());
        assert!(opts.config_source().is_none());
    }

    #[test]
    fn parse_level_aliases() {
        for (arg, level) in [
            ("b", Level::Batch),
            ("d", Level::Default),
            ("a", Level::Advanced),
            ("f", Level::Full),
            ("full", Level::Full),
        ] {
            let opts = generate_opts(&["bashgen", "generate", "-l", arg]);
            assert_eq!(opts.level, level, "alias {arg}");
        }
    }

    #[test]
    fn load_config_forces_batch() {
        let opts = generate_opts(&["bashgen", "generate", "-l", "full", "-c", "{}"]);
        assert_eq!(opts.effective_level(), Level::Batch);
        assert_eq!(opts.config_source(), Some("{}"));
    }

    #[test]
    fn base_config_keeps_level() {
        let opts = generate_opts(&["bashgen", "generate", "-l", "a", "-b", "conf.json"]);
        assert_eq!(opts.effective_level(), Level::Advanced);
        assert_eq!(opts.config_source(), Some("conf.json"));
    }

    #[test]
    fn load_and_base_config_conflict() {
        let result = Cli::try_parse_from(["bashgen", "generate", "-c", "{}", "-b", "{}"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_generate_output_and_dump() {
        let opts = generate_opts(&[
            "bashgen", "generate", "-i", "2", "-o", "out.sh", "-d", "-",
        ]);
        assert_eq!(opts.indent, 2);
        assert_eq!(opts.output.as_deref(), Some("out.sh"));
        assert_eq!(opts.dump_config.as_deref(), Some("-"));
    }

    #[test]
    fn parse_matrix() {
        let cli = Cli::parse_from(["bashgen", "matrix", "--out", "/tmp/m"]);
        assert!(
            matches!(&cli.command, Command::Matrix(opts) if opts.out == PathBuf::from("/tmp/m"))
        );
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["bashgen", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["bashgen", "-v", "version"]);
        assert!(cli.verbose);
    }
}
