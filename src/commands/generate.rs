//! Command: ask questions (or load a configuration) and emit a script.
use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};

use crate::assembler::RenderOptions;
use crate::cli::GenerateOpts;
use crate::config::{RawConfig, ScriptConfig, loader};
use crate::logging::Logger;
use crate::output::{self, Target};
use crate::prompt::{Level, Questionnaire};

/// Run the generate command on the process's standard streams.
///
/// Questions go to standard error so that a script printed to standard
/// output stays clean.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or validated, the
/// questions cannot be answered, or the output cannot be written.
pub fn run(opts: &GenerateOpts, log: &Logger) -> Result<()> {
    let stdin = std::io::stdin();
    let stderr = std::io::stderr();
    let stdout = std::io::stdout();
    execute(opts, log, stdin.lock(), stderr.lock(), &mut stdout.lock())
}

/// Run the generate command with explicit streams.
///
/// # Errors
///
/// See [`run`].
pub fn execute(
    opts: &GenerateOpts,
    log: &Logger,
    answers: impl BufRead,
    questions: impl Write,
    out: &mut impl Write,
) -> Result<()> {
    let base = match opts.config_source() {
        Some(source) => {
            log.debug(&format!("loading configuration from {source}"));
            loader::load(source).context("failed to load configuration")?
        }
        None => RawConfig::default(),
    };

    let target = Target::from_arg(opts.output.as_deref());
    let config = configure(opts.effective_level(), base, &target, log, answers, questions)?;
    log.debug(&format!(
        "configuration: {}",
        serde_json::to_string(&config.to_raw()).unwrap_or_default()
    ));

    log.stage("Generating script");
    let utils = output::utils_path(&target, config.utils());
    let options = RenderOptions {
        indent: opts.indent,
        utils_name: output::utils_file_name(utils.as_deref()),
    };
    let generated = crate::generate_with(&config, &options)?;
    output::write_output(&generated, &target, utils.as_deref(), out, log)?;
    if let Target::File(path) = &target
        && !target.is_dev_null()
    {
        log.info(&format!("script written to {}", path.display()));
        if let Some(utils) = utils.as_deref().filter(|_| generated.utils().is_some()) {
            log.info(&format!("helpers written to {}", utils.display()));
        }
    }

    if let Some(dump) = opts.dump_config.as_deref().filter(|d| !d.trim().is_empty()) {
        output::write_config(
            &config.to_raw(),
            &Target::from_arg(Some(dump)),
            opts.indent,
            out,
            log,
        )?;
    }

    log.finish();
    Ok(())
}

/// Validate `base` directly in batch mode, otherwise ask the questions of
/// `level` with `base` as defaults.
fn configure(
    level: Level,
    base: RawConfig,
    target: &Target,
    log: &Logger,
    answers: impl BufRead,
    questions: impl Write,
) -> Result<ScriptConfig> {
    if level == Level::Batch {
        return base.validate().context("invalid configuration");
    }
    log.stage("Questions");
    let file_output = matches!(target, Target::File(_));
    let config = Questionnaire::new(answers, questions, log, file_output).run(level, base)?;
    Ok(config)
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
    use clap::Parser as _;
    use std::io::Cursor;

    use crate::cli::{Cli, Command};

    fn opts(args: &[&str]) -> GenerateOpts {
        let mut full = vec!["bashgen", "generate"];
        full.extend_from_slice(args);
        let Command::Generate(opts) = Cli::parse_from(full).command else {
            panic!("expected the generate command");
        };
        opts
    }

    fn run_with(args: &[&str], answers: &str) -> Result<String> {
        let log = Logger::new("generate");
        let mut out = Vec::new();
        execute(
            &opts(args),
            &log,
            Cursor::new(answers.as_bytes().to_vec()),
            Vec::new(),
            &mut out,
        )?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn batch_prints_default_script() {
        let text = run_with(&["-l", "batch"], "").unwrap();
        let expected = crate::generate(&RawConfig::default().validate().unwrap())
            .unwrap()
            .main()
            .render();
        assert!(text.contains(&expected));
        assert!(!text.contains("UTILS START"));
    }

    #[test]
    fn load_config_skips_questions() {
        let text = run_with(&["-l", "full", "-c", r#"{"main": true}"#], "").unwrap();
        assert!(text.contains("main() {\n"));
    }

    #[test]
    fn load_config_rejects_broken_rules() {
        let err = run_with(&["-c", r#"{"logging_utils": false, "dry": true}"#], "").unwrap_err();
        assert!(format!("{err:#}").contains("invalid configuration"));
    }

    #[test]
    fn questions_need_answers() {
        let err = run_with(&[], "").unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn default_level_with_empty_answers_matches_batch() {
        let asked = run_with(&[], &"\n".repeat(16)).unwrap();
        let batch = run_with(&["-l", "b"], "").unwrap();
        assert_eq!(asked, batch);
    }

    #[test]
    fn dump_config_to_stdout() {
        let text = run_with(&["-l", "b", "-i", "2", "-d", "-"], "").unwrap();
        assert!(text.contains("==== [ ↓ CONFIG START ↓ ] ====\n{\n  \"use_env\": true,"));
    }

    #[test]
    fn blank_dump_target_is_ignored() {
        let text = run_with(&["-l", "b", "-d", " "], "").unwrap();
        assert!(!text.contains("CONFIG START"));
    }

    #[test]
    fn file_output_writes_script_and_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("tool.sh");
        let main_arg = main.to_str().unwrap();
        let text = run_with(&["-o", main_arg, "-c", r#"{"utils": 2}"#], "").unwrap();

        assert!(text.is_empty());
        let script = std::fs::read_to_string(&main).unwrap();
        assert!(script.contains(". \"${BASEDIR:?}/common.sh\" || exit\n"));
        assert!(dir.path().join("common.sh").exists());

        run_with(&["-o", main_arg, "-c", r#"{"utils": 2}"#], "").unwrap();
        let script = std::fs::read_to_string(&main).unwrap();
        assert!(script.contains(". \"${BASEDIR:?}/common-2.sh\" || exit\n"));
        assert!(dir.path().join("common-2.sh").exists());
    }
}
