//! Command: render every valid configuration into a directory tree.
//!
//! Each configuration gets `<out>/<slug>/` holding `script.sh`, the helper
//! file in split mode, and the `config.json` that reproduces it. The tree is
//! meant for reviewing (or shellchecking) the whole output space at once.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::assembler::RenderOptions;
use crate::cli::MatrixOpts;
use crate::config::{self, ScriptConfig, loader};
use crate::fragments;
use crate::logging::Logger;
use crate::output;

/// File name of the main script inside each configuration directory.
pub const SCRIPT_NAME: &str = "script.sh";

/// File name of the configuration dump inside each configuration directory.
pub const CONFIG_NAME: &str = "config.json";

/// Run the matrix command.
///
/// # Errors
///
/// Returns an error if the fragment catalogue is inconsistent or any file
/// cannot be written.
pub fn run(opts: &MatrixOpts, log: &Logger) -> Result<()> {
    log.stage("Checking fragment catalogue");
    let problems = fragments::catalogue_problems(fragments::catalogue());
    if !problems.is_empty() {
        for problem in &problems {
            log.error(problem);
        }
        anyhow::bail!("{} catalogue problem(s)", problems.len());
    }

    log.stage("Rendering every valid configuration");
    let configs: Vec<ScriptConfig> = config::all_valid().collect();
    log.debug(&format!("{} valid configurations", configs.len()));
    std::fs::create_dir_all(&opts.out)
        .with_context(|| format!("failed to create {}", opts.out.display()))?;

    let options = RenderOptions {
        indent: opts.indent,
        ..RenderOptions::default()
    };
    render_all(&configs, &opts.out, &options, log)?;

    log.info(&format!(
        "{} configurations rendered into {}",
        configs.len(),
        opts.out.display()
    ));
    log.finish();
    Ok(())
}

/// Render `configs` in parallel below `root`.
fn render_all(
    configs: &[ScriptConfig],
    root: &Path,
    options: &RenderOptions,
    log: &Logger,
) -> Result<()> {
    use rayon::prelude::*;
    configs
        .par_iter()
        .try_for_each(|config| render_one(config, root, options, log))
}

fn render_one(
    config: &ScriptConfig,
    root: &Path,
    options: &RenderOptions,
    log: &Logger,
) -> Result<()> {
    let dir = root.join(config.slug());
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let generated = crate::generate_with(config, options)
        .with_context(|| format!("failed to render {}", config.slug()))?;
    output::write_document(generated.main(), &dir.join(SCRIPT_NAME), true, log)?;
    if let Some(utils) = generated.utils() {
        output::write_document(utils, &dir.join(&options.utils_name), false, log)?;
    }

    let json = loader::to_json(&config.to_raw(), options.indent)?;
    let path = dir.join(CONFIG_NAME);
    std::fs::write(&path, format!("{json}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::RawConfig;

    #[test]
    fn render_one_writes_reproducible_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = RawConfig {
            utils: 2,
            main: true,
            ..RawConfig::default()
        }
        .validate()
        .unwrap();
        let log = Logger::new("matrix");
        render_one(&config, dir.path(), &RenderOptions::default(), &log).unwrap();

        let sub = dir.path().join(config.slug());
        let expected = crate::generate(&config).unwrap();
        assert_eq!(
            std::fs::read_to_string(sub.join(SCRIPT_NAME)).unwrap(),
            expected.main().render()
        );
        assert_eq!(
            std::fs::read_to_string(sub.join("common.sh")).unwrap(),
            expected.utils().unwrap().render()
        );
        let dumped = std::fs::read_to_string(sub.join(CONFIG_NAME)).unwrap();
        assert_eq!(loader::parse(&dumped).unwrap().validate().unwrap(), config);
    }

    #[test]
    fn render_all_creates_one_directory_per_config() {
        let dir = tempfile::tempdir().unwrap();
        let configs: Vec<ScriptConfig> = config::all_valid().take(8).collect();
        render_all(
            &configs,
            dir.path(),
            &RenderOptions::default(),
            &Logger::new("matrix"),
        )
        .unwrap();
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, configs.len());
    }
}
