//! Persisting generated documents and configuration dumps.
//!
//! Documents either go to standard output between banner lines or to files.
//! The main script is made executable; the helper file is placed next to it
//! following the configured [`UtilsMode`].
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::assembler::{DEFAULT_UTILS_NAME, Output};
use crate::config::{RawConfig, UtilsMode, loader};
use crate::document::Document;
use crate::error::OutputError;
use crate::logging::Logger;

/// Placeholder path meaning standard output.
pub const STDOUT_TARGET: &str = "-";

/// Path whose writes are skipped altogether.
pub const DEV_NULL: &str = "/dev/null";

/// Where a document is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Standard output, between banner lines.
    Stdout,
    /// A file on disk.
    File(PathBuf),
}

impl Target {
    /// Interpret an optional command-line path; `None` and `-` mean stdout.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some(STDOUT_TARGET | "") => Self::Stdout,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }

    /// Whether this is the null device.
    #[must_use]
    pub fn is_dev_null(&self) -> bool {
        matches!(self, Self::File(path) if path == Path::new(DEV_NULL))
    }
}

/// Where the helper file goes for a main script written to `main`.
///
/// Returns `None` when helpers are inline or the main script goes to stdout.
/// [`UtilsMode::Overwrite`] always uses `common.sh`; [`UtilsMode::Suffix`]
/// keeps an existing `common.sh` and picks the first free `common-N.sh`,
/// starting at 2.
#[must_use]
pub fn utils_path(main: &Target, mode: UtilsMode) -> Option<PathBuf> {
    if main.is_dev_null() {
        return (mode != UtilsMode::Inline).then(|| PathBuf::from(DEV_NULL));
    }
    let Target::File(main) = main else {
        return None;
    };
    if mode == UtilsMode::Inline {
        return None;
    }

    let dir = main.parent().unwrap_or_else(|| Path::new(""));
    let default = dir.join(DEFAULT_UTILS_NAME);
    if mode == UtilsMode::Overwrite || !default.exists() {
        return Some(default);
    }
    let (stem, extension) = DEFAULT_UTILS_NAME
        .rsplit_once('.')
        .unwrap_or((DEFAULT_UTILS_NAME, "sh"));
    let mut n = 2u32;
    loop {
        let candidate = dir.join(format!("{stem}-{n}.{extension}"));
        if !candidate.exists() {
            return Some(candidate);
        }
        n += 1;
    }
}

/// File name the main script should source for helpers stored at `path`.
#[must_use]
pub fn utils_file_name(path: Option<&Path>) -> String {
    match path.and_then(Path::file_name) {
        Some(name) if path != Some(Path::new(DEV_NULL)) => name.to_string_lossy().into_owned(),
        _ => DEFAULT_UTILS_NAME.to_string(),
    }
}

/// Print `text` between `==== [ ↓ {what} START ↓ ] ====` banners.
///
/// # Errors
///
/// Returns [`OutputError::Stdout`] if writing fails.
pub fn print_block(out: &mut impl Write, what: &str, text: &str) -> Result<(), OutputError> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    writeln!(out)
        .and_then(|()| writeln!(out, "==== [ ↓ {what} START ↓ ] ===="))
        .and_then(|()| writeln!(out, "{text}"))
        .and_then(|()| writeln!(out, "==== [ ↑  {what} END  ↑ ] ===="))
        .map_err(OutputError::Stdout)
}

/// Write `doc` to `path`, optionally adding the owner-execute bit.
///
/// Failing to change permissions is only a warning.
///
/// # Errors
///
/// Returns [`OutputError::Write`] if the file cannot be written.
pub fn write_document(
    doc: &Document,
    path: &Path,
    executable: bool,
    log: &Logger,
) -> Result<(), OutputError> {
    if path == Path::new(DEV_NULL) {
        log.debug("skipping write to /dev/null");
        return Ok(());
    }
    std::fs::write(path, doc.render()).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    if executable && let Err(e) = make_executable(path) {
        log.warn(&format!(
            "failed to make {} executable: {e}",
            path.display()
        ));
    }
    log.debug(&format!("wrote {}", path.display()));
    Ok(())
}

/// Add the owner-execute bit to `path`.
#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o100);
    std::fs::set_permissions(path, perms)
}

/// Execute permission is not a file mode bit outside Unix.
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Write every document of `output`.
///
/// For [`Target::Stdout`] the main script and then the helpers are printed to
/// `out` between banners. For a file target the helpers go to `utils`, which
/// [`utils_path`] computed before assembly.
///
/// # Errors
///
/// Returns an [`OutputError`] if any document cannot be written.
pub fn write_output(
    output: &Output,
    target: &Target,
    utils: Option<&Path>,
    out: &mut impl Write,
    log: &Logger,
) -> Result<(), OutputError> {
    match target {
        Target::Stdout => {
            print_block(out, "SCRIPT TEMPLATE", &output.main().render())?;
            if let Some(doc) = output.utils() {
                print_block(out, "UTILS", &doc.render())?;
            }
        }
        Target::File(path) => {
            write_document(output.main(), path, true, log)?;
            if let Some(doc) = output.utils() {
                let utils = utils.map_or_else(
                    || path.with_file_name(DEFAULT_UTILS_NAME),
                    Path::to_path_buf,
                );
                write_document(doc, &utils, false, log)?;
            }
        }
    }
    Ok(())
}

/// Dump `raw` as JSON with `indent` spaces per level.
///
/// # Errors
///
/// Returns an [`OutputError`] if the dump cannot be written.
pub fn write_config(
    raw: &RawConfig,
    target: &Target,
    indent: usize,
    out: &mut impl Write,
    log: &Logger,
) -> Result<(), OutputError> {
    let json = loader::to_json(raw, indent)?;
    match target {
        Target::Stdout => print_block(out, "CONFIG", &json),
        Target::File(path) if path == Path::new(DEV_NULL) => Ok(()),
        Target::File(path) => {
            std::fs::write(path, format!("{json}\n")).map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;
            log.info(&format!("wrote configuration to {}", path.display()));
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn generate(raw: RawConfig) -> Output {
        crate::generate(&raw.validate().unwrap()).unwrap()
    }

    #[test]
    fn target_from_arg() {
        assert_eq!(Target::from_arg(None), Target::Stdout);
        assert_eq!(Target::from_arg(Some("-")), Target::Stdout);
        assert_eq!(
            Target::from_arg(Some("out.sh")),
            Target::File(PathBuf::from("out.sh"))
        );
        assert!(Target::from_arg(Some("/dev/null")).is_dev_null());
    }

    #[test]
    fn utils_path_policy() {
        let dir = tempfile::tempdir().unwrap();
        let main = Target::File(dir.path().join("script.sh"));

        assert_eq!(utils_path(&main, UtilsMode::Inline), None);
        assert_eq!(utils_path(&Target::Stdout, UtilsMode::Suffix), None);
        assert_eq!(
            utils_path(&main, UtilsMode::Suffix),
            Some(dir.path().join("common.sh"))
        );

        std::fs::write(dir.path().join("common.sh"), "").unwrap();
        assert_eq!(
            utils_path(&main, UtilsMode::Overwrite),
            Some(dir.path().join("common.sh"))
        );
        assert_eq!(
            utils_path(&main, UtilsMode::Suffix),
            Some(dir.path().join("common-2.sh"))
        );

        std::fs::write(dir.path().join("common-2.sh"), "").unwrap();
        assert_eq!(
            utils_path(&main, UtilsMode::Suffix),
            Some(dir.path().join("common-3.sh"))
        );
    }

    #[test]
    fn utils_file_name_defaults() {
        assert_eq!(utils_file_name(None), "common.sh");
        assert_eq!(utils_file_name(Some(Path::new("/dev/null"))), "common.sh");
        assert_eq!(
            utils_file_name(Some(Path::new("/tmp/x/common-4.sh"))),
            "common-4.sh"
        );
    }

    #[test]
    fn stdout_banners() {
        let output = generate(RawConfig {
            utils: 1,
            ..RawConfig::default()
        });
        let mut buf = Vec::new();
        write_output(&output, &Target::Stdout, None, &mut buf, &Logger::new("test")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("\n==== [ ↓ SCRIPT TEMPLATE START ↓ ] ====\n#! /usr/bin/env bash\n"));
        assert!(text.contains("\nexit 0\n==== [ ↑  SCRIPT TEMPLATE END  ↑ ] ====\n"));
        assert!(text.contains("\n\n==== [ ↓ UTILS START ↓ ] ====\n#! /usr/bin/env bash\n"));
        assert!(text.ends_with("}\n==== [ ↑  UTILS END  ↑ ] ====\n"));
    }

    #[cfg(unix)]
    #[test]
    fn files_are_written_and_main_is_executable() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("script.sh");
        let target = Target::File(main.clone());
        let utils = utils_path(&target, UtilsMode::Overwrite);
        let output = generate(RawConfig {
            utils: 1,
            ..RawConfig::default()
        });
        let mut buf = Vec::new();
        write_output(&output, &target, utils.as_deref(), &mut buf, &Logger::new("test")).unwrap();

        assert!(buf.is_empty());
        assert_eq!(std::fs::read_to_string(&main).unwrap(), output.main().render());
        let common = dir.path().join("common.sh");
        assert_eq!(
            std::fs::read_to_string(&common).unwrap(),
            output.utils().unwrap().render()
        );
        let mode = std::fs::metadata(&main).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0);
        let mode = std::fs::metadata(&common).unwrap().permissions().mode();
        assert_eq!(mode & 0o100, 0);
    }

    #[test]
    fn dev_null_is_skipped() {
        let output = generate(RawConfig::default());
        let target = Target::from_arg(Some(DEV_NULL));
        let mut buf = Vec::new();
        write_output(&output, &target, None, &mut buf, &Logger::new("test")).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn config_dump_to_file_and_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.json");
        let raw = RawConfig {
            main: true,
            ..RawConfig::default()
        };
        let log = Logger::new("test");
        let mut buf = Vec::new();

        write_config(&raw, &Target::File(path.clone()), 4, &mut buf, &log).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        assert_eq!(loader::parse(&written).unwrap(), raw);

        write_config(&raw, &Target::Stdout, 2, &mut buf, &log).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("\n==== [ ↓ CONFIG START ↓ ] ====\n{\n  \"use_env\": true,"));
        assert!(text.ends_with("}\n==== [ ↑  CONFIG END  ↑ ] ====\n"));
    }

    #[test]
    fn write_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("script.sh");
        let err = write_document(&Document::new(4), &path, true, &Logger::new("test"))
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
