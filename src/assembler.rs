//! Turns a resolved fragment set into one or two documents.
//!
//! The assembler walks [`Slot::ALL`] in order and renders the selected
//! fragments of each slot. Body slots are nested one level when the script
//! uses a `main` wrapper. In split mode the helper slot is routed to a
//! secondary document that starts with its own shebang.
use crate::config::ScriptConfig;
use crate::document::Document;
use crate::fragments::preamble::shebang;
use crate::fragments::{RenderContext, Slot};
use crate::resolver::FragmentSet;

/// Default number of spaces per indentation level.
pub const DEFAULT_INDENT: usize = 4;

/// Default file name of the secondary helper document.
pub const DEFAULT_UTILS_NAME: &str = "common.sh";

/// Generator-level settings that are not part of the script configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Spaces per indentation level in the generated script.
    pub indent: usize,
    /// File name the main script sources the helpers from in split mode.
    pub utils_name: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            utils_name: DEFAULT_UTILS_NAME.to_string(),
        }
    }
}

/// The generated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A self-contained script.
    Single(Document),
    /// A script sourcing its helpers from a second file.
    Split {
        /// The script itself.
        main: Document,
        /// The helper file.
        utils: Document,
    },
}

impl Output {
    /// The main script.
    #[must_use]
    pub const fn main(&self) -> &Document {
        match self {
            Self::Single(main) | Self::Split { main, .. } => main,
        }
    }

    /// The helper document, in split mode.
    #[must_use]
    pub const fn utils(&self) -> Option<&Document> {
        match self {
            Self::Single(_) => None,
            Self::Split { utils, .. } => Some(utils),
        }
    }
}

/// Assemble with default render options.
#[must_use]
pub fn assemble(config: &ScriptConfig, set: &FragmentSet) -> Output {
    assemble_with(config, set, &RenderOptions::default())
}

/// Assemble `set` for `config`.
///
/// `set` must come from [`crate::resolver::resolve`] for the same
/// configuration.
#[must_use]
pub fn assemble_with(config: &ScriptConfig, set: &FragmentSet, options: &RenderOptions) -> Output {
    let ctx = RenderContext { config, options };
    let mut main = Document::new(options.indent);
    let mut utils = config.is_split().then(|| {
        let mut doc = Document::new(options.indent);
        doc.line(shebang(config));
        doc.blank();
        doc
    });

    for slot in Slot::ALL {
        let target = match (utils.as_mut(), slot) {
            (Some(utils), Slot::Helpers) => utils,
            _ => &mut main,
        };
        target.set_depth(usize::from(config.main() && slot.in_body()));
        for fragment in set.in_slot(slot) {
            fragment.render(&ctx, target);
        }
    }

    match utils {
        Some(mut utils) => {
            utils.trim_trailing_blanks();
            Output::Split { main, utils }
        }
        None => Output::Single(main),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use crate::resolver::resolve;

    fn build(raw: RawConfig, options: &RenderOptions) -> Output {
        let config = raw.validate().unwrap();
        let set = resolve(&config).unwrap();
        assemble_with(&config, &set, options)
    }

    #[test]
    fn single_document_ends_with_exit() {
        let output = build(RawConfig::default(), &RenderOptions::default());
        assert!(output.utils().is_none());
        assert!(output.main().render().ends_with("\nlog 'TODO'\n\nexit 0\n"));
    }

    #[test]
    fn split_moves_helpers_out() {
        let raw = RawConfig {
            utils: 1,
            dry: true,
            ..RawConfig::default()
        };
        let output = build(raw, &RenderOptions::default());
        let main = output.main().render();
        let utils = output.utils().expect("split output").render();
        assert!(!main.contains("_f_log()"));
        assert!(!main.contains("run_if_not_dry() {"));
        assert!(main.contains(". \"${BASEDIR:?}/common.sh\" || exit\n"));
        assert!(utils.starts_with("#! /usr/bin/env bash\n\n# For internal use"));
        assert!(utils.contains("run_if_not_dry() {"));
        assert!(utils.ends_with("    fi\n}\n"));
    }

    #[test]
    fn split_without_helpers_still_writes_secondary() {
        let raw = RawConfig {
            utils: 1,
            logging_utils: false,
            use_env: false,
            ..RawConfig::default()
        };
        let output = build(raw, &RenderOptions::default());
        assert_eq!(output.utils().unwrap().render(), "#! /bin/bash\n");
    }

    #[test]
    fn body_is_nested_inside_main() {
        let raw = RawConfig {
            main: true,
            exit_trap: 1,
            ..RawConfig::default()
        };
        let text = build(raw, &RenderOptions::default()).main().render();
        assert!(text.contains("main() {\n    trap exit_trap EXIT\n\n    parse_command \"$@\"\n"));
        assert!(text.ends_with("    log 'TODO'\n    return 0\n}\n\nmain \"$@\"\n"));
    }

    #[test]
    fn indent_option_changes_every_level() {
        let raw = RawConfig {
            main: true,
            ..RawConfig::default()
        };
        let options = RenderOptions {
            indent: 2,
            ..RenderOptions::default()
        };
        let text = build(raw, &options).main().render();
        assert!(text.contains("\n  parse_command \"$@\"\n"));
        assert!(text.contains("\n      -y|--yo)\n        opt_yo=1\n"));
        assert!(!text.contains("\n    parse_command"));
    }
}
