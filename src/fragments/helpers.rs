//! Shared helper functions and the line that sources them when they live in a
//! separate file.
use super::{Fragment, RenderContext, Slot, requires};
use crate::config::ScriptConfig;
use crate::document::Document;

const LOG_HEADER: &str = r#"# For internal use via the logging functions below.
#
# $1    String added between the program name and the message,
#       typically to specify the log level.
# $2    Printf-style format string.
# $3…n  Arguments for printf.
_f_log() {
    local prog"#;

const LOG_FUNCTIONS: &str = r#"    printf "%s %s${2}\n" "$prog" "$1" "${@:3}"
}

# $1    Printf-style format string.
# $2…n  Arguments for printf.
log() {
    _f_log '   INFO  ' "$@"
}

# $1    Printf-style format string.
# $2…n  Arguments for printf.
warn() {
    _f_log 'WARNING  ' "$@" >&2
}

# $1    Printf-style format string.
# $2…n  Arguments for printf.
err() {
    _f_log '  ERROR  ' "$@" >&2
}

# Print a command before running it.
# (This function takes care of running it).
#
# $@    The words making up the command to run.
log_and_run() {
    log 'Running: %s' "${*@Q}"
    "$@"
}"#;

/// `log`, `warn`, `err` and `log_and_run`, built on a private `_f_log`.
///
/// With the dry-run gate enabled, every message is tagged `[DRY RUN]` while
/// `DRY` is set.
#[derive(Debug)]
pub struct LoggingHelpers;

impl Fragment for LoggingHelpers {
    fn name(&self) -> &'static str {
        "logging-helpers"
    }

    fn slot(&self) -> Slot {
        Slot::Helpers
    }

    fn fields(&self) -> &'static [&'static str] {
        &["logging_utils"]
    }

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.logging_utils()
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.block(LOG_HEADER);
        doc.indent(1);
        if ctx.config.dry() {
            doc.line(r#"prog=$(basename "$0"):${DRY:+ [DRY RUN]}"#);
        } else {
            doc.line(r#"prog=$(basename "$0"):"#);
        }
        doc.dedent(1);
        doc.block(LOG_FUNCTIONS);
        doc.blank();
    }
}

/// `is_dry_run` and `run_if_not_dry`.
#[derive(Debug)]
pub struct DryRunHelpers;

impl Fragment for DryRunHelpers {
    fn name(&self) -> &'static str {
        "dry-run-helpers"
    }

    fn slot(&self) -> Slot {
        Slot::Helpers
    }

    fn fields(&self) -> &'static [&'static str] {
        &["dry"]
    }

    requires![LoggingHelpers];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.dry()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.block(
            r#"# Returns with 0 status if and only if
# the dry run mode is currently activated.
is_dry_run() {
    [[ $DRY ]]
}

# Only run a command if dry run mode is not activated.
# In dry run mode, log the command instead to show what
# would have been run in a normal context.
#
# $@    The words making up the command to potentially run.
run_if_not_dry() {
    if is_dry_run
    then
        log 'Would have run: %s' "${*@Q}"
    else
        "$@"
    fi
}"#,
        );
        doc.blank();
    }
}

/// Sources the helper file from the script's own directory.
#[derive(Debug)]
pub struct SourceUtils;

impl Fragment for SourceUtils {
    fn name(&self) -> &'static str {
        "source-utils"
    }

    fn slot(&self) -> Slot {
        Slot::Sourcing
    }

    fn fields(&self) -> &'static [&'static str] {
        &["utils"]
    }

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.is_split()
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        let mut line = format!(r#". "${{BASEDIR:?}}/{}""#, ctx.options.utils_name);
        // Under `set -e` a failed `.` already aborts the script.
        if !ctx.config.set_e() {
            line.push_str(" || exit");
        }
        doc.line(&line);
        doc.blank();
    }
}
