//! The `print_help` function.
use super::{Fragment, RenderContext, Slot};
use crate::config::{ScriptConfig, Usage};
use crate::document::Document;

/// Indentation unit inside the help heredoc.
const HELP_STEP: usize = 2;

/// `print_help`, whose text always matches the options, arguments and
/// environment variables the generated parser actually accepts.
#[derive(Debug)]
pub struct PrintHelp;

impl PrintHelp {
    fn synopsis(config: &ScriptConfig) -> &'static str {
        match (config.options(), config.positionals()) {
            (true, true) => "${prog} [OPTIONS]... FOO [BAR]",
            (true, false) => "${prog} [OPTIONS]...",
            (false, true) => "${prog} FOO [BAR]",
            (false, false) => "<No arguments>",
        }
    }

    fn body(config: &ScriptConfig, doc: &mut Document) {
        let help_option = config.usage() == Usage::HelpOption;

        doc.indent(1);
        doc.line("Perform blah blah on a blah blah.");
        doc.blank();
        doc.line("Usage:");
        doc.indent(1);
        doc.line(Self::synopsis(config));
        doc.dedent(1);
        doc.blank();

        if config.positionals() {
            doc.line("Arguments:");
            doc.indent(1);
            doc.line("FOO     The foo to process.");
            doc.line("BAR     (Optional) A bar in which to write the plop.");
            doc.line("        This allows to blah blah.");
            doc.line("        Default: “${DEFAULT_BAR}”");
            doc.dedent(1);
            doc.blank();
        }

        if config.options() || help_option {
            doc.line("Options:");
            doc.indent(1);
            if config.options() {
                doc.line("-y, --yo            Turn on yo mode.");
                doc.line("-p, --plop PLOP     Use PLOP as the plop.");
                if config.dry() {
                    doc.line("--dry               Turn dry mode on.");
                }
            }
            if help_option {
                doc.line("-h, --help          Print this message and exit.");
            }
            doc.dedent(1);
            doc.blank();
        }

        doc.line("Environment variables:");
        doc.indent(1);
        doc.line("GIT_USER    Username for requests to GitHub.");
        if config.dry() {
            doc.line("DRY         If not empty, turn dry mode on.");
            doc.line("            “Important” commands will be skipped.");
        }
        doc.dedent(2);
    }
}

impl Fragment for PrintHelp {
    fn name(&self) -> &'static str {
        "print-help"
    }

    fn slot(&self) -> Slot {
        Slot::Help
    }

    fn fields(&self) -> &'static [&'static str] {
        &["usage"]
    }

    fn applies(&self, _config: &ScriptConfig) -> bool {
        true
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.block(
            r#"print_help() {
    local prog
    prog=$(printf '%q' "$0")
    cat << _HELP_"#,
        );
        doc.blank();
        doc.with_unit(HELP_STEP, |d| Self::body(ctx.config, d));
        doc.blank();
        doc.line("_HELP_");
        doc.line("}");
        doc.blank();
    }
}
