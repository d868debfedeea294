//! Command-line handling in the generated script: `parse_command`, its call
//! site, and the bare help check used when there is nothing to parse.
use super::{Fragment, RenderContext, Slot, conflicts, requires};
use crate::config::{ScriptConfig, Usage};
use crate::document::Document;

/// Which of the three `parse_command` shapes a configuration calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    OptionsAndPositionals,
    OptionsOnly,
    PositionalsOnly,
}

impl Shape {
    const fn of(config: &ScriptConfig) -> Option<Self> {
        match (config.options(), config.positionals()) {
            (true, true) => Some(Self::OptionsAndPositionals),
            (true, false) => Some(Self::OptionsOnly),
            (false, true) => Some(Self::PositionalsOnly),
            (false, false) => None,
        }
    }
}

/// `print_help` and exit when the script gets no argument at all.
fn help_if_no_arguments(doc: &mut Document, usage: Usage) {
    if usage == Usage::NoArguments {
        doc.block(
            "if (($# == 0))
then
    print_help
    exit 1
fi",
        );
        doc.blank();
    }
}

/// Scan the arguments for a help request without parsing them.
fn help_request_loop(doc: &mut Document, usage: Usage, declare_local: bool) {
    if usage == Usage::HelpOption {
        if declare_local {
            doc.line("local arg");
        }
        doc.block(
            "for arg
do
    if [[ ${arg,,} = @(-h|+(-)help) ]]
    then
        print_help
        exit 0
    fi
done",
        );
        doc.blank();
    }
}

/// Report an error: through `err` when the logging helpers exist, with a
/// plain `printf` to stderr otherwise.
fn report(doc: &mut Document, config: &ScriptConfig, message: &str, args: &str, to_stderr: bool) {
    if config.logging_utils() {
        doc.line(&format!("err '{message}'{args}"));
    } else {
        let redirect = if to_stderr { " >&2" } else { "" };
        doc.line(&format!(
            r#"printf '%s: Error: {message}\n' "$(basename "$0")"{args}{redirect}"#
        ));
    }
}

const OPTIONS_CASES: &str = r"while (($# > 0))
do
    param=$1
    shift
    case $param in
        -y|--yo)
            opt_yo=1
            ;;

        -p|--plop)
            opt_plop=${1:?Missing argument for option: ${param}}
            shift
            ;;";

const POSITIONAL_ASSIGNMENTS: &str = r"arg_foo=$1
arg_bar=${2:-${DEFAULT_BAR}}

if [[ -z $arg_foo ]]
then";

/// `parse_command`: fills `opt_*` and `arg_*` variables and checks the
/// mandatory argument.
#[derive(Debug)]
pub struct ParseCommand;

impl ParseCommand {
    fn header(shape: Shape) -> &'static str {
        match shape {
            Shape::OptionsAndPositionals => {
                "# Fill up global “opt_*” and “arg_*” variables according to given
# options and positional parameters, and perform basic checks
# on the presence of mandatory info.
#
# $@    Arguments originally passed to the script itself.
parse_command() {"
            }
            Shape::OptionsOnly => {
                "# Fill up global “opt_*” variables according to given options
# and perform basic checks on the presence of mandatory info.
#
# $@    Arguments originally passed to the script itself.
parse_command() {"
            }
            Shape::PositionalsOnly => {
                "# Fill up global “arg_*” variables according to given arguments
# and perform basic checks on the presence of mandatory info.
#
# $@    Arguments originally passed to the script itself.
parse_command() {"
            }
        }
    }

    /// The `while`/`case` loop over options, up to and including the
    /// catch-all branch.
    fn option_loop(config: &ScriptConfig, doc: &mut Document, positionals: bool) {
        doc.block(
            r#"# Clear all option-related variables before parsing.
unset -v "${!opt_@}"

local param"#,
        );
        if positionals {
            doc.line("local -a positionals=()");
        }
        doc.block(OPTIONS_CASES);
        doc.blank();
        if config.dry() {
            doc.block(
                "        --dry)
            DRY=1
            ;;",
            );
            doc.blank();
        }
        if config.usage() == Usage::HelpOption {
            doc.block(
                "        -h|--help)
            print_help
            exit 0
            ;;",
            );
            doc.blank();
        }

        let (pattern, message) = if positionals {
            ("        -*)", "Invalid option: %q")
        } else {
            ("        *)", "Invalid option or extra parameter: %q")
        };
        doc.block(pattern);
        doc.block("            print_help >&2");
        doc.indent(3);
        report(doc, config, message, r#" "$param""#, true);
        doc.dedent(3);
        doc.block(
            "            exit 1
            ;;",
        );
    }

    /// Assignment of `arg_*` variables and the check on `FOO`.
    fn positional_check(config: &ScriptConfig, doc: &mut Document, to_stderr: bool) {
        doc.block(POSITIONAL_ASSIGNMENTS);
        doc.indent(1);
        doc.line("print_help");
        report(doc, config, "Missing mandatory parameter: foo", "", to_stderr);
        doc.line("exit 1");
        doc.dedent(1);
        doc.line("fi >&2");
    }
}

impl Fragment for ParseCommand {
    fn name(&self) -> &'static str {
        "parse-command"
    }

    fn slot(&self) -> Slot {
        Slot::Parser
    }

    fn fields(&self) -> &'static [&'static str] {
        &["options", "positionals"]
    }

    fn applies(&self, config: &ScriptConfig) -> bool {
        Shape::of(config).is_some()
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        let config = ctx.config;
        let Some(shape) = Shape::of(config) else {
            return;
        };
        doc.block(Self::header(shape));
        doc.indent(1);
        match shape {
            Shape::OptionsAndPositionals => {
                help_if_no_arguments(doc, config.usage());
                Self::option_loop(config, doc, true);
                doc.blank();
                doc.block(
                    r#"        *)
            positionals+=("$param")
            ;;
    esac
done

set -- "${positionals[@]}""#,
                );
                Self::positional_check(config, doc, false);
            }
            Shape::OptionsOnly => {
                help_if_no_arguments(doc, config.usage());
                Self::option_loop(config, doc, false);
                doc.block(
                    "    esac
done",
                );
            }
            Shape::PositionalsOnly => {
                help_request_loop(doc, config.usage(), true);
                help_if_no_arguments(doc, config.usage());
                Self::positional_check(config, doc, true);
            }
        }
        doc.dedent(1);
        doc.line("}");
        doc.blank();
    }
}

/// `parse_command "$@"` followed by a log of the parsed values.
#[derive(Debug)]
pub struct ParseCall;

impl ParseCall {
    /// Log one line of parsed values, wrapping the `printf` fallback over two
    /// lines.
    fn log_values(config: &ScriptConfig, doc: &mut Document, format: &str, values: &str) {
        if config.logging_utils() {
            doc.line(&format!("log '{format}' {values}"));
        } else {
            doc.line(&format!(r"printf '%s: {format}\n' \"));
            doc.indent(2);
            doc.line(&format!(r#""$(basename "$0")" {values}"#));
            doc.dedent(2);
        }
    }

    fn log_options(config: &ScriptConfig, doc: &mut Document) {
        Self::log_values(config, doc, "Yo: %q; Plop: %q", r#""$opt_yo" "$opt_plop""#);
    }

    fn log_positionals(config: &ScriptConfig, doc: &mut Document) {
        Self::log_values(config, doc, "Foo: %q; Bar: %q", r#""$arg_foo" "$arg_bar""#);
    }
}

impl Fragment for ParseCall {
    fn name(&self) -> &'static str {
        "parse-call"
    }

    fn slot(&self) -> Slot {
        Slot::Invocation
    }

    fn fields(&self) -> &'static [&'static str] {
        &["options", "positionals"]
    }

    requires![ParseCommand];

    fn applies(&self, config: &ScriptConfig) -> bool {
        Shape::of(config).is_some()
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        let config = ctx.config;
        let Some(shape) = Shape::of(config) else {
            return;
        };
        doc.line(r#"parse_command "$@""#);
        match shape {
            Shape::OptionsAndPositionals => {
                doc.blank();
                Self::log_options(config, doc);
                Self::log_positionals(config, doc);
            }
            Shape::OptionsOnly => {
                doc.blank();
                Self::log_options(config, doc);
            }
            Shape::PositionalsOnly => Self::log_positionals(config, doc),
        }
        doc.blank();
    }
}

/// Help handling for scripts that take no argument at all.
#[derive(Debug)]
pub struct HelpRequestCheck;

impl Fragment for HelpRequestCheck {
    fn name(&self) -> &'static str {
        "help-request-check"
    }

    fn slot(&self) -> Slot {
        Slot::Invocation
    }

    fn fields(&self) -> &'static [&'static str] {
        &["options", "positionals", "usage"]
    }

    conflicts![ParseCall];

    fn applies(&self, config: &ScriptConfig) -> bool {
        Shape::of(config).is_none() && config.usage() != Usage::Manual
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        let config = ctx.config;
        // A `local` declaration is only legal inside the `main` wrapper.
        help_request_loop(doc, config.usage(), config.main());
        help_if_no_arguments(doc, config.usage());
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::assembler::RenderOptions;
    use crate::config::RawConfig;

    fn render(fragment: &dyn Fragment, raw: RawConfig, depth: usize) -> String {
        let config = raw.validate().expect("valid configuration");
        let options = RenderOptions::default();
        let ctx = RenderContext {
            config: &config,
            options: &options,
        };
        let mut doc = Document::new(options.indent);
        doc.set_depth(depth);
        fragment.render(&ctx, &mut doc);
        doc.render()
    }

    #[test]
    fn printf_fallback_wraps_over_two_lines() {
        let raw = RawConfig {
            options: false,
            logging_utils: false,
            main: true,
            ..RawConfig::default()
        };
        assert_eq!(
            render(&ParseCall, raw, 1),
            "    parse_command \"$@\"\n    printf '%s: Foo: %q; Bar: %q\\n' \\\n            \"$(basename \"$0\")\" \"$arg_foo\" \"$arg_bar\"\n\n"
        );
    }

    #[test]
    fn options_only_call_logs_options() {
        let raw = RawConfig {
            positionals: false,
            ..RawConfig::default()
        };
        assert_eq!(
            render(&ParseCall, raw, 0),
            "parse_command \"$@\"\n\nlog 'Yo: %q; Plop: %q' \"$opt_yo\" \"$opt_plop\"\n\n"
        );
    }

    #[test]
    fn options_only_parser_rejects_everything_else() {
        let raw = RawConfig {
            positionals: false,
            logging_utils: false,
            ..RawConfig::default()
        };
        let text = render(&ParseCommand, raw, 0);
        assert!(text.contains("            *)\n                print_help >&2\n"));
        assert!(text.contains(
            "                printf '%s: Error: Invalid option or extra parameter: %q\\n' \"$(basename \"$0\")\" \"$param\" >&2\n"
        ));
        assert!(!text.contains("positionals"));
        assert!(text.ends_with("        esac\n    done\n}\n\n"));
    }

    #[test]
    fn positional_parser_scans_for_help() {
        let raw = RawConfig {
            options: false,
            ..RawConfig::default()
        };
        let text = render(&ParseCommand, raw, 0);
        assert!(text.contains("parse_command() {\n    local arg\n    for arg\n    do\n"));
        assert!(text.contains("    done\n\n    arg_foo=$1\n"));
    }

    #[test]
    fn no_argument_check_precedes_option_loop() {
        let raw = RawConfig {
            usage: 2,
            ..RawConfig::default()
        };
        let text = render(&ParseCommand, raw, 0);
        let check = text.find("if (($# == 0))").unwrap();
        let unset = text.find("unset -v").unwrap();
        assert!(check < unset);
        assert!(!text.contains("-h|--help)"));
    }

    #[test]
    fn top_level_help_check_declares_no_local() {
        let raw = RawConfig {
            options: false,
            positionals: false,
            ..RawConfig::default()
        };
        let text = render(&HelpRequestCheck, raw, 0);
        assert!(text.starts_with("for arg\ndo\n"));

        let raw = RawConfig {
            options: false,
            positionals: false,
            main: true,
            ..RawConfig::default()
        };
        assert!(render(&HelpRequestCheck, raw, 1).starts_with("    local arg\n    for arg\n"));
    }

    #[test]
    fn help_check_absent_for_manual_usage() {
        let config = RawConfig {
            options: false,
            positionals: false,
            usage: 3,
            ..RawConfig::default()
        }
        .validate()
        .unwrap();
        assert!(!HelpRequestCheck.applies(&config));
        assert!(!ParseCall.applies(&config));
    }
}
