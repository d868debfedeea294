//! Opening and closing of the script body, and the placeholder it wraps.
use super::{Fragment, RenderContext, Slot, conflicts, requires};
use crate::config::ScriptConfig;
use crate::document::Document;

/// `main() {`, opening the wrapper function.
#[derive(Debug)]
pub struct EntryPoint;

impl Fragment for EntryPoint {
    fn name(&self) -> &'static str {
        "entry-point"
    }

    fn slot(&self) -> Slot {
        Slot::BodyOpen
    }

    fn fields(&self) -> &'static [&'static str] {
        &["main"]
    }

    conflicts![TopLevelBody];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.main()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("main() {");
    }
}

/// A separator between definitions and top-level statements.
#[derive(Debug)]
pub struct TopLevelBody;

impl Fragment for TopLevelBody {
    fn name(&self) -> &'static str {
        "top-level-body"
    }

    fn slot(&self) -> Slot {
        Slot::BodyOpen
    }

    fn fields(&self) -> &'static [&'static str] {
        &["main"]
    }

    conflicts![EntryPoint];

    fn applies(&self, config: &ScriptConfig) -> bool {
        !config.main()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("# ================================");
        doc.blank();
    }
}

/// Where the script author's code goes.
#[derive(Debug)]
pub struct BusinessLogic;

impl Fragment for BusinessLogic {
    fn name(&self) -> &'static str {
        "business-logic"
    }

    fn slot(&self) -> Slot {
        Slot::Business
    }

    fn fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn applies(&self, _config: &ScriptConfig) -> bool {
        true
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        let config = ctx.config;
        let statement = if config.logging_utils() {
            "log 'TODO'"
        } else {
            "echo 'TODO'"
        };
        if config.dry() {
            doc.line(&format!("run_if_not_dry {statement}"));
        } else {
            doc.line(statement);
        }
    }
}

/// Closes `main` and calls it with the script's arguments.
#[derive(Debug)]
pub struct EntryPointCall;

impl Fragment for EntryPointCall {
    fn name(&self) -> &'static str {
        "entry-point-call"
    }

    fn slot(&self) -> Slot {
        Slot::BodyClose
    }

    fn fields(&self) -> &'static [&'static str] {
        &["main"]
    }

    requires![EntryPoint];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.main()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.indent(1);
        doc.line("return 0");
        doc.dedent(1);
        doc.line("}");
        doc.blank();
        doc.line(r#"main "$@""#);
    }
}

/// Explicit successful exit of a top-level script.
#[derive(Debug)]
pub struct ScriptExit;

impl Fragment for ScriptExit {
    fn name(&self) -> &'static str {
        "script-exit"
    }

    fn slot(&self) -> Slot {
        Slot::BodyClose
    }

    fn fields(&self) -> &'static [&'static str] {
        &["main"]
    }

    requires![TopLevelBody];

    fn applies(&self, config: &ScriptConfig) -> bool {
        !config.main()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.blank();
        doc.line("exit 0");
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::assembler::RenderOptions;
    use crate::config::RawConfig;

    #[test]
    fn business_logic_variants() {
        let cases = [
            (RawConfig::default(), "log 'TODO'\n"),
            (
                RawConfig {
                    logging_utils: false,
                    ..RawConfig::default()
                },
                "echo 'TODO'\n",
            ),
            (
                RawConfig {
                    dry: true,
                    ..RawConfig::default()
                },
                "run_if_not_dry log 'TODO'\n",
            ),
        ];
        let options = RenderOptions::default();
        for (raw, expected) in cases {
            let config = raw.validate().unwrap();
            let ctx = RenderContext {
                config: &config,
                options: &options,
            };
            let mut doc = Document::new(options.indent);
            BusinessLogic.render(&ctx, &mut doc);
            assert_eq!(doc.render(), expected);
        }
    }

    #[test]
    fn entry_point_call_closes_wrapper() {
        let config = RawConfig {
            main: true,
            ..RawConfig::default()
        }
        .validate()
        .unwrap();
        let options = RenderOptions::default();
        let ctx = RenderContext {
            config: &config,
            options: &options,
        };
        let mut doc = Document::new(options.indent);
        EntryPointCall.render(&ctx, &mut doc);
        assert_eq!(doc.render(), "    return 0\n}\n\nmain \"$@\"\n");
    }
}
