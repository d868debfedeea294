//! Interpreter line, shell options, path variables and constants.
use super::{Fragment, RenderContext, Slot, conflicts};
use crate::config::{ErrTrap, ScriptConfig};
use crate::document::Document;

/// The interpreter line selected by `use_env`.
#[must_use]
pub const fn shebang(config: &ScriptConfig) -> &'static str {
    if config.use_env() {
        "#! /usr/bin/env bash"
    } else {
        "#! /bin/bash"
    }
}

/// `#! /usr/bin/env bash`.
#[derive(Debug)]
pub struct ShebangEnv;

impl Fragment for ShebangEnv {
    fn name(&self) -> &'static str {
        "shebang-env"
    }

    fn slot(&self) -> Slot {
        Slot::Shebang
    }

    fn fields(&self) -> &'static [&'static str] {
        &["use_env"]
    }

    conflicts![ShebangFixed];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.use_env()
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line(shebang(ctx.config));
        doc.blank();
    }
}

/// `#! /bin/bash`.
#[derive(Debug)]
pub struct ShebangFixed;

impl Fragment for ShebangFixed {
    fn name(&self) -> &'static str {
        "shebang-fixed"
    }

    fn slot(&self) -> Slot {
        Slot::Shebang
    }

    fn fields(&self) -> &'static [&'static str] {
        &["use_env"]
    }

    conflicts![ShebangEnv];

    fn applies(&self, config: &ScriptConfig) -> bool {
        !config.use_env()
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line(shebang(ctx.config));
        doc.blank();
    }
}

/// A single `set -…` line carrying `e`, `E` and `x` as configured.
#[derive(Debug)]
pub struct ShellOptions;

impl Fragment for ShellOptions {
    fn name(&self) -> &'static str {
        "shell-options"
    }

    fn slot(&self) -> Slot {
        Slot::ShellOptions
    }

    fn fields(&self) -> &'static [&'static str] {
        &["set_e", "err_trap", "set_x"]
    }

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.set_e() || config.set_x() || config.err_trap() == ErrTrap::Inherited
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        let config = ctx.config;
        let mut flags = String::new();
        if config.set_e() {
            flags.push('e');
        }
        if config.err_trap() == ErrTrap::Inherited {
            flags.push('E');
        }
        if config.set_x() {
            flags.push('x');
        }
        doc.line(&format!("set -{flags}"));
        doc.blank();
    }
}

const READLINK: &str = r#"BASEDIR=$(dirname "$(readlink -f -- "$0")")"#;

/// `BASEDIR` through `readlink -f`.
#[derive(Debug)]
pub struct BasedirReadlink;

impl Fragment for BasedirReadlink {
    fn name(&self) -> &'static str {
        "basedir-readlink"
    }

    fn slot(&self) -> Slot {
        Slot::Paths
    }

    fn fields(&self) -> &'static [&'static str] {
        &["greadlink"]
    }

    conflicts![BasedirGreadlink];

    fn applies(&self, config: &ScriptConfig) -> bool {
        !config.greadlink()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line(READLINK);
    }
}

/// `BASEDIR` through `greadlink -f` when available, for macOS users with
/// GNU coreutils.
#[derive(Debug)]
pub struct BasedirGreadlink;

impl Fragment for BasedirGreadlink {
    fn name(&self) -> &'static str {
        "basedir-greadlink"
    }

    fn slot(&self) -> Slot {
        Slot::Paths
    }

    fn fields(&self) -> &'static [&'static str] {
        &["greadlink"]
    }

    conflicts![BasedirReadlink];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.greadlink()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.block(
            r#"if type greadlink &> /dev/null
then
    BASEDIR=$(dirname "$(greadlink -f -- "$0")")
else"#,
        );
        doc.indent(1);
        doc.line(READLINK);
        doc.dedent(1);
        doc.line("fi");
    }
}

/// `ROOTDIR`, derived from `BASEDIR`, and the `readonly` declaration of both.
#[derive(Debug)]
pub struct RootDir;

impl Fragment for RootDir {
    fn name(&self) -> &'static str {
        "root-dir"
    }

    fn slot(&self) -> Slot {
        Slot::Paths
    }

    fn fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn applies(&self, _config: &ScriptConfig) -> bool {
        true
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.block(
            r#"# Adapt or remove the ROOTDIR definition depending
# on the depth of this script within the project.
ROOTDIR=$(dirname "$BASEDIR")
readonly BASEDIR ROOTDIR"#,
        );
        doc.blank();
    }
}

/// Default value of the optional positional argument.
#[derive(Debug)]
pub struct Constants;

impl Fragment for Constants {
    fn name(&self) -> &'static str {
        "constants"
    }

    fn slot(&self) -> Slot {
        Slot::Constants
    }

    fn fields(&self) -> &'static [&'static str] {
        &["positionals"]
    }

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.positionals()
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("readonly DEFAULT_BAR=/the/default/bar");
        doc.blank();
    }
}
