//! `ERR` and `EXIT` trap handlers and the statements installing them.
use super::body::EntryPoint;
use super::{Fragment, RenderContext, Slot, conflicts, requires};
use crate::config::{ErrTrap, ExitTrap, ScriptConfig};
use crate::document::Document;

/// `err_trap`, reporting through `err` when available.
#[derive(Debug)]
pub struct ErrTrapHandler;

impl Fragment for ErrTrapHandler {
    fn name(&self) -> &'static str {
        "err-trap-handler"
    }

    fn slot(&self) -> Slot {
        Slot::TrapHandlers
    }

    fn fields(&self) -> &'static [&'static str] {
        &["err_trap"]
    }

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.err_trap() != ErrTrap::None
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.block(
            "# Executed when a command fails, with the same exceptions as for “set -e”.
# See “trap” documentation in “man bash” for details.
err_trap() {",
        );
        doc.indent(1);
        if ctx.config.logging_utils() {
            doc.line("err 'An error occurred.'");
        } else {
            doc.line(r#"printf '%s: An error occurred.\n' "$(basename "$0")" >&2"#);
        }
        doc.dedent(1);
        doc.line("}");
        doc.blank();
    }
}

/// `exit_trap`, whose body depends on what is cleaned up.
#[derive(Debug)]
pub struct ExitTrapHandler;

impl Fragment for ExitTrapHandler {
    fn name(&self) -> &'static str {
        "exit-trap-handler"
    }

    fn slot(&self) -> Slot {
        Slot::TrapHandlers
    }

    fn fields(&self) -> &'static [&'static str] {
        &["exit_trap"]
    }

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.exit_trap() != ExitTrap::None
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        let config = ctx.config;
        doc.line("# Executed upon exit, regardless of the cause.");
        doc.line("exit_trap() {");
        doc.indent(1);
        match config.exit_trap() {
            ExitTrap::Message if config.logging_utils() => doc.line("log 'Exiting.'"),
            ExitTrap::Message => doc.line(r#"printf '%s: Exiting.\n' "$(basename "$0")""#),
            ExitTrap::TempDir => doc.line(r#"rm -rf -- "$_temp_dir""#),
            ExitTrap::CleanupList => doc.line(r#"rm -rf -- "${_to_be_deleted[@]}""#),
            ExitTrap::None => {}
        }
        doc.dedent(1);
        doc.line("}");
        doc.blank();
    }
}

/// `trap err_trap ERR` for the top-level shell only.
#[derive(Debug)]
pub struct ErrTrapInstall;

impl Fragment for ErrTrapInstall {
    fn name(&self) -> &'static str {
        "err-trap-install"
    }

    fn slot(&self) -> Slot {
        Slot::TrapInstall
    }

    fn fields(&self) -> &'static [&'static str] {
        &["err_trap"]
    }

    requires![ErrTrapHandler];
    conflicts![InheritedErrTrapInstall];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.err_trap() == ErrTrap::TopLevel
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("trap err_trap ERR");
        doc.blank();
    }
}

/// `trap err_trap ERR` under `set -E`, inherited by functions.
///
/// The trap only reaches the body's commands when they run inside the `main`
/// wrapper, hence the requirement on [`EntryPoint`].
#[derive(Debug)]
pub struct InheritedErrTrapInstall;

impl Fragment for InheritedErrTrapInstall {
    fn name(&self) -> &'static str {
        "inherited-err-trap-install"
    }

    fn slot(&self) -> Slot {
        Slot::TrapInstall
    }

    fn fields(&self) -> &'static [&'static str] {
        &["err_trap"]
    }

    requires![ErrTrapHandler, EntryPoint];
    conflicts![ErrTrapInstall];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.err_trap() == ErrTrap::Inherited
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("trap err_trap ERR");
        doc.blank();
    }
}

/// Appends ` || exit` to a command substitution unless `set -e` already
/// aborts on failure.
fn checked(config: &ScriptConfig, statement: &str) -> String {
    if config.set_e() {
        statement.to_string()
    } else {
        format!("{statement} || exit")
    }
}

/// `trap exit_trap EXIT` with nothing to clean up.
#[derive(Debug)]
pub struct ExitTrapInstall;

impl Fragment for ExitTrapInstall {
    fn name(&self) -> &'static str {
        "exit-trap-install"
    }

    fn slot(&self) -> Slot {
        Slot::TrapInstall
    }

    fn fields(&self) -> &'static [&'static str] {
        &["exit_trap"]
    }

    requires![ExitTrapHandler];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.exit_trap() == ExitTrap::Message
    }

    fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("trap exit_trap EXIT");
        doc.blank();
    }
}

/// A temporary directory removed by the exit trap.
#[derive(Debug)]
pub struct TempDirCleanup;

impl Fragment for TempDirCleanup {
    fn name(&self) -> &'static str {
        "temp-dir-cleanup"
    }

    fn slot(&self) -> Slot {
        Slot::TrapInstall
    }

    fn fields(&self) -> &'static [&'static str] {
        &["exit_trap"]
    }

    requires![ExitTrapHandler];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.exit_trap() == ExitTrap::TempDir
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("unset -v _temp_dir");
        doc.line("trap exit_trap EXIT");
        doc.line(&checked(ctx.config, "_temp_dir=$(mktemp --directory)"));
        doc.blank();
    }
}

/// A list of paths removed by the exit trap, seeded with one directory.
///
/// The list is local to the `main` wrapper, hence the requirement on
/// [`EntryPoint`].
#[derive(Debug)]
pub struct CleanupList;

impl Fragment for CleanupList {
    fn name(&self) -> &'static str {
        "cleanup-list"
    }

    fn slot(&self) -> Slot {
        Slot::TrapInstall
    }

    fn fields(&self) -> &'static [&'static str] {
        &["exit_trap"]
    }

    requires![ExitTrapHandler, EntryPoint];

    fn applies(&self, config: &ScriptConfig) -> bool {
        config.exit_trap() == ExitTrap::CleanupList
    }

    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document) {
        doc.line("unset -v _to_be_deleted");
        doc.line("_to_be_deleted=()");
        doc.line("trap exit_trap EXIT");
        doc.line(&checked(ctx.config, "_some_dir=$(mktemp --directory)"));
        doc.line(r#"_to_be_deleted+=("$_some_dir")"#);
        doc.blank();
    }
}
