//! The closed catalogue of script fragments.
//!
//! Every fragment is a unit struct implementing [`Fragment`]: a predicate
//! over the configuration, a renderer, the skeleton [`Slot`] it occupies, and
//! `requires`/`conflicts` declarations the resolver asserts. Ordering never
//! comes from the declarations; the assembler walks [`Slot::ALL`] and renders
//! fragments of a slot in catalogue order.
pub mod body;
pub mod help;
pub mod helpers;
pub mod parser;
pub mod preamble;
pub mod traps;

use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;

use crate::assembler::RenderOptions;
use crate::config::ScriptConfig;
use crate::document::Document;

/// Implement [`Fragment::requires`] by expanding to the required
/// `fn requires(&self) -> &[TypeId]` method body.
///
/// The `const DEPS` intermediate gives the slice a `'static` lifetime.
macro_rules! requires {
    [$($dep:ty),+ $(,)?] => {
        fn requires(&self) -> &[std::any::TypeId] {
            const DEPS: &[std::any::TypeId] = &[$(std::any::TypeId::of::<$dep>()),+];
            DEPS
        }
    };
}

/// Implement [`Fragment::conflicts`], see [`requires!`].
macro_rules! conflicts {
    [$($other:ty),+ $(,)?] => {
        fn conflicts(&self) -> &[std::any::TypeId] {
            const OTHERS: &[std::any::TypeId] = &[$(std::any::TypeId::of::<$other>()),+];
            OTHERS
        }
    };
}

pub(crate) use conflicts;
pub(crate) use requires;

/// Fixed position classes of the output skeleton, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Interpreter line.
    Shebang,
    /// `set -eEx` style declarations.
    ShellOptions,
    /// `BASEDIR`/`ROOTDIR` derivation.
    Paths,
    /// Named constants.
    Constants,
    /// Shared helper functions; moved to the secondary document when split.
    Helpers,
    /// Sourcing of the secondary document.
    Sourcing,
    /// Trap handler definitions.
    TrapHandlers,
    /// `print_help`.
    Help,
    /// `parse_command`.
    Parser,
    /// Opening of the body: `main() {` or a separator.
    BodyOpen,
    /// Trap installation statements.
    TrapInstall,
    /// Argument handling at the start of the body.
    Invocation,
    /// Placeholder business logic.
    Business,
    /// Closing of the body and final exit.
    BodyClose,
}

impl Slot {
    /// Every slot, in output order.
    pub const ALL: [Self; 14] = [
        Self::Shebang,
        Self::ShellOptions,
        Self::Paths,
        Self::Constants,
        Self::Helpers,
        Self::Sourcing,
        Self::TrapHandlers,
        Self::Help,
        Self::Parser,
        Self::BodyOpen,
        Self::TrapInstall,
        Self::Invocation,
        Self::Business,
        Self::BodyClose,
    ];

    /// Whether statements in this slot live inside the `main` wrapper when
    /// there is one.
    #[must_use]
    pub const fn in_body(self) -> bool {
        matches!(self, Self::TrapInstall | Self::Invocation | Self::Business)
    }
}

/// What a fragment's renderer can see: the configuration and the generator's
/// render options.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// The validated configuration.
    pub config: &'a ScriptConfig,
    /// Indentation and helper file naming.
    pub options: &'a RenderOptions,
}

/// A named, independently renderable piece of generated script.
///
/// The `'static` bound gives each fragment struct a stable [`TypeId`], which
/// [`Fragment::requires`] and [`Fragment::conflicts`] use as identifiers.
pub trait Fragment: fmt::Debug + Send + Sync + 'static {
    /// Stable, human-readable fragment name.
    fn name(&self) -> &'static str;

    /// The concrete `TypeId` of this fragment.
    fn fragment_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Skeleton slot this fragment renders into.
    fn slot(&self) -> Slot;

    /// Configuration fields whose values decide [`Fragment::applies`].
    fn fields(&self) -> &'static [&'static str];

    /// Fragments that must also be selected whenever this one is.
    fn requires(&self) -> &[TypeId] {
        &[]
    }

    /// Fragments that must never be selected together with this one.
    fn conflicts(&self) -> &[TypeId] {
        &[]
    }

    /// Whether the configuration selects this fragment.
    fn applies(&self, config: &ScriptConfig) -> bool;

    /// Append this fragment's text to `doc`.
    fn render(&self, ctx: &RenderContext<'_>, doc: &mut Document);
}

static CATALOGUE: &[&dyn Fragment] = &[
    &preamble::ShebangEnv,
    &preamble::ShebangFixed,
    &preamble::ShellOptions,
    &preamble::BasedirReadlink,
    &preamble::BasedirGreadlink,
    &preamble::RootDir,
    &preamble::Constants,
    &helpers::LoggingHelpers,
    &helpers::DryRunHelpers,
    &helpers::SourceUtils,
    &traps::ErrTrapHandler,
    &traps::ExitTrapHandler,
    &help::PrintHelp,
    &parser::ParseCommand,
    &body::EntryPoint,
    &body::TopLevelBody,
    &traps::ErrTrapInstall,
    &traps::InheritedErrTrapInstall,
    &traps::ExitTrapInstall,
    &traps::TempDirCleanup,
    &traps::CleanupList,
    &parser::ParseCall,
    &parser::HelpRequestCheck,
    &body::BusinessLogic,
    &body::EntryPointCall,
    &body::ScriptExit,
];

/// The complete fragment catalogue.
///
/// Fragments sharing a slot render in the order they appear here.
#[must_use]
pub fn catalogue() -> &'static [&'static dyn Fragment] {
    CATALOGUE
}

/// Look up a catalogue fragment by its `TypeId`.
#[must_use]
pub fn find(id: TypeId) -> Option<&'static dyn Fragment> {
    CATALOGUE.iter().copied().find(|f| f.fragment_id() == id)
}

/// Look up a catalogue fragment by name.
#[must_use]
pub fn find_by_name(name: &str) -> Option<&'static dyn Fragment> {
    CATALOGUE.iter().copied().find(|f| f.name() == name)
}

/// Names of fragments whose `requires` chain never bottoms out.
///
/// A fragment is settled once everything it requires within `fragments` is
/// settled; whatever is left sits on a requirement cycle or behind one.
/// Requirements pointing outside `fragments` are ignored.
#[must_use]
pub fn requirement_cycle(fragments: &[&dyn Fragment]) -> Vec<&'static str> {
    let known: HashSet<TypeId> = fragments.iter().map(|f| f.fragment_id()).collect();
    let mut settled: HashSet<TypeId> = HashSet::new();
    loop {
        let before = settled.len();
        for f in fragments {
            let ready = f
                .requires()
                .iter()
                .all(|id| !known.contains(id) || settled.contains(id));
            if ready {
                settled.insert(f.fragment_id());
            }
        }
        if settled.len() == before {
            break;
        }
    }
    fragments
        .iter()
        .filter(|f| !settled.contains(&f.fragment_id()))
        .map(|f| f.name())
        .collect()
}

/// Consistency problems in a fragment catalogue.
///
/// An empty result means names and ids are unique, every `requires` and
/// `conflicts` target exists, conflicts are declared between distinct
/// fragments, and the requirement graph is acyclic. Any problem is a bug in
/// the catalogue, never a user error.
#[must_use]
pub fn catalogue_problems(fragments: &[&dyn Fragment]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut names = HashSet::new();
    let mut ids = HashSet::new();
    for f in fragments {
        if !names.insert(f.name()) {
            problems.push(format!("duplicate fragment name '{}'", f.name()));
        }
        if !ids.insert(f.fragment_id()) {
            problems.push(format!("fragment '{}' is listed twice", f.name()));
        }
    }
    for f in fragments {
        for dep in f.requires() {
            if !ids.contains(dep) {
                problems.push(format!("'{}' requires a fragment not in the catalogue", f.name()));
            }
        }
        for other in f.conflicts() {
            if !ids.contains(other) {
                problems.push(format!("'{}' conflicts with a fragment not in the catalogue", f.name()));
            } else if *other == f.fragment_id() {
                problems.push(format!("'{}' conflicts with itself", f.name()));
            }
        }
    }
    let cycle = requirement_cycle(fragments);
    if !cycle.is_empty() {
        problems.push(format!("requirement cycle through {}", cycle.join(", ")));
    }
    problems
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Mock fragments: each is a distinct type so TypeId-based deps work.
    // -----------------------------------------------------------------------

    macro_rules! mock_fragment {
        ($name:ident, $display:expr, $deps:expr) => {
            #[derive(Debug)]
            struct $name;
            impl Fragment for $name {
                fn name(&self) -> &'static str {
                    $display
                }
                fn slot(&self) -> Slot {
                    Slot::Business
                }
                fn fields(&self) -> &'static [&'static str] {
                    &[]
                }
                fn requires(&self) -> &[TypeId] {
                    const DEPS: &[TypeId] = $deps;
                    DEPS
                }
                fn applies(&self, _config: &ScriptConfig) -> bool {
                    true
                }
                fn render(&self, _ctx: &RenderContext<'_>, doc: &mut Document) {
                    doc.line($display);
                }
            }
        };
    }

    mock_fragment!(DepA, "dep-a", &[]);
    mock_fragment!(DepB, "dep-b", &[TypeId::of::<DepA>()]);
    mock_fragment!(DepC, "dep-c", &[TypeId::of::<DepB>()]);

    mock_fragment!(CycA, "cyc-a", &[TypeId::of::<CycB>()]);
    mock_fragment!(CycB, "cyc-b", &[TypeId::of::<CycA>()]);

    mock_fragment!(Orphan, "orphan", &[TypeId::of::<DepC>()]);

    #[test]
    fn no_cycle_linear_chain() {
        let fragments: Vec<&dyn Fragment> = vec![&DepA, &DepB, &DepC];
        assert!(requirement_cycle(&fragments).is_empty());
    }

    #[test]
    fn cycle_detected() {
        let fragments: Vec<&dyn Fragment> = vec![&DepA, &CycA, &CycB];
        assert_eq!(requirement_cycle(&fragments), ["cyc-a", "cyc-b"]);
        assert!(
            catalogue_problems(&fragments)
                .iter()
                .any(|p| p == "requirement cycle through cyc-a, cyc-b")
        );
    }

    #[test]
    fn fragments_behind_a_cycle_are_reported() {
        mock_fragment!(Behind, "behind", &[TypeId::of::<CycA>()]);
        let fragments: Vec<&dyn Fragment> = vec![&Behind, &CycA, &CycB, &DepA];
        assert_eq!(requirement_cycle(&fragments), ["behind", "cyc-a", "cyc-b"]);
    }

    #[test]
    fn missing_requirement_target_is_a_problem() {
        let fragments: Vec<&dyn Fragment> = vec![&Orphan, &DepA];
        let problems = catalogue_problems(&fragments);
        assert_eq!(problems.len(), 1, "{problems:?}");
        assert!(problems[0].contains("'orphan' requires"));
    }

    #[test]
    fn duplicate_entries_are_problems() {
        let fragments: Vec<&dyn Fragment> = vec![&DepA, &DepA];
        let problems = catalogue_problems(&fragments);
        assert_eq!(problems.len(), 2, "{problems:?}");
    }

    // -----------------------------------------------------------------------
    // The real catalogue
    // -----------------------------------------------------------------------

    #[test]
    fn catalogue_is_consistent() {
        let problems = catalogue_problems(catalogue());
        assert!(problems.is_empty(), "catalogue problems: {problems:?}");
    }

    #[test]
    fn catalogue_names_are_kebab_case() {
        for f in catalogue() {
            assert!(
                f.name()
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '-'),
                "fragment name '{}' is not kebab-case",
                f.name()
            );
        }
    }

    #[test]
    fn catalogue_fields_are_configuration_fields() {
        for f in catalogue() {
            for field in f.fields() {
                assert!(
                    crate::config::FIELD_NAMES.contains(field),
                    "fragment '{}' names unknown field '{field}'",
                    f.name()
                );
            }
        }
    }

    #[test]
    fn every_slot_has_a_fragment() {
        for slot in Slot::ALL {
            assert!(
                catalogue().iter().any(|f| f.slot() == slot),
                "no fragment renders into {slot:?}"
            );
        }
    }

    #[test]
    fn slots_are_listed_in_order() {
        assert!(Slot::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn find_by_name_and_id_agree() {
        for f in catalogue() {
            let by_name = find_by_name(f.name()).expect("listed fragment");
            let by_id = find(f.fragment_id()).expect("listed fragment");
            assert_eq!(by_name.name(), by_id.name());
        }
        assert!(find_by_name("no-such-fragment").is_none());
    }
}
