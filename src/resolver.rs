//! Fragment selection and rule checking.
//!
//! [`resolve`] evaluates every catalogue predicate against a configuration
//! and asserts the declared `requires`/`conflicts` rules over the result.
//! Violations surface as [`DependencyError`]s naming the configuration fields
//! involved, so interactive callers can re-ask exactly those questions.
use std::any::TypeId;
use std::collections::HashSet;

use crate::config::ScriptConfig;
use crate::error::DependencyError;
use crate::fragments::{self, Fragment, Slot};

/// The fragments a configuration selects, in catalogue order.
#[derive(Debug, Clone)]
pub struct FragmentSet {
    fragments: Vec<&'static dyn Fragment>,
}

impl FragmentSet {
    /// Whether a fragment with this name was selected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fragments.iter().any(|f| f.name() == name)
    }

    /// Whether the fragment with this `TypeId` was selected.
    #[must_use]
    pub fn contains_id(&self, id: TypeId) -> bool {
        self.fragments.iter().any(|f| f.fragment_id() == id)
    }

    /// Selected fragments, in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = &'static dyn Fragment> + '_ {
        self.fragments.iter().copied()
    }

    /// Selected fragments rendering into `slot`, in catalogue order.
    pub fn in_slot(&self, slot: Slot) -> impl Iterator<Item = &'static dyn Fragment> + '_ {
        self.iter().filter(move |f| f.slot() == slot)
    }

    /// Names of the selected fragments.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|f| f.name()).collect()
    }

    /// Number of selected fragments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Fields of `first` followed by those of `second`, without repetition.
fn merged_fields(first: &dyn Fragment, second: Option<&dyn Fragment>) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = first.fields().to_vec();
    for field in second.map_or(&[][..], |f| f.fields()) {
        if !fields.contains(field) {
            fields.push(field);
        }
    }
    fields
}

/// Select the fragments for `config` and check every rule.
///
/// # Errors
///
/// Returns [`DependencyError::MissingRequirement`] when a selected fragment
/// requires one that was not selected, and [`DependencyError::Conflict`]
/// when two mutually exclusive fragments were both selected. The first
/// violation in catalogue order is reported.
pub fn resolve(config: &ScriptConfig) -> Result<FragmentSet, DependencyError> {
    let selected: Vec<&'static dyn Fragment> = fragments::catalogue()
        .iter()
        .copied()
        .filter(|f| f.applies(config))
        .collect();
    let present: HashSet<TypeId> = selected.iter().map(|f| f.fragment_id()).collect();

    for fragment in &selected {
        if let Some(missing) = fragment.requires().iter().find(|id| !present.contains(*id)) {
            let required = fragments::find(*missing);
            return Err(DependencyError::MissingRequirement {
                fragment: fragment.name(),
                required: required.map_or("unknown", |r| r.name()),
                fields: merged_fields(*fragment, required),
            });
        }
        if let Some(other) = fragment.conflicts().iter().find(|id| present.contains(*id)) {
            let second = fragments::find(*other);
            return Err(DependencyError::Conflict {
                first: fragment.name(),
                second: second.map_or("unknown", |s| s.name()),
                fields: merged_fields(*fragment, second),
            });
        }
    }

    Ok(FragmentSet {
        fragments: selected,
    })
}
