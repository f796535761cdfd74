//! Association deltas for a perfume's join-table edges.
//!
//! Current edges are loaded from storage, desired edges come from the
//! patched aggregate; the difference becomes `DELETE`/`INSERT` statements.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::NoteCategory;

/// Edges to insert and delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta<T> {
    pub add: Vec<T>,
    pub remove: Vec<T>,
}

impl<T> Delta<T> {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

impl<T> Default for Delta<T> {
    fn default() -> Self {
        Self {
            add: Vec::new(),
            remove: Vec::new(),
        }
    }
}

/// Global set difference between current and desired perfumer ids.
///
/// Output order follows the input order; duplicates collapse.
pub fn perfumers(current: &[String], desired: &[String]) -> Delta<String> {
    let current_set: BTreeSet<&String> = current.iter().collect();
    let desired_set: BTreeSet<&String> = desired.iter().collect();

    let mut delta = Delta::default();
    let mut seen = BTreeSet::new();
    for id in desired {
        if !current_set.contains(id) && seen.insert(id) {
            delta.add.push(id.clone());
        }
    }
    seen.clear();
    for id in current {
        if !desired_set.contains(id) && seen.insert(id) {
            delta.remove.push(id.clone());
        }
    }
    delta
}

/// Per-category difference for note edges.
///
/// Only categories present in `desired` are touched: an empty list removes
/// every edge of that category, a missing category keeps its edges.
pub fn notes(
    current: &[(NoteCategory, String)],
    desired: &BTreeMap<NoteCategory, Vec<String>>,
) -> Delta<(NoteCategory, String)> {
    let mut delta = Delta::default();

    for (category, wanted) in desired {
        let existing: Vec<String> = current
            .iter()
            .filter(|(c, _)| c == category)
            .map(|(_, id)| id.clone())
            .collect();

        let per_category = perfumers(&existing, wanted);
        delta
            .add
            .extend(per_category.add.into_iter().map(|id| (*category, id)));
        delta
            .remove
            .extend(per_category.remove.into_iter().map(|id| (*category, id)));
    }

    delta
}
