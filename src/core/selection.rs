use crate::core::library::LibraryResource;
use std::collections::BTreeSet;

/// Ids of the libraries marked for the next submission.
///
/// The set never holds an id that is absent from the snapshot it was last
/// checked against. [`crate::core::library_store::LibraryStore`] owns the only
/// long-lived instance and prunes it under the same lock as every snapshot
/// change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<i64>,
}

fn exists(resources: &[LibraryResource], id: i64) -> bool {
    resources.iter().any(|resource| resource.id == id)
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_selected(&self) -> BTreeSet<i64> {
        self.ids.clone()
    }

    /// Ascending ids, the canonical shape sent to the backend.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replaces the selection wholesale. Unknown ids are dropped and returned.
    pub fn set_selected<I>(&mut self, ids: I, resources: &[LibraryResource]) -> Vec<i64>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut dropped = Vec::new();
        let mut next = BTreeSet::new();
        for id in ids {
            if exists(resources, id) {
                next.insert(id);
            } else if !dropped.contains(&id) {
                dropped.push(id);
            }
        }
        self.ids = next;
        dropped
    }

    /// Flips one id. Returns the new state, or `None` when the id is unknown.
    pub fn toggle(&mut self, id: i64, resources: &[LibraryResource]) -> Option<bool> {
        if self.ids.remove(&id) {
            return Some(false);
        }
        if exists(resources, id) {
            self.ids.insert(id);
            Some(true)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub(crate) fn forget(&mut self, id: i64) -> bool {
        self.ids.remove(&id)
    }

    /// Drops every id that no longer has a resource; returns what was pruned.
    pub(crate) fn retain_known(&mut self, resources: &[LibraryResource]) -> Vec<i64> {
        let pruned: Vec<i64> = self
            .ids
            .iter()
            .copied()
            .filter(|id| !exists(resources, *id))
            .collect();
        for id in &pruned {
            self.ids.remove(id);
        }
        pruned
    }
}
