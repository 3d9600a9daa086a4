// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Current element selection

use ifc_edit_model::EntityId;

/// Ordered list of element handles
///
/// The store owns the elements; a selection only names them and is replaced
/// wholesale whenever the resolver produces a new result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<EntityId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection, dropping repeated IDs
    pub fn from_ids(ids: impl IntoIterator<Item = EntityId>) -> Self {
        let mut selection = Self::new();
        selection.replace(ids);
        selection
    }

    /// Replace the whole selection
    pub fn replace(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_order_without_duplicates() {
        let mut selection = Selection::from_ids([EntityId(5), EntityId(2), EntityId(5)]);
        assert_eq!(selection.ids(), &[EntityId(5), EntityId(2)]);

        selection.replace([EntityId(9)]);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(EntityId(9)));
        assert!(!selection.contains(EntityId(5)));
    }
}
