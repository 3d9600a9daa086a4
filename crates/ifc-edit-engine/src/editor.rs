// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editing session facade
//!
//! An [`Editor`] owns one model store, the path it was loaded from, the
//! engine options and the current [`Selection`]. Hosts (the shell, a web
//! layer) call into it and render what it returns.

use crate::bag::PropertyBag;
use crate::error::{ExportError, MutationError, ResolutionError, Result};
use crate::export::{
    build_export, build_rows, comparison_table, ExportKind, ExportMode, ExportOutcome, Table,
};
use crate::layers::{layer_properties, layer_rows, select_layer};
use crate::material::Layer;
use crate::mutator::{create_property, update_with_report, UpdateReport};
use crate::options::EngineOptions;
use crate::persist::{persist, SaveReport};
use crate::projector::project_id;
use crate::resolver::{
    is_numeric, list_types, matching_types, resolve, Resolution, SelectionResolver,
};
use crate::selection::Selection;
use ifc_edit_model::{EntityId, ModelStore};
use std::path::{Path, PathBuf};

/// Identifying fields of one element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementSummary {
    pub id: EntityId,
    pub ifc_type: String,
    pub name: Option<String>,
    pub global_id: Option<String>,
}

/// One editing session over a store
pub struct Editor<S: ModelStore> {
    store: S,
    path: PathBuf,
    options: EngineOptions,
    selection: Selection,
    dirty: bool,
}

impl<S: ModelStore> Editor<S> {
    pub fn new(store: S, path: impl Into<PathBuf>, options: EngineOptions) -> Self {
        Self {
            store,
            path: path.into(),
            options,
            selection: Selection::new(),
            dirty: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection wholesale
    pub fn select(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.selection.replace(ids);
        log::debug!("Selection is now {} element(s)", self.selection.len());
    }

    /// Unsaved changes exist
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn resolve(&self, token: &str) -> Resolution {
        resolve(&self.store, token)
    }

    /// Fresh resolver configured from the session options
    pub fn resolver(&self) -> SelectionResolver {
        SelectionResolver::new().with_auto_confirm(self.options.auto_confirm_single_type)
    }

    /// Adopt a finished resolver's result as the selection
    pub fn apply(&mut self, resolver: &SelectionResolver) -> bool {
        match resolver.resolved() {
            Some(ids) => {
                self.select(ids.iter().copied());
                true
            }
            None => false,
        }
    }

    pub fn list_types(&self) -> Vec<String> {
        list_types(&self.store)
    }

    pub fn count_by_type(&self, type_name: &str) -> usize {
        self.store.find_by_type_name(type_name).len()
    }

    /// Instance counts for a 1-based index into [`Self::list_types`] or a type fragment
    pub fn count(&self, query: &str) -> std::result::Result<Vec<(String, usize)>, ResolutionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolutionError::EmptyToken);
        }

        let types = if is_numeric(query) {
            let all = self.list_types();
            let choice: usize = query
                .parse()
                .map_err(|_| ResolutionError::InvalidPick(query.to_string()))?;
            let picked = choice
                .checked_sub(1)
                .and_then(|i| all.get(i))
                .ok_or(ResolutionError::ChoiceOutOfRange {
                    choice,
                    max: all.len(),
                })?;
            vec![picked.clone()]
        } else {
            let matches = matching_types(&self.store, query);
            if matches.is_empty() {
                return Err(ResolutionError::NoTypesMatch(query.to_string()));
            }
            matches
        };

        Ok(types
            .into_iter()
            .map(|name| {
                let count = self.count_by_type(&name);
                (name, count)
            })
            .collect())
    }

    /// Identifying fields of every selected element
    pub fn view(&self) -> Vec<ElementSummary> {
        self.selection
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|entity| ElementSummary {
                id: entity.id,
                ifc_type: entity.ifc_type.name().to_string(),
                name: entity.name().map(str::to_string),
                global_id: entity.global_id().map(str::to_string),
            })
            .collect()
    }

    pub fn project(&self, id: EntityId) -> Result<PropertyBag> {
        Ok(project_id(&self.store, id, &self.options)?)
    }

    /// Selected elements side by side
    pub fn comparison_table(&self) -> Table {
        comparison_table(&build_rows(&self.store, self.selection.ids(), &self.options))
    }

    pub fn select_layer(
        &self,
        id: EntityId,
        index: usize,
    ) -> std::result::Result<Layer, ResolutionError> {
        select_layer(&self.store, id, index)
    }

    pub fn layer_properties(&self, layer: &Layer) -> PropertyBag {
        layer_properties(&self.store, layer)
    }

    /// Numbered layer bags of every selected element that has layers
    pub fn layer_listing(&self) -> Vec<(ElementSummary, Vec<PropertyBag>)> {
        self.view()
            .into_iter()
            .map(|summary| {
                let rows = layer_rows(&self.store, summary.id);
                (summary, rows)
            })
            .filter(|(_, rows)| !rows.is_empty())
            .collect()
    }

    /// Update a property on every selected element
    pub fn update(&mut self, property: &str, value: &str) -> Result<UpdateReport> {
        let ids = self.selection.ids().to_vec();
        let report = update_with_report(&mut self.store, &ids, property, value)?;
        self.dirty |= report.succeeded();
        Ok(report)
    }

    /// Add a property to every selected element
    pub fn create_property(&mut self, name: &str, value: &str) -> Result<Vec<EntityId>> {
        if self.selection.is_empty() {
            return Err(MutationError::EmptyBatch.into());
        }
        let ids = self.selection.ids().to_vec();
        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            created.push(create_property(&mut self.store, id, name, value, &self.options)?);
            self.dirty = true;
        }
        Ok(created)
    }

    /// Build export tables for the selection
    pub fn export(&self, mode: ExportMode, kind: ExportKind) -> Result<ExportOutcome> {
        if self.selection.is_empty() {
            return Err(ExportError::EmptySelection.into());
        }
        let rows = build_rows(&self.store, self.selection.ids(), &self.options);
        Ok(build_export(rows, mode, kind)?)
    }

    /// Two-phase save to the path the session was opened from
    pub fn save(&mut self) -> Result<SaveReport> {
        let path = self.path.clone();
        self.save_as(path)
    }

    /// Two-phase save to `path`, which becomes the session path
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<SaveReport> {
        let path = path.into();
        let report = persist(&self.store, &path, &self.options)?;
        self.path = path;
        self.dirty = false;
        Ok(report)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
