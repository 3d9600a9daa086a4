// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model store traits: entity lookup, relation traversal, and mutation

use crate::{AttributeValue, DecodedEntity, EntityId, IfcType, ModelMetadata, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Entity lookup and reference resolution
///
/// This trait provides read access to the entities of a document. Entities are
/// handed out as shared snapshots; a store that is mutated afterwards hands out
/// fresh snapshots on the next lookup.
///
/// # Example
///
/// ```ignore
/// use ifc_edit_model::{EntityResolver, EntityId};
///
/// fn print_name(store: &dyn EntityResolver, wall_id: EntityId) {
///     if let Some(wall) = store.get(wall_id) {
///         println!("{}: {:?}", wall.ifc_type, wall.name());
///     }
/// }
/// ```
pub trait EntityResolver: Send + Sync {
    /// Get entity by ID
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>>;

    /// Resolve an entity reference from an attribute value
    fn resolve_ref(&self, attr: &AttributeValue) -> Option<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::EntityRef(id) => self.get(*id),
            _ => None,
        }
    }

    /// Resolve a list of entity references
    ///
    /// Dangling references and non-reference items are skipped.
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Vec<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::List(items) => items
                .iter()
                .filter_map(|item| self.resolve_ref(item))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get all entities of a specific type, in store order
    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>>;

    /// Find entities by type name string (case-insensitive)
    fn find_by_type_name(&self, type_name: &str) -> Vec<Arc<DecodedEntity>> {
        self.entities_by_type(&IfcType::parse(type_name))
    }

    /// Count entities of a specific type
    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.entities_by_type(ifc_type).len()
    }

    /// Get all entity IDs in store order
    fn all_ids(&self) -> Vec<EntityId>;

    /// Get total entity count
    fn entity_count(&self) -> usize {
        self.all_ids().len()
    }

    /// Distinct type names present in the document, sorted ascending
    fn type_names(&self) -> Vec<String> {
        self.all_ids()
            .into_iter()
            .filter_map(|id| self.get(id))
            .map(|entity| entity.ifc_type.name().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Inverse relation traversal
    ///
    /// Returns every entity of `ifc_type` whose attribute at `attribute` is a
    /// reference to `target`, or a list containing one.
    fn referencing(
        &self,
        ifc_type: &IfcType,
        attribute: usize,
        target: EntityId,
    ) -> Vec<Arc<DecodedEntity>> {
        self.entities_by_type(ifc_type)
            .into_iter()
            .filter(|entity| {
                entity
                    .get(attribute)
                    .map(|value| value.references(target))
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// Mutable model store
///
/// Adds attribute writes, entity creation and persistence to [`EntityResolver`].
/// Only one logical session is expected to hold a store at a time.
pub trait ModelStore: EntityResolver {
    /// File metadata (schema version, originating system, etc.)
    fn metadata(&self) -> &ModelMetadata;

    /// Replace one attribute of an existing entity
    fn set_attribute(&mut self, id: EntityId, index: usize, value: AttributeValue) -> Result<()>;

    /// Append a new entity and return its freshly allocated ID
    fn add_entity(&mut self, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> EntityId;

    /// Serialize the full document to `path`
    fn write(&self, path: &Path) -> Result<()>;
}
