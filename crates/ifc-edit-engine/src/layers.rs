// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer selection and per-layer projection

use crate::bag::PropertyBag;
use crate::error::ResolutionError;
use crate::material::{material_association, Layer};
use crate::psets::material_property_sets;
use ifc_edit_model::{EntityId, EntityResolver};

/// Ordered layers of an element, empty when it has no layer composition
pub fn layers_of<S: EntityResolver + ?Sized>(store: &S, id: EntityId) -> Vec<Layer> {
    material_association(store, id)
        .and_then(|association| association.layer_set().map(|set| set.layers.clone()))
        .unwrap_or_default()
}

/// Layer at zero-based `index`
pub fn select_layer<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
    index: usize,
) -> Result<Layer, ResolutionError> {
    let layers = layers_of(store, id);
    if layers.is_empty() {
        return Err(ResolutionError::NoLayers(id));
    }
    let count = layers.len();
    layers
        .into_iter()
        .nth(index)
        .ok_or(ResolutionError::LayerOutOfRange { index, count })
}

/// Flatten one layer and its material's property sets
pub fn layer_properties<S: EntityResolver + ?Sized>(store: &S, layer: &Layer) -> PropertyBag {
    let mut bag = PropertyBag::new();
    let material = layer.material.as_ref();

    bag.insert(
        "Material",
        material
            .and_then(|m| m.name.as_deref())
            .unwrap_or("Unknown"),
    );
    bag.insert("Thickness", layer.thickness);
    if let Some(ventilated) = &layer.is_ventilated {
        bag.insert("IsVentilated", ventilated.clone());
    }
    if let Some(priority) = &layer.priority {
        bag.insert("Priority", priority.clone());
    }
    bag.insert(
        "MaterialCategory",
        material.and_then(|m| m.category.as_deref()).unwrap_or("N/A"),
    );
    bag.insert(
        "MaterialDescription",
        material
            .and_then(|m| m.description.as_deref())
            .unwrap_or("N/A"),
    );

    if let Some(material) = material {
        for set in material_property_sets(store, material.id) {
            set.flatten_into(&mut bag, "Material.");
        }
    }
    bag
}

/// Every layer of an element as a bag tagged with its 1-based `Layer Number`
pub fn layer_rows<S: EntityResolver + ?Sized>(store: &S, id: EntityId) -> Vec<PropertyBag> {
    layers_of(store, id)
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let mut row = PropertyBag::new();
            row.insert("Layer Number", i + 1);
            row.extend_from(&layer_properties(store, layer));
            row
        })
        .collect()
}

/// Whether an element has a layer composition
pub fn has_layers<S: EntityResolver + ?Sized>(store: &S, id: EntityId) -> bool {
    !layers_of(store, id).is_empty()
}
