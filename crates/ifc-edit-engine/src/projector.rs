// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property projection
//!
//! Flattens everything known about one element into a [`PropertyBag`]:
//! identity, layer summary, property and quantity sets, material composition
//! and absolute placement. Nothing is cached; each call reads the store again.

use crate::bag::{PropertyBag, PropertyValue};
use crate::material::{material_association, LayerSet, MaterialAssociation, MaterialInfo};
use crate::options::EngineOptions;
use crate::placement::{absolute_placement, matrix_rows, object_placement};
use crate::psets::{property_sets, quantity_sets, type_property_sets, PropertySetView};
use ifc_edit_model::{DecodedEntity, EntityId, EntityResolver, ModelError};

/// Project one element by id
pub fn project_id<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
    options: &EngineOptions,
) -> Result<PropertyBag, ModelError> {
    let entity = store.get(id).ok_or(ModelError::EntityNotFound(id))?;
    Ok(project(store, &entity, options))
}

/// Project one element into a flat, ordered bag
pub fn project<S: EntityResolver + ?Sized>(
    store: &S,
    entity: &DecodedEntity,
    options: &EngineOptions,
) -> PropertyBag {
    let mut bag = PropertyBag::new();
    bag.insert("Name", entity.name());
    bag.insert("Type", entity.ifc_type.name());
    bag.insert("GlobalId", entity.global_id());

    let association = material_association(store, entity.id);
    if let Some(set) = association.as_ref().and_then(|a| a.layer_set()) {
        bag.insert("HasLayers", true);
        bag.insert("LayerSetName", set.name.as_deref());
        bag.insert("NumberOfLayers", set.layers.len());
    }

    if options.include_type_properties {
        for set in type_property_sets(store, entity.id) {
            set.flatten_into(&mut bag, "");
        }
    }
    for set in property_sets(store, entity.id) {
        set.flatten_into(&mut bag, "");
    }

    let quantities = quantity_sets(store, entity.id);
    for set in &quantities {
        set.flatten_into(&mut bag, "");
    }

    if let Some(association) = &association {
        let area = if entity.ifc_type.is_wall_like() {
            Some(quantity(&quantities, "Qto_WallBaseQuantities", "GrossFootprintArea"))
        } else if entity.ifc_type.is_slab_like() {
            Some(quantity(&quantities, "Qto_SlabBaseQuantities", "GrossArea"))
        } else {
            None
        };
        project_material(&mut bag, association, area);
    }

    let placement = object_placement(store, entity);
    if entity.ifc_type.is_product() || placement.is_some() {
        let matrix = placement
            .map(|id| absolute_placement(store, id))
            .unwrap_or_else(nalgebra::Matrix4::identity);
        bag.insert(
            "LocalPlacement",
            matrix_rows(&matrix)
                .into_iter()
                .map(|row| PropertyValue::List(row.into_iter().map(PropertyValue::Real).collect()))
                .collect::<Vec<_>>(),
        );
    }

    log::debug!("Projected {} into {} keys", entity.id, bag.len());
    bag
}

/// Conventional area quantity, 0 when absent
fn quantity(sets: &[PropertySetView], set_name: &str, name: &str) -> f64 {
    sets.iter()
        .filter(|set| set.name == set_name)
        .find_map(|set| set.value(name).and_then(PropertyValue::as_f64))
        .unwrap_or(0.0)
}

fn project_material(bag: &mut PropertyBag, association: &MaterialAssociation, area: Option<f64>) {
    match association {
        MaterialAssociation::Single(material) => {
            bag.insert("Material", material.name.as_deref());
        }
        MaterialAssociation::List(materials) => {
            bag.insert("Materials", material_names(materials));
        }
        MaterialAssociation::MaterialList(materials) => {
            bag.insert("MaterialList", material_names(materials));
        }
        MaterialAssociation::LayerSet(set) => {
            bag.insert("MaterialLayers", layer_entries(set, area));
        }
        MaterialAssociation::LayerSetUsage(usage) => {
            let mut summary = PropertyBag::new();
            summary.insert("LayerSet", usage.layer_set.name.as_deref());
            summary.insert("LayerSetDirection", usage.direction.as_deref());
            summary.insert("DirectionSense", usage.sense.as_deref());
            summary.insert("OffsetFromReferenceLine", usage.offset);
            bag.insert("MaterialLayerSetUsage", summary);
            bag.insert("MaterialLayers", layer_entries(&usage.layer_set, area));
        }
    }
}

fn material_names(materials: &[MaterialInfo]) -> Vec<PropertyValue> {
    materials
        .iter()
        .map(|m| PropertyValue::from(m.name.as_deref()))
        .collect()
}

fn layer_entries(set: &LayerSet, area: Option<f64>) -> Vec<PropertyValue> {
    set.layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let mut entry = PropertyBag::new();
            entry.insert("Position", i + 1);
            entry.insert(
                "Material",
                layer
                    .material
                    .as_ref()
                    .and_then(|m| m.name.as_deref())
                    .unwrap_or("Unknown"),
            );
            entry.insert("Thickness", layer.thickness);
            entry.insert(
                "IsVentilated",
                layer
                    .is_ventilated
                    .clone()
                    .filter(|v| !v.is_null())
                    .unwrap_or_else(|| PropertyValue::from("N/A")),
            );
            if let Some(area) = area {
                entry.insert("Area", area);
                entry.insert("Volume", area * layer.thickness);
            }
            PropertyValue::Map(entry)
        })
        .collect()
}
