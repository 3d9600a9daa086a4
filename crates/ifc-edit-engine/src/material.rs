// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material associations
//!
//! The schema's open material hierarchy is decoded once, here, into the closed
//! [`MaterialAssociation`] enum. Everything downstream matches on it.

use crate::bag::PropertyValue;
use crate::psets::{attribute_value, type_object};
use ifc_edit_model::{DecodedEntity, EntityId, EntityResolver, IfcType};

/// An `IfcMaterial`
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialInfo {
    pub id: EntityId,
    pub name: Option<String>,
    /// `None` when the schema has no Description slot or it is unset
    pub description: Option<String>,
    /// IFC4 only
    pub category: Option<String>,
}

/// One slice of a layered composition
///
/// Optional slots are probed on the instance: `None` means the schema version
/// has no such attribute, `Some(Null)` means it exists but is unset.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub id: EntityId,
    pub material: Option<MaterialInfo>,
    pub thickness: f64,
    pub is_ventilated: Option<PropertyValue>,
    pub priority: Option<PropertyValue>,
}

/// An ordered `IfcMaterialLayerSet`
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSet {
    pub id: EntityId,
    pub name: Option<String>,
    pub layers: Vec<Layer>,
}

/// An `IfcMaterialLayerSetUsage`
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSetUsage {
    pub id: EntityId,
    pub layer_set: LayerSet,
    pub direction: Option<String>,
    pub sense: Option<String>,
    pub offset: Option<f64>,
}

/// How an element is made of materials
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialAssociation {
    Single(MaterialInfo),
    /// Several single-material associations on one element
    List(Vec<MaterialInfo>),
    LayerSet(LayerSet),
    /// An `IfcMaterialList`
    MaterialList(Vec<MaterialInfo>),
    LayerSetUsage(LayerSetUsage),
}

impl MaterialAssociation {
    /// Ordered layer composition, from a usage or a direct layer set
    pub fn layer_set(&self) -> Option<&LayerSet> {
        match self {
            MaterialAssociation::LayerSet(set) => Some(set),
            MaterialAssociation::LayerSetUsage(usage) => Some(&usage.layer_set),
            _ => None,
        }
    }
}

/// Resolve the material association of an element
///
/// Falls back to the element's type object when the occurrence has none.
pub fn material_association<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
) -> Option<MaterialAssociation> {
    associated_materials(store, id).or_else(|| {
        let type_object = type_object(store, id)?;
        associated_materials(store, type_object.id)
    })
}

fn associated_materials<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
) -> Option<MaterialAssociation> {
    // RelatedObjects at index 4, RelatingMaterial at index 5
    let targets: Vec<_> = store
        .referencing(&IfcType::IfcRelAssociatesMaterial, 4, id)
        .iter()
        .filter_map(|rel| rel.get_ref(5))
        .filter_map(|target| store.get(target))
        .collect();

    match targets.as_slice() {
        [] => None,
        [single] => classify(store, single),
        several if several.iter().all(|t| t.ifc_type == IfcType::IfcMaterial) => Some(
            MaterialAssociation::List(several.iter().map(|m| material_info(m)).collect()),
        ),
        several => {
            log::warn!(
                "{} has {} material associations, using the first structured one",
                id,
                several.len()
            );
            several
                .iter()
                .filter(|t| t.ifc_type != IfcType::IfcMaterial)
                .find_map(|t| classify(store, t))
        }
    }
}

fn classify<S: EntityResolver + ?Sized>(
    store: &S,
    target: &DecodedEntity,
) -> Option<MaterialAssociation> {
    match target.ifc_type {
        IfcType::IfcMaterial => Some(MaterialAssociation::Single(material_info(target))),
        // Materials at index 0
        IfcType::IfcMaterialList => Some(MaterialAssociation::MaterialList(
            target
                .get(0)
                .map(|list| store.resolve_ref_list(list))
                .unwrap_or_default()
                .iter()
                .map(|m| material_info(m))
                .collect(),
        )),
        IfcType::IfcMaterialLayerSet => Some(MaterialAssociation::LayerSet(layer_set(
            store, target,
        ))),
        // ForLayerSet 0, LayerSetDirection 1, DirectionSense 2, OffsetFromReferenceLine 3
        IfcType::IfcMaterialLayerSetUsage => {
            let set = target.get_ref(0).and_then(|set_id| store.get(set_id));
            let Some(set) = set else {
                log::warn!("Layer set usage {} has no layer set", target.id);
                return None;
            };
            Some(MaterialAssociation::LayerSetUsage(LayerSetUsage {
                id: target.id,
                layer_set: layer_set(store, &set),
                direction: target.get_enum(1).map(str::to_string),
                sense: target.get_enum(2).map(str::to_string),
                offset: target.get_float(3),
            }))
        }
        _ => {
            log::debug!("Unsupported material definition {} ({})", target.id, target.ifc_type);
            None
        }
    }
}

/// Decode an `IfcMaterial`: Name 0, Description 1 and Category 2 (IFC4)
pub fn material_info(material: &DecodedEntity) -> MaterialInfo {
    MaterialInfo {
        id: material.id,
        name: material.get_string(0).map(str::to_string),
        description: material.get_string(1).map(str::to_string),
        category: material.get_string(2).map(str::to_string),
    }
}

/// Decode an `IfcMaterialLayerSet`: MaterialLayers 0, LayerSetName 1
pub fn layer_set<S: EntityResolver + ?Sized>(store: &S, set: &DecodedEntity) -> LayerSet {
    let layers = set
        .get(0)
        .map(|list| store.resolve_ref_list(list))
        .unwrap_or_default()
        .iter()
        .map(|layer| decode_layer(store, layer))
        .collect();

    LayerSet {
        id: set.id,
        name: set.get_string(1).map(str::to_string),
        layers,
    }
}

/// Decode an `IfcMaterialLayer`
///
/// Material 0, LayerThickness 1, IsVentilated 2; Priority 6 exists in IFC4 only.
fn decode_layer<S: EntityResolver + ?Sized>(store: &S, layer: &DecodedEntity) -> Layer {
    let probe = |index: usize| {
        layer
            .has_attribute(index)
            .then(|| layer.get(index).map(attribute_value).unwrap_or(PropertyValue::Null))
    };

    Layer {
        id: layer.id,
        material: layer
            .get_ref(0)
            .and_then(|id| store.get(id))
            .filter(|m| m.ifc_type == IfcType::IfcMaterial)
            .map(|m| material_info(&m)),
        thickness: layer.get_float(1).unwrap_or(0.0),
        is_ventilated: probe(2),
        priority: probe(6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{legacy, multi, sample};

    #[test]
    fn test_usage_on_wall() {
        let doc = sample();
        let Some(MaterialAssociation::LayerSetUsage(usage)) =
            material_association(&doc, EntityId(42))
        else {
            panic!("expected a layer set usage");
        };

        assert_eq!(usage.direction.as_deref(), Some("AXIS2"));
        assert_eq!(usage.sense.as_deref(), Some("POSITIVE"));
        assert_eq!(usage.offset, Some(-0.15));
        assert_eq!(usage.layer_set.name.as_deref(), Some("Wall 300"));
        assert_eq!(usage.layer_set.layers.len(), 2);

        let core = &usage.layer_set.layers[0];
        assert_eq!(core.thickness, 0.2);
        assert_eq!(core.is_ventilated, Some(PropertyValue::Bool(false)));
        assert_eq!(core.priority, Some(PropertyValue::Integer(10)));
        assert_eq!(
            core.material.as_ref().and_then(|m| m.category.as_deref()),
            Some("Structural")
        );

        let insulation = &usage.layer_set.layers[1];
        assert_eq!(insulation.is_ventilated, Some(PropertyValue::Null));
    }

    #[test]
    fn test_other_association_kinds() {
        let doc = sample();
        assert!(matches!(
            material_association(&doc, EntityId(43)),
            Some(MaterialAssociation::Single(m)) if m.name.as_deref() == Some("Concrete")
        ));
        assert!(matches!(
            material_association(&doc, EntityId(44)),
            Some(MaterialAssociation::LayerSet(set)) if set.layers.len() == 1
        ));
        assert!(matches!(
            material_association(&doc, EntityId(45)),
            Some(MaterialAssociation::MaterialList(list)) if list.len() == 2
        ));
        assert_eq!(material_association(&doc, EntityId(46)), None);
    }

    #[test]
    fn test_several_single_materials_form_a_list() {
        let doc = multi();
        let Some(MaterialAssociation::List(materials)) = material_association(&doc, EntityId(2))
        else {
            panic!("expected a list of materials");
        };
        let names: Vec<_> = materials.iter().filter_map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_structured_association_wins_over_single() {
        let doc = multi();
        let Some(MaterialAssociation::LayerSet(set)) = material_association(&doc, EntityId(3))
        else {
            panic!("expected the layer set");
        };
        assert_eq!(set.name.as_deref(), Some("B 300"));
        assert_eq!(set.layers.len(), 1);
    }

    #[test]
    fn test_ifc2x3_layers_lack_priority() {
        let doc = legacy();
        let association = material_association(&doc, EntityId(5)).unwrap();
        let set = association.layer_set().unwrap();
        let layer = &set.layers[0];

        assert_eq!(layer.priority, None);
        assert_eq!(layer.is_ventilated, Some(PropertyValue::Null));
        let material = layer.material.as_ref().unwrap();
        assert_eq!(material.name.as_deref(), Some("Brick"));
        assert_eq!(material.description, None);
    }
}
