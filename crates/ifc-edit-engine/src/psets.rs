// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property and quantity set reading
//!
//! Walks `IfcRelDefinesByProperties` (and `IfcRelDefinesByType` for inherited
//! sets) and decodes every supported property kind into a [`PropertyValue`].

use crate::bag::{PropertyBag, PropertyValue};
use ifc_edit_model::{AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType};
use std::sync::Arc;

/// Property set vs quantity set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetKind {
    Properties,
    Quantities,
}

/// One decoded property or quantity
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyEntry {
    /// The `IfcProperty`/`IfcPhysicalQuantity` instance
    pub id: EntityId,
    pub name: String,
    pub value: PropertyValue,
}

/// A decoded property or quantity set
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySetView {
    pub id: EntityId,
    pub name: String,
    pub kind: SetKind,
    pub entries: Vec<PropertyEntry>,
}

impl PropertySetView {
    /// Value of the entry named `name`
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    /// Insert every entry as `"{prefix}{set}.{property}"`
    pub fn flatten_into(&self, bag: &mut PropertyBag, prefix: &str) {
        for entry in &self.entries {
            bag.insert(
                format!("{}{}.{}", prefix, self.name, entry.name),
                entry.value.clone(),
            );
        }
    }
}

/// Property definitions attached to an element, in relation order
///
/// Handles both a single `RelatingPropertyDefinition` and the IFC4 set form.
pub fn attached_definitions<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
) -> Vec<Arc<DecodedEntity>> {
    // RelatedObjects at index 4, RelatingPropertyDefinition at index 5
    store
        .referencing(&IfcType::IfcRelDefinesByProperties, 4, id)
        .iter()
        .flat_map(|rel| match rel.get(5) {
            Some(value @ AttributeValue::List(_)) => store.resolve_ref_list(value),
            Some(value) => store.resolve_ref(value).into_iter().collect(),
            None => Vec::new(),
        })
        .collect()
}

/// Type object of an element (`IfcRelDefinesByType`)
pub fn type_object<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
) -> Option<Arc<DecodedEntity>> {
    // RelatedObjects at index 4, RelatingType at index 5
    store
        .referencing(&IfcType::IfcRelDefinesByType, 4, id)
        .first()
        .and_then(|rel| rel.get_ref(5))
        .and_then(|type_id| store.get(type_id))
}

/// Property sets attached to the element itself
pub fn property_sets<S: EntityResolver + ?Sized>(store: &S, id: EntityId) -> Vec<PropertySetView> {
    sets_of_kind(store, id, SetKind::Properties)
}

/// Quantity sets attached to the element
pub fn quantity_sets<S: EntityResolver + ?Sized>(store: &S, id: EntityId) -> Vec<PropertySetView> {
    sets_of_kind(store, id, SetKind::Quantities)
}

fn sets_of_kind<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
    kind: SetKind,
) -> Vec<PropertySetView> {
    attached_definitions(store, id)
        .iter()
        .filter_map(|definition| read_set(store, definition))
        .filter(|set| set.kind == kind)
        .collect()
}

/// Property sets declared on the element's type object
pub fn type_property_sets<S: EntityResolver + ?Sized>(
    store: &S,
    id: EntityId,
) -> Vec<PropertySetView> {
    let Some(type_object) = type_object(store, id) else {
        return Vec::new();
    };
    // HasPropertySets at index 5
    type_object
        .get(5)
        .map(|sets| store.resolve_ref_list(sets))
        .unwrap_or_default()
        .iter()
        .filter_map(|set| read_set(store, set))
        .filter(|set| set.kind == SetKind::Properties)
        .collect()
}

/// Decode a property or quantity set entity
pub fn read_set<S: EntityResolver + ?Sized>(
    store: &S,
    set: &DecodedEntity,
) -> Option<PropertySetView> {
    // Name at 2; HasProperties at 4, Quantities at 5
    let (kind, members) = match set.ifc_type {
        IfcType::IfcPropertySet => (SetKind::Properties, 4),
        IfcType::IfcElementQuantity => (SetKind::Quantities, 5),
        _ => {
            log::debug!("Skipping property definition {} ({})", set.id, set.ifc_type);
            return None;
        }
    };

    Some(PropertySetView {
        id: set.id,
        name: set.get_string(2).unwrap_or_default().to_string(),
        kind,
        entries: read_entries(store, set.get(members)),
    })
}

fn read_entries<S: EntityResolver + ?Sized>(
    store: &S,
    members: Option<&AttributeValue>,
) -> Vec<PropertyEntry> {
    members
        .map(|list| store.resolve_ref_list(list))
        .unwrap_or_default()
        .iter()
        .filter_map(|member| read_entry(member))
        .collect()
}

/// Decode a single property or quantity
pub fn read_entry(member: &DecodedEntity) -> Option<PropertyEntry> {
    // Name at index 0 for both properties and quantities
    let name = member.get_string(0)?.to_string();

    let value = match member.ifc_type {
        // NominalValue at 2
        IfcType::IfcPropertySingleValue => attribute_value(member.get(2)?),
        // EnumerationValues / ListValues at 2
        IfcType::IfcPropertyEnumeratedValue | IfcType::IfcPropertyListValue => {
            attribute_value(member.get(2)?)
        }
        // UpperBoundValue 2, LowerBoundValue 3, SetPointValue 5 (IFC4)
        IfcType::IfcPropertyBoundedValue => {
            let mut bounds = PropertyBag::new();
            let slots = [("LowerBoundValue", 3), ("UpperBoundValue", 2), ("SetPointValue", 5)];
            for (key, index) in slots {
                if let Some(value) = member.get(index).filter(|v| !v.is_null()) {
                    bounds.insert(key, attribute_value(value));
                }
            }
            PropertyValue::Map(bounds)
        }
        // Quantity value at index 3
        IfcType::IfcQuantityLength
        | IfcType::IfcQuantityArea
        | IfcType::IfcQuantityVolume
        | IfcType::IfcQuantityCount
        | IfcType::IfcQuantityWeight
        | IfcType::IfcQuantityTime => attribute_value(member.get(3)?),
        _ => {
            log::debug!("Unsupported property kind {} ({})", member.id, member.ifc_type);
            return None;
        }
    };

    Some(PropertyEntry {
        id: member.id,
        name,
        value,
    })
}

/// Convert a raw attribute into a display value
///
/// Typed values are unwrapped; STEP logicals become booleans.
pub fn attribute_value(attr: &AttributeValue) -> PropertyValue {
    match attr {
        AttributeValue::Null | AttributeValue::Derived => PropertyValue::Null,
        AttributeValue::String(s) => PropertyValue::Text(s.clone()),
        AttributeValue::Integer(i) => PropertyValue::Integer(*i),
        AttributeValue::Float(f) => PropertyValue::Real(*f),
        AttributeValue::Bool(b) => PropertyValue::Bool(*b),
        AttributeValue::Enum(e) => match attr.as_bool() {
            Some(b) => PropertyValue::Bool(b),
            None if e.eq_ignore_ascii_case("U") => PropertyValue::Text("UNKNOWN".to_string()),
            None => PropertyValue::Text(e.clone()),
        },
        AttributeValue::EntityRef(id) => PropertyValue::Text(id.to_string()),
        AttributeValue::List(items) => {
            PropertyValue::List(items.iter().map(attribute_value).collect())
        }
        AttributeValue::TypedValue(_, args) => args
            .first()
            .map(attribute_value)
            .unwrap_or(PropertyValue::Null),
    }
}

/// Property sets of a material, from both schema layouts
///
/// IFC4 `IfcMaterialProperties(Name, Description, Properties, Material)` and
/// IFC2X3 `IfcExtendedMaterialProperties(Material, ExtendedProperties, Description, Name)`.
pub fn material_property_sets<S: EntityResolver + ?Sized>(
    store: &S,
    material: EntityId,
) -> Vec<PropertySetView> {
    let ifc4 = store
        .referencing(&IfcType::IfcMaterialProperties, 3, material)
        .into_iter()
        .map(|set| (set, 0, 2));
    let ifc2x3 = store
        .referencing(&IfcType::IfcExtendedMaterialProperties, 0, material)
        .into_iter()
        .map(|set| (set, 3, 1));

    ifc4.chain(ifc2x3)
        .map(|(set, name, members)| PropertySetView {
            id: set.id,
            name: set.get_string(name).unwrap_or_default().to_string(),
            kind: SetKind::Properties,
            entries: read_entries(store, set.get(members)),
        })
        .collect()
}
