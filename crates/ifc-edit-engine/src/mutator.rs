// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property updates and creation
//!
//! Writes go straight to the store. Each assignment is local to one property
//! instance, so a failed entity never rolls back the others in a batch.

use crate::error::MutationError;
use crate::guid::new_global_id;
use crate::options::EngineOptions;
use crate::psets::{property_sets, quantity_sets, PropertySetView};
use ifc_edit_model::{AttributeValue, DecodedEntity, EntityId, IfcType, ModelError, ModelStore};

/// Attribute slot holding a property's value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertySlot {
    /// `NominalValue` of a single-value property, a typed measure
    Wrapped { index: usize },
    /// Bare numeric value of a physical quantity
    Bare { index: usize },
}

impl PropertySlot {
    /// Slot of a property or quantity instance
    pub fn of(property: &DecodedEntity) -> Result<Self, MutationError> {
        match property.ifc_type {
            IfcType::IfcPropertySingleValue => Ok(PropertySlot::Wrapped { index: 2 }),
            IfcType::IfcQuantityLength
            | IfcType::IfcQuantityArea
            | IfcType::IfcQuantityVolume
            | IfcType::IfcQuantityCount
            | IfcType::IfcQuantityWeight
            | IfcType::IfcQuantityTime => Ok(PropertySlot::Bare { index: 3 }),
            _ => Err(MutationError::UnrecognizedRepresentation {
                property: property.id,
                ifc_type: property.ifc_type.name().to_string(),
            }),
        }
    }

    /// Write `raw`, coerced to the kind of value currently stored
    pub fn write<S: ModelStore + ?Sized>(
        self,
        store: &mut S,
        property: &DecodedEntity,
        raw: &str,
    ) -> Result<(), MutationError> {
        let (index, value) = match self {
            PropertySlot::Wrapped { index } => {
                let value = property
                    .get(index)
                    .and_then(|current| coerce_wrapped(current, raw))
                    .unwrap_or_else(|| label(raw));
                (index, value)
            }
            PropertySlot::Bare { index } => {
                let value = property
                    .get(index)
                    .and_then(|current| coerce_bare(current, raw))
                    .ok_or_else(|| MutationError::InvalidValue {
                        property: property.id,
                        value: raw.to_string(),
                    })?;
                (index, value)
            }
        };
        store.set_attribute(property.id, index, value)?;
        Ok(())
    }
}

fn label(raw: &str) -> AttributeValue {
    AttributeValue::TypedValue(
        "IFCLABEL".to_string(),
        vec![AttributeValue::String(raw.to_string())],
    )
}

/// Keep the measure type when `raw` parses as its payload kind
fn coerce_wrapped(current: &AttributeValue, raw: &str) -> Option<AttributeValue> {
    let AttributeValue::TypedValue(measure, args) = current else {
        return None;
    };
    let payload = coerce_scalar(args.first()?, raw)?;
    Some(AttributeValue::TypedValue(measure.clone(), vec![payload]))
}

fn coerce_bare(current: &AttributeValue, raw: &str) -> Option<AttributeValue> {
    match current {
        AttributeValue::Null => raw.trim().parse().ok().map(AttributeValue::Float),
        other => coerce_scalar(other, raw),
    }
}

fn coerce_scalar(current: &AttributeValue, raw: &str) -> Option<AttributeValue> {
    let trimmed = raw.trim();
    match current {
        AttributeValue::Float(_) => trimmed.parse().ok().map(AttributeValue::Float),
        AttributeValue::Integer(_) => trimmed.parse().ok().map(AttributeValue::Integer),
        AttributeValue::Bool(_) => parse_bool(trimmed).map(AttributeValue::Bool),
        AttributeValue::Enum(_)
            if current.as_bool().is_some() || current.as_enum() == Some("U") =>
        {
            parse_bool(trimmed).map(|b| AttributeValue::Enum(if b { "T" } else { "F" }.to_string()))
        }
        AttributeValue::String(_) => Some(AttributeValue::String(raw.to_string())),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Outcome of a batch update
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub updated: Vec<EntityId>,
    pub failures: Vec<(EntityId, MutationError)>,
}

impl UpdateReport {
    /// At least one assignment went through
    pub fn succeeded(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Set `property` to `value` on every element of the batch
///
/// `Name` writes the element attribute. Any other name is looked up in the
/// element's own property sets, then its quantity sets, either bare or as
/// `Set.Property`; the first match per element is written.
pub fn update_with_report<S: ModelStore + ?Sized>(
    store: &mut S,
    ids: &[EntityId],
    property: &str,
    value: &str,
) -> Result<UpdateReport, MutationError> {
    if ids.is_empty() {
        return Err(MutationError::EmptyBatch);
    }
    if property.trim().is_empty() {
        return Err(MutationError::EmptyName);
    }

    let mut report = UpdateReport::default();
    for &id in ids {
        let outcome = if property == "Name" {
            store
                .set_attribute(id, 2, AttributeValue::String(value.to_string()))
                .map_err(MutationError::from)
        } else {
            update_property(store, id, property, value)
        };

        match outcome {
            Ok(()) => {
                log::info!("Set {} = '{}' on {}", property, value, id);
                report.updated.push(id);
            }
            Err(err) => {
                log::warn!("{}", err);
                report.failures.push((id, err));
            }
        }
    }
    Ok(report)
}

/// Boolean form of [`update_with_report`]
pub fn update<S: ModelStore + ?Sized>(
    store: &mut S,
    ids: &[EntityId],
    property: &str,
    value: &str,
) -> bool {
    match update_with_report(store, ids, property, value) {
        Ok(report) => report.succeeded(),
        Err(err) => {
            log::warn!("{}", err);
            false
        }
    }
}

fn update_property<S: ModelStore + ?Sized>(
    store: &mut S,
    id: EntityId,
    property: &str,
    value: &str,
) -> Result<(), MutationError> {
    if store.get(id).is_none() {
        return Err(ModelError::EntityNotFound(id).into());
    }

    let target = property_sets(store, id)
        .into_iter()
        .chain(quantity_sets(store, id))
        .find_map(|set| find_entry(&set, property));

    let Some(target) = target else {
        return Err(MutationError::PropertyNotFound {
            entity: id,
            property: property.to_string(),
        });
    };
    let member = store.get(target).ok_or(ModelError::EntityNotFound(target))?;
    PropertySlot::of(&member)?.write(store, &member, value)
}

fn find_entry(set: &PropertySetView, property: &str) -> Option<EntityId> {
    let name = match property.split_once('.') {
        Some((set_name, name)) if set_name == set.name => name,
        _ => property,
    };
    set.entries
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.id)
}

/// Attach `name = value` to an element in its custom property set
///
/// The set is named from the element type and created on first use. Calling
/// again with the same name updates the existing property. Returns the
/// property instance.
pub fn create_property<S: ModelStore + ?Sized>(
    store: &mut S,
    id: EntityId,
    name: &str,
    value: &str,
    options: &EngineOptions,
) -> Result<EntityId, MutationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MutationError::EmptyName);
    }
    let entity = store.get(id).ok_or(ModelError::EntityNotFound(id))?;
    let set_name = options.custom_pset_name(entity.ifc_type.name());

    let existing = property_sets(store, id)
        .into_iter()
        .find(|set| set.name == set_name);

    if let Some(set) = existing {
        if let Some(property_id) = find_entry(&set, name) {
            let member = store
                .get(property_id)
                .ok_or(ModelError::EntityNotFound(property_id))?;
            PropertySlot::of(&member)?.write(store, &member, value)?;
            log::info!("Updated {}.{} on {}", set_name, name, id);
            return Ok(property_id);
        }

        let property_id = add_single_value(store, name, value);
        let pset = store.get(set.id).ok_or(ModelError::EntityNotFound(set.id))?;
        // HasProperties at index 4
        let mut members = pset.get(4).and_then(|v| v.as_list()).unwrap_or(&[]).to_vec();
        members.push(AttributeValue::EntityRef(property_id));
        store.set_attribute(set.id, 4, AttributeValue::List(members))?;
        log::info!("Added {}.{} to {}", set_name, name, id);
        return Ok(property_id);
    }

    // Reuse the element's OwnerHistory, required by IFC2X3
    let owner_history = entity
        .get(1)
        .filter(|v| v.as_entity_ref().is_some())
        .cloned()
        .unwrap_or(AttributeValue::Null);

    let property_id = add_single_value(store, name, value);
    let pset_id = store.add_entity(
        IfcType::IfcPropertySet,
        vec![
            AttributeValue::String(new_global_id()),
            owner_history.clone(),
            AttributeValue::String(set_name.clone()),
            AttributeValue::Null,
            AttributeValue::List(vec![AttributeValue::EntityRef(property_id)]),
        ],
    );
    store.add_entity(
        IfcType::IfcRelDefinesByProperties,
        vec![
            AttributeValue::String(new_global_id()),
            owner_history,
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::List(vec![AttributeValue::EntityRef(id)]),
            AttributeValue::EntityRef(pset_id),
        ],
    );
    log::info!("Created {} with {} on {}", set_name, name, id);
    Ok(property_id)
}

fn add_single_value<S: ModelStore + ?Sized>(store: &mut S, name: &str, value: &str) -> EntityId {
    store.add_entity(
        IfcType::IfcPropertySingleValue,
        vec![
            AttributeValue::String(name.to_string()),
            AttributeValue::Null,
            label(value),
            AttributeValue::Null,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::PropertyValue;
    use crate::fixtures::{legacy, sample};
    use crate::projector::project_id;
    use ifc_edit_model::EntityResolver;

    #[test]
    fn test_rename_batch() {
        let mut doc = sample();
        let ids = [EntityId(42), EntityId(43)];
        assert!(update(&mut doc, &ids, "Name", "Foo"));
        for id in ids {
            assert_eq!(doc.get(id).unwrap().name(), Some("Foo"));
        }
        assert!(!update(&mut doc, &[], "Name", "Foo"));
    }

    #[test]
    fn test_wrapped_value_keeps_measure() {
        let mut doc = sample();
        assert!(update(&mut doc, &[EntityId(42)], "ThermalTransmittance", "0.3"));
        assert_eq!(
            doc.get(EntityId(74)).unwrap().get(2),
            Some(&AttributeValue::TypedValue(
                "IFCTHERMALTRANSMITTANCEMEASURE".into(),
                vec![AttributeValue::Float(0.3)]
            ))
        );

        // Unparseable input falls back to a label
        assert!(update(&mut doc, &[EntityId(42)], "IsExternal", "maybe"));
        assert_eq!(
            doc.get(EntityId(71)).unwrap().get(2),
            Some(&label("maybe"))
        );
    }

    #[test]
    fn test_bare_quantity_value() {
        let mut doc = sample();
        let report =
            update_with_report(&mut doc, &[EntityId(42)], "Qto_WallBaseQuantities.Length", "7.5")
                .unwrap();
        assert_eq!(report.updated, vec![EntityId(42)]);
        assert_eq!(doc.get(EntityId(81)).unwrap().get_float(3), Some(7.5));

        let report =
            update_with_report(&mut doc, &[EntityId(42)], "Length", "long").unwrap();
        assert!(!report.succeeded());
        assert!(matches!(
            report.failures[0].1,
            MutationError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_partial_batch() {
        let mut doc = sample();
        let report = update_with_report(
            &mut doc,
            &[EntityId(42), EntityId(46)],
            "FireRating",
            "F120",
        )
        .unwrap();
        assert!(report.succeeded());
        assert_eq!(report.updated, vec![EntityId(42)]);
        assert!(matches!(
            report.failures[0],
            (EntityId(46), MutationError::PropertyNotFound { .. })
        ));

        let bag = project_id(&doc, EntityId(42), &EngineOptions::default()).unwrap();
        assert_eq!(bag.cell("Pset_WallCommon.FireRating"), "F120");
    }

    #[test]
    fn test_create_property_is_idempotent() {
        let mut doc = sample();
        let options = EngineOptions::default();

        let first = create_property(&mut doc, EntityId(46), "Note", "hello", &options).unwrap();
        let count = doc.entity_count();
        let second = create_property(&mut doc, EntityId(46), "Note", "again", &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.entity_count(), count);

        create_property(&mut doc, EntityId(46), "Other", "x", &options).unwrap();
        assert_eq!(doc.entity_count(), count + 1);

        let bag = project_id(&doc, EntityId(46), &options).unwrap();
        assert_eq!(
            bag.get("Custom_Properties_IfcWall.Note"),
            Some(&PropertyValue::Text("again".into()))
        );
        assert_eq!(bag.cell("Custom_Properties_IfcWall.Other"), "x");
    }

    #[test]
    fn test_created_set_reuses_owner_history() {
        let mut doc = legacy();
        let property =
            create_property(&mut doc, EntityId(5), "Remark", "ok", &EngineOptions::default())
                .unwrap();
        let sets = property_sets(&doc, EntityId(5));
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "Custom_Properties_IfcWallStandardCase");
        assert_eq!(sets[0].entries[0].id, property);

        let pset = doc.get(sets[0].id).unwrap();
        assert_eq!(pset.get_ref(1), Some(EntityId(1)));
        assert_eq!(pset.global_id().map(str::len), Some(22));
    }
}
