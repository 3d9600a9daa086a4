// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editable in-memory STEP document
//!
//! Every instance of the DATA section is decoded eagerly into a shared
//! [`DecodedEntity`]. Lookups hand out `Arc` snapshots; writes go through
//! `Arc::make_mut`, so a snapshot taken before a write never changes under
//! its holder.
//!
//! Instances the tokenizer cannot decode, such as complex (multi-leaf)
//! instances, are kept as raw text. They are invisible to lookups and are
//! written back unchanged.

use crate::scanner::{data_offset, parse_header, EntityScanner};
use crate::tokenizer::parse_entity;
use crate::writer::{write_document, Instance};
use ifc_edit_model::{
    AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType, ModelError,
    ModelMetadata, ModelStore, Result,
};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// A parsed, mutable STEP/IFC file
pub struct StepDocument {
    /// Header text up to and including `DATA;`, written back verbatim
    header: String,
    metadata: ModelMetadata,
    entities: FxHashMap<u32, Arc<DecodedEntity>>,
    /// Undecodable instances, verbatim `#id=...;` text
    verbatim: FxHashMap<u32, String>,
    /// Instance order as found in the file, new instances appended
    order: Vec<EntityId>,
    type_index: FxHashMap<IfcType, Vec<EntityId>>,
    next_id: u32,
}

impl StepDocument {
    /// Parse a document from STEP text
    pub fn parse(content: &str) -> Result<Self> {
        if !content.trim_start().starts_with("ISO-10303-21") {
            return Err(ModelError::format("missing ISO-10303-21 preamble"));
        }
        let data_start =
            data_offset(content).ok_or_else(|| ModelError::format("missing DATA section"))?;

        let header = content[..data_start].to_string();
        let metadata = parse_header(&header);

        let mut doc = Self {
            header,
            metadata,
            entities: FxHashMap::default(),
            verbatim: FxHashMap::default(),
            order: Vec::new(),
            type_index: FxHashMap::default(),
            next_id: 1,
        };

        for raw in EntityScanner::new(content) {
            let text = &content[raw.span.clone()];
            match parse_entity(text) {
                Ok(entity) => doc.insert(entity),
                Err(msg) => {
                    let err = ModelError::entity_parse(EntityId(raw.id), msg);
                    log::warn!("{}; keeping it verbatim", err);
                    doc.insert_verbatim(EntityId(raw.id), text);
                }
            }
        }

        log::debug!(
            "Parsed {} entities, {} kept verbatim ({} schema)",
            doc.entities.len(),
            doc.verbatim.len(),
            doc.metadata.schema_version
        );

        Ok(doc)
    }

    /// Read and parse a document from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::info!("Loading {}", path.display());
        Self::parse(&content)
    }

    /// Serialize the document back to STEP text
    pub fn to_step_string(&self) -> String {
        write_document(
            &self.header,
            self.order.iter().filter_map(|id| {
                if let Some(entity) = self.entities.get(&id.0) {
                    return Some(Instance::Decoded(entity.as_ref()));
                }
                self.verbatim.get(&id.0).map(|text| Instance::Verbatim(text.as_str()))
            }),
        )
    }

    /// Number of instances kept as raw text
    pub fn verbatim_count(&self) -> usize {
        self.verbatim.len()
    }

    fn insert(&mut self, entity: DecodedEntity) {
        let id = entity.id;
        let ifc_type = entity.ifc_type.clone();
        let replaced_raw = self.verbatim.remove(&id.0).is_some();
        if self.entities.insert(id.0, Arc::new(entity)).is_some() || replaced_raw {
            log::warn!("Duplicate instance {}, keeping the last definition", id);
            for ids in self.type_index.values_mut() {
                ids.retain(|existing| *existing != id);
            }
        } else {
            self.order.push(id);
        }
        self.type_index.entry(ifc_type).or_default().push(id);
        self.next_id = self.next_id.max(id.0 + 1);
    }

    fn insert_verbatim(&mut self, id: EntityId, text: &str) {
        let replaced = self.entities.remove(&id.0).is_some();
        if self.verbatim.insert(id.0, text.to_string()).is_some() || replaced {
            log::warn!("Duplicate instance {}, keeping the last definition", id);
            for ids in self.type_index.values_mut() {
                ids.retain(|existing| *existing != id);
            }
        } else {
            self.order.push(id);
        }
        self.next_id = self.next_id.max(id.0 + 1);
    }
}

impl EntityResolver for StepDocument {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.entities.get(&id.0).cloned()
    }

    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>> {
        self.type_index
            .get(ifc_type)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    fn all_ids(&self) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.entities.contains_key(&id.0))
            .collect()
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl ModelStore for StepDocument {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn set_attribute(&mut self, id: EntityId, index: usize, value: AttributeValue) -> Result<()> {
        let entity = self
            .entities
            .get_mut(&id.0)
            .ok_or(ModelError::EntityNotFound(id))?;
        let entity = Arc::make_mut(entity);
        let slot = entity
            .attributes
            .get_mut(index)
            .ok_or(ModelError::AttributeOutOfRange {
                entity: id,
                attribute: index,
            })?;
        *slot = value;
        Ok(())
    }

    fn add_entity(&mut self, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> EntityId {
        let id = EntityId(self.next_id);
        log::trace!("Creating {} as {}", ifc_type, id);
        self.insert(DecodedEntity::new(id, ifc_type, attributes));
        id
    }

    fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_step_string())?;
        log::debug!("Wrote {} instances to {}", self.order.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEST_IFC: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('walls.ifc','2024-01-01T00:00:00',(''),(''),'','Editor','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCWALL('0aBcDeFgHiJkLmNoPqRsTu',$,'Wall A',$,$,$,$,$,$);
#2=IFCWALL('1aBcDeFgHiJkLmNoPqRsTu',$,'Wall B',$,$,$,$,$,$);
#5=IFCSLAB('2aBcDeFgHiJkLmNoPqRsTu',$,'Floor',$,$,$,$,$,$);
#7=IFCPROPERTYSINGLEVALUE('Note',$,IFCTEXT('don''t touch'),$);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn test_parse_indexes_types() {
        let doc = StepDocument::parse(TEST_IFC).unwrap();
        assert_eq!(doc.entity_count(), 4);
        assert_eq!(doc.count_by_type(&IfcType::IfcWall), 2);
        assert_eq!(doc.find_by_type_name("ifcslab").len(), 1);
        assert_eq!(doc.metadata().schema_version, "IFC4");
        assert_eq!(
            doc.type_names(),
            vec!["IfcPropertySingleValue", "IfcSlab", "IfcWall"]
        );
    }

    #[test]
    fn test_rejects_non_step_content() {
        assert!(matches!(
            StepDocument::parse("hello world"),
            Err(ModelError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_complex_instance_is_kept_verbatim() {
        let complex = "#9=(IFCNAMEDUNIT(*,.LENGTHUNIT.)IFCSIUNIT());";
        let content = TEST_IFC.replace("ENDSEC;\nEND", &format!("{}\nENDSEC;\nEND", complex));
        let doc = StepDocument::parse(&content).unwrap();

        assert_eq!(doc.entity_count(), 4);
        assert_eq!(doc.verbatim_count(), 1);
        assert!(doc.get(EntityId(9)).is_none());
        assert!(!doc.all_ids().contains(&EntityId(9)));
        assert_eq!(doc.get(EntityId(1)).unwrap().name(), Some("Wall A"));

        let written = doc.to_step_string();
        assert!(written.contains(&format!("{}\nENDSEC;", complex)));
    }

    #[test]
    fn test_new_ids_skip_verbatim_instances() {
        let content = TEST_IFC.replace(
            "ENDSEC;\nEND",
            "#20=(IFCNAMEDUNIT(*,.LENGTHUNIT.)IFCSIUNIT());\nENDSEC;\nEND",
        );
        let mut doc = StepDocument::parse(&content).unwrap();
        let id = doc.add_entity(IfcType::IfcPropertySet, vec![AttributeValue::Null]);
        assert_eq!(id, EntityId(21));
    }

    #[test]
    fn test_snapshots_survive_writes() {
        let mut doc = StepDocument::parse(TEST_IFC).unwrap();
        let before = doc.get(EntityId(1)).unwrap();

        doc.set_attribute(EntityId(1), 2, AttributeValue::String("Renamed".into()))
            .unwrap();

        assert_eq!(before.name(), Some("Wall A"));
        assert_eq!(doc.get(EntityId(1)).unwrap().name(), Some("Renamed"));
    }

    #[test]
    fn test_set_attribute_out_of_range() {
        let mut doc = StepDocument::parse(TEST_IFC).unwrap();
        let err = doc
            .set_attribute(EntityId(7), 9, AttributeValue::Null)
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::AttributeOutOfRange { attribute: 9, .. }
        ));
        assert!(doc.set_attribute(EntityId(99), 0, AttributeValue::Null).is_err());
    }

    #[test]
    fn test_add_entity_allocates_after_highest_id() {
        let mut doc = StepDocument::parse(TEST_IFC).unwrap();
        let id = doc.add_entity(
            IfcType::IfcPropertySet,
            vec![AttributeValue::String("x".into())],
        );
        assert_eq!(id, EntityId(8));
        assert_eq!(doc.all_ids().last(), Some(&id));
        assert_eq!(doc.count_by_type(&IfcType::IfcPropertySet), 1);
    }

    #[test]
    fn test_write_and_reload() {
        let mut doc = StepDocument::parse(TEST_IFC).unwrap();
        doc.set_attribute(EntityId(2), 2, AttributeValue::String("O'Brien".into()))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ifc");
        doc.write(&path).unwrap();

        let reloaded = StepDocument::open(&path).unwrap();
        assert_eq!(reloaded.get(EntityId(2)).unwrap().name(), Some("O'Brien"));
        assert_eq!(
            reloaded.get(EntityId(7)).unwrap().get_string(2),
            Some("don't touch")
        );
        assert_eq!(reloaded.all_ids(), doc.all_ids());
        assert_eq!(reloaded.metadata().file_name.as_deref(), Some("walls.ifc"));
    }
}
