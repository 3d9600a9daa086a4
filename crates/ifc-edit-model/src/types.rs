// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for IFC data representation
//!
//! This module defines the fundamental types shared by the store and the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe entity identifier
///
/// Wraps the raw STEP instance number (e.g., #123 becomes EntityId(123))
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declares the known schema classes once and derives the
/// keyword parser and both name renderings from the same table.
macro_rules! ifc_types {
    ($($variant:ident => $step:literal),* $(,)?) => {
        /// IFC entity type enumeration
        ///
        /// Covers the schema classes the engine reasons about. Anything else is
        /// kept as [`IfcType::Unknown`] with its upper-cased STEP keyword, so the
        /// open schema hierarchy still round-trips.
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum IfcType {
            $($variant,)*
            /// Unknown type - stores the upper-cased STEP keyword
            Unknown(String),
        }

        impl IfcType {
            /// Parse a type name (STEP keyword or schema spelling, any case)
            pub fn parse(s: &str) -> Self {
                let upper = s.trim().to_ascii_uppercase();
                match upper.as_str() {
                    $($step => IfcType::$variant,)*
                    _ => IfcType::Unknown(upper),
                }
            }

            /// Schema spelling of the type (e.g. `IfcWallStandardCase`)
            pub fn name(&self) -> &str {
                match self {
                    $(IfcType::$variant => stringify!($variant),)*
                    IfcType::Unknown(s) => s,
                }
            }

            /// STEP keyword of the type (e.g. `IFCWALLSTANDARDCASE`)
            pub fn step_name(&self) -> &str {
                match self {
                    $(IfcType::$variant => $step,)*
                    IfcType::Unknown(s) => s,
                }
            }
        }
    };
}

ifc_types! {
    // Spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",

    // Building elements
    IfcWall => "IFCWALL",
    IfcWallStandardCase => "IFCWALLSTANDARDCASE",
    IfcWallElementedCase => "IFCWALLELEMENTEDCASE",
    IfcCurtainWall => "IFCCURTAINWALL",
    IfcSlab => "IFCSLAB",
    IfcSlabStandardCase => "IFCSLABSTANDARDCASE",
    IfcSlabElementedCase => "IFCSLABELEMENTEDCASE",
    IfcRoof => "IFCROOF",
    IfcBeam => "IFCBEAM",
    IfcColumn => "IFCCOLUMN",
    IfcDoor => "IFCDOOR",
    IfcWindow => "IFCWINDOW",
    IfcStair => "IFCSTAIR",
    IfcStairFlight => "IFCSTAIRFLIGHT",
    IfcRamp => "IFCRAMP",
    IfcRampFlight => "IFCRAMPFLIGHT",
    IfcRailing => "IFCRAILING",
    IfcCovering => "IFCCOVERING",
    IfcPlate => "IFCPLATE",
    IfcMember => "IFCMEMBER",
    IfcFooting => "IFCFOOTING",
    IfcPile => "IFCPILE",
    IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
    IfcFurnishingElement => "IFCFURNISHINGELEMENT",
    IfcFurniture => "IFCFURNITURE",
    IfcDistributionElement => "IFCDISTRIBUTIONELEMENT",
    IfcFlowTerminal => "IFCFLOWTERMINAL",
    IfcFlowSegment => "IFCFLOWSEGMENT",
    IfcFlowFitting => "IFCFLOWFITTING",
    IfcOpeningElement => "IFCOPENINGELEMENT",
    IfcAnnotation => "IFCANNOTATION",
    IfcGrid => "IFCGRID",

    // Type objects
    IfcTypeObject => "IFCTYPEOBJECT",
    IfcWallType => "IFCWALLTYPE",
    IfcSlabType => "IFCSLABTYPE",
    IfcBeamType => "IFCBEAMTYPE",
    IfcColumnType => "IFCCOLUMNTYPE",
    IfcDoorType => "IFCDOORTYPE",
    IfcDoorStyle => "IFCDOORSTYLE",
    IfcWindowType => "IFCWINDOWTYPE",
    IfcWindowStyle => "IFCWINDOWSTYLE",
    IfcCoveringType => "IFCCOVERINGTYPE",
    IfcMemberType => "IFCMEMBERTYPE",
    IfcPlateType => "IFCPLATETYPE",
    IfcRailingType => "IFCRAILINGTYPE",
    IfcBuildingElementProxyType => "IFCBUILDINGELEMENTPROXYTYPE",
    IfcFurnitureType => "IFCFURNITURETYPE",

    // Relationships
    IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
    IfcRelDefinesByType => "IFCRELDEFINESBYTYPE",
    IfcRelAssociatesMaterial => "IFCRELASSOCIATESMATERIAL",
    IfcRelAggregates => "IFCRELAGGREGATES",
    IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",

    // Properties and quantities
    IfcPropertySet => "IFCPROPERTYSET",
    IfcElementQuantity => "IFCELEMENTQUANTITY",
    IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
    IfcPropertyEnumeratedValue => "IFCPROPERTYENUMERATEDVALUE",
    IfcPropertyBoundedValue => "IFCPROPERTYBOUNDEDVALUE",
    IfcPropertyListValue => "IFCPROPERTYLISTVALUE",
    IfcQuantityLength => "IFCQUANTITYLENGTH",
    IfcQuantityArea => "IFCQUANTITYAREA",
    IfcQuantityVolume => "IFCQUANTITYVOLUME",
    IfcQuantityCount => "IFCQUANTITYCOUNT",
    IfcQuantityWeight => "IFCQUANTITYWEIGHT",
    IfcQuantityTime => "IFCQUANTITYTIME",

    // Materials
    IfcMaterial => "IFCMATERIAL",
    IfcMaterialList => "IFCMATERIALLIST",
    IfcMaterialLayer => "IFCMATERIALLAYER",
    IfcMaterialLayerSet => "IFCMATERIALLAYERSET",
    IfcMaterialLayerSetUsage => "IFCMATERIALLAYERSETUSAGE",
    IfcMaterialProperties => "IFCMATERIALPROPERTIES",
    IfcExtendedMaterialProperties => "IFCEXTENDEDMATERIALPROPERTIES",

    // Placement
    IfcLocalPlacement => "IFCLOCALPLACEMENT",
    IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
    IfcAxis2Placement2D => "IFCAXIS2PLACEMENT2D",
    IfcCartesianPoint => "IFCCARTESIANPOINT",
    IfcDirection => "IFCDIRECTION",

    // Units and bookkeeping
    IfcUnitAssignment => "IFCUNITASSIGNMENT",
    IfcSIUnit => "IFCSIUNIT",
    IfcOwnerHistory => "IFCOWNERHISTORY",
}

impl IfcType {
    /// Wall and its schema subtypes
    pub fn is_wall_like(&self) -> bool {
        matches!(
            self,
            IfcType::IfcWall | IfcType::IfcWallStandardCase | IfcType::IfcWallElementedCase
        )
    }

    /// Slab and its schema subtypes
    pub fn is_slab_like(&self) -> bool {
        matches!(
            self,
            IfcType::IfcSlab | IfcType::IfcSlabStandardCase | IfcType::IfcSlabElementedCase
        )
    }

    /// Check if this type is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            IfcType::IfcSite | IfcType::IfcBuilding | IfcType::IfcBuildingStorey | IfcType::IfcSpace
        )
    }

    /// Check if this type is a placeable product (has an ObjectPlacement slot)
    pub fn is_product(&self) -> bool {
        self.is_spatial()
            || matches!(
                self,
                IfcType::IfcWall
                    | IfcType::IfcWallStandardCase
                    | IfcType::IfcWallElementedCase
                    | IfcType::IfcCurtainWall
                    | IfcType::IfcSlab
                    | IfcType::IfcSlabStandardCase
                    | IfcType::IfcSlabElementedCase
                    | IfcType::IfcRoof
                    | IfcType::IfcBeam
                    | IfcType::IfcColumn
                    | IfcType::IfcDoor
                    | IfcType::IfcWindow
                    | IfcType::IfcStair
                    | IfcType::IfcStairFlight
                    | IfcType::IfcRamp
                    | IfcType::IfcRampFlight
                    | IfcType::IfcRailing
                    | IfcType::IfcCovering
                    | IfcType::IfcPlate
                    | IfcType::IfcMember
                    | IfcType::IfcFooting
                    | IfcType::IfcPile
                    | IfcType::IfcBuildingElementProxy
                    | IfcType::IfcFurnishingElement
                    | IfcType::IfcFurniture
                    | IfcType::IfcDistributionElement
                    | IfcType::IfcFlowTerminal
                    | IfcType::IfcFlowSegment
                    | IfcType::IfcFlowFitting
                    | IfcType::IfcOpeningElement
                    | IfcType::IfcAnnotation
                    | IfcType::IfcGrid
            )
    }
}

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in an IFC entity's attribute list.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(EntityId),
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value (STEP quote escaping already removed)
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value like IFCLABEL('text')
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_string(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_float(),
            _ => None,
        }
    }

    /// Try to get as boolean (.T./.F. enumerations included)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_bool(),
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Whether this value is `target` or a list containing it
    pub fn references(&self, target: EntityId) -> bool {
        match self {
            AttributeValue::EntityRef(id) => *id == target,
            AttributeValue::List(items) => items.iter().any(|v| v.references(target)),
            _ => false,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Decoded IFC entity
///
/// Represents a fully decoded IFC entity with its ID, type, and attribute values.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedEntity {
    /// Entity ID
    pub id: EntityId,
    /// Entity type
    pub ifc_type: IfcType,
    /// Attribute values in order
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Create a new entity
    pub fn new(id: EntityId, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            ifc_type,
            attributes,
        }
    }

    /// Whether the schema version in use defines an attribute slot at `index`
    pub fn has_attribute(&self, index: usize) -> bool {
        index < self.attributes.len()
    }

    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference at index
    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get string at index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Get float at index
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// Get list at index
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Get enum string at index
    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    /// `GlobalId` of a rooted entity
    pub fn global_id(&self) -> Option<&str> {
        self.get_string(0)
    }

    /// `Name` of a rooted entity
    pub fn name(&self) -> Option<&str> {
        self.get_string(2)
    }
}

/// Model metadata extracted from the file header
#[derive(Clone, Debug, Default)]
pub struct ModelMetadata {
    /// IFC schema version (e.g., "IFC2X3", "IFC4", "IFC4X3")
    pub schema_version: String,
    /// Originating system (CAD application)
    pub originating_system: Option<String>,
    /// File name from header
    pub file_name: Option<String>,
    /// Timestamp
    pub timestamp: Option<String>,
}

impl ModelMetadata {
    /// Whether the file uses the IFC2X3 schema
    pub fn is_ifc2x3(&self) -> bool {
        self.schema_version.eq_ignore_ascii_case("IFC2X3")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_types() {
        assert_eq!(IfcType::parse("IFCWALL"), IfcType::IfcWall);
        assert_eq!(IfcType::parse("IfcWallStandardCase"), IfcType::IfcWallStandardCase);
        assert_eq!(
            IfcType::parse("IfcFlowController"),
            IfcType::Unknown("IFCFLOWCONTROLLER".to_string())
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(IfcType::IfcSlab.name(), "IfcSlab");
        assert_eq!(IfcType::IfcSlab.step_name(), "IFCSLAB");
        assert_eq!(IfcType::parse("ifcfoo").name(), "IFCFOO");
        assert_eq!(IfcType::IfcRelAssociatesMaterial.to_string(), "IfcRelAssociatesMaterial");
    }

    #[test]
    fn test_type_families() {
        assert!(IfcType::IfcWallStandardCase.is_wall_like());
        assert!(IfcType::IfcSlabElementedCase.is_slab_like());
        assert!(!IfcType::IfcBeam.is_wall_like());
        assert!(IfcType::IfcDoor.is_product());
        assert!(IfcType::IfcBuildingStorey.is_product());
        assert!(!IfcType::IfcPropertySet.is_product());
    }

    #[test]
    fn test_attribute_helpers() {
        let label = AttributeValue::TypedValue(
            "IFCBOOLEAN".to_string(),
            vec![AttributeValue::Enum("T".to_string())],
        );
        assert_eq!(label.as_bool(), Some(true));

        let refs = AttributeValue::List(vec![
            AttributeValue::EntityRef(EntityId(3)),
            AttributeValue::Null,
            AttributeValue::EntityRef(EntityId(9)),
        ]);
        assert!(refs.references(EntityId(9)));
        assert!(!refs.references(EntityId(4)));
    }

    #[test]
    fn test_entity_accessors() {
        let wall = DecodedEntity::new(
            EntityId(10),
            IfcType::IfcWall,
            vec![
                AttributeValue::String("2O2Fr$t4X7Zf8NOew3FLOH".to_string()),
                AttributeValue::Null,
                AttributeValue::String("Wall 1".to_string()),
            ],
        );
        assert_eq!(wall.global_id(), Some("2O2Fr$t4X7Zf8NOew3FLOH"));
        assert_eq!(wall.name(), Some("Wall 1"));
        assert!(wall.has_attribute(2));
        assert!(!wall.has_attribute(3));
        assert_eq!(wall.get_ref(7), None);
    }
}
