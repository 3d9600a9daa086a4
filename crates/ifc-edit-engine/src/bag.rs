// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flattened property view of one element
//!
//! A [`PropertyBag`] is an insertion-ordered map with unique keys. Re-inserting
//! an existing key replaces the value in place, so the first insertion fixes
//! the column position used by displays and exports.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A projected value, renderable as a single table cell
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<PropertyValue>),
    Map(PropertyBag),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Real(f) => Some(*f),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropertyBag> {
        match self {
            PropertyValue::Map(bag) => Some(bag),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => Ok(()),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Text(s) => f.write_str(s),
            // Reals render as JSON at every depth
            PropertyValue::Real(_) | PropertyValue::List(_) | PropertyValue::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Null => serializer.serialize_none(),
            PropertyValue::Bool(b) => serializer.serialize_bool(*b),
            PropertyValue::Integer(i) => serializer.serialize_i64(*i),
            PropertyValue::Real(r) => serializer.serialize_f64(*r),
            PropertyValue::Text(s) => serializer.serialize_str(s),
            PropertyValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            PropertyValue::Map(bag) => bag.serialize(serializer),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<usize> for PropertyValue {
    fn from(i: usize) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Real(f)
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(items: Vec<PropertyValue>) -> Self {
        PropertyValue::List(items)
    }
}

impl From<PropertyBag> for PropertyValue {
    fn from(bag: PropertyBag) -> Self {
        PropertyValue::Map(bag)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Ordered key/value view with unique keys
///
/// Equality compares entries in order.
#[derive(Clone, Debug, Default)]
pub struct PropertyBag {
    entries: IndexMap<String, PropertyValue>,
}

impl PartialEq for PropertyBag {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.iter().eq(other.iter())
    }
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one
    ///
    /// A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Rendered cell for `key`, empty when the key is absent
    pub fn cell(&self, key: &str) -> String {
        self.get(key).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert every entry of `other` in its order
    pub fn extend_from(&mut self, other: &PropertyBag) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (key, value) in iter {
            bag.insert(key, value);
        }
        bag
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinsert_keeps_position() {
        let mut bag = PropertyBag::new();
        bag.insert("Name", "Wall");
        bag.insert("Pset_WallCommon.FireRating", "F30");
        bag.insert("Type", "IfcWall");

        let previous = bag.insert("Pset_WallCommon.FireRating", "F90");

        assert_eq!(previous, Some(PropertyValue::from("F30")));
        assert_eq!(
            bag.keys().collect::<Vec<_>>(),
            vec!["Name", "Pset_WallCommon.FireRating", "Type"]
        );
        assert_eq!(bag.cell("Pset_WallCommon.FireRating"), "F90");
        assert_eq!(bag.cell("Missing"), "");
    }

    #[test]
    fn test_cells_render_nested_values_as_json() {
        let layer: PropertyBag = [
            ("Position", PropertyValue::from(1usize)),
            ("Material", PropertyValue::from("Concrete")),
            ("IsVentilated", PropertyValue::from("N/A")),
        ]
        .into_iter()
        .collect();

        let value = PropertyValue::List(vec![layer.into()]);
        assert_eq!(
            value.to_string(),
            r#"[{"Position":1,"Material":"Concrete","IsVentilated":"N/A"}]"#
        );
        assert_eq!(PropertyValue::Null.to_string(), "");
        assert_eq!(PropertyValue::Real(0.25).to_string(), "0.25");
    }

    #[test]
    fn test_reals_render_alike_at_any_depth() {
        let area = PropertyValue::Real(10.0);
        let nested: PropertyBag = [("Area", area.clone())].into_iter().collect();

        assert_eq!(area.to_string(), "10.0");
        assert_eq!(PropertyValue::from(nested).to_string(), r#"{"Area":10.0}"#);
        assert_eq!(PropertyValue::List(vec![area]).to_string(), "[10.0]");
        assert_eq!(PropertyValue::from(None::<String>), PropertyValue::Null);
    }
}
