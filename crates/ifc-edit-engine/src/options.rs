// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration

/// Settings shared by the resolver, projector, mutator and save path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Appended to the canonical path to name the backup copy
    pub backup_suffix: String,
    /// Prefix of the property set created by `create_property`, followed by the type name
    pub custom_pset_prefix: String,
    /// Skip the confirmation step when exactly one type matches
    pub auto_confirm_single_type: bool,
    /// Also project property sets inherited from the element's type object
    pub include_type_properties: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            backup_suffix: ".bak".to_string(),
            custom_pset_prefix: "Custom_Properties_".to_string(),
            auto_confirm_single_type: false,
            include_type_properties: true,
        }
    }
}

impl EngineOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backup suffix
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    /// Set the custom property set prefix
    pub fn with_custom_pset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_pset_prefix = prefix.into();
        self
    }

    /// Set whether a single matching type is accepted without confirmation
    pub fn with_auto_confirm(mut self, enabled: bool) -> Self {
        self.auto_confirm_single_type = enabled;
        self
    }

    /// Set whether type-level property sets are projected
    pub fn with_type_properties(mut self, enabled: bool) -> Self {
        self.include_type_properties = enabled;
        self
    }

    /// Name of the property set `create_property` writes into for a type
    pub fn custom_pset_name(&self, type_name: &str) -> String {
        format!("{}{}", self.custom_pset_prefix, type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_builder() {
        let defaults = EngineOptions::new();
        assert_eq!(defaults.backup_suffix, ".bak");
        assert!(defaults.include_type_properties);
        assert!(!defaults.auto_confirm_single_type);
        assert_eq!(defaults.custom_pset_name("IfcWall"), "Custom_Properties_IfcWall");

        let custom = EngineOptions::new()
            .with_backup_suffix(".orig")
            .with_custom_pset_prefix("Extra_")
            .with_auto_confirm(true)
            .with_type_properties(false);
        assert_eq!(custom.backup_suffix, ".orig");
        assert_eq!(custom.custom_pset_name("IfcSlab"), "Extra_IfcSlab");
        assert!(custom.auto_confirm_single_type);
        assert!(!custom.include_type_properties);
    }
}
