// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model store operations

use crate::EntityId;
use thiserror::Error;

/// Result type alias for model store operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by a model store
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Malformed STEP file: {0}")]
    InvalidFormat(String),

    #[error("Instance {0} could not be decoded: {1}")]
    EntityParse(EntityId, String),

    /// Lookup or write against an id the store does not hold
    #[error("No instance {0} in the model")]
    EntityNotFound(EntityId),

    /// Attribute index beyond the entity's attribute list
    #[error("Instance {entity} has no attribute {attribute}")]
    AttributeOutOfRange { entity: EntityId, attribute: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    pub fn format(msg: impl Into<String>) -> Self {
        ModelError::InvalidFormat(msg.into())
    }

    pub fn entity_parse(id: EntityId, msg: impl Into<String>) -> Self {
        ModelError::EntityParse(id, msg.into())
    }
}
