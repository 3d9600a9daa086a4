// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the editing engine

use ifc_edit_model::{EntityId, ModelError};
use std::path::PathBuf;
use thiserror::Error;

/// Engine result type
pub type Result<T> = std::result::Result<T, EngineError>;

/// Identifier resolution and layer lookup failures
///
/// All of these are recoverable: the caller shows the message and re-prompts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Empty identifier")]
    EmptyToken,

    #[error("No element found with ID {0}")]
    NoSuchId(String),

    #[error("No element types match '{0}'")]
    NoTypesMatch(String),

    #[error("Choice {choice} is out of range (1-{max})")]
    ChoiceOutOfRange { choice: usize, max: usize },

    #[error("'{0}' is not a number, ID or name from the list")]
    InvalidPick(String),

    #[error("Multiple elements found with name '{0}'. Use the number or ID to select")]
    AmbiguousName(String),

    #[error("Selection cancelled")]
    Cancelled,

    #[error("No elements picked")]
    NothingSelected,

    #[error("'{input}' is not accepted while {state}")]
    UnexpectedInput { input: String, state: String },

    #[error("Element {0} does not have layers")]
    NoLayers(EntityId),

    #[error("No layer at index {index} ({count} layers)")]
    LayerOutOfRange { index: usize, count: usize },
}

/// Property update and creation failures
#[derive(Error, Debug)]
pub enum MutationError {
    #[error("No elements selected")]
    EmptyBatch,

    #[error("Property name must not be empty")]
    EmptyName,

    #[error("Property '{property}' not found on {entity}")]
    PropertyNotFound { entity: EntityId, property: String },

    #[error("Property {property} has an unrecognized value representation ({ifc_type})")]
    UnrecognizedRepresentation { property: EntityId, ifc_type: String },

    #[error("'{value}' is not a valid value for {property}")]
    InvalidValue { property: EntityId, value: String },

    #[error(transparent)]
    Store(#[from] ModelError),
}

/// Two-phase save failures
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Backup could not be written; the canonical file was not touched
    #[error("Backup to {} failed: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    /// Backup written but does not look like a usable copy
    #[error("Backup at {} could not be verified", .0.display())]
    Verification(PathBuf),

    /// Canonical write failed after a good backup
    #[error("Saving {} failed, backup kept at {}: {source}", .path.display(), .backup.display())]
    Canonical {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("Commit requested before the backup was written")]
    NotBackedUp,
}

/// Export failures
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No elements selected to export")]
    EmptySelection,

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
