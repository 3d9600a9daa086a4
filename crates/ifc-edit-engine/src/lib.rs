// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Edit Engine
//!
//! Entity resolution and property projection for IFC models. The engine reads
//! and writes through the [`ifc_edit_model`] traits and never owns entities.
//!
//! ## Overview
//!
//! - **Resolution**: [`resolve`] and the [`SelectionResolver`] state machine turn
//!   a raw token into an ordered [`Selection`]
//! - **Projection**: [`project`] flattens an element into a [`PropertyBag`]
//! - **Layers**: [`select_layer`] and [`layer_properties`] look one level deeper
//! - **Mutation**: [`update`] and [`create_property`] write values back
//! - **Export**: [`build_export`] merges bags into deterministic [`Table`]s
//! - **Persistence**: [`persist`] saves through a backup-first [`SaveTransaction`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_edit_engine::{Editor, EngineOptions, ExportKind, ExportMode};
//!
//! let doc = ifc_edit_parser::open("model.ifc")?;
//! let mut editor = Editor::new(doc, "model.ifc", EngineOptions::default());
//!
//! editor.select([ifc_edit_model::EntityId(42)]);
//! let bag = editor.project(ifc_edit_model::EntityId(42))?;
//! println!("{}", bag.cell("Name"));
//!
//! editor.update("Name", "Renamed wall")?;
//! editor.save()?;
//! ```

pub mod bag;
pub mod editor;
pub mod error;
pub mod export;
pub mod guid;
pub mod layers;
pub mod material;
pub mod mutator;
pub mod options;
pub mod persist;
pub mod placement;
pub mod projector;
pub mod psets;
pub mod resolver;
pub mod selection;

#[cfg(test)]
mod fixtures;

pub use bag::{PropertyBag, PropertyValue};
pub use editor::{Editor, ElementSummary};
pub use error::{
    EngineError, ExportError, MutationError, PersistenceError, ResolutionError, Result,
};
pub use export::{
    build_export, build_rows, comparison_table, merge_table, sanitize_filename, ExportKind,
    ExportMode, ExportOutcome, ExportRow, Table,
};
pub use layers::{layer_properties, layer_rows, select_layer};
pub use material::{Layer, LayerSet, LayerSetUsage, MaterialAssociation, MaterialInfo};
pub use mutator::{create_property, update, update_with_report, PropertySlot, UpdateReport};
pub use options::EngineOptions;
pub use persist::{persist, SaveReport, SaveTransaction};
pub use projector::{project, project_id};
pub use resolver::{
    resolve, Candidates, Resolution, ResolverEvent, ResolverState, SelectionResolver,
};
pub use selection::Selection;
