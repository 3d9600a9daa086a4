// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Edit Model - Entity types and model store traits
//!
//! This crate provides the abstractions the editing engine consumes. The engine
//! never owns entities; it reads and writes them through the traits defined
//! here, so any document backend can sit underneath it.
//!
//! # Architecture
//!
//! - [`EntityResolver`] - Read access: lookup by id, by type, inverse relations
//! - [`ModelStore`] - Write access: attribute updates, new entities, persistence
//! - [`DecodedEntity`] / [`AttributeValue`] - The attribute-level entity view
//!
//! # Example
//!
//! ```ignore
//! use ifc_edit_model::{EntityId, EntityResolver};
//!
//! fn describe(store: &dyn EntityResolver, id: u32) {
//!     if let Some(entity) = store.get(EntityId(id)) {
//!         println!("{} is a {}", entity.id, entity.ifc_type);
//!     }
//! }
//! ```

pub mod error;
pub mod store;
pub mod types;

pub use error::*;
pub use store::*;
pub use types::*;
