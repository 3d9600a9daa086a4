// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Edit Parser - Editable STEP/IFC documents
//!
//! This crate reads IFC (STEP) files into a [`StepDocument`] that implements
//! the `ifc-edit-model` store traits, and writes the document back out.
//!
//! # Features
//!
//! - **Fast tokenization** using `nom` combinators
//! - **Lossless strings** - `\X2\` and friends decoded on read, re-encoded on write
//! - **SIMD-accelerated scanning** using `memchr`
//! - **Arc snapshots** - readers keep a stable view while the document is edited
//! - **Header preserved verbatim** on write
//!
//! # Example
//!
//! ```ignore
//! use ifc_edit_model::EntityResolver;
//!
//! let doc = ifc_edit_parser::open("model.ifc")?;
//! let walls = doc.find_by_type_name("IFCWALL");
//! println!("Found {} walls", walls.len());
//! ```

mod document;
mod scanner;
pub mod strings;
mod tokenizer;
mod writer;

pub use document::StepDocument;
pub use scanner::{parse_header, EntityScanner, RawInstance};
pub use tokenizer::{parse_entity, parse_record};

use ifc_edit_model::Result;
use std::path::Path;

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> Result<StepDocument> {
    StepDocument::parse(content)
}

/// Read and parse a file from disk
pub fn open(path: impl AsRef<Path>) -> Result<StepDocument> {
    StepDocument::open(path)
}
