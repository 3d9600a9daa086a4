// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tabular export
//!
//! Rows are sorted by `(Name, GlobalId, Type)` before anything is built, so
//! output never depends on selection order. Columns are the first-seen union
//! of every bag's keys; missing cells are empty.

use crate::bag::PropertyBag;
use crate::error::ExportError;
use crate::layers::layer_rows;
use crate::options::EngineOptions;
use crate::projector::project;
use ifc_edit_model::{EntityId, EntityResolver};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One element ready for export
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRow {
    pub id: EntityId,
    pub name: Option<String>,
    pub global_id: Option<String>,
    pub ifc_type: String,
    pub properties: PropertyBag,
    /// Layer bags, each carrying its `Layer Number`
    pub layers: Vec<PropertyBag>,
}

/// One table per element or one table per kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportMode {
    Separate,
    Collective,
}

/// What to export
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Properties,
    Layers,
    Both,
}

impl ExportKind {
    fn properties(self) -> bool {
        matches!(self, ExportKind::Properties | ExportKind::Both)
    }

    fn layers(self) -> bool {
        matches!(self, ExportKind::Layers | ExportKind::Both)
    }
}

/// A rectangular table of string cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// `{name}.csv`
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }

    /// RFC 4180 rendering: header record, CRLF line endings
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_record(&mut out, &self.columns);
        for row in &self.rows {
            push_record(&mut out, row);
        }
        out
    }

    /// Write `{dir}/{name}.csv`
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(self.file_name());
        fs::write(&path, self.to_csv()).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Exported {} rows to {}", self.rows.len(), path.display());
        Ok(path)
    }
}

fn push_record(out: &mut String, cells: &[String]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if cell.contains([',', '"', '\r', '\n']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}

/// Tables produced by [`build_export`] plus anything that was skipped
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportOutcome {
    pub tables: Vec<Table>,
    pub diagnostics: Vec<String>,
}

impl ExportOutcome {
    /// Write every table into `dir`
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        self.tables.iter().map(|table| table.write_csv(dir)).collect()
    }
}

/// Project every id into an export row
pub fn build_rows<S: EntityResolver + ?Sized>(
    store: &S,
    ids: &[EntityId],
    options: &EngineOptions,
) -> Vec<ExportRow> {
    ids.iter()
        .filter_map(|&id| {
            let Some(entity) = store.get(id) else {
                log::warn!("Skipping missing element {}", id);
                return None;
            };
            Some(ExportRow {
                id,
                name: entity.name().map(str::to_string),
                global_id: entity.global_id().map(str::to_string),
                ifc_type: entity.ifc_type.name().to_string(),
                properties: project(store, &entity, options),
                layers: layer_rows(store, id),
            })
        })
        .collect()
}

/// Canonical order: Name, GlobalId, Type, then id
pub fn sort_rows(rows: &mut [ExportRow]) {
    rows.sort_by(|a, b| {
        let key = |row: &ExportRow| {
            (
                row.name.clone().unwrap_or_default(),
                row.global_id.clone().unwrap_or_default(),
                row.ifc_type.clone(),
                row.id,
            )
        };
        key(a).cmp(&key(b))
    });
}

/// Merge bags of different shapes into one table
pub fn merge_table<'a>(
    name: impl Into<String>,
    bags: impl IntoIterator<Item = &'a PropertyBag>,
) -> Table {
    let bags: Vec<_> = bags.into_iter().collect();
    let mut seen = FxHashSet::default();
    let columns: Vec<String> = bags
        .iter()
        .flat_map(|bag| bag.keys())
        .filter(|key| seen.insert(*key))
        .map(str::to_string)
        .collect();
    let rows = bags
        .iter()
        .map(|bag| columns.iter().map(|column| bag.cell(column)).collect())
        .collect();

    Table {
        name: name.into(),
        columns,
        rows,
    }
}

/// Strip characters that are unsafe in file names; spaces become `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

fn identity(row: &ExportRow) -> PropertyBag {
    let mut bag = PropertyBag::new();
    bag.insert("Element Name", row.name.as_deref());
    bag.insert("Element GlobalId", row.global_id.as_deref());
    bag.insert("Element Type", row.ifc_type.as_str());
    bag
}

fn base_name(row: &ExportRow) -> String {
    format!(
        "{}_{}",
        sanitize_filename(row.name.as_deref().unwrap_or("Unnamed")),
        row.global_id.as_deref().unwrap_or(&row.id.0.to_string())
    )
}

/// Build export tables from rows
pub fn build_export(
    mut rows: Vec<ExportRow>,
    mode: ExportMode,
    kind: ExportKind,
) -> Result<ExportOutcome, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    sort_rows(&mut rows);

    let mut outcome = ExportOutcome::default();
    if kind.layers() {
        for row in rows.iter().filter(|row| row.layers.is_empty()) {
            outcome.diagnostics.push(format!(
                "{} ({}) has no material layers",
                row.name.as_deref().unwrap_or("Unnamed"),
                row.id
            ));
        }
    }

    match mode {
        ExportMode::Separate => {
            for row in &rows {
                if kind.properties() {
                    let name = format!("{}_properties", base_name(row));
                    outcome.tables.push(merge_table(name, [&row.properties]));
                }
                if kind.layers() && !row.layers.is_empty() {
                    let name = format!("{}_layers", base_name(row));
                    outcome.tables.push(merge_table(name, &row.layers));
                }
            }
        }
        ExportMode::Collective => {
            if kind.properties() {
                let bags: Vec<_> = rows
                    .iter()
                    .map(|row| {
                        let mut bag = identity(row);
                        bag.extend_from(&row.properties);
                        bag
                    })
                    .collect();
                outcome.tables.push(merge_table("collective_properties", &bags));
            }
            if kind.layers() {
                let bags: Vec<_> = rows
                    .iter()
                    .flat_map(|row| {
                        row.layers.iter().map(move |layer| {
                            let mut bag = identity(row);
                            bag.extend_from(layer);
                            bag
                        })
                    })
                    .collect();
                if !bags.is_empty() {
                    outcome.tables.push(merge_table("collective_layers", &bags));
                }
            }
        }
    }

    log::debug!(
        "Built {} table(s) from {} row(s)",
        outcome.tables.len(),
        rows.len()
    );
    Ok(outcome)
}

/// Side-by-side view: one row per property key, one column per element
pub fn comparison_table(rows: &[ExportRow]) -> Table {
    let mut seen = FxHashSet::default();
    let keys: Vec<&str> = rows
        .iter()
        .flat_map(|row| row.properties.keys())
        .filter(|key| seen.insert(*key))
        .collect();

    let mut columns = vec!["Property".to_string()];
    columns.extend(
        rows.iter()
            .map(|row| format!("{} (ID: {})", row.ifc_type, row.id.0)),
    );

    let table_rows = keys
        .iter()
        .map(|key| {
            let mut cells = vec![key.to_string()];
            cells.extend(rows.iter().map(|row| row.properties.cell(key)));
            cells
        })
        .collect();

    Table {
        name: "comparison".to_string(),
        columns,
        rows: table_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample;
    use pretty_assertions::assert_eq;

    fn row(id: u32, name: &str, props: &[(&str, &str)]) -> ExportRow {
        ExportRow {
            id: EntityId(id),
            name: Some(name.to_string()),
            global_id: Some(format!("G{}", id)),
            ifc_type: "IfcWall".to_string(),
            properties: props.iter().copied().collect(),
            layers: Vec::new(),
        }
    }

    #[test]
    fn test_rows_sorted_by_name() {
        let rows = vec![row(1, "B", &[("k", "1")]), row(2, "A", &[("k", "2")])];
        let outcome = build_export(rows, ExportMode::Collective, ExportKind::Properties).unwrap();
        let table = &outcome.tables[0];
        assert_eq!(table.name, "collective_properties");
        assert_eq!(table.rows[0][0], "A");
        assert_eq!(table.rows[1][0], "B");
    }

    #[test]
    fn test_disjoint_keys_union() {
        let rows = vec![row(1, "A", &[("x", "1")]), row(2, "B", &[("y", "2")])];
        let outcome = build_export(rows, ExportMode::Collective, ExportKind::Properties).unwrap();
        let table = &outcome.tables[0];
        assert_eq!(
            table.columns,
            vec!["Element Name", "Element GlobalId", "Element Type", "x", "y"]
        );
        assert_eq!(table.rows[0], vec!["A", "G1", "IfcWall", "1", ""]);
        assert_eq!(table.rows[1], vec!["B", "G2", "IfcWall", "", "2"]);
    }

    #[test]
    fn test_empty_selection_rejected() {
        assert!(matches!(
            build_export(Vec::new(), ExportMode::Separate, ExportKind::Both),
            Err(ExportError::EmptySelection)
        ));
    }

    #[test]
    fn test_layers_without_composition_are_diagnosed() {
        let outcome = build_export(
            vec![row(1, "A", &[])],
            ExportMode::Collective,
            ExportKind::Layers,
        )
        .unwrap();
        assert!(outcome.tables.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_separate_export_from_model() {
        let doc = sample();
        let rows = build_rows(&doc, &[EntityId(43), EntityId(42)], &EngineOptions::default());
        let outcome = build_export(rows, ExportMode::Separate, ExportKind::Both).unwrap();
        let names: Vec<_> = outcome.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Wall_A_2O2Fr$t4X7Zf8NOew3FLOH_properties",
                "Wall_A_2O2Fr$t4X7Zf8NOew3FLOH_layers",
                "Wall_B_1kTvXnbbzCWw8lcMd1dR4o_properties",
            ]
        );
        let layers = &outcome.tables[1];
        assert_eq!(layers.columns[0], "Layer Number");
        assert_eq!(layers.rows.len(), 2);
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_collective_layers_prefix_identity() {
        let doc = sample();
        let rows = build_rows(&doc, &[EntityId(44), EntityId(42)], &EngineOptions::default());
        let outcome = build_export(rows, ExportMode::Collective, ExportKind::Layers).unwrap();
        let table = &outcome.tables[0];
        assert_eq!(table.name, "collective_layers");
        assert_eq!(
            &table.columns[..5],
            &["Element Name", "Element GlobalId", "Element Type", "Layer Number", "Material"]
        );
        // Floor sorts before Wall A
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "Floor");
        assert_eq!(table.rows[2][3], "2");
    }

    #[test]
    fn test_csv_quoting() {
        let table = Table {
            name: "t".into(),
            columns: vec!["a".into(), "b".into()],
            rows: vec![vec!["x,y".into(), "say \"hi\"\nnow".into()]],
        };
        assert_eq!(
            table.to_csv(),
            "a,b\r\n\"x,y\",\"say \"\"hi\"\"\nnow\"\r\n"
        );
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let bag: PropertyBag = [("k", "v")].into_iter().collect();
        let table = merge_table("out", [&bag]);
        let path = table.write_csv(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "k\r\nv\r\n");
    }

    #[test]
    fn test_sanitize_and_compare() {
        assert_eq!(sanitize_filename("Wall: A/B <1>"), "Wall_AB_1");

        let rows = vec![row(7, "A", &[("x", "1")]), row(8, "B", &[("y", "2")])];
        let table = comparison_table(&rows);
        assert_eq!(
            table.columns,
            vec!["Property", "IfcWall (ID: 7)", "IfcWall (ID: 8)"]
        );
        assert_eq!(table.rows[1], vec!["y", "", "2"]);
    }
}
