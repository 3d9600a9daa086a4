// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot subcommands

use crate::render::{grid, numbered};
use anyhow::{bail, Context, Result};
use ifc_edit_engine::resolver::instances_of;
use ifc_edit_engine::{
    merge_table, resolve, Candidates, Editor, ExportKind, ExportMode, PropertyBag, Table,
    UpdateReport,
};
use ifc_edit_model::{EntityId, ModelStore};
use std::path::Path;

/// Resolve command-line tokens without prompting
///
/// A numeric token names one element. A type fragment selects every instance
/// of the single type it matches, or of the type it names exactly.
pub fn resolve_tokens<S: ModelStore>(
    editor: &Editor<S>,
    tokens: &[String],
) -> Result<Vec<EntityId>> {
    let mut ids = Vec::new();
    for token in tokens {
        let resolution = resolve(editor.store(), token);
        if let Some(diagnostic) = &resolution.diagnostic {
            bail!("{}", diagnostic);
        }
        match resolution.candidates {
            Candidates::Entities(found) => ids.extend(found),
            Candidates::Types(types) => {
                let exact = types.iter().find(|t| t.eq_ignore_ascii_case(token));
                let type_name = match (types.as_slice(), exact) {
                    (_, Some(exact)) => exact.clone(),
                    ([only], None) => only.clone(),
                    _ => bail!("'{}' matches several types:\n{}", token, numbered(&types)),
                };
                ids.extend(instances_of(editor.store(), &type_name));
            }
        }
    }
    if ids.is_empty() {
        bail!("Nothing selected");
    }
    Ok(ids)
}

pub fn list<S: ModelStore>(editor: &Editor<S>) -> String {
    format!(
        "All element types in the IFC file:\n{}",
        numbered(&editor.list_types())
    )
}

pub fn count<S: ModelStore>(editor: &Editor<S>, query: &str) -> Result<String> {
    let counts = editor.count(query)?;
    Ok(match counts.as_slice() {
        [(type_name, count)] => format!("Number of {} elements: {}\n", type_name, count),
        many => {
            let mut out = format!("Multiple element types found matching '{}':\n", query);
            for (i, (type_name, count)) in many.iter().enumerate() {
                out.push_str(&format!("  {}. {}: {} elements\n", i + 1, type_name, count));
            }
            out
        }
    })
}

/// Comparison grid of the current selection
pub fn show<S: ModelStore>(editor: &Editor<S>) -> String {
    grid(&editor.comparison_table())
}

/// One layer grid per layered element
pub fn layers<S: ModelStore>(editor: &Editor<S>) -> String {
    let listing = editor.layer_listing();
    let mut out = String::new();
    for summary in editor.view() {
        if !listing.iter().any(|(layered, _)| layered.id == summary.id) {
            out.push_str(&format!("Element {} does not have layers.\n", summary.id.0));
        }
    }
    if listing.is_empty() {
        out.push_str("No layers found for the selected elements.\n");
        return out;
    }
    for (summary, rows) in &listing {
        let title = format!("{} (ID: {})", summary.ifc_type, summary.id.0);
        out.push_str(&format!("\n{}\n", title));
        out.push_str(&grid(&merge_table(title.clone(), rows)));
    }
    out
}

/// Two-column grid of one bag
pub fn bag_grid(title: &str, bag: &PropertyBag) -> String {
    grid(&Table {
        name: title.to_string(),
        columns: vec!["Property".to_string(), title.to_string()],
        rows: bag
            .iter()
            .map(|(key, value)| vec![key.to_string(), value.to_string()])
            .collect(),
    })
}

/// Properties of one layer of one element, 1-based
pub fn layer_detail<S: ModelStore>(
    editor: &Editor<S>,
    id: EntityId,
    number: usize,
) -> Result<String> {
    let index = number
        .checked_sub(1)
        .with_context(|| format!("Layer numbers start at 1, got {}", number))?;
    let layer = editor.select_layer(id, index)?;
    let bag = editor.layer_properties(&layer);
    Ok(bag_grid(&format!("Layer {} of element {}", number, id.0), &bag))
}

pub fn update_summary(property: &str, value: &str, report: &UpdateReport) -> String {
    let mut out = String::new();
    for (id, error) in &report.failures {
        out.push_str(&format!("Element {}: {}\n", id.0, error));
    }
    if report.succeeded() {
        out.push_str(&format!(
            "Updated {} to {} for {} element(s)\n",
            property,
            value,
            report.updated.len()
        ));
    } else {
        out.push_str(&format!(
            "Failed to update property {}. Make sure the property exists and is editable.\n",
            property
        ));
    }
    out
}

/// Export the selection and write the tables into `out_dir`
pub fn export<S: ModelStore>(
    editor: &Editor<S>,
    mode: ExportMode,
    kind: ExportKind,
    out_dir: &Path,
) -> Result<String> {
    let outcome = editor.export(mode, kind)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let written = outcome.write_all(out_dir)?;

    let mut out = String::new();
    for diagnostic in &outcome.diagnostics {
        out.push_str(&format!("{}\n", diagnostic));
    }
    for path in &written {
        out.push_str(&format!("Data exported to {}\n", path.display()));
    }
    if written.is_empty() {
        out.push_str("No data to export\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_edit_engine::EngineOptions;
    use ifc_edit_parser::StepDocument;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCOWNERHISTORY($,$,$,.ADDED.,$,$,$,0);
#2=IFCWALL('0Wall00000000000000001',#1,'North',$,$,$,$,$,$);
#3=IFCWALL('0Wall00000000000000002',#1,'South',$,$,$,$,$,$);
#4=IFCSLAB('0Slab00000000000000001',#1,'Roof',$,$,$,$,$,$);
#5=IFCMATERIAL('Concrete',$,$);
#6=IFCMATERIALLAYER(#5,0.3,$,$,$,$,$);
#7=IFCMATERIALLAYERSET((#6),'Roof 300',$);
#8=IFCRELASSOCIATESMATERIAL('0Rel000000000000000001',#1,$,$,(#4),#7);
ENDSEC;
END-ISO-10303-21;
"#;

    fn editor() -> Editor<StepDocument> {
        let doc = StepDocument::parse(TEST_IFC).unwrap();
        Editor::new(doc, "test.ifc", EngineOptions::default())
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_tokens() {
        let editor = editor();
        assert_eq!(
            resolve_tokens(&editor, &tokens(&["wall"])).unwrap(),
            vec![EntityId(2), EntityId(3)]
        );
        assert_eq!(
            resolve_tokens(&editor, &tokens(&["4", "2"])).unwrap(),
            vec![EntityId(4), EntityId(2)]
        );
        assert!(resolve_tokens(&editor, &tokens(&["99"])).is_err());
        // "ifc" matches every type
        assert!(resolve_tokens(&editor, &tokens(&["ifc"])).is_err());
    }

    #[test]
    fn test_count_output() {
        let editor = editor();
        assert_eq!(count(&editor, "slab").unwrap(), "Number of IfcSlab elements: 1\n");
        assert!(count(&editor, "a").unwrap().starts_with("Multiple element types"));
    }

    #[test]
    fn test_layers_output() {
        let mut editor = editor();
        editor.select([EntityId(2), EntityId(4)]);
        let out = layers(&editor);
        assert!(out.starts_with("Element 2 does not have layers.\n"));
        assert!(out.contains("IfcSlab (ID: 4)"));
        assert!(out.contains("| Layer Number |"));
    }

    #[test]
    fn test_layer_detail() {
        let editor = editor();
        let out = layer_detail(&editor, EntityId(4), 1).unwrap();
        assert!(out.contains("| Material "));
        assert!(out.contains("Concrete"));
        assert!(layer_detail(&editor, EntityId(4), 0).is_err());
        assert!(layer_detail(&editor, EntityId(4), 2).is_err());
        assert!(layer_detail(&editor, EntityId(2), 1).is_err());
    }

    #[test]
    fn test_update_summary() {
        let mut editor = editor();
        editor.select([EntityId(2), EntityId(3)]);
        let report = editor.update("Name", "Renamed").unwrap();
        assert_eq!(
            update_summary("Name", "Renamed", &report),
            "Updated Name to Renamed for 2 element(s)\n"
        );

        let report = editor.update("FireRating", "EI60").unwrap();
        let out = update_summary("FireRating", "EI60", &report);
        assert!(out.starts_with("Element 2: "));
        assert!(out.ends_with("Make sure the property exists and is editable.\n"));
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor();
        editor.select([EntityId(3), EntityId(2)]);
        let out = export(
            &editor,
            ExportMode::Collective,
            ExportKind::Both,
            dir.path(),
        )
        .unwrap();

        assert!(out.contains("North (#2) has no material layers"));
        let csv = std::fs::read_to_string(dir.path().join("collective_properties.csv")).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("North,"));
        assert!(!dir.path().join("collective_layers.csv").exists());
    }
}
