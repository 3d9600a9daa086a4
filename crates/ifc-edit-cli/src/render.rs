// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain-text rendering of engine results

use ifc_edit_engine::{ElementSummary, Table};

/// Grid table with a `=` rule under the header
pub fn grid(table: &Table) -> String {
    let clean = |cell: &str| cell.replace(['\r', '\n'], " ");
    let header: Vec<String> = table.columns.iter().map(|c| clean(c.as_str())).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| clean(c.as_str())).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let rule = |fill: char| {
        let mut line = String::from("+");
        for width in &widths {
            line.extend(std::iter::repeat(fill).take(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let record = |cells: &[String]| {
        let mut line = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width - cell.chars().count();
            line.push_str(&format!(" {}{} |", cell, " ".repeat(pad)));
        }
        line.push('\n');
        line
    };

    let mut out = rule('-');
    out.push_str(&record(&header));
    out.push_str(&rule('='));
    for row in &rows {
        out.push_str(&record(row));
        out.push_str(&rule('-'));
    }
    out
}

/// `  1. IfcWall` lines
pub fn numbered<T: AsRef<str>>(items: &[T]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("  {}. {}\n", i + 1, item.as_ref()))
        .collect()
}

/// Identifying fields, one block per element
pub fn summaries(elements: &[ElementSummary]) -> String {
    let mut out = String::new();
    for (i, element) in elements.iter().enumerate() {
        out.push_str(&format!(
            "\nElement {}:\n  ID: {}\n  Type: {}\n  Name: {}\n  GlobalId: {}\n",
            i + 1,
            element.id.0,
            element.ifc_type,
            element.name.as_deref().unwrap_or(""),
            element.global_id.as_deref().unwrap_or("")
        ));
    }
    out
}

/// `  ID 42, Type: IfcWall, Name: Wall A`
pub fn selection_line(element: &ElementSummary) -> String {
    format!(
        "  ID {}, Type: {}, Name: {}",
        element.id.0,
        element.ifc_type,
        element.name.as_deref().unwrap_or("")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_edit_model::EntityId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_grid_layout() {
        let table = Table {
            name: "t".into(),
            columns: vec!["Property".into(), "IfcWall (ID: 42)".into()],
            rows: vec![vec!["Name".into(), "Wall A".into()]],
        };
        assert_eq!(
            grid(&table),
            "+----------+------------------+\n\
             | Property | IfcWall (ID: 42) |\n\
             +==========+==================+\n\
             | Name     | Wall A           |\n\
             +----------+------------------+\n"
        );
    }

    #[test]
    fn test_numbered_and_summary() {
        assert_eq!(numbered(&["IfcSlab", "IfcWall"]), "  1. IfcSlab\n  2. IfcWall\n");

        let element = ElementSummary {
            id: EntityId(42),
            ifc_type: "IfcWall".into(),
            name: Some("Wall A".into()),
            global_id: None,
        };
        assert_eq!(selection_line(&element), "  ID 42, Type: IfcWall, Name: Wall A");
        assert!(summaries(&[element]).contains("  GlobalId: \n"));
    }
}
