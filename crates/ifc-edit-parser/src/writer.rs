// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP physical file serialization

use crate::strings;
use ifc_edit_model::{AttributeValue, DecodedEntity};

/// One DATA section line to write
pub enum Instance<'a> {
    Decoded(&'a DecodedEntity),
    /// Raw `#id=...;` text kept from the source file
    Verbatim(&'a str),
}

/// Render a full document: header verbatim, one instance per line, trailer
pub fn write_document<'a>(header: &str, instances: impl Iterator<Item = Instance<'a>>) -> String {
    let mut out = String::with_capacity(header.len() + 4096);
    out.push_str(header);
    if !header.ends_with('\n') {
        out.push('\n');
    }
    for instance in instances {
        match instance {
            Instance::Decoded(entity) => write_entity(&mut out, entity),
            Instance::Verbatim(text) => out.push_str(text),
        }
        out.push('\n');
    }
    out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
    out
}

/// Render one instance as `#id=KEYWORD(attrs);`
pub fn write_entity(out: &mut String, entity: &DecodedEntity) {
    out.push_str(&format!("#{}={}(", entity.id.0, entity.ifc_type.step_name()));
    write_list_items(out, &entity.attributes);
    out.push_str(");");
}

fn write_list_items(out: &mut String, items: &[AttributeValue]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_value(out, item);
    }
}

/// Render a single attribute value
pub fn write_value(out: &mut String, value: &AttributeValue) {
    match value {
        AttributeValue::Null => out.push('$'),
        AttributeValue::Derived => out.push('*'),
        AttributeValue::EntityRef(id) => out.push_str(&format!("#{}", id.0)),
        AttributeValue::Bool(b) => out.push_str(if *b { ".T." } else { ".F." }),
        AttributeValue::Integer(i) => out.push_str(&i.to_string()),
        AttributeValue::Float(f) => out.push_str(&format_real(*f)),
        AttributeValue::String(s) => {
            out.push('\'');
            out.push_str(&strings::encode(s));
            out.push('\'');
        }
        AttributeValue::Enum(e) => out.push_str(&format!(".{}.", e)),
        AttributeValue::List(items) => {
            out.push('(');
            write_list_items(out, items);
            out.push(')');
        }
        AttributeValue::TypedValue(name, args) => {
            out.push_str(name);
            out.push('(');
            write_list_items(out, args);
            out.push(')');
        }
    }
}

/// STEP reals always carry a decimal point (`1.`, `0.25`, `1.5E-05`)
fn format_real(f: f64) -> String {
    if !f.is_finite() {
        log::warn!("Non-finite real {} written as 0.", f);
        return "0.".to_string();
    }
    let repr = format!("{:?}", f);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let mantissa = if mantissa.contains('.') {
                mantissa.to_string()
            } else {
                format!("{}.", mantissa)
            };
            format!("{}E{}", mantissa, exponent)
        }
        None if repr.ends_with(".0") => repr[..repr.len() - 1].to_string(),
        None => repr,
    }
}
