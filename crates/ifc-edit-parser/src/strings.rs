// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP string literal encoding
//!
//! ISO 10303-21 strings are 7-bit. Quotes are doubled, backslashes doubled,
//! and anything outside printable ASCII travels in control directives:
//! `\S\c` (high half of ISO 8859-1), `\X\hh` (one ISO 8859-1 byte),
//! `\X2\hhhh...\X0\` (UTF-16) and `\X4\hhhhhhhh...\X0\` (UTF-32).
//! Code page switches (`\P?\`) are dropped.

/// Decode the raw contents of a string literal (without the outer quotes)
///
/// Malformed directives are kept as literal text.
pub fn decode(raw: &str) -> String {
    if !raw.contains(['\\', '\'']) {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        match c {
            '\'' if rest.starts_with("''") => {
                out.push('\'');
                rest = &rest[2..];
            }
            '\\' => rest = decode_directive(rest, &mut out),
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

/// Decode one directive at the start of `input`, returning what follows it
fn decode_directive<'a>(input: &'a str, out: &mut String) -> &'a str {
    if let Some(rest) = input.strip_prefix("\\\\") {
        out.push('\\');
        return rest;
    }
    if let Some(rest) = input.strip_prefix("\\S\\") {
        if let Some(c) = rest.chars().next().filter(char::is_ascii) {
            out.push(char::from(c as u8 + 0x80));
            return &rest[1..];
        }
    }
    if let Some(rest) = input.strip_prefix("\\X\\") {
        if let Some(byte) = rest.get(..2).and_then(|h| u8::from_str_radix(h, 16).ok()) {
            out.push(char::from(byte));
            return &rest[2..];
        }
    }
    if let Some(rest) = input.strip_prefix("\\X2\\") {
        if let Some((hex, after)) = rest.split_once("\\X0\\") {
            if let Some(units) = hex_units(hex, 4) {
                let units = units.into_iter().map(|u| u as u16);
                out.extend(
                    char::decode_utf16(units).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
                );
                return after;
            }
        }
    }
    if let Some(rest) = input.strip_prefix("\\X4\\") {
        if let Some((hex, after)) = rest.split_once("\\X0\\") {
            if let Some(units) = hex_units(hex, 8) {
                out.extend(
                    units
                        .into_iter()
                        .map(|u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER)),
                );
                return after;
            }
        }
    }
    if let Some(page) = input.strip_prefix("\\P") {
        if page.len() >= 2 && page.as_bytes()[1] == b'\\' {
            return &page[2..];
        }
    }

    out.push('\\');
    &input[1..]
}

fn hex_units(hex: &str, width: usize) -> Option<Vec<u32>> {
    if hex.is_empty() || hex.len() % width != 0 || !hex.is_ascii() {
        return None;
    }
    (0..hex.len())
        .step_by(width)
        .map(|i| u32::from_str_radix(&hex[i..i + width], 16).ok())
        .collect()
}

/// Encode text as the contents of a string literal (without the outer quotes)
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut wide: Vec<u16> = Vec::new();

    for c in text.chars() {
        if c == ' ' || c.is_ascii_graphic() {
            flush_wide(&mut out, &mut wide);
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        } else {
            let mut buf = [0u16; 2];
            wide.extend_from_slice(c.encode_utf16(&mut buf));
        }
    }
    flush_wide(&mut out, &mut wide);
    out
}

fn flush_wide(out: &mut String, wide: &mut Vec<u16>) {
    if wide.is_empty() {
        return;
    }
    out.push_str("\\X2\\");
    for unit in wide.drain(..) {
        out.push_str(&format!("{:04X}", unit));
    }
    out.push_str("\\X0\\");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(decode("Basic Wall:Interior - 138mm"), "Basic Wall:Interior - 138mm");
        assert_eq!(encode("Basic Wall:Interior - 138mm"), "Basic Wall:Interior - 138mm");
    }

    #[test]
    fn test_quotes_and_backslashes() {
        assert_eq!(decode("it''s"), "it's");
        assert_eq!(decode("C:\\\\temp"), "C:\\temp");
        assert_eq!(encode("it's C:\\temp"), "it''s C:\\\\temp");
    }

    #[test]
    fn test_directives() {
        assert_eq!(decode("W\\X2\\00E4\\X0\\nde"), "Wände");
        assert_eq!(decode("\\X\\E9t\\X\\E9"), "été");
        assert_eq!(decode("\\S\\d"), "ä");
        assert_eq!(decode("\\X4\\0001F600\\X0\\"), "\u{1F600}");
        assert_eq!(decode("\\PA\\plain"), "plain");
    }

    #[test]
    fn test_malformed_directive_is_literal() {
        assert_eq!(decode("\\X2\\00E\\X0\\"), "\\X2\\00E\\X0\\");
        assert_eq!(decode("50\\"), "50\\");
    }

    #[test]
    fn test_non_ascii_is_encoded() {
        assert_eq!(encode("Wände"), "W\\X2\\00E4\\X0\\nde");
        assert_eq!(encode("a\nb"), "a\\X2\\000A\\X0\\b");
        assert_eq!(decode(&encode("Tür \u{1F6AA} 'x'")), "Tür \u{1F6AA} 'x'");
    }
}
