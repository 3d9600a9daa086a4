// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP instance decoding using nom combinators
//!
//! Instances and header records decode straight into owned
//! [`AttributeValue`]s; the document keeps and edits them in place.

use crate::strings;
use ifc_edit_model::{AttributeValue, DecodedEntity, EntityId, IfcType};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

type Span<'a, T> = IResult<&'a str, T>;

fn blank(input: &str) -> Span<'_, ()> {
    value((), multispace0).parse(input)
}

fn keyword(input: &str) -> Span<'_, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// `#123`
fn instance_name(input: &str) -> Span<'_, EntityId> {
    map_res(preceded(char('#'), digit1), |digits: &str| {
        digits.parse::<u32>().map(EntityId)
    })
    .parse(input)
}

/// Raw contents of a quoted literal, doubled quotes still in place
fn quoted(input: &str) -> Span<'_, &str> {
    let unterminated =
        || nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char));
    let body = input.strip_prefix('\'').ok_or_else(unterminated)?;

    let mut offset = 0;
    while let Some(found) = memchr::memchr(b'\'', &body.as_bytes()[offset..]) {
        let quote = offset + found;
        if body.as_bytes().get(quote + 1) == Some(&b'\'') {
            offset = quote + 2;
            continue;
        }
        return Ok((&body[quote + 1..], &body[..quote]));
    }
    Err(unterminated())
}

fn string(input: &str) -> Span<'_, AttributeValue> {
    map(quoted, |raw| AttributeValue::String(strings::decode(raw))).parse(input)
}

/// Integers and reals; a decimal point or exponent makes a real
fn numeric(input: &str) -> Span<'_, AttributeValue> {
    let (rest, text) = recognize((
        opt(one_of("+-")),
        digit1,
        opt((char('.'), take_while(|c: char| c.is_ascii_digit()))),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)?;

    let text = text.strip_prefix('+').unwrap_or(text);
    let parsed = if text.contains(['.', 'e', 'E']) {
        lexical_core::parse::<f64>(text.as_bytes()).map(AttributeValue::Float)
    } else {
        lexical_core::parse::<i64>(text.as_bytes()).map(AttributeValue::Integer)
    };
    match parsed {
        Ok(number) => Ok((rest, number)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

/// `.ELEMENT.`
fn enumeration(input: &str) -> Span<'_, AttributeValue> {
    map(delimited(char('.'), keyword, char('.')), |name: &str| {
        AttributeValue::Enum(name.to_string())
    })
    .parse(input)
}

/// `$` and `*`
fn omitted(input: &str) -> Span<'_, AttributeValue> {
    alt((
        value(AttributeValue::Null, char('$')),
        value(AttributeValue::Derived, char('*')),
    ))
    .parse(input)
}

/// Parenthesised, comma separated values
fn aggregate(input: &str) -> Span<'_, Vec<AttributeValue>> {
    delimited(
        terminated(char('('), blank),
        separated_list0((blank, char(','), blank), attribute),
        preceded(blank, char(')')),
    )
    .parse(input)
}

/// `IFCLABEL('text')`
fn typed(input: &str) -> Span<'_, AttributeValue> {
    map(
        (keyword, blank, aggregate),
        |(name, _, args): (&str, (), Vec<AttributeValue>)| {
            AttributeValue::TypedValue(name.to_ascii_uppercase(), args)
        },
    )
    .parse(input)
}

fn attribute(input: &str) -> Span<'_, AttributeValue> {
    alt((
        map(instance_name, AttributeValue::EntityRef),
        string,
        omitted,
        enumeration,
        numeric,
        map(aggregate, AttributeValue::List),
        typed,
    ))
    .parse(input)
}

/// Decode a keyword followed by its attribute list
///
/// Used for instance bodies and for header records such as
/// `FILE_NAME('a.ifc','2024-01-01T00:00:00',(''),(''),'','','')`.
pub fn parse_record(input: &str) -> Result<(&str, Vec<AttributeValue>), String> {
    let (_, (name, _, attributes)) = (keyword, blank, aggregate)
        .parse(input.trim_start())
        .map_err(|e| format!("Malformed record: {:?}", e))?;
    Ok((name, attributes))
}

/// Decode one instance, `#123=IFCWALL(attr1,attr2,...);`
pub fn parse_entity(input: &str) -> Result<DecodedEntity, String> {
    let (body, id) = terminated(instance_name, (blank, char('='), blank))
        .parse(input.trim_start())
        .map_err(|_: nom::Err<nom::error::Error<&str>>| "Expected '#id=' at start of instance")?;

    let (type_name, attributes) = parse_record(body)?;
    Ok(DecodedEntity::new(id, IfcType::parse(type_name), attributes))
}
