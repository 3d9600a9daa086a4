// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instance boundary scanning
//!
//! Splits the DATA section into instance slices with `memchr` without
//! decoding attributes, and reads the few header records the store exposes.

use crate::tokenizer::parse_record;
use ifc_edit_model::{AttributeValue, ModelMetadata};
use memchr::{memchr, memchr3, memmem};
use std::ops::Range;

/// One undecoded instance of the DATA section
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawInstance<'a> {
    pub id: u32,
    pub keyword: &'a str,
    /// Byte range of `#id=KEYWORD(...);` in the scanned text
    pub span: Range<usize>,
}

/// Iterator over the instances of a STEP file
pub struct EntityScanner<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> EntityScanner<'a> {
    /// Start right after the `DATA;` marker, or at the top if there is none
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: data_offset(content).unwrap_or(0),
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.content.as_bytes()
    }

    fn skip_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.bytes().get(self.pos).is_some_and(|&b| pred(b)) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skip blanks and `/* ... */` comments between instances
    fn skip_separators(&mut self) {
        loop {
            self.skip_while(|b| b.is_ascii_whitespace());
            if !self.bytes()[self.pos..].starts_with(b"/*") {
                return;
            }
            match memmem::find(&self.bytes()[self.pos + 2..], b"*/") {
                Some(close) => self.pos += close + 4,
                None => {
                    self.pos = self.bytes().len();
                    return;
                }
            }
        }
    }

    /// Position just past the terminating `;`, skipping quoted text and comments
    fn instance_end(&self, from: usize) -> Option<usize> {
        let bytes = self.bytes();
        let mut pos = from;
        loop {
            pos += memchr3(b'\'', b';', b'/', &bytes[pos..])?;
            match bytes[pos] {
                b';' => return Some(pos + 1),
                b'\'' => {
                    // '' inside a literal reads as close-then-reopen
                    pos += 1;
                    pos += memchr(b'\'', &bytes[pos..])? + 1;
                }
                _ if bytes[pos..].starts_with(b"/*") => {
                    pos += memmem::find(&bytes[pos + 2..], b"*/")? + 4;
                }
                _ => pos += 1,
            }
        }
    }

    /// Skip to the end of the current statement after something unreadable
    fn recover(&mut self) {
        self.pos = self
            .instance_end(self.pos)
            .unwrap_or_else(|| self.bytes().len());
    }
}

impl<'a> Iterator for EntityScanner<'a> {
    type Item = RawInstance<'a>;

    fn next(&mut self) -> Option<RawInstance<'a>> {
        loop {
            self.skip_separators();
            let start = self.pos;
            if self.bytes().get(start) != Some(&b'#') {
                // ENDSEC; or trailing text ends the section
                return None;
            }

            self.pos += 1;
            if self.skip_while(|b| b.is_ascii_digit()) == 0 {
                log::warn!("Skipping statement without instance id at byte {}", start);
                self.recover();
                continue;
            }
            let id = match self.content[start + 1..self.pos].parse::<u32>() {
                Ok(id) => id,
                Err(_) => {
                    log::warn!("Skipping instance with oversized id at byte {}", start);
                    self.recover();
                    continue;
                }
            };

            self.skip_while(|b| b.is_ascii_whitespace());
            if self.bytes().get(self.pos) != Some(&b'=') {
                log::warn!("Skipping #{}: expected '='", id);
                self.recover();
                continue;
            }
            self.pos += 1;
            self.skip_while(|b| b.is_ascii_whitespace());

            let keyword_start = self.pos;
            self.skip_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            let keyword = &self.content[keyword_start..self.pos];

            let end = self.instance_end(self.pos)?;
            self.pos = end;
            return Some(RawInstance {
                id,
                keyword,
                span: start..end,
            });
        }
    }
}

/// Byte offset just past the `DATA;` marker
pub fn data_offset(content: &str) -> Option<usize> {
    memmem::find(content.as_bytes(), b"DATA;").map(|p| p + 5)
}

/// Read schema and file name records from the header section
pub fn parse_header(header: &str) -> ModelMetadata {
    let mut info = ModelMetadata::default();

    if let Some(args) = header_record(header, "FILE_SCHEMA") {
        info.schema_version = args
            .first()
            .and_then(AttributeValue::as_list)
            .and_then(|schemas| schemas.first())
            .and_then(AttributeValue::as_string)
            .unwrap_or_default()
            .to_string();
    }

    // FILE_NAME(name, time_stamp, author, organization, preprocessor,
    //           originating_system, authorization)
    if let Some(args) = header_record(header, "FILE_NAME") {
        let text = |index: usize| {
            args.get(index)
                .and_then(AttributeValue::as_string)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        info.file_name = text(0);
        info.timestamp = text(1);
        info.originating_system = text(5);
    }

    info
}

fn header_record(header: &str, keyword: &str) -> Option<Vec<AttributeValue>> {
    let start = memmem::find(header.as_bytes(), keyword.as_bytes())?;
    match parse_record(&header[start..]) {
        Ok((_, args)) => Some(args),
        Err(err) => {
            log::warn!("Unreadable {} header record: {}", keyword, err);
            None
        }
    }
}
