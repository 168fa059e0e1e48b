use std::fmt;

use crate::error::EditParseError;

/// Field separator of the edit line format. Never escaped.
pub const DELIMITER: &str = ":::";

/// Directive tag of an edit line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditKind {
    /// `r`: replace `[offset, offset + length)` with the text.
    Replace,
    /// Any other tag. Parsed so it can be reported, never applied.
    Other(String),
}

impl EditKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "r" => Self::Replace,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Replace => "r",
            Self::Other(tag) => tag,
        }
    }
}

/// One byte-span replacement against a file's original text.
///
/// Ordering is by file, then offset, then length, so sorted records of one
/// file come out in source order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditRecord {
    pub file: String,
    pub offset: usize,
    pub length: usize,
    pub replacement: String,
    pub kind: EditKind,
}

impl EditRecord {
    pub fn replacement(
        file: impl Into<String>,
        offset: usize,
        length: usize,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            offset,
            length,
            replacement: replacement.into(),
            kind: EditKind::Replace,
        }
    }

    /// One past the last replaced byte. Saturates, so a span that cannot
    /// exist still compares as out of bounds.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Serialize as a single line (no trailing newline). Newlines in the
    /// replacement are written as NUL bytes.
    pub fn to_line(&self) -> String {
        format!(
            "{kind}{d}{file}{d}{offset}{d}{length}{d}{text}",
            kind = self.kind.as_str(),
            d = DELIMITER,
            file = self.file,
            offset = self.offset,
            length = self.length,
            text = self.replacement.replace('\n', "\0"),
        )
    }

    /// Parse a line written by [`EditRecord::to_line`], without its line
    /// terminator. Only the first four delimiters split fields; the rest,
    /// trailing whitespace included, belongs to the replacement text.
    pub fn parse_line(line: &str) -> Result<Self, EditParseError> {
        let fields: Vec<&str> = line.splitn(5, DELIMITER).collect();
        let [kind, file, offset, length, text] = fields[..] else {
            return Err(EditParseError::MissingFields {
                found: fields.len(),
            });
        };

        let offset = parse_number("offset", offset)?;
        let length = parse_number("length", length)?;
        if offset.checked_add(length).is_none() {
            return Err(EditParseError::OutOfRange {
                offset,
                length,
            });
        }

        Ok(Self {
            file: file.to_owned(),
            offset,
            length,
            replacement: text.replace('\0', "\n"),
            kind: EditKind::from_tag(kind),
        })
    }
}

impl fmt::Display for EditRecord {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

fn parse_number(
    field: &'static str,
    value: &str,
) -> Result<usize, EditParseError> {
    value.parse().map_err(|_| EditParseError::InvalidNumber {
        field,
        value: value.to_owned(),
    })
}

#[cfg(test)]
#[path = "../../tests/src/edits/record_tests.rs"]
mod tests;
