use std::io::{self, BufRead, Write};

use crate::{edits::record::EditRecord, error::EditParseError};

pub const BEGIN_MARKER: &str = "==== BEGIN EDITS ====";
pub const END_MARKER: &str = "==== END EDITS ====";

/// Write the bracketed edit block, one record per line.
pub fn write_edit_block<'a, W: Write>(
    out: &mut W,
    records: impl IntoIterator<Item = &'a EditRecord>,
) -> io::Result<()> {
    writeln!(out, "{BEGIN_MARKER}")?;
    for record in records {
        writeln!(out, "{}", record.to_line())?;
    }
    writeln!(out, "{END_MARKER}")?;
    out.flush()
}

pub fn render_edit_block<'a>(records: impl IntoIterator<Item = &'a EditRecord>) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_edit_block(&mut buf, records);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Collect edit lines from a tool's output.
///
/// When the input contains edit blocks, only lines inside them are kept
/// (several concatenated runs may each contribute a block). Input without any
/// marker is taken to be bare edit lines. Blank lines are dropped.
///
/// Only the `\n` terminator is removed from an edit line. A `\r` before it
/// is part of the replacement text.
pub fn read_edit_lines<R: BufRead>(mut input: R) -> io::Result<Vec<String>> {
    let mut bracketed = Vec::new();
    let mut bare = Vec::new();
    let mut saw_marker = false;
    let mut inside = false;
    let mut buf = String::new();

    loop {
        buf.clear();
        if input.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.strip_suffix('\n').unwrap_or(&buf);
        let bare_text = line.trim_end_matches('\r');
        if bare_text == BEGIN_MARKER {
            saw_marker = true;
            inside = true;
            continue;
        }
        if bare_text == END_MARKER {
            saw_marker = true;
            inside = false;
            continue;
        }
        if bare_text.is_empty() {
            continue;
        }
        if inside {
            bracketed.push(line.to_owned());
        } else if !saw_marker {
            bare.push(line.to_owned());
        }
    }

    Ok(if saw_marker { bracketed } else { bare })
}

/// Parse edit lines, separating well-formed records from rejected lines.
pub fn parse_edit_lines(lines: &[String]) -> (Vec<EditRecord>, Vec<(String, EditParseError)>) {
    let mut records = Vec::with_capacity(lines.len());
    let mut rejected = Vec::new();
    for line in lines {
        match EditRecord::parse_line(line) {
            Ok(record) => records.push(record),
            Err(err) => rejected.push((line.clone(), err)),
        }
    }
    (records, rejected)
}

#[cfg(test)]
#[path = "../../tests/src/edits/stream_tests.rs"]
mod tests;
