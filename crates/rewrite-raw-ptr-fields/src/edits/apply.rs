//! Batch application of an edit stream to the files it names.
//!
//! Offsets in a stream always refer to the unmodified file. Each file is read
//! once, its edits are applied from the highest offset down, and the result
//! is written back once.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    edits::record::{EditKind, EditRecord},
    error::ApplyError,
};

const WHITESPACE_BYTES: [u8; 4] = [b'\t', b'\n', b'\r', b' '];

/// Totals over one `apply` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub files: usize,
    pub applied: usize,
    pub errors: usize,
}

/// Group records by the file they apply to.
///
/// Paths that do not exist as given are resolved against `build_dir`.
/// Records for files that still cannot be found are reported and dropped.
/// When `filters` is non-empty, only files under one of them are kept.
pub fn group_by_file(
    records: Vec<EditRecord>,
    build_dir: &Path,
    filters: &[PathBuf],
) -> BTreeMap<PathBuf, Vec<EditRecord>> {
    let filters: Vec<PathBuf> = filters.iter().map(|f| canonical_or_joined(f, build_dir)).collect();
    let mut resolved: BTreeMap<String, Option<PathBuf>> = BTreeMap::new();
    let mut grouped: BTreeMap<PathBuf, Vec<EditRecord>> = BTreeMap::new();

    for record in records {
        let path = resolved
            .entry(record.file.clone())
            .or_insert_with(|| resolve_path(&record.file, build_dir))
            .clone();
        let Some(path) = path else {
            continue;
        };
        if !filters.is_empty() && !filters.iter().any(|filter| path.starts_with(filter)) {
            debug!("[apply] {} is outside the path filters", path.display());
            continue;
        }
        grouped.entry(path).or_default().push(record);
    }
    grouped
}

fn resolve_path(
    file: &str,
    build_dir: &Path,
) -> Option<PathBuf> {
    let direct = Path::new(file);
    let candidate = if direct.is_file() {
        direct.to_path_buf()
    } else {
        build_dir.join(direct)
    };
    if !candidate.is_file() {
        warn!("[apply] edit applies to a non-existent file: {file}");
        return None;
    }
    Some(std::fs::canonicalize(&candidate).unwrap_or(candidate))
}

fn canonical_or_joined(
    path: &Path,
    base: &Path,
) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::fs::canonicalize(base.join(path)))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Apply every edit for one file to its contents in place.
///
/// Returns the number of applied edits and the edits that were rejected.
/// Exact duplicates are applied once. Two different replacements of the
/// same span are a conflict; the first one in sort order wins.
pub fn apply_to_contents(
    file: &Path,
    contents: &mut Vec<u8>,
    mut edits: Vec<EditRecord>,
) -> (usize, Vec<ApplyError>) {
    edits.sort_by(|a, b| {
        (b.offset, b.length, &b.replacement, &b.kind).cmp(&(a.offset, a.length, &a.replacement, &a.kind))
    });

    let original_len = contents.len();
    let mut applied = 0;
    let mut errors = Vec::new();
    let mut last: Option<EditRecord> = None;

    for edit in edits {
        if let Err(err) = check_edit(file, original_len, &edit, last.as_ref()) {
            errors.push(err);
            continue;
        }
        if last.as_ref() == Some(&edit) {
            continue;
        }

        contents.splice(edit.offset..edit.end(), edit.replacement.bytes());
        if edit.replacement.is_empty() {
            extend_deletion_if_element_in_list(contents, edit.offset);
        }
        applied += 1;
        last = Some(edit);
    }

    (applied, errors)
}

fn check_edit(
    file: &Path,
    original_len: usize,
    edit: &EditRecord,
    last: Option<&EditRecord>,
) -> Result<(), ApplyError> {
    if edit.kind != EditKind::Replace {
        return Err(ApplyError::UnrecognizedKind {
            file: file.to_path_buf(),
            kind: edit.kind.as_str().to_owned(),
        });
    }
    if edit.end() > original_len {
        return Err(ApplyError::OutOfBounds {
            file: file.to_path_buf(),
            offset: edit.offset,
            end: edit.end(),
            size: original_len,
        });
    }
    let Some(last) = last else {
        return Ok(());
    };
    if last == edit {
        return Ok(());
    }
    if last.offset == edit.offset && last.length == edit.length {
        return Err(ApplyError::Conflict {
            file: file.to_path_buf(),
            offset: edit.offset,
            length: edit.length,
            text: edit.replacement.clone(),
            previous: last.replacement.clone(),
        });
    }
    if edit.end() > last.offset {
        return Err(ApplyError::Overlap {
            file: file.to_path_buf(),
            offset: edit.offset,
            end: edit.end(),
            next_offset: last.offset,
        });
    }
    Ok(())
}

/// After deleting a list element at `offset`, remove the separator it leaves
/// behind: the following comma when the element sat between separators, or
/// the preceding `,`/`:` when it was the last element.
fn extend_deletion_if_element_in_list(
    contents: &mut Vec<u8>,
    offset: usize,
) {
    let mut char_before = None;
    let mut left_trim_count = 0;
    for &byte in contents[..offset].iter().rev() {
        left_trim_count += 1;
        if WHITESPACE_BYTES.contains(&byte) {
            continue;
        }
        if matches!(byte, b',' | b':' | b'(' | b'{') {
            char_before = Some(byte);
        }
        break;
    }

    let mut char_after = None;
    let mut right_trim_count = 0;
    for &byte in &contents[offset..] {
        right_trim_count += 1;
        if WHITESPACE_BYTES.contains(&byte) {
            continue;
        }
        if byte == b',' {
            char_after = Some(byte);
        }
        break;
    }

    if let Some(before) = char_before {
        if char_after.is_some() {
            contents.drain(offset..offset + right_trim_count);
        } else if matches!(before, b',' | b':') {
            contents.drain(offset - left_trim_count..offset);
        }
    }
}

/// Read `path`, apply its edits, and write it back.
pub fn apply_to_file(
    path: &Path,
    edits: Vec<EditRecord>,
) -> Result<(usize, Vec<ApplyError>), ApplyError> {
    let io_error = |source| ApplyError::Io {
        file: path.to_path_buf(),
        source,
    };
    let mut contents = std::fs::read(path).map_err(io_error)?;
    let (applied, errors) = apply_to_contents(path, &mut contents, edits);
    if applied > 0 {
        std::fs::write(path, &contents).map_err(io_error)?;
    }
    Ok((applied, errors))
}

/// Apply grouped edits file by file, reporting every rejected edit.
pub fn apply_all(grouped: BTreeMap<PathBuf, Vec<EditRecord>>) -> ApplySummary {
    let mut summary = ApplySummary::default();
    for (path, edits) in grouped {
        summary.files += 1;
        match apply_to_file(&path, edits) {
            Ok((applied, errors)) => {
                summary.applied += applied;
                summary.errors += errors.len();
                for err in errors {
                    warn!("[apply] {err}");
                }
            },
            Err(err) => {
                summary.errors += 1;
                warn!("[apply] {err}");
            },
        }
        debug!("[apply] {} edits applied so far ({} files)", summary.applied, summary.files);
    }
    summary
}

#[cfg(test)]
#[path = "../../tests/src/edits/apply_tests.rs"]
mod tests;
