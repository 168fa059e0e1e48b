use crate::{error::SpanError, rewrite::field_site::DeclarationSpanSource};

/// Half-open byte range `[start, end)` in the original file text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementSpan {
    pub start: usize,
    pub end: usize,
}

impl ReplacementSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Compute the span holding the written type of a declaration.
///
/// ```text
///     const Pointee* const field_name_;
///     ^------------------^              replacement span
///                         ^             name offset - 1 (excluded)
///                          ^            name offset
///     ^                                 declaration start
/// ```
///
/// Qualifiers have no source locations of their own, so the span is anchored
/// on the declaration start and the byte before the name. The separator
/// between the type and the name is left in place.
pub fn resolve(source: &impl DeclarationSpanSource) -> Result<ReplacementSpan, SpanError> {
    let start = source.decl_start();
    let name_offset = source.name_offset();
    match name_offset.checked_sub(1) {
        Some(end) if end > start => Ok(ReplacementSpan {
            start,
            end,
        }),
        _ => Err(SpanError::NameBeforeStart {
            decl_start: start,
            name_offset,
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/src/rewrite/range_tests.rs"]
mod tests;
