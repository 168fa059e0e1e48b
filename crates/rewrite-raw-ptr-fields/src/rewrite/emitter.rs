use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    edits::EditRecord,
    rewrite::{pointer_type::PointerType, range::ReplacementSpan},
};

pub const DEFAULT_WRAPPER: &str = "CheckedPtr";

static TAG_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:class|struct|union|enum)\s+").unwrap());
static DECLARATOR_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([*&])").unwrap());

/// Turns a resolved span and the field's pointer type into an edit.
#[derive(Debug, Clone)]
pub struct ReplacementEmitter {
    wrapper: String,
}

impl Default for ReplacementEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_WRAPPER)
    }
}

impl ReplacementEmitter {
    pub fn new(wrapper: impl Into<String>) -> Self {
        Self {
            wrapper: wrapper.into(),
        }
    }

    pub fn wrapper(&self) -> &str {
        &self.wrapper
    }

    /// `Wrapper<Pointee>` for one level of indirection.
    ///
    /// Qualifiers on the pointer itself are not carried over, and a pointee
    /// that is itself a pointer is not wrapped again.
    pub fn replacement_text(
        &self,
        pointer_type: &PointerType,
    ) -> String {
        format!("{}<{}>", self.wrapper, render_pointee(pointer_type.pointee()))
    }

    pub fn emit(
        &self,
        file: &str,
        span: ReplacementSpan,
        pointer_type: &PointerType,
    ) -> EditRecord {
        EditRecord::replacement(file, span.start, span.len(), self.replacement_text(pointer_type))
    }
}

/// Render a pointee as it is written elsewhere in the codebase: no tag
/// keywords (`class Foo` becomes `Foo`) and declarators attached to the
/// type (`Foo *` becomes `Foo*`).
pub fn render_pointee(pointee: &str) -> String {
    let without_tags = TAG_KEYWORD_RE.replace_all(pointee.trim(), "");
    DECLARATOR_SPACE_RE.replace_all(&without_tags, "$1").into_owned()
}

#[cfg(test)]
#[path = "../../tests/src/rewrite/emitter_tests.rs"]
mod tests;
