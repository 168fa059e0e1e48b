//! Span resolution and replacement synthesis for pointer fields.

mod emitter;
mod field_site;
mod pointer_type;
mod range;

pub use emitter::{DEFAULT_WRAPPER, ReplacementEmitter, render_pointee};
pub use field_site::{DeclarationSpanSource, FieldSite};
pub use pointer_type::{PointerType, Qualifier};
pub use range::{ReplacementSpan, resolve};

use crate::{edits::EditRecord, error::SpanError};

/// Resolve the site's span and emit its edit.
pub fn rewrite_site(
    site: &FieldSite,
    emitter: &ReplacementEmitter,
) -> Result<EditRecord, SpanError> {
    let span = resolve(site)?;
    Ok(emitter.emit(site.file(), span, site.pointer_type()))
}
