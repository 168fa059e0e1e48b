//! Edit records, their line format, and the batch applier.

pub mod apply;
mod collector;
mod record;
mod stream;

pub use apply::{ApplySummary, apply_all, apply_to_contents, group_by_file};
pub use collector::EditCollector;
pub use record::{DELIMITER, EditKind, EditRecord};
pub use stream::{BEGIN_MARKER, END_MARKER, parse_edit_lines, read_edit_lines, render_edit_block, write_edit_block};
