pub mod config;
pub mod driver;
pub mod edits;
pub mod error;
pub mod frontend;
pub mod rewrite;

pub use config::{CliOverrides, Settings};
pub use driver::rewrite_units;
pub use edits::{EditCollector, EditRecord};
pub use frontend::{CompilationDatabase, CompileCommand};
pub use rewrite::{DeclarationSpanSource, FieldSite, PointerType, ReplacementEmitter, ReplacementSpan};
