use crate::rewrite::pointer_type::PointerType;

/// The two source anchors a front end can reliably report for a declaration.
///
/// Everything the range resolver needs is expressed through this trait, so
/// it works the same for AST-backed sites and synthetic offset fixtures.
pub trait DeclarationSpanSource {
    /// Path of the file both offsets point into.
    fn file(&self) -> &str;
    /// Byte offset of the declaration's first token.
    fn decl_start(&self) -> usize;
    /// Byte offset of the declared name.
    fn name_offset(&self) -> usize;
}

/// A pointer-typed field declaration selected for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSite {
    file: String,
    decl_start: usize,
    name_offset: usize,
    name: String,
    pointer_type: PointerType,
}

impl FieldSite {
    pub fn new(
        file: impl Into<String>,
        decl_start: usize,
        name_offset: usize,
        name: impl Into<String>,
        pointer_type: PointerType,
    ) -> Self {
        Self {
            file: file.into(),
            decl_start,
            name_offset,
            name: name.into(),
            pointer_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pointer_type(&self) -> &PointerType {
        &self.pointer_type
    }

    pub(crate) fn set_file(
        &mut self,
        file: String,
    ) {
        self.file = file;
    }
}

impl DeclarationSpanSource for FieldSite {
    fn file(&self) -> &str {
        &self.file
    }

    fn decl_start(&self) -> usize {
        self.decl_start
    }

    fn name_offset(&self) -> usize {
        self.name_offset
    }
}
