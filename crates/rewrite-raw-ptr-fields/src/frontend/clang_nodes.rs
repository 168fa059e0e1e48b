use clang_ast::{BareSourceLocation, SourceLocation, SourceRange};
use serde::Deserialize;

pub type Node = clang_ast::Node<Clang>;

/// Clang AST node kinds the field matcher cares about.
///
/// Each variant corresponds to a Clang AST node `"kind"` value.
#[derive(Deserialize)]
pub enum Clang {
    FieldDecl(FieldDeclData),
    ClassTemplateDecl(LocatedData),
    ClassTemplateSpecializationDecl(LocatedData),

    // The `loc` and `range` fields MUST be deserialized even for unrecognized
    // node kinds. The `clang-ast` crate tracks "current file" state across the
    // deserialization stream via `SourceLocation`; skipping them would leave
    // later nodes with an empty or stale file.
    #[allow(dead_code)]
    Other {
        #[serde(default)]
        loc: Option<SourceLocation>,
        #[serde(default)]
        range: Option<SourceRange>,
    },
}

#[derive(Deserialize, Debug)]
pub struct FieldDeclData {
    pub name: Option<String>,
    /// Location of the field's name.
    pub loc: Option<SourceLocation>,
    /// Extent of the whole declaration; `range.begin` is its first token.
    pub range: Option<SourceRange>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

#[derive(Deserialize, Debug)]
#[allow(dead_code)]
pub struct LocatedData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
}

/// Clang's printed type, plus the desugared form when the written type is
/// sugar (a typedef or alias).
#[derive(Deserialize, Debug)]
pub struct QualType {
    #[serde(rename = "qualType")]
    pub qual_type: Option<String>,
    #[serde(rename = "desugaredQualType")]
    pub desugared_qual_type: Option<String>,
}

impl FieldDeclData {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn is_implicit(&self) -> bool {
        self.is_implicit.unwrap_or(false)
    }
    pub fn qual_type(&self) -> Option<&str> {
        self.ty.as_ref().and_then(|t| t.qual_type.as_deref())
    }
    pub fn desugared_qual_type(&self) -> Option<&str> {
        self.ty.as_ref().and_then(|t| t.desugared_qual_type.as_deref())
    }
}

/// Where the characters of a location were written.
///
/// Declarations prefer the spelling location; it falls back to the expansion
/// location when clang only reports one.
pub fn spelling_loc(loc: &SourceLocation) -> Option<&BareSourceLocation> {
    loc.spelling_loc.as_ref().or(loc.expansion_loc.as_ref())
}

/// Whether the location comes out of a macro expansion.
pub fn is_macro_loc(loc: &SourceLocation) -> bool {
    match (&loc.spelling_loc, &loc.expansion_loc) {
        (Some(spelling), Some(expansion)) => {
            spelling.offset != expansion.offset || spelling.file != expansion.file
        },
        _ => false,
    }
}
