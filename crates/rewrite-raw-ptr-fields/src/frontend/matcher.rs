use std::path::Path;

use tracing::debug;

use crate::{
    frontend::clang_nodes::{Clang, FieldDeclData, Node, is_macro_loc, spelling_loc},
    rewrite::{DeclarationSpanSource, FieldSite, PointerType},
};

/// Options for [`collect_field_sites`].
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub skip_system_headers: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            skip_system_headers: true,
        }
    }
}

/// Collect every field declaration whose type is a pointer.
///
/// ```text
///   struct S {
///     int* y;     // matched
///     int z;      // not a pointer
///   };
/// ```
///
/// Instantiations listed under a class template are not visited; the
/// template's own declaration carries the written type. Explicit
/// specializations appear where they are written and are visited.
pub fn collect_field_sites(
    root: &Node,
    options: MatchOptions,
) -> Vec<FieldSite> {
    let mut sites = Vec::new();
    walk(root, options, &mut sites);
    debug!("[match] collected {} pointer field(s)", sites.len());
    sites
}

fn walk(
    node: &Node,
    options: MatchOptions,
    sites: &mut Vec<FieldSite>,
) {
    let in_class_template = match &node.kind {
        Clang::FieldDecl(data) => {
            collect_field(data, options, sites);
            false
        },
        Clang::ClassTemplateDecl(_) => true,
        Clang::ClassTemplateSpecializationDecl(_)
        | Clang::Other {
            ..
        } => false,
    };

    for child in &node.inner {
        if in_class_template && matches!(child.kind, Clang::ClassTemplateSpecializationDecl(_)) {
            continue;
        }
        walk(child, options, sites);
    }
}

fn collect_field(
    data: &FieldDeclData,
    options: MatchOptions,
    sites: &mut Vec<FieldSite>,
) {
    let name = match data.name() {
        Some(n) if !n.is_empty() => n,
        _ => return,
    };
    if data.is_implicit() {
        return;
    }

    let Some(qual_type) = data.qual_type() else {
        return;
    };
    let Some(pointer_type) = PointerType::from_decl_type(qual_type, data.desugared_qual_type()) else {
        return;
    };

    let (Some(name_loc), Some(range)) = (data.loc.as_ref(), data.range.as_ref()) else {
        return;
    };
    let (Some(name_bare), Some(begin_bare)) = (spelling_loc(name_loc), spelling_loc(&range.begin)) else {
        return;
    };
    if name_bare.file.is_empty() || name_bare.file != begin_bare.file {
        debug!("[match] {name}: declaration and name are in different files, skipping");
        return;
    }
    if options.skip_system_headers && is_system_header(&name_bare.file) {
        return;
    }
    if is_macro_loc(name_loc) || is_macro_loc(&range.begin) {
        debug!("[match] {name}: declared through a macro at {}:{}", name_bare.file, name_bare.line);
    }
    if pointer_type.indirection_depth() > 0 {
        debug!("[match] {name}: `{qual_type}` is a nested pointer, wrapping one level only");
    }
    if pointer_type.points_to_function() {
        debug!("[match] {name}: `{qual_type}` is a function pointer");
    }
    if !pointer_type.qualifiers().is_empty() {
        let dropped: Vec<&str> = pointer_type.qualifiers().iter().map(|q| q.as_str()).collect();
        debug!("[match] {name}: dropping pointer qualifier(s) `{}`", dropped.join(" "));
    }

    sites.push(FieldSite::new(
        name_bare.file.to_string(),
        begin_bare.offset,
        name_bare.offset,
        name,
        pointer_type,
    ));
}

/// Returns `true` if a file path looks like a toolchain or system header.
pub fn is_system_header(path: &str) -> bool {
    path.contains("/usr/include/")
        || path.contains("/usr/local/include/")
        || path.contains("/lib/clang/")
        || path.contains("/lib/gcc/")
        || path.contains("/Toolchains/")
        || path.contains("/SDKs/")
        || path.starts_with('<')
}

/// Make a site's file absolute against the directory clang ran in.
pub(crate) fn absolutize_file(
    site: &mut FieldSite,
    directory: &Path,
) {
    let path = Path::new(site.file());
    if path.is_absolute() {
        return;
    }
    let joined = directory.join(path);
    let absolute = std::fs::canonicalize(&joined).unwrap_or(joined);
    site.set_file(absolute.display().to_string());
}

#[cfg(test)]
#[path = "../../tests/src/frontend/matcher_tests.rs"]
mod tests;
