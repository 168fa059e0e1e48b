use std::{
    fs,
    sync::atomic::{AtomicU64, Ordering},
};

use super::*;
use crate::rewrite::{FieldSite, PointerType, ReplacementEmitter, rewrite_site};

fn test_dir() -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("rewrite_apply_test_{}_{id}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn replace_text(
    source: &str,
    target: &str,
    replacement: &str,
) -> EditRecord {
    let offset = source.find(target).expect("target in source");
    EditRecord::replacement("mem.h", offset, target.len(), replacement)
}

fn apply(
    source: &str,
    edits: Vec<EditRecord>,
) -> (String, usize, Vec<ApplyError>) {
    let mut contents = source.as_bytes().to_vec();
    let (applied, errors) = apply_to_contents(Path::new("mem.h"), &mut contents, edits);
    (String::from_utf8(contents).unwrap(), applied, errors)
}

#[test]
fn offsets_refer_to_the_original_text() {
    let source = "struct S {\n  Foo* a;\n  const Bar* const b;\n};\n";
    let edits = vec![
        replace_text(source, "Foo*", "CheckedPtr<Foo>"),
        replace_text(source, "const Bar* const", "CheckedPtr<const Bar>"),
    ];

    let (result, applied, errors) = apply(source, edits);
    assert_eq!(result, "struct S {\n  CheckedPtr<Foo> a;\n  CheckedPtr<const Bar> b;\n};\n");
    assert_eq!(applied, 2);
    assert!(errors.is_empty());
}

#[test]
fn duplicates_are_applied_once() {
    let source = "void* v;";
    let edit = replace_text(source, "void*", "CheckedPtr<void>");
    let (result, applied, errors) = apply(source, vec![edit.clone(), edit]);

    assert_eq!(result, "CheckedPtr<void> v;");
    assert_eq!(applied, 1);
    assert!(errors.is_empty());
}

#[test]
fn conflicting_replacements_of_one_span_are_reported() {
    let source = "Foo* f;";
    let (result, applied, errors) = apply(
        source,
        vec![replace_text(source, "Foo*", "CheckedPtr<Foo>"), replace_text(source, "Foo*", "raw_ptr<Foo>")],
    );

    assert_eq!(applied, 1);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ApplyError::Conflict { offset: 0, length: 4, .. }));
    assert!(result == "CheckedPtr<Foo> f;" || result == "raw_ptr<Foo> f;");
}

#[test]
fn overlapping_edits_are_reported() {
    let source = "SomeClass** pp;";
    let (result, applied, errors) = apply(
        source,
        vec![
            EditRecord::replacement("mem.h", 0, 11, "CheckedPtr<SomeClass*>"),
            EditRecord::replacement("mem.h", 0, 10, "CheckedPtr<SomeClass>"),
        ],
    );

    assert_eq!(applied, 1);
    assert_eq!(result, "CheckedPtr<SomeClass*> pp;");
    assert!(matches!(errors[0], ApplyError::Overlap { .. }));
}

#[test]
fn out_of_bounds_edit_is_reported() {
    let (result, applied, errors) = apply("int* p;", vec![EditRecord::replacement("mem.h", 5, 10, "x")]);

    assert_eq!(result, "int* p;");
    assert_eq!(applied, 0);
    assert!(matches!(errors[0], ApplyError::OutOfBounds { size: 7, end: 15, .. }));
}

#[test]
fn span_overflowing_the_address_space_is_out_of_bounds() {
    let source = "struct S {};\n";
    let (text, applied, errors) = apply(source, vec![EditRecord::replacement("mem.h", usize::MAX, 5, "X")]);

    assert_eq!(text, source);
    assert_eq!(applied, 0);
    assert!(matches!(errors.as_slice(), [ApplyError::OutOfBounds { .. }]), "{errors:?}");
}

#[test]
fn const_pointer_to_const_field_keeps_the_pointee_qualifier() {
    let source = "struct S {\n  const Pointee* const field_name;\n};\n";
    let site = FieldSite::new(
        "mem.h",
        source.find("const Pointee").unwrap(),
        source.find("field_name").unwrap(),
        "field_name",
        PointerType::parse("const Pointee *const").unwrap(),
    );
    let edit = rewrite_site(&site, &ReplacementEmitter::default()).unwrap();

    let (text, applied, errors) = apply(source, vec![edit]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(applied, 1);
    assert_eq!(text, "struct S {\n  CheckedPtr<const Pointee> field_name;\n};\n");
}

#[test]
fn unknown_directive_is_reported() {
    let mut edit = EditRecord::replacement("mem.h", 0, 0, "base/foo.h");
    edit.kind = EditKind::Other("include-user-header".to_owned());
    let (result, applied, errors) = apply("int x;", vec![edit]);

    assert_eq!(result, "int x;");
    assert_eq!(applied, 0);
    assert!(matches!(&errors[0], ApplyError::UnrecognizedKind { kind, .. } if kind == "include-user-header"));
}

#[test]
fn deleting_last_list_element_removes_preceding_comma() {
    let source = "f(a, b)";
    let (result, _, errors) = apply(source, vec![replace_text(source, "b", "")]);
    assert!(errors.is_empty());
    assert_eq!(result, "f(a)");
}

#[test]
fn deleting_first_list_element_removes_following_comma() {
    let source = "f(a, b)";
    let (result, _, _) = apply(source, vec![EditRecord::replacement("mem.h", 2, 1, "")]);
    assert_eq!(result, "f( b)");
}

#[test]
fn apply_to_file_rewrites_in_place() {
    let dir = test_dir();
    let path = dir.join("fields.h");
    fs::write(&path, "struct S { Foo* f; };\n").unwrap();

    let edits = vec![EditRecord::replacement("fields.h", 11, 4, "CheckedPtr<Foo>")];
    let (applied, errors) = apply_to_file(&path, edits).unwrap();

    assert_eq!(applied, 1);
    assert!(errors.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "struct S { CheckedPtr<Foo> f; };\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn group_by_file_resolves_relative_paths_against_build_dir() {
    let dir = test_dir();
    let build_dir = dir.join("out");
    fs::create_dir_all(&build_dir).unwrap();
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/a.h"), "int* a;").unwrap();

    let records = vec![
        EditRecord::replacement("../src/a.h", 0, 4, "CheckedPtr<int>"),
        EditRecord::replacement("../src/missing.h", 0, 4, "CheckedPtr<int>"),
    ];
    let grouped = group_by_file(records, &build_dir, &[]);

    assert_eq!(grouped.len(), 1);
    let (path, edits) = grouped.iter().next().unwrap();
    assert!(path.ends_with("src/a.h"));
    assert_eq!(edits.len(), 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn group_by_file_honors_path_filters() {
    let dir = test_dir();
    fs::create_dir_all(dir.join("base")).unwrap();
    fs::create_dir_all(dir.join("third_party")).unwrap();
    fs::write(dir.join("base/a.h"), "int* a;").unwrap();
    fs::write(dir.join("third_party/b.h"), "int* b;").unwrap();

    let records = vec![
        EditRecord::replacement(dir.join("base/a.h").display().to_string(), 0, 4, "CheckedPtr<int>"),
        EditRecord::replacement(dir.join("third_party/b.h").display().to_string(), 0, 4, "CheckedPtr<int>"),
    ];
    let grouped = group_by_file(records, &dir, &[dir.join("base")]);

    assert_eq!(grouped.len(), 1);
    assert!(grouped.keys().all(|path| path.ends_with("base/a.h")));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn apply_all_counts_files_edits_and_errors() {
    let dir = test_dir();
    let a = dir.join("a.h");
    let b = dir.join("b.h");
    fs::write(&a, "int* a;").unwrap();
    fs::write(&b, "int* b;").unwrap();

    let mut grouped = BTreeMap::new();
    grouped.insert(a.clone(), vec![EditRecord::replacement("a.h", 0, 4, "CheckedPtr<int>")]);
    grouped.insert(
        b.clone(),
        vec![
            EditRecord::replacement("b.h", 0, 4, "CheckedPtr<int>"),
            EditRecord::replacement("b.h", 0, 4, "CheckedPtr<long>"),
        ],
    );

    let summary = apply_all(grouped);
    assert_eq!(
        summary,
        ApplySummary {
            files: 2,
            applied: 2,
            errors: 1,
        }
    );
    assert_eq!(fs::read_to_string(&a).unwrap(), "CheckedPtr<int> a;");

    let _ = fs::remove_dir_all(&dir);
}
