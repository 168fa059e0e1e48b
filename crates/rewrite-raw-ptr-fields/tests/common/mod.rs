#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use rewrite_raw_ptr_fields::config::DEFAULT_CLANG;

pub fn has_clang() -> bool {
    std::process::Command::new(DEFAULT_CLANG).arg("--version").output().is_ok_and(|output| output.status.success())
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// A scratch build directory holding copies of the given fixtures and a
/// `compile_commands.json` with one entry per `.cc` file.
pub fn build_dir_with(fixtures: &[&str]) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("rewrite_integration_{}_{id}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create build dir");

    let mut entries = Vec::new();
    for name in fixtures {
        std::fs::copy(fixtures_dir().join(name), dir.join(name)).expect("copy fixture");
        if name.ends_with(".cc") {
            entries.push(serde_json::json!({
                "directory": dir.display().to_string(),
                "file": name,
                "arguments": ["c++", "-std=c++17", "-c", name, "-o", format!("{name}.o")],
            }));
        }
    }
    std::fs::write(dir.join("compile_commands.json"), serde_json::to_string_pretty(&entries).expect("json"))
        .expect("write compile_commands.json");
    dir
}

pub fn read(
    dir: &Path,
    name: &str,
) -> String {
    std::fs::read_to_string(dir.join(name)).expect("fixture must exist")
}
