use std::{
    fs,
    sync::atomic::{AtomicU64, Ordering},
};

use super::*;

fn test_dir() -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("rewrite_config_test_{}_{id}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.rewrite.wrapper, "CheckedPtr");
    assert!(settings.rewrite.skip_system_headers);
    assert_eq!(settings.frontend.clang, DEFAULT_CLANG);
    assert!(settings.frontend.extra_flags.is_empty());
    assert_eq!(settings.thread_pool.jobs, 0);
    assert!(settings.thread_pool.resolved_jobs() >= MIN_JOBS);
    assert_eq!(settings.logging.level, LogLevel::Info);
}

#[test]
fn toml_patch_overrides_defaults() {
    let settings = Settings::from_toml_str(
        r#"
[rewrite]
wrapper = "raw_ptr"
skip_system_headers = false

[frontend]
clang = "/opt/llvm/bin/clang++"
extra_flags = ["-Wno-unknown-warning-option", "  "]

[thread_pool]
jobs = 4

[logging]
level = "debug"
"#,
    )
    .unwrap();

    assert_eq!(settings.rewrite.wrapper, "raw_ptr");
    assert!(!settings.rewrite.skip_system_headers);
    assert_eq!(settings.frontend.clang, "/opt/llvm/bin/clang++");
    assert_eq!(settings.frontend.extra_flags, vec!["-Wno-unknown-warning-option".to_string()]);
    assert_eq!(settings.thread_pool.resolved_jobs(), 4);
    assert_eq!(settings.logging.level, LogLevel::Debug);
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let settings = Settings::from_toml_str("[thread_pool]\njobs = 2\n").unwrap();
    assert_eq!(settings.thread_pool.jobs, 2);
    assert_eq!(settings.rewrite, RewriteSettings::default());
    assert_eq!(settings.frontend, FrontendSettings::default());
}

#[test]
fn unknown_keys_are_ignored() {
    let settings = Settings::from_toml_str("future_option = true\n[rewrite]\nfancy = 1\n").unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn invalid_values_are_rejected() {
    assert!(Settings::from_toml_str("[thread_pool]\njobs = \"many\"\n").is_err());
    assert!(Settings::from_toml_str("[logging]\nlevel = \"loud\"\n").is_err());
}

#[test]
fn normalize_clamps_and_restores_defaults() {
    let settings = Settings::from_toml_str(
        "[rewrite]\nwrapper = \"  \"\n[frontend]\nclang = \"\"\n[thread_pool]\njobs = 1000\n",
    )
    .unwrap();
    assert_eq!(settings.rewrite.wrapper, "CheckedPtr");
    assert_eq!(settings.frontend.clang, DEFAULT_CLANG);
    assert_eq!(settings.thread_pool.jobs, MAX_JOBS);
}

#[test]
fn cli_overrides_win_over_file() {
    let settings = Settings::from_toml_str("[rewrite]\nwrapper = \"raw_ptr\"\n[thread_pool]\njobs = 4\n").unwrap();
    let settings = settings.with_overrides(&CliOverrides {
        wrapper: Some("MyPtr".to_string()),
        clang: None,
        jobs: Some(1),
        verbose: true,
    });

    assert_eq!(settings.rewrite.wrapper, "MyPtr");
    assert_eq!(settings.frontend.clang, DEFAULT_CLANG);
    assert_eq!(settings.thread_pool.jobs, 1);
    assert_eq!(settings.logging.level, LogLevel::Debug);
}

#[test]
fn verbose_does_not_lower_trace() {
    let settings = Settings::from_toml_str("[logging]\nlevel = \"trace\"\n").unwrap();
    let settings = settings.with_overrides(&CliOverrides {
        verbose: true,
        ..Default::default()
    });
    assert_eq!(settings.logging.level, LogLevel::Trace);
    assert_eq!(settings.logging.level.filter_directive(), "rewrite_raw_ptr_fields=trace");
}

#[test]
fn discovers_config_in_parent_dir() {
    let dir = test_dir();
    fs::write(dir.join(CONFIG_FILENAME), "[rewrite]\nwrapper = \"raw_ptr\"\n").unwrap();
    let build_dir = dir.join("out").join("Default");
    fs::create_dir_all(&build_dir).unwrap();

    assert_eq!(find_config_file(&build_dir), Some(dir.join(CONFIG_FILENAME)));
    let settings = Settings::discover(None, &build_dir).unwrap();
    assert_eq!(settings.rewrite.wrapper, "raw_ptr");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = test_dir();
    let missing = dir.join("missing.toml");
    assert!(matches!(Settings::discover(Some(missing.as_path()), &dir), Err(ConfigError::Read { .. })));

    let broken = dir.join("broken.toml");
    fs::write(&broken, "[rewrite\n").unwrap();
    assert!(matches!(Settings::load(&broken), Err(ConfigError::Parse { .. })));

    let _ = fs::remove_dir_all(&dir);
}
