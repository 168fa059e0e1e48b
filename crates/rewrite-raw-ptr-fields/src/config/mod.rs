//! Layered configuration.
//!
//! Settings are split into one file per category. Each category has a
//! public settings struct with defaults and `normalize()` logic, and a
//! private `*Patch` struct for partial deserialization. [`Settings`]
//! aggregates the categories and layers, in order: defaults, the
//! `rewrite_raw_ptr_fields.toml` file, command-line overrides.

pub(crate) mod frontend;
pub(crate) mod logging;
pub(crate) mod rewrite;
pub(crate) mod thread_pool;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

pub use frontend::{DEFAULT_CLANG, FrontendSettings};
use frontend::FrontendSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
use logging::LoggingSettingsPatch;
pub use rewrite::RewriteSettings;
use rewrite::RewriteSettingsPatch;
use serde::Deserialize;
pub use thread_pool::{MAX_JOBS, MIN_JOBS, ThreadPoolSettings};
use thread_pool::ThreadPoolSettingsPatch;
use tracing::debug;

use crate::error::ConfigError;

pub const CONFIG_FILENAME: &str = "rewrite_raw_ptr_fields.toml";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub rewrite: RewriteSettings,
    pub frontend: FrontendSettings,
    pub thread_pool: ThreadPoolSettings,
    pub logging: LoggingSettings,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub wrapper: Option<String>,
    pub clang: Option<String>,
    pub jobs: Option<usize>,
    pub verbose: bool,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let patch: SettingsPatch = toml::from_str(content)?;
        let mut settings = Self::default();
        settings.apply_patch(patch);
        settings.normalize();
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("[config] loaded {}", path.display());
        Ok(settings)
    }

    /// Load an explicit config file, or the nearest one above `start`, or
    /// fall back to defaults.
    pub fn discover(
        explicit: Option<&Path>,
        start: &Path,
    ) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(|| find_config_file(start)) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(
        mut self,
        overrides: &CliOverrides,
    ) -> Self {
        self.apply_patch(SettingsPatch {
            rewrite: Some(RewriteSettingsPatch {
                wrapper: overrides.wrapper.clone(),
                ..Default::default()
            }),
            frontend: Some(FrontendSettingsPatch {
                clang: overrides.clang.clone(),
                ..Default::default()
            }),
            thread_pool: Some(ThreadPoolSettingsPatch {
                jobs: overrides.jobs,
                ..Default::default()
            }),
            logging: None,
            _extra: HashMap::new(),
        });
        if overrides.verbose && self.logging.level < LogLevel::Debug {
            self.logging.level = LogLevel::Debug;
        }
        self.normalize();
        self
    }

    fn apply_patch(
        &mut self,
        patch: SettingsPatch,
    ) {
        if let Some(p) = patch.rewrite {
            self.rewrite.apply_patch(p);
        }
        if let Some(p) = patch.frontend {
            self.frontend.apply_patch(p);
        }
        if let Some(p) = patch.thread_pool {
            self.thread_pool.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.rewrite.normalize();
        self.frontend.normalize();
        self.thread_pool.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct SettingsPatch {
    rewrite: Option<RewriteSettingsPatch>,
    frontend: Option<FrontendSettingsPatch>,
    thread_pool: Option<ThreadPoolSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, toml::Value>,
}

/// Walks parent directories from `start` looking for the config file.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
