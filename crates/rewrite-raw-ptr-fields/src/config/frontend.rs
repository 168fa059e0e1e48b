use std::collections::HashMap;

use serde::Deserialize;

pub const DEFAULT_CLANG: &str = "clang++";

/// How the compiler front end is invoked for each translation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontendSettings {
    /// Program that replaces the compiler recorded in the compile database.
    pub clang: String,
    /// Extra flags appended after the recorded arguments.
    pub extra_flags: Vec<String>,
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            clang: DEFAULT_CLANG.to_string(),
            extra_flags: Vec::new(),
        }
    }
}

impl FrontendSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: FrontendSettingsPatch,
    ) {
        if let Some(v) = patch.clang {
            self.clang = v;
        }
        if let Some(v) = patch.extra_flags {
            self.extra_flags = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.clang = self.clang.trim().to_string();
        if self.clang.is_empty() {
            self.clang = DEFAULT_CLANG.to_string();
        }
        self.extra_flags = self.extra_flags.iter().map(|f| f.trim().to_string()).filter(|f| !f.is_empty()).collect();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct FrontendSettingsPatch {
    pub(crate) clang: Option<String>,
    pub(crate) extra_flags: Option<Vec<String>>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, toml::Value>,
}
