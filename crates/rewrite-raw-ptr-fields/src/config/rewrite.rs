use std::collections::HashMap;

use serde::Deserialize;

use crate::rewrite::DEFAULT_WRAPPER;

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteSettings {
    /// Template name wrapped around each pointee.
    pub wrapper: String,
    /// Leave fields declared in toolchain and system headers alone.
    pub skip_system_headers: bool,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            wrapper: DEFAULT_WRAPPER.to_string(),
            skip_system_headers: true,
        }
    }
}

impl RewriteSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: RewriteSettingsPatch,
    ) {
        if let Some(v) = patch.wrapper {
            self.wrapper = v;
        }
        if let Some(v) = patch.skip_system_headers {
            self.skip_system_headers = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.wrapper = self.wrapper.trim().to_string();
        if self.wrapper.is_empty() {
            self.wrapper = DEFAULT_WRAPPER.to_string();
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct RewriteSettingsPatch {
    pub(crate) wrapper: Option<String>,
    pub(crate) skip_system_headers: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, toml::Value>,
}
