use std::collections::HashMap;

use serde::Deserialize;

pub const MIN_JOBS: usize = 1;
pub const MAX_JOBS: usize = 64;

/// Parallelism of front-end invocations. `jobs = 0` means one per core.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThreadPoolSettings {
    pub jobs: usize,
}

impl ThreadPoolSettings {
    pub fn resolved_jobs(&self) -> usize {
        if self.jobs == 0 {
            return std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(MIN_JOBS)
                .clamp(MIN_JOBS, MAX_JOBS);
        }
        self.jobs
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: ThreadPoolSettingsPatch,
    ) {
        if let Some(v) = patch.jobs {
            self.jobs = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        if self.jobs != 0 {
            self.jobs = self.jobs.clamp(MIN_JOBS, MAX_JOBS);
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ThreadPoolSettingsPatch {
    pub(crate) jobs: Option<usize>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, toml::Value>,
}
