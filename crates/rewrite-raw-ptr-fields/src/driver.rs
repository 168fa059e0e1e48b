//! Runs the rewrite over a set of translation units.
//!
//! Units are processed in parallel, bounded by `thread_pool.jobs`. Edits
//! from all units land in one [`EditCollector`]. The run is all-or-nothing:
//! if any unit fails, no edits are returned.

use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error, info, warn};

use crate::{
    config::Settings,
    edits::{EditCollector, EditRecord},
    error::{FrontendError, RunError},
    frontend::{self, CompileCommand, MatchOptions},
    rewrite::{FieldSite, ReplacementEmitter, rewrite_site},
};

/// Turn one unit's field sites into edits. Sites whose span cannot be
/// resolved are skipped.
pub fn edits_for_sites(
    sites: &[FieldSite],
    emitter: &ReplacementEmitter,
) -> Vec<EditRecord> {
    sites
        .iter()
        .filter_map(|site| match rewrite_site(site, emitter) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("[driver] skipping field `{}`: {err}", site.name());
                None
            },
        })
        .collect()
}

/// Rewrite every unit and return the de-duplicated edits, sorted by file and
/// offset.
pub async fn rewrite_units(
    units: Vec<CompileCommand>,
    settings: &Settings,
) -> Result<Vec<EditRecord>, RunError> {
    let total = units.len();
    let jobs = settings.thread_pool.resolved_jobs();
    info!("[driver] rewriting {total} translation unit(s) with {jobs} job(s)");

    let semaphore = Arc::new(Semaphore::new(jobs));
    let collector = Arc::new(EditCollector::new());
    let emitter = Arc::new(ReplacementEmitter::new(settings.rewrite.wrapper.clone()));
    let frontend_settings = Arc::new(settings.frontend.clone());
    let options = MatchOptions {
        skip_system_headers: settings.rewrite.skip_system_headers,
    };

    let mut tasks = JoinSet::new();
    for unit in units {
        let semaphore = Arc::clone(&semaphore);
        let collector = Arc::clone(&collector);
        let emitter = Arc::clone(&emitter);
        let frontend_settings = Arc::clone(&frontend_settings);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Err(FrontendError::Cancelled {
                    file: unit.file,
                });
            };
            let sites = frontend::unit_field_sites(&unit, &frontend_settings, options).await?;
            let records = edits_for_sites(&sites, &emitter);
            debug!("[driver] {}: {} edit(s)", unit.file.display(), records.len());
            collector.extend(records);
            Ok(unit.file)
        });
    }

    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(_)) => {},
            Ok(Err(err)) => {
                error!("[driver] {err}");
                failed += 1;
            },
            Err(err) => {
                error!("[driver] translation unit task failed: {err}");
                failed += 1;
            },
        }
    }

    if failed > 0 {
        return Err(RunError::UnitsFailed {
            failed,
            total,
        });
    }

    let records = collector.sorted_records();
    info!("[driver] {} edit(s) across {} file(s)", records.len(), collector.file_count());
    Ok(records)
}

#[cfg(test)]
#[path = "../tests/src/driver_tests.rs"]
mod tests;
