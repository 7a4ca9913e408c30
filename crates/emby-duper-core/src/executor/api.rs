use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::analysis::DeletionPlan;
use crate::catalog::Catalog;
use crate::progress::ProgressReporter;

/// Delete every candidate of every safe plan through the catalog API.
/// Returns (success_count, error_count).
///
/// Each catalog id is deleted at most once. Failures are logged and counted;
/// there is no rollback of deletions that already went through.
pub fn execute_api_deletions<'a, C, I>(
    catalog: &C,
    plans: I,
    reporter: &dyn ProgressReporter,
) -> (usize, usize)
where
    C: Catalog + ?Sized,
    I: IntoIterator<Item = &'a DeletionPlan>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let targets: Vec<(&str, &str)> = plans
        .into_iter()
        .flat_map(|plan| plan.candidates())
        .map(|candidate| (candidate.id.as_str(), candidate.path.as_str()))
        .filter(|(id, _)| seen.insert(*id))
        .collect();

    let total = targets.len();
    reporter.on_delete_start(total);

    let mut success_count = 0;
    let mut error_count = 0;
    for (done, (id, path)) in targets.into_iter().enumerate() {
        match catalog.delete_item(id) {
            Ok(()) => {
                success_count += 1;
                debug!("deleted: {} ({})", path, id);
            }
            Err(e) => {
                error_count += 1;
                error!("Failed to delete '{}' (id {}): {}", path, id, e);
            }
        }
        reporter.on_delete_progress(done + 1, total);
    }

    reporter.on_delete_complete(success_count, error_count);
    info!(
        "Deletion executed: {} succeeded, {} failed",
        success_count, error_count
    );
    (success_count, error_count)
}
