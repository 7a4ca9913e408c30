/// Trait for reporting scan and deletion progress.
///
/// CLI implements with indicatif progress bars. All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_library_start(&self, _library: &str) {}
    fn on_fetch_progress(&self, _fetched: usize, _total: Option<usize>) {}
    fn on_library_complete(&self, _library: &str, _records: usize, _plans: usize, _duration_secs: f64) {}
    fn on_delete_start(&self, _total: usize) {}
    fn on_delete_progress(&self, _done: usize, _total: usize) {}
    fn on_delete_complete(&self, _deleted: usize, _failed: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
