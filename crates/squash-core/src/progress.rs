use std::path::Path;

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif bars. `on_file_complete` is called
/// from scheduler worker threads. All methods have default no-op
/// implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _candidates: usize, _work_set: usize, _duration_secs: f64) {}
    fn on_compress_start(&self, _total: usize) {}
    fn on_file_complete(&self, _done: usize, _total: usize, _path: &Path, _ok: bool) {}
    fn on_compress_complete(&self, _succeeded: usize, _failed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
