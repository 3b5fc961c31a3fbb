use crate::compress::Compressor;
use crate::config::AppConfig;
use crate::error::Error;
use crate::fingerprint::{self, FingerprintStore};
use crate::progress::ProgressReporter;
use crate::report::{self, Aggregate};
use crate::scanner;
use crate::scheduler::{Outcome, Scheduler};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every candidate was already fingerprinted. Nothing was written.
    NothingToDo,
    Completed,
}

#[derive(Debug)]
pub struct RunSummary {
    pub status: RunStatus,
    pub candidates: usize,
    pub skipped: usize,
    pub aggregate: Aggregate,
    pub new_fingerprints: usize,
    pub report_path: Option<PathBuf>,
    pub scan_duration: Duration,
    pub compress_duration: Duration,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.aggregate.succeeded()
    }

    pub fn failed(&self) -> usize {
        self.aggregate.failed()
    }
}

pub struct SquashEngine {
    config: AppConfig,
}

impl SquashEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the incremental compression pipeline:
    /// 1. Load the fingerprint store (absent is empty, corrupt is fatal)
    /// 2. Enumerate candidate images under the root
    /// 3. Drop candidates whose current fingerprint is already stored
    /// 4. Compress the work set in place under the concurrency cap
    /// 5. Record post-compression fingerprints of successes and save once
    /// 6. Optionally write the report
    pub fn run(
        &self,
        compressor: &dyn Compressor,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunSummary, Error> {
        let root = self.config.root();
        if !root.exists() {
            return Err(Error::RootNotFound(root));
        }

        let mut store = FingerprintStore::load(&self.config.fingerprint_path)?;
        let scheduler = Scheduler::new(self.config.effective_concurrency());

        // Phase 1: Scan
        info!("Scanning {}...", root.display());
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let candidates = scanner::enumerate(
            &root,
            &self.config.include_extensions,
            &self.config.exclude_dirs,
            &self.config.ignore_patterns,
        )?;
        let candidate_count = candidates.len();
        let work = scanner::filter_unprocessed(candidates, store.fingerprints());
        let scan_duration = scan_start.elapsed();
        let skipped = candidate_count - work.len();
        reporter.on_scan_complete(candidate_count, work.len(), scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s: {} candidates, {} already compressed",
            scan_duration.as_secs_f64(),
            candidate_count,
            skipped,
        );

        if work.is_empty() {
            info!("No images need compressing");
            return Ok(RunSummary {
                status: RunStatus::NothingToDo,
                candidates: candidate_count,
                skipped,
                aggregate: Aggregate::default(),
                new_fingerprints: 0,
                report_path: None,
                scan_duration,
                compress_duration: Duration::ZERO,
            });
        }

        // Phase 2: Compress
        info!(
            "Compressing {} images with up to {} workers...",
            work.len(),
            scheduler.limit()
        );
        reporter.on_compress_start(work.len());
        let compress_start = Instant::now();
        let outcomes = scheduler.run(work, compressor, reporter);
        let compress_duration = compress_start.elapsed();

        let aggregate = report::aggregate(&outcomes);
        reporter.on_compress_complete(
            aggregate.succeeded(),
            aggregate.failed(),
            compress_duration.as_secs_f64(),
        );

        // Phase 3: Persist fingerprints of what actually landed on disk
        let new_fingerprints = store.extend(compressed_fingerprints(&outcomes));
        store.save()?;

        // Phase 4: Report
        let report_path = if self.config.generate_report {
            let path = PathBuf::from(&self.config.report_path);
            report::write_report(&aggregate, self.config.report_format, &path)?;
            Some(path)
        } else {
            None
        };

        Ok(RunSummary {
            status: RunStatus::Completed,
            candidates: candidate_count,
            skipped,
            aggregate,
            new_fingerprints,
            report_path,
            scan_duration,
            compress_duration,
        })
    }
}

/// Post-compression fingerprints for successful outcomes only, so failed
/// files are picked up again next run.
fn compressed_fingerprints(outcomes: &[Outcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Success { file, mini_size } => {
                Some(fingerprint::fingerprint(&file.path, *mini_size))
            }
            Outcome::Failure { .. } => None,
        })
        .collect()
}
