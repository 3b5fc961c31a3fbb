use crate::compress::{Compressor, ImageFormat};
use crate::error::{CompressError, TaskError};
use crate::progress::ProgressReporter;
use crate::scanner::FileDescriptor;
use std::any::Any;
use std::collections::VecDeque;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};
use std::thread;
use tracing::{debug, trace, warn};

/// Result of one compression task.
#[derive(Debug)]
pub enum Outcome {
    Success { file: FileDescriptor, mini_size: u64 },
    Failure { file: FileDescriptor, error: TaskError },
}

impl Outcome {
    pub fn file(&self) -> &FileDescriptor {
        match self {
            Outcome::Success { file, .. } | Outcome::Failure { file, .. } => file,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Bounded-parallelism executor over the work set.
///
/// Runs at most `limit` scoped worker threads. Each worker pops the next
/// item off one shared FIFO queue and runs it to completion before taking
/// another, so admission follows work-set order and nothing a codec does
/// internally (rayon joins included) can start a second item on a worker.
/// Outcomes go down one channel whose only consumer is the calling thread.
pub struct Scheduler {
    limit: usize,
}

type Queue = Mutex<VecDeque<(usize, FileDescriptor)>>;

impl Scheduler {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Compress every item in place. Never fails as a whole: each item
    /// resolves to its own `Outcome`. Outcomes are returned in work-set order
    /// regardless of completion order.
    pub fn run(
        &self,
        work: Vec<FileDescriptor>,
        compressor: &dyn Compressor,
        reporter: &dyn ProgressReporter,
    ) -> Vec<Outcome> {
        if work.is_empty() {
            return Vec::new();
        }

        let total = work.len();
        let workers = self.limit.min(total);
        let queue: Queue = Mutex::new(work.into_iter().enumerate().collect());
        let done = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, Outcome)>();
        debug!("Scheduling {} tasks on {} workers", total, workers);

        thread::scope(|scope| {
            let mut started = 0;
            for id in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let done = &done;
                let spawned = thread::Builder::new()
                    .name(format!("squash-worker-{}", id))
                    .spawn_scoped(scope, move || {
                        worker_loop(queue, done, total, compressor, reporter, &tx)
                    });
                match spawned {
                    Ok(_) => started += 1,
                    Err(err) => warn!("Could not start worker {}: {}", id, err),
                }
            }
            if started == 0 {
                worker_loop(&queue, &done, total, compressor, reporter, &tx);
            }
        });
        drop(tx);

        let mut indexed: Vec<(usize, Outcome)> = rx.into_iter().collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

fn worker_loop(
    queue: &Queue,
    done: &AtomicUsize,
    total: usize,
    compressor: &dyn Compressor,
    reporter: &dyn ProgressReporter,
    tx: &mpsc::Sender<(usize, Outcome)>,
) {
    while let Some((index, file)) = next_item(queue) {
        let outcome = run_task(file, compressor);
        let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
        reporter.on_file_complete(finished, total, &outcome.file().path, outcome.is_success());
        // The receiver outlives the scope.
        let _ = tx.send((index, outcome));
    }
}

fn next_item(queue: &Queue) -> Option<(usize, FileDescriptor)> {
    // Nothing panics while the lock is held, so a poisoned queue is still intact.
    queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front()
}

fn run_task(file: FileDescriptor, compressor: &dyn Compressor) -> Outcome {
    match compress_in_place(&file, compressor) {
        Ok(mini_size) => {
            trace!("{}: {} -> {} bytes", file.path.display(), file.size, mini_size);
            Outcome::Success { file, mini_size }
        }
        Err(error) => {
            warn!("Failed to compress {}: {}", file.path.display(), error);
            Outcome::Failure { file, error }
        }
    }
}

/// Read, compress, overwrite, then stat for the size actually on disk.
fn compress_in_place(file: &FileDescriptor, compressor: &dyn Compressor) -> Result<u64, TaskError> {
    let format = ImageFormat::from_path(&file.path)
        .ok_or_else(|| CompressError::UnsupportedFormat(file.name.clone()))?;

    let data = fs::read(&file.path).map_err(TaskError::Read)?;

    let optimized = panic::catch_unwind(AssertUnwindSafe(|| compressor.compress(&data, format)))
        .map_err(|payload| TaskError::Panicked(panic_message(payload)))??;

    fs::write(&file.path, &optimized).map_err(TaskError::Write)?;

    let metadata = fs::metadata(&file.path).map_err(TaskError::Stat)?;
    Ok(metadata.len())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
