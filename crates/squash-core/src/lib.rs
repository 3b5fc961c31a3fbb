pub mod compress;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod scheduler;

pub use compress::{CommandCompressor, Compressor, ImageFormat};
pub use config::AppConfig;
pub use engine::{RunStatus, RunSummary, SquashEngine};
pub use error::Error;
pub use fingerprint::FingerprintStore;
pub use progress::{ProgressReporter, SilentReporter};
pub use scheduler::{Outcome, Scheduler};
