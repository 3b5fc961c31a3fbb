use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run. Nothing on disk has been mutated when one of
/// these is returned before the scheduling phase.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Folder '{}' does not exist", .0.display())]
    RootNotFound(PathBuf),

    #[error("Fingerprint file '{}' is not valid: {source}", .path.display())]
    CorruptFingerprints {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),
}

/// Failure of a single compression task. Captured as data, never propagated.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("compression failed: {0}")]
    Compress(#[from] CompressError),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("stat after write failed: {0}")]
    Stat(#[source] io::Error),

    #[error("task panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("no codec for '{0}'")]
    UnsupportedFormat(String),

    #[error("could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("'{0}' produced no output")]
    EmptyOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
