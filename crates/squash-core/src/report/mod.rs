pub mod csv_file;
pub mod markdown;

use crate::config::ReportFormat;
use crate::error::Error;
use crate::scheduler::Outcome;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub ratio: f64,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureRow {
    pub path: PathBuf,
    pub error: String,
}

/// Everything the report needs, derived from the outcomes of one run.
/// Failures never contribute to the size totals.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub rows: Vec<ReportRow>,
    pub totals: Totals,
    pub failures: Vec<FailureRow>,
}

impl Aggregate {
    pub fn succeeded(&self) -> usize {
        self.rows.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn saved_bytes(&self) -> i64 {
        self.totals.original_bytes as i64 - self.totals.compressed_bytes as i64
    }
}

/// Fraction of the original size removed. Zero for an empty original;
/// negative when the codec grew the file.
pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64
}

/// Rows keep the order of `outcomes`.
pub fn aggregate(outcomes: &[Outcome]) -> Aggregate {
    let mut result = Aggregate::default();

    for outcome in outcomes {
        match outcome {
            Outcome::Success { file, mini_size } => {
                result.totals.original_bytes += file.size;
                result.totals.compressed_bytes += mini_size;
                result.rows.push(ReportRow {
                    name: file.name.clone(),
                    original_size: file.size,
                    compressed_size: *mini_size,
                    ratio: compression_ratio(file.size, *mini_size),
                    path: file.normalized_path(),
                });
            }
            Outcome::Failure { file, error } => result.failures.push(FailureRow {
                path: file.path.clone(),
                error: error.to_string(),
            }),
        }
    }

    result.totals.ratio =
        compression_ratio(result.totals.original_bytes, result.totals.compressed_bytes);
    result
}

/// Human size as the report shows it: bytes up to 1024, kilobytes above.
pub fn format_size(size: u64) -> String {
    if size > 1024 {
        format!("{:.2}KB", size as f64 / 1024.0)
    } else {
        format!("{}B", size)
    }
}

pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

pub fn write_report(aggregate: &Aggregate, format: ReportFormat, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    match format {
        ReportFormat::Markdown => fs::write(path, markdown::render(aggregate))?,
        ReportFormat::Csv => csv_file::write(aggregate, path)?,
    }
    info!("Report written to {}", path.display());
    Ok(())
}
