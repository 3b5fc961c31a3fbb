mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ProcessArgs};
use dotenv::dotenv;
use progress::CliReporter;
use squash_core::report::format_size;
use squash_core::{
    AppConfig, CommandCompressor, Error, FingerprintStore, RunStatus, RunSummary, SquashEngine,
};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match squash_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Process(process_args)) => {
            if let Err(err) = run_process(config, &process_args) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::CountFingerprints) => match count_fingerprints(&config) {
            Ok(count) => info!("Total fingerprints in {}: {}", config.fingerprint_path, count),
            Err(err) => {
                error!("Error reading fingerprints: {}", err);
                process::exit(1);
            }
        },
        Some(Commands::ClearFingerprints) => {
            match prompt_confirm(
                "Are you SURE you want to forget every compressed image? They will all be compressed again.",
                Some(false),
            ) {
                Ok(true) => {
                    if let Err(err) = clear_fingerprints(&config) {
                        error!("Error clearing fingerprints: {}", err);
                        process::exit(1);
                    } else {
                        println!("Fingerprint file cleared");
                    }
                }
                _ => {
                    process::exit(0);
                }
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_process(mut config: AppConfig, process_args: &ProcessArgs) -> Result<(), Error> {
    process_args.apply(&mut config);

    let compressor = CommandCompressor::from_config(&config.codecs)?;
    let engine = SquashEngine::new(config);
    let reporter = CliReporter::new();
    let summary = engine.run(&compressor, &reporter)?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    if summary.status == RunStatus::NothingToDo {
        info!(
            "{} ({} images already compressed)",
            "Nothing to compress".green(),
            summary.skipped
        );
        return;
    }

    info!(
        "Compressed {} files, skipped {} already-processed, failed {}",
        format!("{}", summary.succeeded()).green(),
        format!("{}", summary.skipped).cyan(),
        format!("{}", summary.failed()).red(),
    );

    let totals = &summary.aggregate.totals;
    info!(
        "{} -> {} ({} saved), Scan: {}, Compress: {}",
        format_size(totals.original_bytes),
        format_size(totals.compressed_bytes),
        format!("{:.2}%", totals.ratio * 100.0).green(),
        format!("{:.2}s", summary.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.compress_duration.as_secs_f64()).green(),
    );

    for failure in &summary.aggregate.failures {
        error!("{} {}: {}", "FAILED".red(), failure.path.display(), failure.error);
    }

    if let Some(path) = &summary.report_path {
        info!("Report: {}", path.display());
    }
}

/// A corrupt store is an error, not a count of zero.
fn count_fingerprints(config: &AppConfig) -> Result<usize, Error> {
    Ok(FingerprintStore::load(&config.fingerprint_path)?.len())
}

/// Works on a corrupt file too: the old contents are never read.
fn clear_fingerprints(config: &AppConfig) -> Result<(), Error> {
    FingerprintStore::empty(&config.fingerprint_path).save()?;
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_with_store(path: &std::path::Path) -> AppConfig {
        AppConfig {
            fingerprint_path: path.to_string_lossy().into_owned(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_count_fingerprints_rejects_corrupt_store() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("squash.json");
        fs::write(&path, "{ not json").unwrap();

        let err = count_fingerprints(&config_with_store(&path)).unwrap_err();
        assert!(matches!(err, Error::CorruptFingerprints { .. }));
    }

    #[test]
    fn test_count_fingerprints_missing_store_is_zero() {
        let tmp = tempdir().unwrap();
        let config = config_with_store(&tmp.path().join("squash.json"));
        assert_eq!(count_fingerprints(&config).unwrap(), 0);
    }

    #[test]
    fn test_clear_fingerprints_reports_write_failure() {
        let tmp = tempdir().unwrap();
        // A directory where the file should go cannot be overwritten.
        let path = tmp.path().join("squash.json");
        fs::create_dir(&path).unwrap();

        assert!(clear_fingerprints(&config_with_store(&path)).is_err());
    }

    #[test]
    fn test_clear_fingerprints_overwrites_corrupt_store() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("squash.json");
        fs::write(&path, "{ not json").unwrap();

        clear_fingerprints(&config_with_store(&path)).unwrap();
        assert_eq!(count_fingerprints(&config_with_store(&path)).unwrap(), 0);
    }
}
