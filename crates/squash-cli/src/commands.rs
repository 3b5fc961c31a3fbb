use clap::{Args, Parser, Subcommand, ValueEnum};
use squash_core::config::ReportFormat;
use squash_core::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "img-squash")]
#[command(about = "Incrementally compress the images in a source tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compress every image not already recorded in the fingerprint file
    Process(ProcessArgs),
    /// Display the number of fingerprints in the fingerprint file
    CountFingerprints,
    /// Empty the fingerprint file so every image is compressed again
    ClearFingerprints,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Root folder to scan
    #[arg(short, long)]
    pub folder: Option<String>,
    /// Maximum number of images compressed at once
    #[arg(short, long)]
    pub concurrency: Option<usize>,
    /// Write a compression report
    #[arg(long, visible_alias = "md")]
    pub report: bool,
    /// Report format
    #[arg(long, value_enum)]
    pub report_format: Option<ReportFormatArg>,
    /// Path of the report file
    #[arg(long)]
    pub report_path: Option<String>,
    /// Path of the fingerprint file
    #[arg(long)]
    pub fingerprint_file: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Markdown,
    Csv,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Markdown => ReportFormat::Markdown,
            ReportFormatArg::Csv => ReportFormat::Csv,
        }
    }
}

impl ProcessArgs {
    /// Flags take precedence over file and environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(folder) = &self.folder {
            config.folder = folder.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency_limit = concurrency;
        }
        if self.report {
            config.generate_report = true;
        }
        if let Some(format) = self.report_format {
            config.report_format = format.into();
        }
        if let Some(path) = &self.report_path {
            config.report_path = path.clone();
        }
        if let Some(path) = &self.fingerprint_file {
            config.fingerprint_path = path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "img-squash",
            "process",
            "--folder",
            "assets",
            "-c",
            "4",
            "--md",
            "--report-format",
            "csv",
        ]);
        let Some(Commands::Process(args)) = cli.command else {
            panic!("expected process subcommand");
        };

        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.folder, "assets");
        assert_eq!(config.concurrency_limit, 4);
        assert!(config.generate_report);
        assert_eq!(config.report_format, ReportFormat::Csv);
        assert_eq!(config.fingerprint_path, "squash.json");
    }
}
