use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Csv,
}

/// Placeholder in a codec command line, replaced with the path of the
/// bundled svgo config when the compressor is built.
pub const SVGO_CONFIG_PLACEHOLDER: &str = "{svgo-config}";

/// External command line for one image format. The first element of
/// `command` is the program, the rest its arguments. The tool reads the
/// image from stdin and writes the optimized image to stdout.
///
/// An exit status listed in `passthrough_exit_codes` means "could not
/// improve this image": the original bytes are kept and the file still
/// counts as processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecCommand {
    pub command: Vec<String>,
    pub passthrough_exit_codes: Vec<i32>,
}

impl CodecCommand {
    pub fn new(command: &[&str]) -> Self {
        Self {
            command: strings(command),
            passthrough_exit_codes: Vec::new(),
        }
    }

    pub fn with_passthrough(mut self, codes: &[i32]) -> Self {
        self.passthrough_exit_codes = codes.to_vec();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub png: CodecCommand,
    pub jpg: CodecCommand,
    pub gif: CodecCommand,
    pub svg: CodecCommand,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            // 99: quality floor not reachable, pngquant wrote nothing.
            png: CodecCommand::new(&["pngquant", "--quality=60-80", "-"]).with_passthrough(&[99]),
            jpg: CodecCommand::new(&["jpegtran", "-copy", "none", "-optimize"]),
            gif: CodecCommand::new(&["gifsicle"]),
            svg: CodecCommand::new(&[
                "svgo",
                "--config",
                SVGO_CONFIG_PLACEHOLDER,
                "--input",
                "-",
                "--output",
                "-",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub folder: String,
    pub concurrency_limit: usize,
    pub generate_report: bool,
    pub include_extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub fingerprint_path: String,
    pub report_path: String,
    pub report_format: ReportFormat,
    pub codecs: CodecConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            folder: "src".to_string(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            generate_report: false,
            include_extensions: strings(&["png", "jpg", "jpeg", "svg", "gif"]),
            exclude_dirs: strings(&["node_modules"]),
            ignore_patterns: Vec::new(),
            fingerprint_path: "squash.json".to_string(),
            report_path: "squash-report.md".to_string(),
            report_format: ReportFormat::Markdown,
            codecs: CodecConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.folder)
    }

    /// Zero would leave the scheduler without workers.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency_limit.max(1)
    }
}

/// Layered load: built-in defaults, then an optional `Squash.{toml,yaml,json}`
/// in the working directory, then `SQUASH_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Squash").required(false))
        .add_source(Environment::with_prefix("SQUASH").try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
