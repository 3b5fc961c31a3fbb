use super::{Compressor, ImageFormat};
use crate::config::{CodecCommand, CodecConfig, SVGO_CONFIG_PLACEHOLDER};
use crate::error::CompressError;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, trace};

const SVGO_CONFIG: &str = include_str!("svgo.config.mjs");

/// Runs one external optimizer per format, streaming the image through the
/// tool's stdin and stdout.
#[derive(Debug, Clone, Default)]
pub struct CommandCompressor {
    commands: HashMap<ImageFormat, CodecCommand>,
}

impl CommandCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the codec table from configuration. When a command line uses
    /// the svgo config placeholder, the bundled config is written to the
    /// temp directory and its path substituted.
    pub fn from_config(codecs: &CodecConfig) -> io::Result<Self> {
        let entries = [
            (ImageFormat::Png, &codecs.png),
            (ImageFormat::Jpeg, &codecs.jpg),
            (ImageFormat::Gif, &codecs.gif),
            (ImageFormat::Svg, &codecs.svg),
        ];

        let mut svgo_config: Option<String> = None;
        let mut compressor = Self::new();
        for (format, codec) in entries {
            let mut codec = codec.clone();
            if codec.command.iter().any(|arg| arg == SVGO_CONFIG_PLACEHOLDER) {
                let path = match &svgo_config {
                    Some(path) => path.clone(),
                    None => {
                        let path = write_svgo_config()?.to_string_lossy().into_owned();
                        svgo_config = Some(path.clone());
                        path
                    }
                };
                for arg in codec.command.iter_mut() {
                    if arg == SVGO_CONFIG_PLACEHOLDER {
                        *arg = path.clone();
                    }
                }
            }
            compressor = compressor.with_codec(format, codec);
        }
        Ok(compressor)
    }

    /// A command line with no pass-through exit codes.
    pub fn with_command(self, format: ImageFormat, command_line: Vec<String>) -> Self {
        self.with_codec(
            format,
            CodecCommand {
                command: command_line,
                passthrough_exit_codes: Vec::new(),
            },
        )
    }

    /// An empty command line leaves the format without a codec.
    pub fn with_codec(mut self, format: ImageFormat, codec: CodecCommand) -> Self {
        if codec.command.is_empty() {
            self.commands.remove(&format);
        } else {
            self.commands.insert(format, codec);
        }
        self
    }

    pub fn codec(&self, format: ImageFormat) -> Option<&CodecCommand> {
        self.commands.get(&format)
    }
}

fn write_svgo_config() -> io::Result<PathBuf> {
    let dir = env::temp_dir().join("img-squash");
    fs::create_dir_all(&dir)?;
    let path = dir.join("svgo.config.mjs");
    if fs::read_to_string(&path).ok().as_deref() != Some(SVGO_CONFIG) {
        fs::write(&path, SVGO_CONFIG)?;
    }
    debug!("Using svgo config {}", path.display());
    Ok(path)
}

impl Compressor for CommandCompressor {
    fn compress(&self, data: &[u8], format: ImageFormat) -> Result<Vec<u8>, CompressError> {
        let codec = self
            .commands
            .get(&format)
            .ok_or_else(|| CompressError::UnsupportedFormat(format.to_string()))?;
        // Nothing to optimize; codecs reject empty input.
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let (program, args) = codec
            .command
            .split_first()
            .ok_or_else(|| CompressError::UnsupportedFormat(format.to_string()))?;

        trace!("Running {} {:?} on {} bytes", program, args, data.len());
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompressError::Spawn {
                program: program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            CompressError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "child stdin unavailable",
            ))
        })?;

        // Feed stdin from a second thread so a tool that starts writing
        // before it has consumed all input cannot deadlock on a full pipe.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(data));
            let output = child.wait_with_output();
            let written = writer.join().unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::Other,
                    "stdin writer panicked",
                ))
            });
            (output, written)
        });
        let output = output?;

        if let Some(code) = output.status.code() {
            if codec.passthrough_exit_codes.contains(&code) {
                debug!("'{}' exited with {}, keeping original bytes", program, code);
                return Ok(data.to_vec());
            }
        }
        if !output.status.success() {
            return Err(CompressError::ExitStatus {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        if output.stdout.is_empty() {
            return Err(CompressError::EmptyOutput(program.clone()));
        }

        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cmd(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bytes_round_trip_through_tool() {
        let compressor = CommandCompressor::new().with_command(ImageFormat::Png, cmd(&["cat"]));
        let out = compressor.compress(b"\x89PNG fake", ImageFormat::Png).unwrap();
        assert_eq!(out, b"\x89PNG fake");
    }

    #[test]
    fn test_non_zero_exit_is_error() {
        let compressor = CommandCompressor::new().with_command(ImageFormat::Gif, cmd(&["false"]));
        let err = compressor.compress(b"GIF89a", ImageFormat::Gif).unwrap_err();
        assert!(matches!(err, CompressError::ExitStatus { .. }));
    }

    #[test]
    fn test_passthrough_exit_code_keeps_input() {
        let codec = CodecCommand {
            command: cmd(&["sh", "-c", "exit 99"]),
            passthrough_exit_codes: vec![99],
        };
        let compressor = CommandCompressor::new().with_codec(ImageFormat::Png, codec);
        let out = compressor.compress(b"\x89PNG original", ImageFormat::Png).unwrap();
        assert_eq!(out, b"\x89PNG original");
    }

    #[test]
    fn test_unlisted_exit_code_is_still_error() {
        let codec = CodecCommand {
            command: cmd(&["sh", "-c", "exit 3"]),
            passthrough_exit_codes: vec![99],
        };
        let compressor = CommandCompressor::new().with_codec(ImageFormat::Png, codec);
        let err = compressor.compress(b"\x89PNG", ImageFormat::Png).unwrap_err();
        match err {
            CompressError::ExitStatus { status, .. } => assert_eq!(status.code(), Some(3)),
            other => panic!("expected exit status error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_passes_through() {
        let compressor = CommandCompressor::new().with_command(ImageFormat::Gif, cmd(&["false"]));
        let out = compressor.compress(b"", ImageFormat::Gif).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_default_svg_codec_gets_bundled_config() {
        let compressor = CommandCompressor::from_config(&CodecConfig::default()).unwrap();
        let svg = compressor.codec(ImageFormat::Svg).unwrap();
        assert!(!svg.command.iter().any(|arg| arg == SVGO_CONFIG_PLACEHOLDER));

        let config_at = svg.command.iter().position(|arg| arg == "--config").unwrap();
        let written = fs::read_to_string(&svg.command[config_at + 1]).unwrap();
        assert!(written.contains("removeViewBox: false"));

        let png = compressor.codec(ImageFormat::Png).unwrap();
        assert_eq!(png.passthrough_exit_codes, vec![99]);
    }

    #[test]
    fn test_missing_codec_is_unsupported() {
        let compressor = CommandCompressor::new();
        let err = compressor.compress(b"<svg/>", ImageFormat::Svg).unwrap_err();
        assert!(matches!(err, CompressError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let compressor = CommandCompressor::new()
            .with_command(ImageFormat::Jpeg, cmd(&["definitely-not-an-installed-codec"]));
        let err = compressor.compress(b"jpeg", ImageFormat::Jpeg).unwrap_err();
        assert!(matches!(err, CompressError::Spawn { .. }));
    }
}
