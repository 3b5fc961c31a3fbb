pub mod command;

use crate::error::CompressError;
use std::fmt;
use std::path::Path;

pub use command::CommandCompressor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Svg,
}

impl ImageFormat {
    /// Format hint from the file extension. `jpeg` is an alias of `jpg`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Svg => "svg",
        };
        f.write_str(name)
    }
}

/// The codec collaborator: raw bytes in, optimized bytes out.
///
/// Implementations are called concurrently from scheduler workers and may
/// block for as long as the codec needs.
pub trait Compressor: Send + Sync {
    fn compress(&self, data: &[u8], format: ImageFormat) -> Result<Vec<u8>, CompressError>;
}
