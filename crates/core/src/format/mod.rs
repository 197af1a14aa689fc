//! Output format tag and per-format conversion settings.
//!
//! The set of output formats is closed: everything that varies by format
//! (engines, job states, blobs, sizes) is stored in a [`FormatMap`] indexed
//! by [`OutputFormat`] rather than in an open registry.

mod map;
mod settings;

pub use map::FormatMap;
pub use settings::{ConversionSettings, GifQuality, GifSettings, VideoCodec, WebmSettings};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A shareable output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Looping animated image, maximum compatibility.
    Gif,
    /// Silent VP8/VP9 video for web embedding.
    WebM,
}

impl OutputFormat {
    /// All formats in session order.
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Gif, OutputFormat::WebM];

    /// Standard MIME type for the output blob.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "image/gif",
            OutputFormat::WebM => "video/webm",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "gif",
            OutputFormat::WebM => "webm",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gif" => Ok(OutputFormat::Gif),
            "webm" => Ok(OutputFormat::WebM),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}
