use serde::{Deserialize, Serialize};

use super::OutputFormat;

/// Palette quality for animated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GifQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl GifQuality {
    /// Maximum palette size handed to the palette generator.
    pub fn max_colors(&self) -> u16 {
        match self {
            GifQuality::Low => 128,
            GifQuality::Medium | GifQuality::High => 256,
        }
    }
}

/// WebM video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// Faster, lower quality. Accepts an explicit bitrate.
    #[default]
    Vp8,
    /// Slower, higher quality. Always constant-quality VBR.
    Vp9,
}

/// Settings for animated image output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifSettings {
    #[serde(default = "default_gif_fps")]
    pub fps: u32,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub quality: GifQuality,
    /// Two-pass palette pipeline when true.
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

fn default_gif_fps() -> u32 {
    15
}

fn default_optimize() -> bool {
    true
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            fps: default_gif_fps(),
            width: None,
            height: None,
            quality: GifQuality::default(),
            optimize: default_optimize(),
        }
    }
}

impl GifSettings {
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_quality(mut self, quality: GifQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

/// Settings for WebM output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebmSettings {
    #[serde(default = "default_crf")]
    pub crf: u8,
    #[serde(default)]
    pub codec: VideoCodec,
    /// Target bitrate such as `"1M"`; only honored for VP8.
    #[serde(default)]
    pub bitrate: Option<String>,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

fn default_crf() -> u8 {
    25
}

impl Default for WebmSettings {
    fn default() -> Self {
        Self {
            crf: default_crf(),
            codec: VideoCodec::default(),
            bitrate: None,
            fps: None,
            width: None,
            height: None,
        }
    }
}

impl WebmSettings {
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = Some(bitrate.into());
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Settings for one conversion, tagged by output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ConversionSettings {
    Gif(GifSettings),
    #[serde(rename = "webm")]
    WebM(WebmSettings),
}

impl ConversionSettings {
    pub fn format(&self) -> OutputFormat {
        match self {
            ConversionSettings::Gif(_) => OutputFormat::Gif,
            ConversionSettings::WebM(_) => OutputFormat::WebM,
        }
    }
}

impl From<GifSettings> for ConversionSettings {
    fn from(settings: GifSettings) -> Self {
        ConversionSettings::Gif(settings)
    }
}

impl From<WebmSettings> for ConversionSettings {
    fn from(settings: WebmSettings) -> Self {
        ConversionSettings::WebM(settings)
    }
}
