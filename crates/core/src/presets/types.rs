use serde::{Deserialize, Serialize};

use crate::estimate::QualityClass;
use crate::format::{GifQuality, GifSettings, VideoCodec, WebmSettings};
use crate::metadata::VideoMetadata;

/// Highest frame rate a preset inherits from the source for GIF output.
const MAX_INHERITED_GIF_FPS: u32 = 30;

/// GIF fields a preset pins. `None` keeps the source or the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GifPresetSettings {
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub quality: Option<GifQuality>,
    #[serde(default)]
    pub optimize: Option<bool>,
}

impl GifPresetSettings {
    fn merge(&mut self, other: &GifPresetSettings) {
        self.fps = other.fps.or(self.fps);
        self.width = other.width.or(self.width);
        self.height = other.height.or(self.height);
        self.quality = other.quality.or(self.quality);
        self.optimize = other.optimize.or(self.optimize);
    }
}

/// WebM fields a preset pins. `None` keeps the source or the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebmPresetSettings {
    #[serde(default)]
    pub crf: Option<u8>,
    #[serde(default)]
    pub codec: Option<VideoCodec>,
    #[serde(default)]
    pub bitrate: Option<String>,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl WebmPresetSettings {
    fn merge(&mut self, other: &WebmPresetSettings) {
        self.crf = other.crf.or(self.crf);
        self.codec = other.codec.or(self.codec);
        self.bitrate = other.bitrate.clone().or_else(|| self.bitrate.take());
        self.fps = other.fps.or(self.fps);
        self.width = other.width.or(self.width);
        self.height = other.height.or(self.height);
    }
}

/// An immutable bundle of settings for both formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityPreset {
    pub name: String,
    pub label: String,
    pub description: String,
    pub gif: GifPresetSettings,
    pub webm: WebmPresetSettings,
    pub estimated_size_multiplier: f64,
    pub conversion_time: QualityClass,
}

impl QualityPreset {
    /// Concrete GIF settings, filling gaps from the source metadata.
    pub fn gif_settings(&self, source: Option<&VideoMetadata>) -> GifSettings {
        let defaults = GifSettings::default();
        let fps = self.gif.fps.unwrap_or_else(|| {
            source
                .map(|m| m.fps.clamp(1, MAX_INHERITED_GIF_FPS))
                .unwrap_or(defaults.fps)
        });

        GifSettings {
            fps,
            width: self.gif.width,
            height: self.gif.height,
            quality: self.gif.quality.unwrap_or(defaults.quality),
            optimize: self.gif.optimize.unwrap_or(defaults.optimize),
        }
    }

    /// Concrete WebM settings. Unset fps and size keep the source's.
    pub fn webm_settings(&self) -> WebmSettings {
        let defaults = WebmSettings::default();
        WebmSettings {
            crf: self.webm.crf.unwrap_or(defaults.crf),
            codec: self.webm.codec.unwrap_or(defaults.codec),
            bitrate: self.webm.bitrate.clone(),
            fps: self.webm.fps,
            width: self.webm.width,
            height: self.webm.height,
        }
    }

    /// Scale a baseline processing time by this preset's speed class.
    pub fn estimated_time(&self, base_secs: f64) -> f64 {
        base_secs * self.conversion_time.time_multiplier()
    }

    pub(crate) fn apply(&mut self, patch: &PresetOverride) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(gif) = &patch.gif {
            self.gif.merge(gif);
        }
        if let Some(webm) = &patch.webm {
            self.webm.merge(webm);
        }
        if let Some(multiplier) = patch.estimated_size_multiplier {
            self.estimated_size_multiplier = multiplier;
        }
        if let Some(class) = patch.conversion_time {
            self.conversion_time = class;
        }
    }
}

/// Partial preset read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetOverride {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gif: Option<GifPresetSettings>,
    #[serde(default)]
    pub webm: Option<WebmPresetSettings>,
    #[serde(default)]
    pub estimated_size_multiplier: Option<f64>,
    #[serde(default)]
    pub conversion_time: Option<QualityClass>,
}
