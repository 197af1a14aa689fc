use std::collections::HashMap;
use tracing::debug;

use super::{GifPresetSettings, PresetOverride, QualityPreset, WebmPresetSettings};
use crate::estimate::QualityClass;
use crate::format::{GifQuality, VideoCodec};

/// Preset used when a requested name is unknown.
pub const DEFAULT_PRESET: &str = "balanced";

/// The set of presets offered to users.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Vec<QualityPreset>,
    fallback: QualityPreset,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    pub fn builtin() -> Self {
        let presets = builtin_presets();
        let fallback = balanced();
        Self { presets, fallback }
    }

    /// Built-in presets with configuration overrides applied.
    ///
    /// An override naming an unknown preset adds a new preset derived from
    /// `balanced`.
    pub fn from_config(overrides: &HashMap<String, PresetOverride>) -> Self {
        let mut catalog = Self::builtin();

        let mut names: Vec<&String> = overrides.keys().collect();
        names.sort();
        for name in names {
            let patch = &overrides[name];
            match catalog.presets.iter_mut().find(|p| &p.name == name) {
                Some(preset) => preset.apply(patch),
                None => {
                    let mut preset = balanced();
                    preset.name = name.clone();
                    preset.label = name.clone();
                    preset.apply(patch);
                    catalog.presets.push(preset);
                }
            }
            debug!(preset = %name, "Applied preset override");
        }

        if let Some(balanced) = catalog.get(DEFAULT_PRESET) {
            catalog.fallback = balanced.clone();
        }
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&QualityPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Preset by name, or `balanced` when the name is unknown.
    pub fn find(&self, name: &str) -> &QualityPreset {
        self.get(name).unwrap_or(&self.fallback)
    }

    pub fn list(&self) -> &[QualityPreset] {
        &self.presets
    }
}

fn builtin_presets() -> Vec<QualityPreset> {
    vec![fast(), balanced(), high_quality(), original()]
}

fn fast() -> QualityPreset {
    QualityPreset {
        name: "fast".to_string(),
        label: "Fast".to_string(),
        description: "Quick conversion, small files".to_string(),
        gif: GifPresetSettings {
            fps: Some(12),
            width: Some(400),
            height: Some(300),
            quality: Some(GifQuality::Low),
            optimize: Some(false),
        },
        webm: WebmPresetSettings {
            crf: Some(35),
            codec: Some(VideoCodec::Vp8),
            fps: Some(15),
            width: Some(480),
            height: Some(360),
            ..Default::default()
        },
        estimated_size_multiplier: 0.3,
        conversion_time: QualityClass::Fast,
    }
}

fn balanced() -> QualityPreset {
    QualityPreset {
        name: "balanced".to_string(),
        label: "Balanced".to_string(),
        description: "Reasonable speed and quality".to_string(),
        gif: GifPresetSettings {
            fps: Some(15),
            width: Some(540),
            height: Some(405),
            quality: Some(GifQuality::Medium),
            optimize: Some(true),
        },
        webm: WebmPresetSettings {
            crf: Some(25),
            codec: Some(VideoCodec::Vp8),
            fps: Some(24),
            width: Some(640),
            height: Some(480),
            ..Default::default()
        },
        estimated_size_multiplier: 0.6,
        conversion_time: QualityClass::Medium,
    }
}

fn high_quality() -> QualityPreset {
    QualityPreset {
        name: "high_quality".to_string(),
        label: "High quality".to_string(),
        description: "Close to the source, larger files".to_string(),
        gif: GifPresetSettings {
            fps: Some(20),
            quality: Some(GifQuality::High),
            optimize: Some(true),
            ..Default::default()
        },
        webm: WebmPresetSettings {
            crf: Some(15),
            codec: Some(VideoCodec::Vp9),
            fps: Some(30),
            ..Default::default()
        },
        estimated_size_multiplier: 1.2,
        conversion_time: QualityClass::Slow,
    }
}

fn original() -> QualityPreset {
    QualityPreset {
        name: "original".to_string(),
        label: "Original".to_string(),
        description: "Source quality, largest files".to_string(),
        gif: GifPresetSettings {
            quality: Some(GifQuality::High),
            optimize: Some(true),
            ..Default::default()
        },
        webm: WebmPresetSettings {
            crf: Some(10),
            codec: Some(VideoCodec::Vp9),
            ..Default::default()
        },
        estimated_size_multiplier: 1.8,
        conversion_time: QualityClass::Slow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::sample_metadata;

    #[test]
    fn test_builtin_names() {
        let catalog = PresetCatalog::builtin();
        let names: Vec<&str> = catalog.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["fast", "balanced", "high_quality", "original"]);
    }

    #[test]
    fn test_unknown_falls_back_to_balanced() {
        let catalog = PresetCatalog::builtin();
        assert_eq!(catalog.find("ultra").name, "balanced");
        assert!(catalog.get("ultra").is_none());
    }

    #[test]
    fn test_fast_preset_settings() {
        let fast = PresetCatalog::builtin().find("fast").clone();
        let gif = fast.gif_settings(None);
        assert_eq!(gif.fps, 12);
        assert_eq!((gif.width, gif.height), (Some(400), Some(300)));
        assert!(!gif.optimize);

        let webm = fast.webm_settings();
        assert_eq!(webm.crf, 35);
        assert_eq!(webm.codec, VideoCodec::Vp8);
        assert_eq!(webm.fps, Some(15));
    }

    #[test]
    fn test_original_preserves_source() {
        let original = PresetCatalog::builtin().find("original").clone();
        let mut meta = sample_metadata();
        meta.fps = 60;

        let gif = original.gif_settings(Some(&meta));
        assert_eq!(gif.fps, 30);
        assert!(gif.width.is_none() && gif.height.is_none());

        let webm = original.webm_settings();
        assert_eq!(webm.codec, VideoCodec::Vp9);
        assert!(webm.fps.is_none());
        assert!(webm.width.is_none());
    }

    #[test]
    fn test_estimated_time_scales_by_class() {
        let catalog = PresetCatalog::builtin();
        assert_eq!(catalog.find("fast").estimated_time(100.0), 50.0);
        assert_eq!(catalog.find("balanced").estimated_time(100.0), 100.0);
        assert_eq!(catalog.find("original").estimated_time(100.0), 250.0);
    }

    #[test]
    fn test_config_override_merges_fields() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "balanced".to_string(),
            PresetOverride {
                gif: Some(GifPresetSettings {
                    fps: Some(10),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        overrides.insert(
            "tiny".to_string(),
            PresetOverride {
                webm: Some(WebmPresetSettings {
                    crf: Some(45),
                    ..Default::default()
                }),
                conversion_time: Some(QualityClass::Fast),
                ..Default::default()
            },
        );

        let catalog = PresetCatalog::from_config(&overrides);
        let balanced = catalog.find("balanced");
        assert_eq!(balanced.gif.fps, Some(10));
        assert_eq!(balanced.gif.width, Some(540));
        assert_eq!(catalog.find("missing").gif.fps, Some(10));

        let tiny = catalog.get("tiny").unwrap();
        assert_eq!(tiny.webm_settings().crf, 45);
        assert_eq!(tiny.webm_settings().fps, Some(24));
        assert_eq!(tiny.conversion_time, QualityClass::Fast);
        assert_eq!(catalog.list().len(), 5);
    }
}
