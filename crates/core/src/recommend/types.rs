use serde::{Deserialize, Serialize};

use crate::format::{FormatMap, OutputFormat};

const MB: u64 = 1024 * 1024;

/// What the user intends to do with the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Social,
    Website,
    Both,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreference {
    Size,
    Quality,
    #[default]
    Balanced,
}

/// A destination platform and its upload constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub name: String,
    /// Upload limit in bytes.
    pub max_file_size: u64,
    #[serde(default)]
    pub supported_formats: Vec<String>,
}

impl Platform {
    /// Default upload cap of the most restrictive known chat platform.
    pub const DEFAULT_CAP: u64 = 25 * MB;

    /// Look up a well-known platform by case-insensitive name.
    pub fn known(name: &str) -> Option<Platform> {
        let (name, max_file_size, formats): (&str, u64, &[&str]) =
            match name.trim().to_ascii_lowercase().as_str() {
                "discord" => ("Discord", 25 * MB, &["gif", "webm", "mp4"]),
                "twitter" | "x" => ("Twitter", 512 * MB, &["gif", "mp4"]),
                "instagram" => ("Instagram", 100 * MB, &["gif", "mp4"]),
                "facebook" => ("Facebook", 4 * 1024 * MB, &["gif", "mp4", "webm"]),
                _ => return None,
            };
        Some(Platform {
            name: name.to_string(),
            max_file_size,
            supported_formats: formats.iter().map(|f| f.to_string()).collect(),
        })
    }

    /// Whether this platform prefers WebM over GIF for quality.
    pub fn prefers_webm(&self) -> bool {
        self.name.to_ascii_lowercase().contains("discord")
    }
}

/// The user's stated goal for this conversion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserIntent {
    #[serde(default)]
    pub purpose: Purpose,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub quality_preference: QualityPreference,
}

impl UserIntent {
    pub fn new(purpose: Purpose) -> Self {
        Self {
            purpose,
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platforms.push(platform);
        self
    }
}

/// Which format(s) to produce and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRecommendation {
    pub primary: OutputFormat,
    pub secondary: Option<OutputFormat>,
    pub reason: String,
    pub warnings: Vec<String>,
    /// Human readable advisory size per format.
    pub estimated_sizes: FormatMap<String>,
}

impl FormatRecommendation {
    /// Formats to produce, primary first.
    pub fn formats(&self) -> Vec<OutputFormat> {
        let mut formats = vec![self.primary];
        formats.extend(self.secondary.filter(|f| *f != self.primary));
        formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_purpose_deserializes() {
        let purpose: Purpose = serde_json::from_str("\"presentation\"").unwrap();
        assert_eq!(purpose, Purpose::Unknown);
    }

    #[test]
    fn test_known_platforms() {
        let discord = Platform::known("Discord").unwrap();
        assert_eq!(discord.max_file_size, 25 * MB);
        assert!(discord.prefers_webm());

        let twitter = Platform::known("x").unwrap();
        assert_eq!(twitter.name, "Twitter");
        assert!(!twitter.prefers_webm());

        assert!(Platform::known("myspace").is_none());
    }

    #[test]
    fn test_platform_camel_case() {
        let platform: Platform =
            serde_json::from_str(r#"{"name": "Discord Nitro", "maxFileSize": 104857600}"#).unwrap();
        assert!(platform.prefers_webm());
        assert!(platform.supported_formats.is_empty());
    }
}
