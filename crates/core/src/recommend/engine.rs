use std::sync::Arc;

use super::{FormatRecommendation, Platform, Purpose, UserIntent};
use crate::estimate::{format_file_size, EstimateCache};
use crate::format::{FormatMap, OutputFormat};
use crate::metadata::VideoMetadata;

const MEDIUM_DURATION_SECS: f64 = 10.0;
const LONG_DURATION_SECS: f64 = 60.0;
const FULL_HD_PIXELS: u64 = 1920 * 1080;
const SOURCE_SIZE_WARNING: u64 = 50 * 1024 * 1024;

/// Picks primary/secondary formats from the user's intent.
///
/// Deterministic for a given intent and metadata. Size strings come from the
/// advisory estimators through the shared [`EstimateCache`].
pub struct RecommendationEngine {
    cache: Arc<EstimateCache>,
}

impl RecommendationEngine {
    pub fn new(cache: Arc<EstimateCache>) -> Self {
        Self { cache }
    }

    pub fn analyze(&self, intent: &UserIntent, meta: &VideoMetadata) -> FormatRecommendation {
        let estimated_sizes = self.estimated_sizes(meta);

        match intent.purpose {
            Purpose::Social => FormatRecommendation {
                primary: OutputFormat::Gif,
                secondary: Some(OutputFormat::WebM),
                reason: "GIF recommended for maximum social media compatibility".to_string(),
                warnings: platform_warnings(&intent.platforms),
                estimated_sizes,
            },
            Purpose::Website => {
                let mut warnings = website_warnings(meta);
                warnings.extend(platform_warnings(&intent.platforms));
                FormatRecommendation {
                    primary: OutputFormat::WebM,
                    secondary: Some(OutputFormat::Gif),
                    reason: "WebM recommended for website optimization".to_string(),
                    warnings,
                    estimated_sizes,
                }
            }
            Purpose::Both | Purpose::Unknown => FormatRecommendation {
                primary: OutputFormat::Gif,
                secondary: Some(OutputFormat::WebM),
                reason: "Generating both formats covers every use".to_string(),
                warnings: Vec::new(),
                estimated_sizes,
            },
        }
    }

    fn estimated_sizes(&self, meta: &VideoMetadata) -> FormatMap<String> {
        FormatMap::from_fn(|format| format_file_size(self.cache.size(format, meta).round() as u64))
    }
}

fn platform_warnings(platforms: &[Platform]) -> Vec<String> {
    let Some(platform) = platforms.iter().find(|p| p.prefers_webm()) else {
        return Vec::new();
    };

    let mut warnings = vec!["WebM gives better quality on Discord".to_string()];
    if platform.max_file_size <= Platform::DEFAULT_CAP {
        warnings.push(format!(
            "{} limits uploads to {}; large GIFs may be rejected",
            platform.name,
            format_file_size(platform.max_file_size)
        ));
    }
    warnings
}

fn website_warnings(meta: &VideoMetadata) -> Vec<String> {
    let mut warnings = Vec::new();
    if meta.duration > MEDIUM_DURATION_SECS {
        warnings.push("Videos over 10 seconds may produce large files".to_string());
    }
    if meta.duration > LONG_DURATION_SECS {
        warnings.push("Videos over a minute are heavy to embed; consider trimming".to_string());
    }
    if meta.pixels() > FULL_HD_PIXELS {
        warnings.push("Resolution is above 1080p; consider downscaling for the web".to_string());
    }
    if meta.size > SOURCE_SIZE_WARNING {
        warnings.push("Source file is over 50MB; conversion may be slow".to_string());
    }
    warnings
}
