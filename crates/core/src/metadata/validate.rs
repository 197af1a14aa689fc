use super::{AnalyzedMetadata, MetadataError, VideoMetadata};
use crate::config::LimitsConfig;

const FULL_HD_PIXELS: u64 = 1920 * 1080;
const LOW_RES_EDGE: u32 = 240;
const LONG_VIDEO_SECS: f64 = 60.0;

/// Check metadata against domain limits.
///
/// Out-of-range duration or resolution fails; high resolution, very low
/// resolution and long duration only produce advisory warnings.
pub fn validate_metadata(
    metadata: VideoMetadata,
    limits: &LimitsConfig,
) -> Result<AnalyzedMetadata, MetadataError> {
    if metadata.duration > limits.max_duration_secs {
        return Err(MetadataError::DurationExceeded {
            duration: metadata.duration,
            max: limits.max_duration_secs,
        });
    }
    if metadata.duration < limits.min_duration_secs {
        return Err(MetadataError::DurationTooShort {
            duration: metadata.duration,
            min: limits.min_duration_secs,
        });
    }
    if metadata.width < limits.min_width
        || metadata.width > limits.max_width
        || metadata.height < limits.min_height
        || metadata.height > limits.max_height
    {
        return Err(MetadataError::ResolutionOutOfRange {
            width: metadata.width,
            height: metadata.height,
        });
    }

    let mut warnings = Vec::new();
    if metadata.pixels() > FULL_HD_PIXELS {
        warnings.push(
            "Resolution is above 1080p; conversion will be slow and outputs large".to_string(),
        );
    }
    if metadata.width < LOW_RES_EDGE || metadata.height < LOW_RES_EDGE {
        warnings.push("Resolution is very low; output may look blurry".to_string());
    }
    if metadata.duration > LONG_VIDEO_SECS {
        warnings.push("Videos longer than one minute produce large GIFs".to_string());
    }

    Ok(AnalyzedMetadata { metadata, warnings })
}
