use super::{QualityClass, FULL_HD_PIXELS};
use crate::config::SessionConfig;
use crate::format::OutputFormat;
use crate::metadata::VideoMetadata;

const MIN_PREDICTED_SECS: f64 = 10.0;
const MAX_PREDICTED_SECS: f64 = 600.0;
const REFERENCE_FRAMES: f64 = 900.0;
const REFERENCE_SIZE_MB: f64 = 50.0;

/// Seconds of processing per source megabyte.
///
/// GIF rates are higher because of the two-pass palette pipeline.
fn base_rate_per_mb(format: OutputFormat, class: QualityClass) -> f64 {
    match (format, class) {
        (OutputFormat::Gif, QualityClass::Fast) => 2.0,
        (OutputFormat::Gif, QualityClass::Medium) => 4.0,
        (OutputFormat::Gif, QualityClass::Slow) => 8.0,
        (OutputFormat::WebM, QualityClass::Fast) => 1.0,
        (OutputFormat::WebM, QualityClass::Medium) => 2.0,
        (OutputFormat::WebM, QualityClass::Slow) => 4.0,
    }
}

/// Predicted conversion time in seconds, clamped to `[10, 600]`.
pub fn predict_conversion_time(
    meta: &VideoMetadata,
    format: OutputFormat,
    class: QualityClass,
) -> f64 {
    let size_mb = meta.size_mb();
    let frames_at_30 = meta.duration * 30.0;
    let complexity = ((meta.pixels() as f64 / FULL_HD_PIXELS)
        * (frames_at_30 / REFERENCE_FRAMES)
        * (size_mb / REFERENCE_SIZE_MB))
        .clamp(0.1, 2.0);

    (size_mb * base_rate_per_mb(format, class) * complexity)
        .clamp(MIN_PREDICTED_SECS, MAX_PREDICTED_SECS)
}

/// Timeout budget in whole seconds for a predicted conversion time.
pub fn calculate_timeout(estimated_secs: f64, config: &SessionConfig) -> u64 {
    let scaled = (estimated_secs.max(0.0) * config.timeout_multiplier).round();
    // Float to int casts saturate, so huge estimates land on the max.
    (scaled as u64).clamp(config.min_timeout_secs, config.max_timeout_secs)
}

/// [`calculate_timeout`] with the stock 2.5x multiplier and 60..900s clamp.
pub fn calculate_timeout_default(estimated_secs: f64) -> u64 {
    calculate_timeout(estimated_secs, &SessionConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(duration: f64, size_mb: u64) -> VideoMetadata {
        VideoMetadata {
            duration,
            width: 1920,
            height: 1080,
            fps: 30,
            size: size_mb * 1024 * 1024,
            codec: "h264".to_string(),
        }
    }

    #[test]
    fn test_timeout_clamps() {
        assert_eq!(calculate_timeout_default(0.0), 60);
        assert_eq!(calculate_timeout_default(10_000.0), 900);
        assert_eq!(calculate_timeout_default(-5.0), 60);
    }

    #[test]
    fn test_timeout_scales_in_range() {
        assert_eq!(calculate_timeout_default(100.0), 250);
        assert_eq!(calculate_timeout_default(100.3), 251);
    }

    #[test]
    fn test_timeout_is_monotonic() {
        let mut last = 0;
        for secs in 0..1000 {
            let timeout = calculate_timeout_default(secs as f64);
            assert!(timeout >= last);
            last = timeout;
        }
    }

    #[test]
    fn test_timeout_uses_config() {
        let config = SessionConfig {
            timeout_multiplier: 1.0,
            min_timeout_secs: 5,
            max_timeout_secs: 20,
            ..Default::default()
        };
        assert_eq!(calculate_timeout(12.0, &config), 12);
        assert_eq!(calculate_timeout(1.0, &config), 5);
    }

    #[test]
    fn test_prediction_floor() {
        let t = predict_conversion_time(&meta(10.0, 10), OutputFormat::WebM, QualityClass::Medium);
        assert_eq!(t, 10.0);
    }

    #[test]
    fn test_prediction_gif_slower_than_webm() {
        let m = meta(60.0, 60);
        let gif = predict_conversion_time(&m, OutputFormat::Gif, QualityClass::Medium);
        let webm = predict_conversion_time(&m, OutputFormat::WebM, QualityClass::Medium);
        assert!(gif > webm);
    }

    #[test]
    fn test_prediction_ceiling() {
        let t = predict_conversion_time(&meta(300.0, 100), OutputFormat::Gif, QualityClass::Slow);
        assert_eq!(t, 600.0);
    }
}
