use super::{EstimateResult, FULL_HD_PIXELS, MIB};
use crate::format::{GifSettings, VideoCodec, WebmSettings};
use crate::metadata::VideoMetadata;

const COLOR_DEPTH_FACTOR: f64 = 0.8;
const GIF_COMPRESSION_FACTOR: f64 = 0.3;
const LARGE_FRAME_PENALTY: f64 = 0.7;
const SD_PIXELS: f64 = 720.0 * 480.0;

const ENGINE_GIF_BYTES_PER_PIXEL: f64 = 0.5;
const ENGINE_GIF_DEFAULT_FPS: f64 = 30.0;
const ENGINE_GIF_WARNING_BYTES: f64 = 50.0 * MIB;
const ENGINE_WEBM_WARNING_MB: f64 = 100.0;

/// Advisory GIF size in bytes.
///
/// `pixels * round(duration * fps) * 0.8 * 0.3`, with a 0.7 penalty for
/// frames larger than 1080p.
pub fn gif_size_bytes(meta: &VideoMetadata) -> f64 {
    let pixels = meta.pixels() as f64;
    let total_frames = (meta.duration * f64::from(meta.fps)).round();
    let penalty = if pixels > FULL_HD_PIXELS {
        LARGE_FRAME_PENALTY
    } else {
        1.0
    };
    pixels * total_frames * COLOR_DEPTH_FACTOR * GIF_COMPRESSION_FACTOR * penalty
}

/// Advisory WebM size in bytes, derived from the source size.
pub fn webm_size_bytes(meta: &VideoMetadata) -> f64 {
    let pixels = meta.pixels() as f64;

    let mut ratio = 0.6;
    if meta.duration > 30.0 {
        ratio *= 0.8;
    } else if meta.duration < 5.0 {
        ratio *= 1.2;
    }

    let complexity = 0.5 * (pixels / FULL_HD_PIXELS).min(1.0)
        + 0.3 * (meta.duration / 60.0).min(1.0)
        + 0.2 * (f64::from(meta.fps) / 60.0).min(1.0);
    ratio *= 1.0 + complexity * 0.3;

    if pixels > FULL_HD_PIXELS {
        ratio *= 1.1;
    } else if pixels < SD_PIXELS {
        ratio *= 0.8;
    }

    meta.size as f64 * ratio.min(1.0)
}

pub fn estimate_gif_size(meta: &VideoMetadata) -> String {
    format_file_size(gif_size_bytes(meta).round() as u64)
}

pub fn estimate_webm_size(meta: &VideoMetadata) -> String {
    format_file_size(webm_size_bytes(meta).round() as u64)
}

/// Human readable size: `"0 B"`, `"512 B"`, `"1.5 KB"`, `"10.0 MB"`, `"1.20 GB"`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const GB: f64 = MIB * 1024.0;

    let b = bytes as f64;
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if b < MIB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MIB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}

/// In-engine GIF estimate for a concrete settings choice.
pub fn gif_engine_estimate(meta: &VideoMetadata, settings: &GifSettings) -> EstimateResult {
    let width = settings.width.unwrap_or(meta.width);
    let height = settings.height.unwrap_or(meta.height);
    let fps = if settings.fps > 0 {
        f64::from(settings.fps)
    } else {
        ENGINE_GIF_DEFAULT_FPS
    };

    let pixel_count = f64::from(width) * f64::from(height);
    let frame_count = meta.duration * fps;
    let estimated_bytes = pixel_count * frame_count * ENGINE_GIF_BYTES_PER_PIXEL;

    let mut warnings = Vec::new();
    if estimated_bytes > ENGINE_GIF_WARNING_BYTES {
        warnings.push("Estimated GIF size exceeds 50MB".to_string());
    }

    EstimateResult {
        estimated_size_mb: (estimated_bytes / MIB).round(),
        estimated_time_secs: (meta.duration * 2.0).round(),
        warnings,
    }
}

/// In-engine WebM estimate from the source size and CRF bucket.
pub fn webm_engine_estimate(original_size: u64, settings: &WebmSettings) -> EstimateResult {
    let compression_ratio = match settings.crf {
        crf if crf > 35 => 0.4,
        crf if crf > 25 => 0.6,
        _ => 0.7,
    };
    let size = original_size as f64;
    let estimated_size_mb = (size * compression_ratio / MIB).round();

    // One second per source megabyte, scaled by codec cost.
    let base_time = (size / MIB).round();
    let codec_multiplier = match settings.codec {
        VideoCodec::Vp9 => 2.0,
        VideoCodec::Vp8 => 1.5,
    };

    let mut warnings = Vec::new();
    if estimated_size_mb > ENGINE_WEBM_WARNING_MB {
        warnings.push("WebM output may exceed 100MB".to_string());
    }

    EstimateResult {
        estimated_size_mb,
        estimated_time_secs: (base_time * codec_multiplier).round(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(duration: f64, width: u32, height: u32, size_mb: u64) -> VideoMetadata {
        VideoMetadata {
            duration,
            width,
            height,
            fps: 30,
            size: size_mb * 1024 * 1024,
            codec: "h264".to_string(),
        }
    }

    #[test]
    fn test_gif_size_formula() {
        let m = meta(10.0, 640, 480, 10);
        let expected = 640.0 * 480.0 * 300.0 * 0.8 * 0.3;
        assert_eq!(gif_size_bytes(&m), expected);
    }

    #[test]
    fn test_gif_size_penalty_above_full_hd() {
        let m = meta(1.0, 2560, 1440, 10);
        let expected = 2560.0 * 1440.0 * 30.0 * 0.8 * 0.3 * 0.7;
        assert!((gif_size_bytes(&m) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_gif_size_is_monotonic_in_duration() {
        let mut last = 0.0;
        for tenths in 1..=600 {
            let size = gif_size_bytes(&meta(tenths as f64 / 10.0, 1280, 720, 10));
            assert!(size >= last, "size decreased at {}", tenths);
            last = size;
        }
    }

    #[test]
    fn test_gif_size_is_pure() {
        let m = meta(7.3, 1280, 720, 12);
        assert_eq!(gif_size_bytes(&m), gif_size_bytes(&m.clone()));
        assert_eq!(webm_size_bytes(&m), webm_size_bytes(&m.clone()));
    }

    #[test]
    fn test_webm_size_formula_full_hd() {
        let m = meta(10.0, 1920, 1080, 10);
        let complexity = 0.5 * 1.0 + 0.3 * (10.0 / 60.0) + 0.2 * 0.5;
        let ratio = 0.6 * (1.0 + complexity * 0.3);
        let expected = 10.0 * MIB * ratio;
        assert!((webm_size_bytes(&m) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_webm_ratio_clamped_to_original() {
        let mut m = meta(1.0, 3840, 2160, 10);
        m.fps = 120;
        assert!(webm_size_bytes(&m) <= m.size as f64);
    }

    #[test]
    fn test_webm_small_frames_shrink() {
        let small = webm_size_bytes(&meta(10.0, 640, 360, 10));
        let sd = webm_size_bytes(&meta(10.0, 720, 480, 10));
        assert!(small < sd);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_file_size(1288490189), "1.20 GB");
    }

    #[test]
    fn test_gif_engine_estimate() {
        let m = meta(10.0, 1920, 1080, 10);
        let settings = GifSettings::default().with_fps(10).with_size(480, 270);
        let estimate = gif_engine_estimate(&m, &settings);

        // 480 * 270 * 100 frames * 0.5 bytes
        assert_eq!(estimate.estimated_size_mb, (6_480_000.0 / MIB).round());
        assert_eq!(estimate.estimated_time_secs, 20.0);
        assert!(estimate.warnings.is_empty());
    }

    #[test]
    fn test_gif_engine_estimate_warns_once_above_50mb() {
        let m = meta(60.0, 1920, 1080, 10);
        let estimate = gif_engine_estimate(&m, &GifSettings::default().with_fps(30));
        assert_eq!(estimate.warnings.len(), 1);
    }

    #[test]
    fn test_webm_engine_estimate_crf_buckets() {
        let size = 100 * 1024 * 1024;
        let high = webm_engine_estimate(size, &WebmSettings::default().with_crf(40));
        let mid = webm_engine_estimate(size, &WebmSettings::default().with_crf(30));
        let low = webm_engine_estimate(size, &WebmSettings::default().with_crf(20));
        assert_eq!(high.estimated_size_mb, 40.0);
        assert_eq!(mid.estimated_size_mb, 60.0);
        assert_eq!(low.estimated_size_mb, 70.0);
    }

    #[test]
    fn test_webm_engine_estimate_codec_time() {
        let size = 10 * 1024 * 1024;
        let vp8 = webm_engine_estimate(size, &WebmSettings::default());
        let vp9 = webm_engine_estimate(size, &WebmSettings::default().with_codec(VideoCodec::Vp9));
        assert_eq!(vp8.estimated_time_secs, 15.0);
        assert_eq!(vp9.estimated_time_secs, 20.0);
    }

    #[test]
    fn test_webm_engine_estimate_warning() {
        let estimate = webm_engine_estimate(200 * 1024 * 1024, &WebmSettings::default().with_crf(10));
        assert_eq!(estimate.warnings.len(), 1);
        assert!(estimate.warnings[0].contains("100MB"));
    }
}
