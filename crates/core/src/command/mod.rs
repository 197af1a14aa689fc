//! ffmpeg argument synthesis for each output format.
//!
//! Pure functions: settings in, argument vectors out. No I/O happens here,
//! and nothing here validates the ffmpeg grammar beyond what it builds.

mod gif;
mod webm;

pub use gif::{build_gif_plan, gif_filter_chain, GifPlan};
pub use webm::{build_webm_args, encoder_effort, EncoderEffort};

/// `scale=` fragment for optional target dimensions.
///
/// A missing side keeps the aspect ratio (`-1`). Nothing is emitted when
/// neither side is set, so the source resolution is preserved.
fn scale_dimensions(width: Option<u32>, height: Option<u32>) -> Option<String> {
    match (width, height) {
        (None, None) => None,
        (w, h) => Some(format!(
            "{}:{}",
            w.map_or_else(|| "-1".to_string(), |v| v.to_string()),
            h.map_or_else(|| "-1".to_string(), |v| v.to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_dimensions() {
        assert_eq!(scale_dimensions(None, None), None);
        assert_eq!(scale_dimensions(Some(640), Some(480)).as_deref(), Some("640:480"));
        assert_eq!(scale_dimensions(Some(640), None).as_deref(), Some("640:-1"));
        assert_eq!(scale_dimensions(None, Some(360)).as_deref(), Some("-1:360"));
    }
}
