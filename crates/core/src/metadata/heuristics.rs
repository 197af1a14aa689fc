//! Extension-keyed frame rate and codec guesses.
//!
//! Nothing here decodes the bitstream.

/// Frame rate implied by the container extension.
pub fn infer_fps(extension: Option<&str>) -> u32 {
    match extension {
        Some("avi") => 25,
        _ => 30,
    }
}

/// Codec implied by the container extension.
pub fn infer_codec(extension: Option<&str>) -> &'static str {
    match extension {
        Some("mp4") | Some("m4v") | Some("mov") => "h264",
        Some("avi") => "mpeg4",
        Some("webm") => "vp8",
        _ => "unknown",
    }
}
