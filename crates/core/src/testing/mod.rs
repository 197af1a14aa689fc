//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the ffmpeg-backed transcoder and ffprobe-backed
//! metadata probe so engines, the analyzer and whole sessions can be tested
//! without any binaries installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use shareclip_core::testing::{fixtures, MockTranscoder};
//!
//! let transcoder = Arc::new(MockTranscoder::new());
//! transcoder.set_exec_delay(Duration::from_millis(50)).await;
//!
//! let resource = fixtures::sample_resource();
//! // Hand the transcoder to GifEngine / WebmEngine...
//! ```

mod mock_probe;
mod mock_transcoder;

pub use mock_probe::MockProbe;
pub use mock_transcoder::{MockTranscoder, TranscoderOp};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::metadata::{FileResource, ProbedStream, VideoMetadata};

    pub const TEN_MB: u64 = 10 * 1024 * 1024;

    /// 10 second 1080p30 clip weighing 10MB.
    pub fn sample_metadata() -> VideoMetadata {
        VideoMetadata {
            duration: 10.0,
            width: 1920,
            height: 1080,
            fps: 30,
            size: TEN_MB,
            codec: "h264".to_string(),
        }
    }

    /// Upload matching [`sample_metadata`], filled with zero bytes.
    pub fn sample_resource() -> FileResource {
        FileResource::new("sample.mp4", "video/mp4", vec![0; TEN_MB as usize])
    }

    pub fn sample_stream() -> ProbedStream {
        ProbedStream {
            duration: 10.0,
            width: 1920,
            height: 1080,
        }
    }
}
