//! The transcode executable boundary.
//!
//! A [`Transcoder`] is a batch executor driven by argument vectors over a
//! private namespace of named virtual files. [`FfmpegTranscoder`] backs that
//! namespace with a per-instance scratch directory and runs the system
//! ffmpeg binary inside it.

mod error;
mod ffmpeg;
mod traits;

pub use error::TranscoderError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::{TranscodeProgress, Transcoder};
