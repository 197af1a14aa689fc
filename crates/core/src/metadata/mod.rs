//! Video metadata extraction and validation.
//!
//! Duration and dimensions come from a [`MetadataProbe`] (ffprobe in
//! production). Frame rate and codec are *not* measured: they are inferred
//! from the container extension by [`infer_fps`] and [`infer_codec`]. This is
//! a known approximation that callers should treat as advisory.
//!
//! # Example
//!
//! ```rust,ignore
//! use shareclip_core::metadata::{FfprobeProbe, FileResource, MetadataAnalyzer};
//!
//! let analyzer = MetadataAnalyzer::new(Arc::new(FfprobeProbe::new(&config.transcoder)), &config);
//! let resource = FileResource::new("clip.mp4", "video/mp4", bytes);
//! let analyzed = analyzer.analyze(&resource).await?;
//! println!("{}x{} for {:.1}s", analyzed.metadata.width, analyzed.metadata.height, analyzed.metadata.duration);
//! ```

mod analyzer;
mod error;
mod heuristics;
mod probe;
mod types;
mod upload;
mod validate;

pub use analyzer::MetadataAnalyzer;
pub use error::{MetadataError, UploadError};
pub use heuristics::{infer_codec, infer_fps};
pub use probe::{FfprobeProbe, MetadataProbe, ProbedStream};
pub use types::{AnalyzedMetadata, FileResource, VideoMetadata};
pub use upload::validate_upload;
pub use validate::validate_metadata;
