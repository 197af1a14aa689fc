//! Error types for metadata analysis and upload validation.

use thiserror::Error;

/// Errors raised while extracting or validating video metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// No metadata arrived within the bounded wait.
    #[error("metadata analysis timed out after {timeout_secs} seconds")]
    AnalysisTimeout { timeout_secs: u64 },

    /// The resource could not be decoded at all.
    #[error("failed to load video: {reason}")]
    LoadError { reason: String },

    #[error("duration {duration:.1}s exceeds maximum of {max:.1}s")]
    DurationExceeded { duration: f64, max: f64 },

    #[error("duration {duration:.2}s is below minimum of {min:.2}s")]
    DurationTooShort { duration: f64, min: f64 },

    #[error("resolution {width}x{height} is outside the supported range")]
    ResolutionOutOfRange { width: u32, height: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetadataError {
    pub fn load_error(reason: impl Into<String>) -> Self {
        Self::LoadError {
            reason: reason.into(),
        }
    }

    /// Whether the failure is about the input itself and fixable by the user.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DurationExceeded { .. }
                | Self::DurationTooShort { .. }
                | Self::ResolutionOutOfRange { .. }
        )
    }

    /// Human-readable message shown to end users.
    pub fn user_message(&self) -> String {
        match self {
            Self::AnalysisTimeout { .. } => {
                "Reading the video took too long. You can still continue without a preview."
                    .to_string()
            }
            Self::LoadError { .. } | Self::Io(_) => {
                "This video could not be read. Try a different file.".to_string()
            }
            Self::DurationExceeded { max, .. } => {
                format!("Videos can be at most {} seconds long.", max.round() as u64)
            }
            Self::DurationTooShort { .. } => "This video is too short to convert.".to_string(),
            Self::ResolutionOutOfRange { .. } => {
                "This video's resolution is not supported.".to_string()
            }
        }
    }
}

/// Errors raised by upload validation before analysis.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file size {size} exceeds limit of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("file size {size} is below minimum of {min} bytes")]
    FileTooSmall { size: u64, min: u64 },

    #[error("unsupported file type: {mime_type}")]
    UnsupportedFormat { mime_type: String },
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            Self::FileTooLarge { max, .. } => {
                format!("Files must be {}MB or smaller.", max / (1024 * 1024))
            }
            Self::FileTooSmall { .. } => "This file is too small to be a video.".to_string(),
            Self::UnsupportedFormat { .. } => {
                "This file type is not supported. Upload an MP4, MOV or AVI video.".to_string()
            }
        }
    }
}
