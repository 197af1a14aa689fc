//! Error types for conversion engines.

use thiserror::Error;

use crate::metadata::{MetadataError, UploadError};
use crate::transcoder::TranscoderError;

/// Errors surfaced by conversion engines and the session boundary.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Bad input file, metadata or settings. User-correctable.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// A required platform capability is missing. Not retryable here.
    #[error("environment unsupported: {reason}")]
    EnvironmentUnsupported { reason: String },

    /// The transcode executable failed to load.
    #[error("transcoder initialization failed: {source}")]
    InitializationFailed {
        #[source]
        source: TranscoderError,
    },

    /// A transcode invocation errored.
    #[error("conversion failed: {reason}")]
    ExecutionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The output artifact could not be read back.
    #[error("failed to read output {name}: {reason}")]
    DecodeFailed { name: String, reason: String },

    /// The adaptive deadline elapsed first.
    #[error("conversion timed out after {timeout_secs} seconds")]
    ConversionTimeout { timeout_secs: u64 },

    #[error("metadata analysis timed out after {timeout_secs} seconds")]
    AnalysisTimeout { timeout_secs: u64 },

    #[error("failed to load video: {reason}")]
    LoadError { reason: String },
}

impl ConversionError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn execution_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Maps a failed `load()` onto the initialization taxonomy.
    pub(crate) fn from_load(err: TranscoderError) -> Self {
        match err {
            TranscoderError::Unsupported { reason } => Self::EnvironmentUnsupported { reason },
            other => Self::InitializationFailed { source: other },
        }
    }

    /// Maps a failed invocation.
    pub(crate) fn from_exec(err: TranscoderError) -> Self {
        match err {
            TranscoderError::Unsupported { reason } => Self::EnvironmentUnsupported { reason },
            TranscoderError::ExecFailed { reason, stderr } => Self::ExecutionFailed { reason, stderr },
            other => Self::execution_failed(other.to_string(), None),
        }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::EnvironmentUnsupported { .. } => "environment_unsupported",
            Self::InitializationFailed { .. } => "initialization_failed",
            Self::ExecutionFailed { .. } => "execution_failed",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::ConversionTimeout { .. } => "conversion_timeout",
            Self::AnalysisTimeout { .. } => "analysis_timeout",
            Self::LoadError { .. } => "load_error",
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InitializationFailed { .. }
                | Self::ExecutionFailed { .. }
                | Self::ConversionTimeout { .. }
        )
    }

    /// Human-readable message shown to end users, one per kind.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { reason } => format!("This video can't be converted: {}.", reason),
            Self::EnvironmentUnsupported { .. } => {
                "Video conversion isn't available on this server.".to_string()
            }
            Self::InitializationFailed { .. } => {
                "The converter failed to start. Please try again.".to_string()
            }
            Self::ExecutionFailed { .. } => {
                "Conversion failed. Try again or pick a faster preset.".to_string()
            }
            Self::DecodeFailed { .. } => {
                "The converted file could not be read back. Please try again.".to_string()
            }
            Self::ConversionTimeout { .. } => {
                "Conversion took too long. Try a shorter clip or a faster preset.".to_string()
            }
            Self::AnalysisTimeout { .. } => {
                "Reading the video took too long. You can still continue without a preview."
                    .to_string()
            }
            Self::LoadError { .. } => "This video could not be read. Try a different file.".to_string(),
        }
    }
}

impl From<MetadataError> for ConversionError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::AnalysisTimeout { timeout_secs } => Self::AnalysisTimeout { timeout_secs },
            MetadataError::LoadError { reason } => Self::LoadError { reason },
            MetadataError::Io(e) => Self::LoadError {
                reason: e.to_string(),
            },
            validation => Self::validation(validation.to_string()),
        }
    }
}

impl From<UploadError> for ConversionError {
    fn from(err: UploadError) -> Self {
        Self::validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_kinds() -> Vec<ConversionError> {
        vec![
            ConversionError::validation("too long"),
            ConversionError::EnvironmentUnsupported {
                reason: "no ffmpeg".into(),
            },
            ConversionError::InitializationFailed {
                source: TranscoderError::load_failed("boom"),
            },
            ConversionError::execution_failed("exit 1", None),
            ConversionError::DecodeFailed {
                name: "output.gif".into(),
                reason: "missing".into(),
            },
            ConversionError::ConversionTimeout { timeout_secs: 60 },
            ConversionError::AnalysisTimeout { timeout_secs: 10 },
            ConversionError::LoadError {
                reason: "bad".into(),
            },
        ]
    }

    #[test]
    fn test_user_messages_distinct_per_kind() {
        let errors = all_kinds();
        let messages: HashSet<String> = errors.iter().map(|e| e.user_message()).collect();
        assert_eq!(messages.len(), errors.len());

        let kinds: HashSet<&str> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = ConversionError::execution_failed("ffmpeg exited with code Some(1)", None);
        assert!(!err.user_message().contains("ffmpeg"));
    }

    #[test]
    fn test_load_mapping() {
        let unsupported = ConversionError::from_load(TranscoderError::Unsupported {
            reason: "missing".into(),
        });
        assert!(matches!(unsupported, ConversionError::EnvironmentUnsupported { .. }));
        assert!(!unsupported.is_retryable());

        let failed = ConversionError::from_load(TranscoderError::load_failed("crashed"));
        assert!(matches!(failed, ConversionError::InitializationFailed { .. }));
        assert!(failed.is_retryable());
    }

    #[test]
    fn test_metadata_mapping() {
        let err: ConversionError = MetadataError::DurationExceeded {
            duration: 400.0,
            max: 300.0,
        }
        .into();
        assert!(matches!(err, ConversionError::Validation { .. }));

        let err: ConversionError = MetadataError::AnalysisTimeout { timeout_secs: 10 }.into();
        assert!(matches!(err, ConversionError::AnalysisTimeout { timeout_secs: 10 }));
    }
}
