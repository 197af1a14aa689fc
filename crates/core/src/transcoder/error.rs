use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscoderError {
    /// The host lacks something the executable needs to run at all.
    #[error("transcoder unsupported in this environment: {reason}")]
    Unsupported { reason: String },

    #[error("failed to load transcoder: {reason}")]
    LoadFailed { reason: String },

    #[error("invalid virtual file name: {name:?}")]
    InvalidName { name: String },

    #[error("virtual file not found: {name}")]
    FileNotFound { name: String },

    #[error("execution failed: {reason}")]
    ExecFailed {
        reason: String,
        stderr: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscoderError {
    pub fn exec_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExecFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn load_failed(reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            reason: reason.into(),
        }
    }
}
