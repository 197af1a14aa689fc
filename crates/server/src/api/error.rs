//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shareclip_core::{ConversionError, MetadataError, UploadError};
use tracing::warn;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable kind
    pub error: String,
    /// Human-readable message for end users
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Upload(UploadError),
    Metadata(MetadataError),
    Conversion(ConversionError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m.clone()),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
            Self::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.clone()),
            Self::Upload(e) => {
                let status = match e {
                    UploadError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    UploadError::FileTooSmall { .. } => StatusCode::BAD_REQUEST,
                    UploadError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                };
                (status, "validation_error", e.user_message())
            }
            Self::Metadata(e) => {
                let (status, kind) = match e {
                    MetadataError::AnalysisTimeout { .. } => {
                        (StatusCode::GATEWAY_TIMEOUT, "analysis_timeout")
                    }
                    MetadataError::LoadError { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "load_error")
                    }
                    MetadataError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "load_error"),
                    _ => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
                };
                (status, kind, e.user_message())
            }
            Self::Conversion(e) => {
                let status = match e {
                    ConversionError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ConversionError::EnvironmentUnsupported { .. } => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    ConversionError::ConversionTimeout { .. }
                    | ConversionError::AnalysisTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.kind(), e.user_message())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();
        if status.is_server_error() {
            warn!(error = ?self, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: kind.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        Self::Upload(err)
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        Self::Metadata(err)
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(err)
    }
}
