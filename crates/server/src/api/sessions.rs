//! Conversion session handlers.
//!
//! Sessions run in a spawned task and live in memory until the process
//! exits. Clients poll the status and then download each output.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use shareclip_core::metadata::{infer_codec, infer_fps, validate_upload};
use shareclip_core::presets::DEFAULT_PRESET;
use shareclip_core::session::SessionPhase;
use shareclip_core::{
    ConversionRequest, FileResource, MetadataError, OutputFormat, SessionHandle, SessionStatus,
    VideoMetadata,
};

use super::handlers::parse_formats;
use super::upload::read_upload;
use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub id: String,
    pub preset: String,
    pub metadata: VideoMetadata,
    pub warnings: Vec<String>,
    pub status: SessionStatus,
}

/// Start a session from a multipart upload.
///
/// Fields: `file` (required), `formats` (comma separated, default both),
/// `preset` (default `balanced`).
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let form = read_upload(multipart).await?;
    let formats = match form.field("formats") {
        Some(raw) => parse_formats(raw)?,
        None => OutputFormat::ALL.to_vec(),
    };
    let preset = state
        .presets()
        .find(form.field("preset").unwrap_or(DEFAULT_PRESET))
        .clone();

    let resource = Arc::new(form.file);
    validate_upload(&resource, &state.config().limits)?;

    let (metadata, warnings) = match state.analyzer().analyze(&resource).await {
        Ok(analyzed) => (analyzed.metadata, analyzed.warnings),
        // Conversion can still go ahead, only the estimates suffer.
        Err(e @ (MetadataError::AnalysisTimeout { .. } | MetadataError::LoadError { .. })) => {
            warn!(file = %resource.name, error = %e, "Proceeding without metadata");
            (unprobed_metadata(&resource), vec![e.user_message()])
        }
        Err(e) => return Err(e.into()),
    };

    let request = ConversionRequest::from_preset(formats, &preset, Some(&metadata));
    let handle = Arc::new(SessionHandle::new());
    state.insert_session(Arc::clone(&handle)).await;
    info!(
        session = %handle.id(),
        file = %resource.name,
        preset = %preset.name,
        "Created conversion session"
    );

    {
        let state = Arc::clone(&state);
        let handle = Arc::clone(&handle);
        let metadata = metadata.clone();
        tokio::spawn(async move {
            state
                .orchestrator()
                .run(&handle, resource, &metadata, &request, None)
                .await;
        });
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateSessionResponse {
            id: handle.id().to_string(),
            preset: preset.name,
            metadata,
            warnings,
            status: handle.snapshot(),
        }),
    ))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatus>, ApiError> {
    let handle = find_session(&state, &id).await?;
    Ok(Json(handle.snapshot()))
}

pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatus>, ApiError> {
    let handle = find_session(&state, &id).await?;
    handle.cancel();
    info!(session = %id, "Cancelled conversion session");
    Ok(Json(handle.snapshot()))
}

pub async fn get_output(
    State(state): State<Arc<AppState>>,
    Path((id, format)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let format: OutputFormat = format.parse().map_err(ApiError::not_found)?;
    let handle = find_session(&state, &id).await?;

    let Some(results) = handle.result() else {
        return Err(match handle.snapshot().phase {
            SessionPhase::Running => ApiError::Conflict("Conversion is still running".to_string()),
            _ => ApiError::not_found("Session has no results"),
        });
    };
    let bytes = results
        .output(format)
        .ok_or_else(|| ApiError::not_found(format!("No {} output for this session", format)))?
        .to_vec();

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.{}\"", id, format.extension()),
            ),
        ],
        bytes,
    ))
}

async fn find_session(state: &AppState, id: &str) -> Result<Arc<SessionHandle>, ApiError> {
    state
        .session(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Session not found: {}", id)))
}

/// Stand-in metadata when the upload could not be probed.
///
/// Dimensions and duration stay zero so predictions fall back to their
/// lower clamps.
fn unprobed_metadata(resource: &FileResource) -> VideoMetadata {
    let extension = resource.extension();
    VideoMetadata {
        duration: 0.0,
        width: 0,
        height: 0,
        fps: infer_fps(extension.as_deref()),
        size: resource.size(),
        codec: infer_codec(extension.as_deref()).to_string(),
    }
}
