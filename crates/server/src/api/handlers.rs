use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use shareclip_core::estimate::{calculate_timeout, format_file_size, predict_conversion_time};
use shareclip_core::metadata::validate_upload;
use shareclip_core::presets::DEFAULT_PRESET;
use shareclip_core::{
    AnalyzedMetadata, ConversionEngine, ConversionSettings, EstimateResult, FormatMap, FormatRecommendation,
    GifSettings, OutputFormat, QualityPreset, SanitizedConfig, UserIntent, VideoMetadata,
    WebmSettings,
};

use super::upload::read_upload;
use super::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn list_presets(State(state): State<Arc<AppState>>) -> Json<Vec<QualityPreset>> {
    Json(state.presets().list().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct RecommendBody {
    #[serde(default)]
    pub intent: UserIntent,
    pub metadata: VideoMetadata,
}

pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecommendBody>,
) -> Json<FormatRecommendation> {
    Json(state.recommender().analyze(&body.intent, &body.metadata))
}

/// Request body for estimates. Explicit settings win over the preset.
#[derive(Debug, Deserialize)]
pub struct EstimateBody {
    pub metadata: VideoMetadata,
    pub preset: Option<String>,
    pub gif: Option<GifSettings>,
    pub webm: Option<WebmSettings>,
}

#[derive(Debug, Serialize)]
pub struct FormatEstimate {
    pub estimate: EstimateResult,
    /// Advisory size used for recommendations
    pub advisory_size: String,
    pub predicted_time_secs: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub preset: String,
    pub estimates: FormatMap<FormatEstimate>,
}

pub async fn estimate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EstimateBody>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let preset = state
        .presets()
        .find(body.preset.as_deref().unwrap_or(DEFAULT_PRESET));
    let gif = body
        .gif
        .unwrap_or_else(|| preset.gif_settings(Some(&body.metadata)));
    let webm = body.webm.unwrap_or_else(|| preset.webm_settings());

    let gif = format_estimate(&state, &body.metadata, preset, gif.into()).await?;
    let webm = format_estimate(&state, &body.metadata, preset, webm.into()).await?;

    Ok(Json(EstimateResponse {
        preset: preset.name.clone(),
        estimates: FormatMap::new(gif, webm),
    }))
}

async fn format_estimate(
    state: &AppState,
    metadata: &VideoMetadata,
    preset: &QualityPreset,
    settings: ConversionSettings,
) -> Result<FormatEstimate, ApiError> {
    let format = settings.format();
    let orchestrator = state.orchestrator();
    let estimate = orchestrator
        .engine(format)
        .estimate(metadata, &settings)
        .await?;
    let predicted = predict_conversion_time(metadata, format, preset.conversion_time);

    Ok(FormatEstimate {
        estimate,
        advisory_size: format_file_size(orchestrator.cache().size(format, metadata) as u64),
        predicted_time_secs: predicted,
        timeout_secs: calculate_timeout(predicted, &state.config().session),
    })
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalyzedMetadata>, ApiError> {
    let form = read_upload(multipart).await?;
    validate_upload(&form.file, &state.config().limits)?;

    let analyzed = state.analyzer().analyze(&form.file).await?;
    info!(
        file = %form.file.name,
        duration = analyzed.metadata.duration,
        warnings = analyzed.warnings.len(),
        "Analyzed upload"
    );
    Ok(Json(analyzed))
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.orchestrator().clear_cache();
    StatusCode::NO_CONTENT
}

/// Parse a comma separated list of formats.
pub(crate) fn parse_formats(raw: &str) -> Result<Vec<OutputFormat>, ApiError> {
    let formats = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<OutputFormat>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::bad_request)?;
    if formats.is_empty() {
        return Err(ApiError::bad_request("At least one output format is required"));
    }
    Ok(formats)
}
