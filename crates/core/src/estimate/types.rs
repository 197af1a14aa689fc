use serde::{Deserialize, Serialize};

/// Size, time and warnings predicted for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    /// Predicted output size in megabytes, rounded.
    pub estimated_size_mb: f64,
    /// Predicted processing time in seconds, rounded.
    pub estimated_time_secs: f64,
    pub warnings: Vec<String>,
}

/// Qualitative speed class of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityClass {
    Fast,
    #[default]
    Medium,
    Slow,
}

impl QualityClass {
    /// Multiplier applied to a baseline processing time.
    pub fn time_multiplier(&self) -> f64 {
        match self {
            QualityClass::Fast => 0.5,
            QualityClass::Medium => 1.0,
            QualityClass::Slow => 2.5,
        }
    }
}
