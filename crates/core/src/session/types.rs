use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::estimate::QualityClass;
use crate::format::{FormatMap, GifSettings, OutputFormat, WebmSettings};
use crate::metadata::VideoMetadata;
use crate::presets::QualityPreset;

/// Per-job state machine: `pending -> processing -> completed | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// One requested format's conversion attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionJobState {
    pub format: OutputFormat,
    pub status: JobStatus,
    /// Percentage in `0..=100`.
    pub progress: u8,
    pub message: String,
    pub estimated_time: Option<f64>,
    pub timeout_seconds: Option<u64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl ConversionJobState {
    pub fn pending(format: OutputFormat) -> Self {
        Self {
            format,
            status: JobStatus::Pending,
            progress: 0,
            message: "Waiting".to_string(),
            estimated_time: None,
            timeout_seconds: None,
            start_time: None,
            end_time: None,
        }
    }

    pub(crate) fn start(&mut self, estimated_time: f64, timeout_seconds: u64) {
        if self.status != JobStatus::Pending {
            return;
        }
        self.status = JobStatus::Processing;
        self.message = format!("Converting to {}", self.format);
        self.estimated_time = Some(estimated_time);
        self.timeout_seconds = Some(timeout_seconds);
        self.start_time = Some(Utc::now());
    }

    /// Progress only moves forward while processing.
    pub(crate) fn advance(&mut self, progress: u8) {
        if self.status == JobStatus::Processing {
            self.progress = self.progress.max(progress.min(100));
        }
    }

    pub(crate) fn complete(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.message = "Done".to_string();
        self.end_time = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, message: String) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Error;
        self.message = message;
        self.end_time = Some(Utc::now());
    }
}

/// What to convert and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub formats: Vec<OutputFormat>,
    #[serde(default)]
    pub gif: GifSettings,
    #[serde(default)]
    pub webm: WebmSettings,
    #[serde(default)]
    pub quality_class: QualityClass,
}

impl ConversionRequest {
    pub fn new(formats: Vec<OutputFormat>) -> Self {
        Self {
            formats,
            gif: GifSettings::default(),
            webm: WebmSettings::default(),
            quality_class: QualityClass::default(),
        }
    }

    /// Settings and speed class taken from a preset.
    pub fn from_preset(
        formats: Vec<OutputFormat>,
        preset: &QualityPreset,
        source: Option<&VideoMetadata>,
    ) -> Self {
        Self {
            formats,
            gif: preset.gif_settings(source),
            webm: preset.webm_settings(),
            quality_class: preset.conversion_time,
        }
    }

    pub fn with_gif(mut self, gif: GifSettings) -> Self {
        self.gif = gif;
        self
    }

    pub fn with_webm(mut self, webm: WebmSettings) -> Self {
        self.webm = webm;
        self
    }

    /// Requested formats in execution order, without duplicates.
    pub fn ordered_formats(&self) -> Vec<OutputFormat> {
        OutputFormat::ALL
            .into_iter()
            .filter(|f| self.formats.contains(f))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultMetadata {
    pub original_size: u64,
    /// Output size in bytes, zero for absent formats.
    pub sizes: FormatMap<u64>,
    /// `size / original_size`, zero for absent formats.
    pub compression_ratio: FormatMap<f64>,
}

/// Outputs of a finished session. Absent formats failed or were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResults {
    pub outputs: FormatMap<Option<Vec<u8>>>,
    pub metadata: ResultMetadata,
}

impl ConversionResults {
    pub fn assemble(original_size: u64, outputs: FormatMap<Option<Vec<u8>>>) -> Self {
        let sizes = FormatMap::from_fn(|format| {
            outputs
                .get(format)
                .as_ref()
                .map(|blob| blob.len() as u64)
                .unwrap_or(0)
        });
        let compression_ratio = FormatMap::from_fn(|format| {
            let size = *sizes.get(format);
            if size == 0 || original_size == 0 {
                0.0
            } else {
                size as f64 / original_size as f64
            }
        });

        Self {
            outputs,
            metadata: ResultMetadata {
                original_size,
                sizes,
                compression_ratio,
            },
        }
    }

    pub fn output(&self, format: OutputFormat) -> Option<&[u8]> {
        self.outputs.get(format).as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Running,
    Completed,
    Cancelled,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub id: String,
    pub phase: SessionPhase,
    pub jobs: Vec<ConversionJobState>,
    pub overall_progress: u8,
    pub created_at: DateTime<Utc>,
    /// When the session completed or was cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultMetadata>,
}
