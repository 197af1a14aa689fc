use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::runtime::{run_invocations, EngineRuntime, VirtualNames};
use super::{ConversionEngine, ConversionError, EngineState, ProgressObserver};
use crate::command::build_webm_args;
use crate::estimate::{webm_engine_estimate, EstimateResult};
use crate::format::{ConversionSettings, OutputFormat, WebmSettings};
use crate::metadata::{FileResource, VideoMetadata};
use crate::transcoder::Transcoder;

const MAX_CRF: u8 = 63;

/// Produces silent VP8/VP9 WebM video.
pub struct WebmEngine {
    runtime: EngineRuntime,
}

impl WebmEngine {
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            runtime: EngineRuntime::new(transcoder, OutputFormat::WebM),
        }
    }

    fn settings<'a>(settings: &'a ConversionSettings) -> Result<&'a WebmSettings, ConversionError> {
        match settings {
            ConversionSettings::WebM(webm) if webm.crf > MAX_CRF => Err(
                ConversionError::validation(format!("CRF must be between 0 and {}", MAX_CRF)),
            ),
            ConversionSettings::WebM(webm) => Ok(webm),
            other => Err(ConversionError::validation(format!(
                "WebM engine cannot apply {} settings",
                other.format()
            ))),
        }
    }
}

#[async_trait]
impl ConversionEngine for WebmEngine {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebM
    }

    fn state(&self) -> EngineState {
        self.runtime.state()
    }

    async fn initialize(&self) -> Result<(), ConversionError> {
        self.runtime.ensure_ready().await
    }

    async fn convert(
        &self,
        resource: &FileResource,
        settings: &ConversionSettings,
        observer: Option<ProgressObserver>,
    ) -> Result<Vec<u8>, ConversionError> {
        let settings = Self::settings(settings)?;
        self.runtime.ensure_ready().await?;

        let names = VirtualNames::for_resource(resource, OutputFormat::WebM);
        let args = build_webm_args(&names.input, &names.output, settings);

        let mut guard = self.runtime.guard();
        guard.track(&names.input);
        guard.track(&names.output);

        info!(
            name = %resource.name,
            codec = ?settings.codec,
            crf = settings.crf,
            "Starting WebM conversion"
        );
        let result = run_invocations(
            self.runtime.transcoder(),
            resource,
            &names,
            &[args.as_slice()],
            observer.as_ref(),
        )
        .await;
        guard.release().await;
        result
    }

    async fn estimate(
        &self,
        metadata: &VideoMetadata,
        settings: &ConversionSettings,
    ) -> Result<EstimateResult, ConversionError> {
        let settings = Self::settings(settings)?;
        Ok(webm_engine_estimate(metadata.size, settings))
    }
}
