use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::runtime::{run_invocations, EngineRuntime, VirtualNames};
use super::{ConversionEngine, ConversionError, EngineState, ProgressObserver};
use crate::command::build_gif_plan;
use crate::estimate::{gif_engine_estimate, EstimateResult};
use crate::format::{ConversionSettings, GifSettings, OutputFormat};
use crate::metadata::{FileResource, VideoMetadata};
use crate::transcoder::Transcoder;

/// Produces animated GIFs, optionally through the two-pass palette pipeline.
pub struct GifEngine {
    runtime: EngineRuntime,
}

impl GifEngine {
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            runtime: EngineRuntime::new(transcoder, OutputFormat::Gif),
        }
    }

    fn settings<'a>(settings: &'a ConversionSettings) -> Result<&'a GifSettings, ConversionError> {
        match settings {
            ConversionSettings::Gif(gif) if gif.fps == 0 => {
                Err(ConversionError::validation("GIF frame rate must be positive"))
            }
            ConversionSettings::Gif(gif) => Ok(gif),
            other => Err(ConversionError::validation(format!(
                "GIF engine cannot apply {} settings",
                other.format()
            ))),
        }
    }
}

#[async_trait]
impl ConversionEngine for GifEngine {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
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

        let names = VirtualNames::for_resource(resource, OutputFormat::Gif);
        let plan = build_gif_plan(&names.input, &names.output, &names.palette, settings);

        let mut guard = self.runtime.guard();
        guard.track(&names.input);
        for intermediate in plan.intermediates() {
            guard.track(intermediate);
        }
        guard.track(&names.output);

        info!(
            name = %resource.name,
            two_pass = plan.is_two_pass(),
            fps = settings.fps,
            "Starting GIF conversion"
        );
        let result = run_invocations(
            self.runtime.transcoder(),
            resource,
            &names,
            &plan.invocations(),
            observer.as_ref(),
        )
        .await;
        guard.release().await;

        if let Ok(bytes) = &result {
            debug!(bytes = bytes.len(), "GIF conversion finished");
        }
        result
    }

    async fn estimate(
        &self,
        metadata: &VideoMetadata,
        settings: &ConversionSettings,
    ) -> Result<EstimateResult, ConversionError> {
        let settings = Self::settings(settings)?;
        Ok(gif_engine_estimate(metadata, settings))
    }
}
