use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::ConversionError;
use crate::estimate::EstimateResult;
use crate::format::{ConversionSettings, OutputFormat};
use crate::metadata::{FileResource, VideoMetadata};

/// Receives conversion progress as a percentage in `0..=100`.
///
/// Registered per `convert()` call. Invoked synchronously while the
/// transcoder reports progress, so it must be cheap and must not block.
pub type ProgressObserver = Arc<dyn Fn(u8) + Send + Sync>;

/// Lifecycle of an engine's transcoder handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
}

/// One output format's conversion capability.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    /// The format this engine produces.
    fn format(&self) -> OutputFormat;

    fn state(&self) -> EngineState;

    /// Load the transcoder if needed.
    ///
    /// Idempotent. Concurrent callers share one in-flight load, and a failed
    /// load leaves the engine uninitialized so a later call retries.
    async fn initialize(&self) -> Result<(), ConversionError>;

    /// Convert `resource` and return the output bytes.
    ///
    /// Every virtual file created by the call is deleted before it returns,
    /// on success and on failure.
    async fn convert(
        &self,
        resource: &FileResource,
        settings: &ConversionSettings,
        observer: Option<ProgressObserver>,
    ) -> Result<Vec<u8>, ConversionError>;

    /// Predict output size and processing time. Never touches the transcoder.
    async fn estimate(
        &self,
        metadata: &VideoMetadata,
        settings: &ConversionSettings,
    ) -> Result<EstimateResult, ConversionError>;
}
