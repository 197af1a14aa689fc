use async_trait::async_trait;
use std::sync::Arc;

use super::TranscoderError;

/// Receives execution progress as a fraction in `0.0..=1.0`.
///
/// Called synchronously from the reader loop; implementations must not block.
pub type TranscodeProgress = Arc<dyn Fn(f64) + Send + Sync>;

/// An argument-vector-driven transcode executable with a virtual filesystem.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Prepare the executable. Called once per engine before any other call.
    async fn load(&self) -> Result<(), TranscoderError>;

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), TranscoderError>;

    /// Run one invocation to completion.
    async fn exec(
        &self,
        args: &[String],
        progress: Option<TranscodeProgress>,
    ) -> Result<(), TranscoderError>;

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, TranscoderError>;

    async fn delete_file(&self, name: &str) -> Result<(), TranscoderError>;
}
