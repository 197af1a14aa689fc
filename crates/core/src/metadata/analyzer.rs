use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{
    heuristics::{infer_codec, infer_fps},
    validate_metadata, AnalyzedMetadata, FileResource, MetadataError, MetadataProbe,
    VideoMetadata,
};
use crate::config::{Config, LimitsConfig};

/// Extracts and validates [`VideoMetadata`] for uploaded files.
pub struct MetadataAnalyzer {
    probe: Arc<dyn MetadataProbe>,
    limits: LimitsConfig,
    scratch_dir: PathBuf,
    timeout: Duration,
}

impl MetadataAnalyzer {
    pub fn new(probe: Arc<dyn MetadataProbe>, config: &Config) -> Self {
        Self {
            probe,
            limits: config.limits.clone(),
            scratch_dir: config.transcoder.work_dir.join("probe"),
            timeout: Duration::from_secs(config.transcoder.analysis_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Extract metadata and validate it against the configured limits.
    pub async fn analyze(&self, resource: &FileResource) -> Result<AnalyzedMetadata, MetadataError> {
        let metadata = self.extract(resource).await?;
        let analyzed = validate_metadata(metadata, &self.limits)?;
        debug!(
            name = %resource.name,
            duration = analyzed.metadata.duration,
            width = analyzed.metadata.width,
            height = analyzed.metadata.height,
            warnings = analyzed.warnings.len(),
            "Analyzed video"
        );
        Ok(analyzed)
    }

    async fn extract(&self, resource: &FileResource) -> Result<VideoMetadata, MetadataError> {
        let extension = resource.extension();

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        // Removed on drop, whichever way this function returns.
        let transient = tempfile::Builder::new()
            .prefix("probe-")
            .suffix(&format!(".{}", extension.as_deref().unwrap_or("mp4")))
            .tempfile_in(&self.scratch_dir)?;
        tokio::fs::write(transient.path(), &resource.bytes).await?;

        let probed = match timeout(self.timeout, self.probe.probe(transient.path())).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(name = %resource.name, timeout = ?self.timeout, "Metadata analysis timed out");
                return Err(MetadataError::AnalysisTimeout {
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        Ok(VideoMetadata {
            duration: probed.duration,
            width: probed.width,
            height: probed.height,
            fps: infer_fps(extension.as_deref()),
            size: resource.size(),
            codec: infer_codec(extension.as_deref()).to_string(),
        })
    }
}
