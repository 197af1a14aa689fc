//! Mock metadata probe for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::metadata::{MetadataError, MetadataProbe, ProbedStream};

/// Probe returning a fixed stream description or a fixed failure.
#[derive(Debug)]
pub struct MockProbe {
    outcome: Result<ProbedStream, String>,
    delay: Duration,
    probed: Arc<RwLock<Vec<String>>>,
}

impl MockProbe {
    pub fn returning(stream: ProbedStream) -> Self {
        Self {
            outcome: Ok(stream),
            delay: Duration::ZERO,
            probed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Probe that always fails with a load error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            delay: Duration::ZERO,
            probed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Simulate a slow probe.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Extensions of the files handed to `probe`, in call order.
    pub async fn probed_extensions(&self) -> Vec<String> {
        self.probed.read().await.clone()
    }
}

#[async_trait]
impl MetadataProbe for MockProbe {
    async fn probe(&self, path: &Path) -> Result<ProbedStream, MetadataError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        self.probed.write().await.push(extension);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.outcome {
            Ok(stream) => Ok(stream.clone()),
            Err(reason) => Err(MetadataError::load_error(reason.clone())),
        }
    }
}
