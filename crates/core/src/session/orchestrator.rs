use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::handle::SessionHandle;
use super::race::{race, Raced};
use super::types::{ConversionRequest, ConversionResults};
use crate::config::SessionConfig;
use crate::engine::{ConversionEngine, ConversionError, ProgressObserver};
use crate::estimate::{calculate_timeout, predict_conversion_time, EstimateCache};
use crate::format::{ConversionSettings, FormatMap, OutputFormat};
use crate::metadata::{FileResource, VideoMetadata};

/// Called once with the results of a session that was not cancelled.
pub type CompletionCallback = Box<dyn FnOnce(Arc<ConversionResults>) + Send>;

/// Drives the conversion engines for one session at a time.
pub struct SessionOrchestrator {
    engines: FormatMap<Arc<dyn ConversionEngine>>,
    config: SessionConfig,
    cache: Arc<EstimateCache>,
    timeout_override: Option<Duration>,
}

impl SessionOrchestrator {
    pub fn new(
        engines: FormatMap<Arc<dyn ConversionEngine>>,
        config: SessionConfig,
        cache: Arc<EstimateCache>,
    ) -> Self {
        Self {
            engines,
            config,
            cache,
            timeout_override: None,
        }
    }

    /// Use a fixed WebM deadline instead of the predicted one.
    pub fn with_timeout_override(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    pub fn engine(&self, format: OutputFormat) -> &Arc<dyn ConversionEngine> {
        self.engines.get(format)
    }

    pub fn cache(&self) -> &Arc<EstimateCache> {
        &self.cache
    }

    /// Drop every memoized size estimate.
    pub fn clear_cache(&self) {
        let entries = self.cache.len();
        self.cache.clear();
        debug!(entries, "Cleared estimate cache");
    }

    /// Convert `resource` into every requested format.
    ///
    /// Jobs run one at a time, GIF first. A failed job is recorded on the
    /// handle and the session moves on; this never returns an error.
    pub async fn run(
        &self,
        handle: &Arc<SessionHandle>,
        resource: Arc<FileResource>,
        metadata: &VideoMetadata,
        request: &ConversionRequest,
        on_complete: Option<CompletionCallback>,
    ) -> Arc<ConversionResults> {
        let formats = request.ordered_formats();
        handle.reset_jobs(&formats);
        info!(
            session = %handle.id(),
            file = %resource.name,
            formats = ?formats,
            "Starting conversion session"
        );

        let mut outputs: FormatMap<Option<Vec<u8>>> = FormatMap::default();
        for format in formats {
            if handle.is_cancelled() {
                info!(session = %handle.id(), %format, "Session cancelled, skipping job");
                break;
            }

            let estimated = predict_conversion_time(metadata, format, request.quality_class);
            let timeout_secs = calculate_timeout(estimated, &self.config);
            handle.update_job(format, |job| job.start(estimated, timeout_secs));

            let settings = match format {
                OutputFormat::Gif => ConversionSettings::Gif(request.gif.clone()),
                OutputFormat::WebM => ConversionSettings::WebM(request.webm.clone()),
            };
            let deadline = match format {
                OutputFormat::Gif => None,
                OutputFormat::WebM => Some(
                    self.timeout_override
                        .unwrap_or(Duration::from_secs(timeout_secs)),
                ),
            };

            match self
                .run_job(handle, format, resource.clone(), settings, deadline)
                .await
            {
                Ok(blob) => {
                    debug!(
                        session = %handle.id(),
                        %format,
                        bytes = blob.len(),
                        advisory_bytes = self.cache.size(format, metadata),
                        "Job completed"
                    );
                    handle.update_job(format, |job| job.complete());
                    outputs.insert(format, Some(blob));
                }
                Err(e) => {
                    error!(session = %handle.id(), %format, error = %e, "Job failed");
                    handle.update_job(format, |job| job.fail(e.user_message()));
                }
            }
        }

        let results = Arc::new(ConversionResults::assemble(resource.size(), outputs));
        if handle.finish(results.clone()) {
            info!(
                session = %handle.id(),
                sizes = ?results.metadata.sizes,
                "Conversion session completed"
            );
            if let Some(callback) = on_complete {
                callback(results.clone());
            }
        } else {
            info!(session = %handle.id(), "Conversion session cancelled");
        }
        results
    }

    async fn run_job(
        &self,
        handle: &Arc<SessionHandle>,
        format: OutputFormat,
        resource: Arc<FileResource>,
        settings: ConversionSettings,
        deadline: Option<Duration>,
    ) -> Result<Vec<u8>, ConversionError> {
        let engine = self.engines.get(format).clone();
        let observer: ProgressObserver = {
            let handle = handle.clone();
            Arc::new(move |pct| handle.update_job(format, |job| job.advance(pct)))
        };

        let Some(limit) = deadline else {
            return engine.convert(&resource, &settings, Some(observer)).await;
        };

        // Spawned so a conversion that loses the race still finishes and
        // deletes its artifacts.
        let task = tokio::spawn(async move {
            engine.convert(&resource, &settings, Some(observer)).await
        });

        match race(task, limit).await {
            Raced::Settled(Ok(result)) => result,
            Raced::Settled(Err(join_err)) => Err(ConversionError::execution_failed(
                format!("conversion task aborted: {}", join_err),
                None,
            )),
            Raced::TimedOut => {
                warn!(
                    session = %handle.id(),
                    %format,
                    timeout_secs = limit.as_secs_f64(),
                    "Conversion timed out, abandoning job"
                );
                Err(ConversionError::ConversionTimeout {
                    timeout_secs: limit.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GifEngine, WebmEngine};
    use crate::session::{JobStatus, SessionPhase};
    use crate::testing::fixtures::{sample_metadata, sample_resource};
    use crate::testing::{MockTranscoder, TranscoderOp};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn orchestrator(transcoder: Arc<MockTranscoder>) -> SessionOrchestrator {
        let engines: FormatMap<Arc<dyn ConversionEngine>> = FormatMap::new(
            Arc::new(GifEngine::new(transcoder.clone())),
            Arc::new(WebmEngine::new(transcoder)),
        );
        SessionOrchestrator::new(
            engines,
            SessionConfig::default(),
            Arc::new(EstimateCache::new()),
        )
    }

    fn both() -> ConversionRequest {
        ConversionRequest::new(OutputFormat::ALL.to_vec())
    }

    #[tokio::test]
    async fn test_runs_gif_before_webm() {
        let transcoder = Arc::new(MockTranscoder::new());
        let orchestrator = orchestrator(transcoder.clone());
        let handle = Arc::new(SessionHandle::new());
        let request = ConversionRequest::new(vec![OutputFormat::WebM, OutputFormat::Gif]);

        let results = orchestrator
            .run(
                &handle,
                Arc::new(sample_resource()),
                &sample_metadata(),
                &request,
                None,
            )
            .await;

        let execs = transcoder.recorded_execs().await;
        // Two GIF passes, then the WebM encode.
        assert_eq!(execs.len(), 3);
        assert!(execs[2].iter().any(|a| a.starts_with("libvpx")));
        assert!(results.output(OutputFormat::Gif).is_some());
        assert!(results.output(OutputFormat::WebM).is_some());

        let status = handle.snapshot();
        assert_eq!(status.phase, SessionPhase::Completed);
        assert_eq!(status.overall_progress, 100);
        assert!(status
            .jobs
            .iter()
            .all(|j| j.status == JobStatus::Completed && j.timeout_seconds.is_some()));
    }

    #[tokio::test]
    async fn test_job_failure_does_not_abort_session() {
        let transcoder = Arc::new(MockTranscoder::new());
        transcoder.fail_next(TranscoderOp::Exec).await;
        let orchestrator = orchestrator(transcoder.clone());
        let handle = Arc::new(SessionHandle::new());

        let results = orchestrator
            .run(
                &handle,
                Arc::new(sample_resource()),
                &sample_metadata(),
                &both(),
                None,
            )
            .await;

        assert!(results.output(OutputFormat::Gif).is_none());
        assert!(results.output(OutputFormat::WebM).is_some());
        assert_eq!(results.metadata.sizes.gif, 0);
        assert_eq!(results.metadata.compression_ratio.gif, 0.0);

        let gif = handle.job(OutputFormat::Gif).unwrap();
        assert_eq!(gif.status, JobStatus::Error);
        assert_eq!(
            gif.message,
            ConversionError::execution_failed("x", None).user_message()
        );
        assert!(transcoder.remaining_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_settings_become_job_error() {
        let transcoder = Arc::new(MockTranscoder::new());
        let orchestrator = orchestrator(transcoder);
        let handle = Arc::new(SessionHandle::new());
        let mut request = both();
        request.webm.crf = 80;

        let results = orchestrator
            .run(
                &handle,
                Arc::new(sample_resource()),
                &sample_metadata(),
                &request,
                None,
            )
            .await;

        assert!(results.output(OutputFormat::Gif).is_some());
        assert_eq!(
            handle.job(OutputFormat::WebM).unwrap().status,
            JobStatus::Error
        );
    }

    #[tokio::test]
    async fn test_on_complete_invoked_once() {
        let transcoder = Arc::new(MockTranscoder::new());
        let orchestrator = orchestrator(transcoder);
        let handle = Arc::new(SessionHandle::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        orchestrator
            .run(
                &handle,
                Arc::new(sample_resource()),
                &sample_metadata(),
                &ConversionRequest::new(vec![OutputFormat::Gif]),
                Some(Box::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handle.result().is_some());
        assert!(handle.job(OutputFormat::WebM).is_none());
    }

    #[tokio::test]
    async fn test_cancel_suppresses_completion() {
        let transcoder = Arc::new(MockTranscoder::new());
        transcoder.set_exec_delay(Duration::from_millis(50)).await;
        let orchestrator = Arc::new(orchestrator(transcoder.clone()));
        let handle = Arc::new(SessionHandle::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let task = {
            let orchestrator = orchestrator.clone();
            let handle = handle.clone();
            tokio::spawn(async move {
                orchestrator
                    .run(
                        &handle,
                        Arc::new(sample_resource()),
                        &sample_metadata(),
                        &both(),
                        Some(Box::new(move |_| {
                            counter.fetch_add(1, Ordering::SeqCst);
                        })),
                    )
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        let results = task.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(handle.result().is_none());
        assert_eq!(handle.snapshot().phase, SessionPhase::Cancelled);
        // The GIF job in flight finished; WebM never started.
        assert!(results.output(OutputFormat::Gif).is_some());
        assert_eq!(
            handle.job(OutputFormat::WebM).unwrap().status,
            JobStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_webm_timeout_keeps_gif() {
        let transcoder = Arc::new(MockTranscoder::new());
        let orchestrator =
            orchestrator(transcoder.clone()).with_timeout_override(Duration::from_millis(30));
        let handle = Arc::new(SessionHandle::new());
        let request = ConversionRequest::new(vec![OutputFormat::WebM]);
        transcoder.set_exec_delay(Duration::from_millis(200)).await;

        let results = orchestrator
            .run(
                &handle,
                Arc::new(sample_resource()),
                &sample_metadata(),
                &request,
                None,
            )
            .await;

        assert!(results.output(OutputFormat::WebM).is_none());
        let webm = handle.job(OutputFormat::WebM).unwrap();
        assert_eq!(webm.status, JobStatus::Error);
        assert_eq!(
            webm.message,
            ConversionError::ConversionTimeout { timeout_secs: 0 }.user_message()
        );

        // The abandoned conversion still cleans up after itself.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(transcoder.remaining_files().await.is_empty());
    }

    #[test]
    fn test_clear_cache() {
        let orchestrator = orchestrator(Arc::new(MockTranscoder::new()));
        orchestrator.cache().gif_size(&sample_metadata());
        assert_eq!(orchestrator.cache().len(), 1);

        orchestrator.clear_cache();
        assert!(orchestrator.cache().is_empty());
    }
}
