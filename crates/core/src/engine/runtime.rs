use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ConversionError, EngineState, ProgressObserver};
use crate::format::OutputFormat;
use crate::metadata::FileResource;
use crate::transcoder::{TranscodeProgress, Transcoder, TranscoderError};

const FALLBACK_INPUT_EXTENSION: &str = "mp4";

/// Transcoder handle plus its lazy one-time load.
pub(crate) struct EngineRuntime {
    transcoder: Arc<dyn Transcoder>,
    ready: OnceCell<()>,
    initializing: AtomicBool,
    format: OutputFormat,
}

impl EngineRuntime {
    pub(crate) fn new(transcoder: Arc<dyn Transcoder>, format: OutputFormat) -> Self {
        Self {
            transcoder,
            ready: OnceCell::new(),
            initializing: AtomicBool::new(false),
            format,
        }
    }

    pub(crate) fn transcoder(&self) -> &dyn Transcoder {
        self.transcoder.as_ref()
    }

    pub(crate) fn state(&self) -> EngineState {
        if self.ready.initialized() {
            EngineState::Ready
        } else if self.initializing.load(Ordering::SeqCst) {
            EngineState::Initializing
        } else {
            EngineState::Uninitialized
        }
    }

    pub(crate) async fn ensure_ready(&self) -> Result<(), ConversionError> {
        self.ready
            .get_or_try_init(|| async {
                let _flag = InitializingFlag::raise(&self.initializing);
                info!(format = %self.format, backend = self.transcoder.name(), "Initializing conversion engine");
                self.transcoder.load().await.map_err(|e| {
                    warn!(format = %self.format, "Engine initialization failed: {}", e);
                    ConversionError::from_load(e)
                })
            })
            .await
            .map(|_| ())
    }

    pub(crate) fn guard(&self) -> ArtifactGuard {
        ArtifactGuard {
            transcoder: Arc::clone(&self.transcoder),
            names: Vec::new(),
        }
    }
}

/// Holds `initializing` high for the duration of a load, including a load
/// whose caller is dropped mid-way.
struct InitializingFlag<'a>(&'a AtomicBool);

impl<'a> InitializingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InitializingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Unique virtual file names for one `convert()` call.
#[derive(Debug, Clone)]
pub(crate) struct VirtualNames {
    pub input: String,
    pub output: String,
    pub palette: String,
}

impl VirtualNames {
    pub(crate) fn for_resource(resource: &FileResource, format: OutputFormat) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        let extension = resource
            .extension()
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| FALLBACK_INPUT_EXTENSION.to_string());

        Self {
            input: format!("input-{}.{}", id, extension),
            output: format!("output-{}.{}", id, format.extension()),
            palette: format!("palette-{}.png", id),
        }
    }
}

/// Deletes every tracked virtual file once the conversion is over.
///
/// Call [`ArtifactGuard::release`] on the normal path. If the owning future
/// is dropped first, `Drop` hands the deletions to the runtime instead.
pub(crate) struct ArtifactGuard {
    transcoder: Arc<dyn Transcoder>,
    names: Vec<String>,
}

impl ArtifactGuard {
    pub(crate) fn track(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    pub(crate) async fn release(mut self) {
        let names = std::mem::take(&mut self.names);
        delete_all(self.transcoder.as_ref(), names).await;
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if self.names.is_empty() {
            return;
        }
        let names = std::mem::take(&mut self.names);
        let transcoder = Arc::clone(&self.transcoder);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { delete_all(transcoder.as_ref(), names).await });
            }
            Err(_) => warn!(count = names.len(), "No runtime to clean up virtual files"),
        }
    }
}

async fn delete_all(transcoder: &dyn Transcoder, names: Vec<String>) {
    for name in names {
        match transcoder.delete_file(&name).await {
            Ok(()) => debug!(name = %name, "Deleted virtual file"),
            // Never created, e.g. an output after a failed pass.
            Err(TranscoderError::FileNotFound { .. }) => {}
            Err(e) => warn!(name = %name, "Failed to delete virtual file: {}", e),
        }
    }
}

/// Maps one pass's 0..1 progress into its slice of an overall 0..100 range.
pub(crate) fn pass_progress(
    observer: Option<&ProgressObserver>,
    pass: usize,
    passes: usize,
) -> Option<TranscodeProgress> {
    let observer = Arc::clone(observer?);
    let passes = passes.max(1) as f64;
    let offset = pass as f64;
    Some(Arc::new(move |fraction: f64| {
        let overall = (offset + fraction.clamp(0.0, 1.0)) / passes * 100.0;
        observer(overall.round() as u8);
    }))
}

/// Write the input, run each invocation in order, read the output back.
pub(crate) async fn run_invocations(
    transcoder: &dyn Transcoder,
    resource: &FileResource,
    names: &VirtualNames,
    invocations: &[&[String]],
    observer: Option<&ProgressObserver>,
) -> Result<Vec<u8>, ConversionError> {
    transcoder
        .write_file(&names.input, &resource.bytes)
        .await
        .map_err(|e| ConversionError::execution_failed(format!("cannot stage input: {}", e), None))?;

    let passes = invocations.len();
    for (pass, args) in invocations.iter().enumerate() {
        debug!(pass = pass + 1, passes, "Executing transcode pass");
        transcoder
            .exec(args, pass_progress(observer, pass, passes))
            .await
            .map_err(ConversionError::from_exec)?;
    }

    let bytes = transcoder
        .read_file(&names.output)
        .await
        .map_err(|e| ConversionError::DecodeFailed {
            name: names.output.clone(),
            reason: e.to_string(),
        })?;
    if bytes.is_empty() {
        return Err(ConversionError::DecodeFailed {
            name: names.output.clone(),
            reason: "output is empty".to_string(),
        });
    }

    if let Some(observer) = observer {
        observer(100);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_virtual_names_unique_and_extension_aware() {
        let resource = FileResource::new("clip.MOV", "video/quicktime", vec![]);
        let a = VirtualNames::for_resource(&resource, OutputFormat::Gif);
        let b = VirtualNames::for_resource(&resource, OutputFormat::Gif);

        assert_ne!(a.input, b.input);
        assert!(a.input.starts_with("input-") && a.input.ends_with(".mov"));
        assert!(a.output.ends_with(".gif"));
        assert!(a.palette.ends_with(".png"));
    }

    #[test]
    fn test_virtual_names_fallback_extension() {
        for name in ["clip", "weird.m/p4"] {
            let resource = FileResource::new(name, "video/mp4", vec![]);
            let names = VirtualNames::for_resource(&resource, OutputFormat::WebM);
            assert!(names.input.ends_with(".mp4"), "{}", names.input);
        }
    }

    #[test]
    fn test_pass_progress_spans_both_passes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer: ProgressObserver = Arc::new(move |p| sink.lock().unwrap().push(p));

        let first = pass_progress(Some(&observer), 0, 2).unwrap();
        let second = pass_progress(Some(&observer), 1, 2).unwrap();
        first(0.0);
        first(1.0);
        second(0.0);
        second(0.5);
        second(1.0);

        assert_eq!(*seen.lock().unwrap(), vec![0, 50, 50, 75, 100]);
    }

    #[tokio::test]
    async fn test_abandoned_load_resets_state() {
        use crate::testing::MockTranscoder;
        use std::time::Duration;

        let transcoder =
            Arc::new(MockTranscoder::new().with_load_delay(Duration::from_millis(200)));
        let runtime = Arc::new(EngineRuntime::new(transcoder.clone(), OutputFormat::WebM));

        let loading = {
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move { runtime.ensure_ready().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(runtime.state(), EngineState::Initializing);

        loading.abort();
        let _ = loading.await;
        assert_eq!(runtime.state(), EngineState::Uninitialized);

        // A later call still loads.
        runtime.ensure_ready().await.unwrap();
        assert_eq!(runtime.state(), EngineState::Ready);
    }

    #[test]
    fn test_pass_progress_without_observer() {
        assert!(pass_progress(None, 0, 1).is_none());
    }
}
