//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::transcoder::{TranscodeProgress, Transcoder, TranscoderError};

/// Minimal GIF header followed by filler, used as default output.
const DEFAULT_OUTPUT: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00mock-output";

/// Transcoder operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscoderOp {
    Load,
    Write,
    Exec,
    Read,
    Delete,
}

/// In-memory implementation of the [`Transcoder`] trait.
///
/// Provides controllable behavior for testing:
/// - Virtual files live in a map; `exec` writes the last argument as output
/// - Every write, exec and delete is recorded for assertions
/// - One-shot failures per operation, or a failure on the n-th exec
/// - Simulated load and exec latency
///
/// # Example
///
/// ```rust,ignore
/// use shareclip_core::testing::MockTranscoder;
///
/// let transcoder = Arc::new(MockTranscoder::new());
/// let engine = GifEngine::new(transcoder.clone());
/// engine.convert(&resource, &GifSettings::default().into(), None).await?;
///
/// assert_eq!(transcoder.recorded_execs().await.len(), 2);
/// assert!(transcoder.remaining_files().await.is_empty());
/// ```
#[derive(Debug)]
pub struct MockTranscoder {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    writes: Arc<RwLock<Vec<String>>>,
    execs: Arc<RwLock<Vec<Vec<String>>>>,
    deletes: Arc<RwLock<Vec<String>>>,
    loads: Arc<RwLock<usize>>,
    next_errors: Arc<RwLock<HashMap<TranscoderOp, TranscoderError>>>,
    fail_exec_index: Arc<RwLock<Option<usize>>>,
    output: Arc<RwLock<Vec<u8>>>,
    exec_delay: Arc<RwLock<Duration>>,
    load_delay: Duration,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(BTreeMap::new())),
            writes: Arc::new(RwLock::new(Vec::new())),
            execs: Arc::new(RwLock::new(Vec::new())),
            deletes: Arc::new(RwLock::new(Vec::new())),
            loads: Arc::new(RwLock::new(0)),
            next_errors: Arc::new(RwLock::new(HashMap::new())),
            fail_exec_index: Arc::new(RwLock::new(None)),
            output: Arc::new(RwLock::new(DEFAULT_OUTPUT.to_vec())),
            exec_delay: Arc::new(RwLock::new(Duration::ZERO)),
            load_delay: Duration::ZERO,
        }
    }

    /// Simulate a slow executable load.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Set the simulated duration of every exec call.
    pub async fn set_exec_delay(&self, delay: Duration) {
        *self.exec_delay.write().await = delay;
    }

    /// Set the bytes every exec writes to its output name.
    pub async fn set_output(&self, bytes: Vec<u8>) {
        *self.output.write().await = bytes;
    }

    /// Configure the next call of `op` to fail with `error`.
    pub async fn set_next_error(&self, op: TranscoderOp, error: TranscoderError) {
        self.next_errors.write().await.insert(op, error);
    }

    /// Configure the next call of `op` to fail with a representative error.
    pub async fn fail_next(&self, op: TranscoderOp) {
        let error = match op {
            TranscoderOp::Load => TranscoderError::load_failed("simulated load failure"),
            TranscoderOp::Exec => TranscoderError::exec_failed("simulated exec failure", None),
            TranscoderOp::Read => TranscoderError::FileNotFound {
                name: "simulated".to_string(),
            },
            TranscoderOp::Write | TranscoderOp::Delete => TranscoderError::Io(
                std::io::Error::new(std::io::ErrorKind::Other, "simulated I/O failure"),
            ),
        };
        self.set_next_error(op, error).await;
    }

    /// Make the exec call with this zero-based index fail.
    pub async fn fail_exec_at(&self, index: usize) {
        *self.fail_exec_index.write().await = Some(index);
    }

    pub async fn load_count(&self) -> usize {
        *self.loads.read().await
    }

    pub async fn recorded_writes(&self) -> Vec<String> {
        self.writes.read().await.clone()
    }

    pub async fn recorded_execs(&self) -> Vec<Vec<String>> {
        self.execs.read().await.clone()
    }

    pub async fn recorded_deletes(&self) -> Vec<String> {
        self.deletes.read().await.clone()
    }

    /// Names still present in the virtual namespace.
    pub async fn remaining_files(&self) -> Vec<String> {
        self.files.read().await.keys().cloned().collect()
    }

    async fn take_error(&self, op: TranscoderOp) -> Option<TranscoderError> {
        self.next_errors.write().await.remove(&op)
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load(&self) -> Result<(), TranscoderError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        *self.loads.write().await += 1;
        match self.take_error(TranscoderOp::Load).await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), TranscoderError> {
        if let Some(err) = self.take_error(TranscoderOp::Write).await {
            return Err(err);
        }
        self.writes.write().await.push(name.to_string());
        self.files.write().await.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn exec(
        &self,
        args: &[String],
        progress: Option<TranscodeProgress>,
    ) -> Result<(), TranscoderError> {
        let index = {
            let mut execs = self.execs.write().await;
            execs.push(args.to_vec());
            execs.len() - 1
        };

        let delay = *self.exec_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error(TranscoderOp::Exec).await {
            return Err(err);
        }
        if *self.fail_exec_index.read().await == Some(index) {
            return Err(TranscoderError::exec_failed(
                format!("simulated failure of exec #{}", index),
                Some("Conversion failed!".to_string()),
            ));
        }

        let inputs: Vec<&String> = args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| &w[1])
            .collect();
        {
            let files = self.files.read().await;
            if let Some(missing) = inputs.iter().find(|name| !files.contains_key(name.as_str())) {
                return Err(TranscoderError::exec_failed(
                    format!("{}: No such file or directory", missing),
                    None,
                ));
            }
        }

        if let Some(callback) = &progress {
            for fraction in [0.0, 0.5, 1.0] {
                callback(fraction);
            }
        }

        let output_name = args
            .last()
            .ok_or_else(|| TranscoderError::exec_failed("no output specified", None))?;
        let output = self.output.read().await.clone();
        self.files.write().await.insert(output_name.clone(), output);
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, TranscoderError> {
        if let Some(err) = self.take_error(TranscoderOp::Read).await {
            return Err(err);
        }
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| TranscoderError::FileNotFound {
                name: name.to_string(),
            })
    }

    async fn delete_file(&self, name: &str) -> Result<(), TranscoderError> {
        self.deletes.write().await.push(name.to_string());
        if let Some(err) = self.take_error(TranscoderOp::Delete).await {
            return Err(err);
        }
        match self.files.write().await.remove(name) {
            Some(_) => Ok(()),
            None => Err(TranscoderError::FileNotFound {
                name: name.to_string(),
            }),
        }
    }
}
