use async_trait::async_trait;
use regex_lite::Regex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{TranscodeProgress, Transcoder, TranscoderError};
use crate::config::TranscoderConfig;

/// Lines of stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Runs the system ffmpeg inside a private scratch directory.
///
/// Virtual file names are plain file names inside that directory. The
/// directory is removed when the transcoder is dropped.
#[derive(Debug)]
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
    namespace: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(config: &TranscoderConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            namespace: config.work_dir.join(format!("vfs-{}", Uuid::new_v4())),
        }
    }

    /// Scratch directory backing the virtual namespace.
    pub fn namespace(&self) -> &Path {
        &self.namespace
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, TranscoderError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.contains('\0');
        if !valid {
            return Err(TranscoderError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.namespace.join(name))
    }
}

impl Drop for FfmpegTranscoder {
    fn drop(&mut self) {
        if self.namespace.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.namespace) {
                warn!(path = %self.namespace.display(), "Failed to remove transcoder namespace: {}", e);
            }
        }
    }
}

/// Input duration in seconds from ffmpeg's `Duration: HH:MM:SS.ss` banner line.
fn parse_duration(re: &Regex, line: &str) -> Option<f64> {
    let caps = re.captures(line)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Encoded position in seconds from a `-progress` `out_time_ms=` line.
///
/// Despite the name ffmpeg reports microseconds here.
fn parse_out_time(re: &Regex, line: &str) -> Option<f64> {
    let caps = re.captures(line)?;
    let micros: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(micros / 1_000_000.0)
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn load(&self) -> Result<(), TranscoderError> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscoderError::Unsupported {
                        reason: format!("ffmpeg not found at {}", self.ffmpeg_path.display()),
                    }
                } else {
                    TranscoderError::load_failed(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(TranscoderError::load_failed(format!(
                "ffmpeg -version exited with code {:?}",
                output.status.code()
            )));
        }

        tokio::fs::create_dir_all(&self.namespace)
            .await
            .map_err(|e| TranscoderError::load_failed(format!("cannot create namespace: {}", e)))?;

        let version = String::from_utf8_lossy(&output.stdout);
        info!(
            version = version.lines().next().unwrap_or("unknown"),
            namespace = %self.namespace.display(),
            "Loaded ffmpeg"
        );
        Ok(())
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), TranscoderError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn exec(
        &self,
        args: &[String],
        progress: Option<TranscodeProgress>,
    ) -> Result<(), TranscoderError> {
        debug!(args = ?args, "Running ffmpeg");

        let mut child = Command::new(&self.ffmpeg_path)
            .current_dir(&self.namespace)
            .args(["-nostdin", "-progress", "pipe:2", "-nostats"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscoderError::Unsupported {
                        reason: format!("ffmpeg not found at {}", self.ffmpeg_path.display()),
                    }
                } else {
                    TranscoderError::Io(e)
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TranscoderError::exec_failed("stderr was not captured", None))?;
        let mut reader = BufReader::new(stderr);

        let duration_regex = Regex::new(r"Duration: (\d+):(\d+):(\d+(?:\.\d+)?)").ok();
        let time_regex = Regex::new(r"out_time_ms=(\d+)").ok();

        let mut total_secs: Option<f64> = None;
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        // Raw lines: container metadata in the banner is not always UTF-8.
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("Stopped reading ffmpeg stderr: {}", e);
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf).trim_end().to_string();

            if total_secs.is_none() {
                if let Some(re) = &duration_regex {
                    total_secs = parse_duration(re, &line).filter(|d| *d > 0.0);
                }
            }

            let position = time_regex.as_ref().and_then(|re| parse_out_time(re, &line));
            if let (Some(position), Some(total), Some(callback)) = (position, total_secs, &progress) {
                callback((position / total).clamp(0.0, 1.0));
            }

            // Progress key=value lines are noise in error reports.
            if position.is_none() && !line.contains('=') {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            let stderr = Vec::from(tail).join("\n");
            return Err(TranscoderError::exec_failed(
                format!("ffmpeg exited with code {:?}", status.code()),
                (!stderr.is_empty()).then_some(stderr),
            ));
        }

        if let Some(callback) = &progress {
            callback(1.0);
        }
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, TranscoderError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TranscoderError::FileNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(TranscoderError::Io(e)),
        }
    }

    async fn delete_file(&self, name: &str) -> Result<(), TranscoderError> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TranscoderError::FileNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(TranscoderError::Io(e)),
        }
    }
}
