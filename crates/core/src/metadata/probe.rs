use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use super::MetadataError;
use crate::config::TranscoderConfig;

/// Container-level facts reported once the video's metadata has loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedStream {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
}

/// Source of container metadata for a file on disk.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbedStream, MetadataError>;
}

/// Probe backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: PathBuf,
}

impl FfprobeProbe {
    pub fn new(config: &TranscoderConfig) -> Self {
        Self {
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }

    /// Parses ffprobe JSON output, taking the first video stream.
    fn parse_output(output: &str) -> Result<ProbedStream, MetadataError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            width: Option<u32>,
            height: Option<u32>,
            duration: Option<String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| MetadataError::load_error(format!("unreadable ffprobe output: {}", e)))?;

        let video = probe
            .streams
            .iter()
            .find(|s| s.codec_type == "video")
            .ok_or_else(|| MetadataError::load_error("no video stream"))?;

        let (width, height) = match (video.width, video.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(MetadataError::load_error("video stream has no dimensions")),
        };

        let duration = probe
            .format
            .duration
            .as_deref()
            .or(video.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| MetadataError::load_error("video has no duration"))?;

        Ok(ProbedStream {
            duration,
            width,
            height,
        })
    }
}

#[async_trait]
impl MetadataProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<ProbedStream, MetadataError> {
        debug!(path = %path.display(), "Probing video metadata");

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MetadataError::load_error(format!(
                        "ffprobe not found at {}",
                        self.ffprobe_path.display()
                    ))
                } else {
                    MetadataError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(MetadataError::load_error(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Self::parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output() {
        let json = r#"{
            "streams": [
                {"codec_type": "audio", "codec_name": "aac"},
                {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080}
            ],
            "format": {"filename": "clip.mp4", "duration": "10.010000"}
        }"#;

        let probed = FfprobeProbe::parse_output(json).unwrap();
        assert_eq!(probed.width, 1920);
        assert_eq!(probed.height, 1080);
        assert!((probed.duration - 10.01).abs() < 1e-9);
    }

    #[test]
    fn test_parse_output_falls_back_to_stream_duration() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 480, "duration": "3.5"}],
            "format": {}
        }"#;
        assert_eq!(FfprobeProbe::parse_output(json).unwrap().duration, 3.5);
    }

    #[test]
    fn test_parse_output_without_video_stream() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "3.0"}}"#;
        let err = FfprobeProbe::parse_output(json).unwrap_err();
        assert!(matches!(err, MetadataError::LoadError { .. }));
    }

    #[test]
    fn test_parse_output_garbage() {
        assert!(FfprobeProbe::parse_output("not json").is_err());
    }
}
