use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::presets::PresetOverride;

const MB: u64 = 1024 * 1024;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Per-preset overrides keyed by preset name.
    #[serde(default)]
    pub presets: HashMap<String, PresetOverride>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request body limit for uploads, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_mb() -> u64 {
    100
}

/// Domain limits for uploaded videos.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f64,
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: f64,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    #[serde(default = "default_min_dimension")]
    pub min_width: u32,
    #[serde(default = "default_min_dimension")]
    pub min_height: u32,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration(),
            min_duration_secs: default_min_duration(),
            max_width: default_max_width(),
            max_height: default_max_height(),
            min_width: default_min_dimension(),
            min_height: default_min_dimension(),
            max_file_size: default_max_file_size(),
            min_file_size: default_min_file_size(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

fn default_max_duration() -> f64 {
    300.0
}

fn default_min_duration() -> f64 {
    0.1
}

fn default_max_width() -> u32 {
    3840
}

fn default_max_height() -> u32 {
    2160
}

fn default_min_dimension() -> u32 {
    32
}

fn default_max_file_size() -> u64 {
    100 * MB
}

fn default_min_file_size() -> u64 {
    1024
}

fn default_allowed_mime_types() -> Vec<String> {
    ["video/mp4", "video/mov", "video/quicktime", "video/avi", "video/webm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// ffmpeg/ffprobe locations and scratch space.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// Parent directory for per-engine virtual namespaces and probe files.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Upper bound on waiting for metadata from a probe.
    #[serde(default = "default_analysis_timeout")]
    pub analysis_timeout_secs: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            work_dir: default_work_dir(),
            analysis_timeout_secs: default_analysis_timeout(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("shareclip")
}

fn default_analysis_timeout() -> u64 {
    10
}

/// Adaptive timeout derivation for conversion jobs, and how long finished
/// sessions stay downloadable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_timeout_multiplier")]
    pub timeout_multiplier: f64,
    #[serde(default = "default_min_timeout")]
    pub min_timeout_secs: u64,
    #[serde(default = "default_max_timeout")]
    pub max_timeout_secs: u64,
    /// Completed or cancelled sessions are dropped this long after they end.
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_multiplier: default_timeout_multiplier(),
            min_timeout_secs: default_min_timeout(),
            max_timeout_secs: default_max_timeout(),
            retention_secs: default_retention(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_timeout_multiplier() -> f64 {
    2.5
}

fn default_min_timeout() -> u64 {
    60
}

fn default_max_timeout() -> u64 {
    900
}

fn default_retention() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    60
}

/// Sanitized config for API responses (host paths hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub session: SessionConfig,
    pub transcoder: SanitizedTranscoderConfig,
    pub preset_overrides: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranscoderConfig {
    pub custom_ffmpeg_path: bool,
    pub analysis_timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let mut preset_overrides: Vec<String> = config.presets.keys().cloned().collect();
        preset_overrides.sort();

        Self {
            server: config.server.clone(),
            limits: config.limits.clone(),
            session: config.session.clone(),
            transcoder: SanitizedTranscoderConfig {
                custom_ffmpeg_path: config.transcoder.ffmpeg_path != default_ffmpeg_path(),
                analysis_timeout_secs: config.transcoder.analysis_timeout_secs,
            },
            preset_overrides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_product_limits() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_duration_secs, 300.0);
        assert_eq!(config.limits.min_duration_secs, 0.1);
        assert_eq!(config.limits.max_file_size, 100 * 1024 * 1024);
        assert_eq!(config.session.min_timeout_secs, 60);
        assert_eq!(config.session.max_timeout_secs, 900);
        assert_eq!(config.session.retention_secs, 3600);
        assert_eq!(config.session.sweep_interval_secs, 60);
        assert_eq!(config.transcoder.analysis_timeout_secs, 10);
    }

    #[test]
    fn test_sanitized_hides_paths() {
        let mut config = Config::default();
        config.transcoder.ffmpeg_path = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.transcoder.custom_ffmpeg_path);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("/opt/ffmpeg"));
    }
}
